//! Username lookups shared by the register and login flows.

use super::error::ApiError;
use crate::store::{User, UserStore};
use tracing::debug;

/// Registration path: the username must not exist yet.
///
/// The store's uniqueness constraint remains the final word; this is the fast path.
pub(super) async fn ensure_username_free(
    users: &dyn UserStore,
    username: &str,
) -> Result<(), ApiError> {
    if users.find_by_username(username).await?.is_empty() {
        Ok(())
    } else {
        debug!("username already registered");
        Err(ApiError::UsernameTaken)
    }
}

/// Login path: resolve exactly one account. Zero and multiple matches both
/// yield the same error.
pub(super) async fn resolve_account(
    users: &dyn UserStore,
    username: &str,
) -> Result<User, ApiError> {
    let mut rows = users.find_by_username(username).await?;
    if rows.len() == 1 {
        if let Some(user) = rows.pop() {
            return Ok(user);
        }
    }
    debug!(matches = rows.len(), "username did not resolve to one account");
    Err(ApiError::InvalidCredentials)
}
