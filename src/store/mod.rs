//! Persistence seams for users and sessions.
//!
//! Handlers only talk to the [`UserStore`] and [`SessionStore`] traits. Two
//! backends exist: [`postgres::PgStore`] for deployments and
//! [`memory::MemoryStore`] for local development and tests.
//!
//! Session tokens are random 32-byte values handed to the client; stores only
//! ever see (and persist) their SHA-256 digest.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::Duration;

/// Persisted account record. `password` is always an argon2 PHC string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
}

/// Account about to be inserted; the store assigns the id.
#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub password: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The username is already present (uniqueness constraint).
    #[error("username already exists")]
    UniqueViolation,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to generate session token: {0}")]
    Token(String),
    #[error("session store unavailable: {0}")]
    Unavailable(String),
    #[error("session database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Exact-match lookup. More than one row is possible on stores without a
    /// uniqueness constraint, so callers decide what multiple matches mean.
    async fn find_by_username(&self, username: &str) -> Result<Vec<User>, StoreError>;

    /// Insert a user and return it with the assigned id.
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;

    /// All users ordered by id.
    async fn list(&self) -> Result<Vec<User>, StoreError>;

    /// Cheap liveness probe for `/health`.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create a session for `user` and return the raw token for the cookie.
    async fn create(&self, user: &User, ttl: Duration) -> Result<String, SessionError>;

    /// Resolve a raw token to its user; `None` for unknown or expired tokens.
    async fn load(&self, token: &str) -> Result<Option<User>, SessionError>;

    /// Remove the session. Unknown tokens are not an error.
    async fn destroy(&self, token: &str) -> Result<(), SessionError>;
}

/// Create a new session token for the auth cookie.
pub(crate) fn generate_session_token() -> Result<String, SessionError> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|err| SessionError::Token(err.to_string()))?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

/// Hash a session token so raw values never reach the store.
pub(crate) fn hash_session_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_tokens_are_unique_and_url_safe() -> Result<(), SessionError> {
        let first = generate_session_token()?;
        let second = generate_session_token()?;
        assert_ne!(first, second);
        // 32 bytes, unpadded base64
        assert_eq!(first.len(), 43);
        assert!(first
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        Ok(())
    }

    #[test]
    fn session_token_hash_is_stable() {
        let token = "abc";
        assert_eq!(hash_session_token(token), hash_session_token(token));
        assert_ne!(hash_session_token(token), hash_session_token("abd"));
        assert_eq!(hash_session_token(token).len(), 32);
    }
}
