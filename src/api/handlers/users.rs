use super::auth::{
    types::{MessageResponse, UserResponse},
    ApiError, AuthState,
};
use axum::{extract::Extension, Json};
use std::sync::Arc;
use tracing::instrument;

#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Registered users", body = [UserResponse]),
        (status = 401, description = "No authenticated session", body = MessageResponse),
    ),
    tag = "users"
)]
// Mounted behind `require_session`.
#[instrument(skip(auth_state))]
pub async fn list_users(
    auth_state: Extension<Arc<AuthState>>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = auth_state.users().list().await?;
    Ok(Json(users.iter().map(UserResponse::from).collect()))
}
