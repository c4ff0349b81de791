use super::{
    checks::ensure_username_free,
    error::ApiError,
    password,
    state::AuthState,
    types::{CredentialPayload, MessageResponse, UserResponse},
    validate::validate,
};
use crate::store::{NewUser, StoreError};
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::{info, instrument};

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = CredentialPayload,
    responses(
        (status = 201, description = "Registration successful", body = UserResponse, content_type = "application/json"),
        (status = 400, description = "Missing username or password", body = MessageResponse),
        (status = 422, description = "Username taken or password too short", body = MessageResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(auth_state, payload))]
pub async fn register(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<CredentialPayload>>,
) -> Result<impl IntoResponse, ApiError> {
    let credentials = validate(payload.map(|Json(payload)| payload).unwrap_or_default())?;

    ensure_username_free(auth_state.users(), &credentials.username).await?;

    let hashed = password::hash(credentials.password).await?;

    let user = match auth_state
        .users()
        .insert(NewUser {
            username: credentials.username,
            password: hashed,
        })
        .await
    {
        Ok(user) => user,
        // Lost the race between the availability check and the insert.
        Err(StoreError::UniqueViolation) => return Err(ApiError::UsernameTaken),
        Err(err) => return Err(err.into()),
    };

    info!(user_id = user.id, "user registered");

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}
