use super::{
    checks::resolve_account,
    error::ApiError,
    password,
    session::{session_cookie, SessionContext},
    state::AuthState,
    types::{CredentialPayload, MessageResponse},
    validate::validate,
};
use anyhow::Context;
use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = CredentialPayload,
    responses(
        (status = 200, description = "Login successful, session cookie set", body = MessageResponse),
        (status = 400, description = "Missing username or password", body = MessageResponse),
        (status = 401, description = "Invalid credentials", body = MessageResponse),
        (status = 422, description = "Password too short", body = MessageResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(auth_state, session, payload))]
pub async fn login(
    auth_state: Extension<Arc<AuthState>>,
    session: SessionContext,
    payload: Option<Json<CredentialPayload>>,
) -> Result<impl IntoResponse, ApiError> {
    let credentials = validate(payload.map(|Json(payload)| payload).unwrap_or_default())?;

    let user = resolve_account(auth_state.users(), &credentials.username).await?;

    if !password::verify(credentials.password, user.password.clone()).await? {
        info!("password mismatch");
        return Err(ApiError::InvalidCredentials);
    }

    // Always issue a fresh token; drop whatever session the client came with.
    if let Some(previous) = session.token.as_deref() {
        if let Err(err) = auth_state.sessions().destroy(previous).await {
            warn!("Failed to destroy previous session: {err}");
        }
    }

    let token = auth_state
        .sessions()
        .create(&user, auth_state.config().session_ttl())
        .await?;
    let cookie = session_cookie(&auth_state, &token).context("failed to build session cookie")?;

    info!(user_id = user.id, "session created");

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, cookie)],
        Json(MessageResponse::new(format!(
            "welcome {}!",
            credentials.username
        ))),
    ))
}
