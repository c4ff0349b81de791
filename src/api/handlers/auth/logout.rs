use super::{
    error::ApiError,
    session::{clear_session_cookie, SessionContext},
    state::AuthState,
    types::MessageResponse,
};
use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{error, info, instrument};

#[utoipa::path(
    get,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session destroyed, or there was no session", body = MessageResponse),
        (status = 500, description = "Session could not be destroyed", body = MessageResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(auth_state, session))]
pub async fn logout(
    auth_state: Extension<Arc<AuthState>>,
    session: SessionContext,
) -> Result<Response, ApiError> {
    let (Some(token), Some(user)) = (session.token.as_deref(), session.user()) else {
        return Ok((StatusCode::OK, Json(MessageResponse::new("no session"))).into_response());
    };

    // On failure the cookie stays so the client can retry.
    auth_state
        .sessions()
        .destroy(token)
        .await
        .map_err(ApiError::Logout)?;

    info!(user_id = user.id, "session destroyed");

    let mut headers = HeaderMap::new();
    match clear_session_cookie(&auth_state) {
        Ok(cookie) => {
            headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build clear-session cookie: {err}"),
    }

    Ok((
        StatusCode::OK,
        headers,
        Json(MessageResponse::new("logged out")),
    )
        .into_response())
}
