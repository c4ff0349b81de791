//! Session cookie handling, per-request session context and the access gate.
//!
//! Flow: `resolve_session` runs on every request, reads the session cookie (or
//! a bearer token), resolves it through the session store and attaches a
//! [`SessionContext`]. Handlers extract that context; protected routes sit
//! behind `require_session`.

use super::{error::ApiError, state::AuthState};
use crate::store::User;
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{
        header::{InvalidHeaderValue, AUTHORIZATION, COOKIE},
        request::Parts,
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{convert::Infallible, sync::Arc};
use tracing::debug;

/// Session state for the current request.
#[derive(Clone, Debug, Default)]
pub struct SessionContext {
    /// Token presented by the client, valid or not.
    pub token: Option<String>,
    /// Set only when the token resolved to a live session.
    pub user: Option<User>,
}

impl SessionContext {
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<Self>()
            .cloned()
            .unwrap_or_default())
    }
}

/// Middleware: resolve the presented session token into a [`SessionContext`].
pub async fn resolve_session(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = extract_session_token(
        request.headers(),
        auth_state.config().session_cookie_name(),
    );

    let user = match &token {
        Some(token) => match auth_state.sessions().load(token).await {
            Ok(user) => user,
            Err(err) => return ApiError::Session(err).into_response(),
        },
        None => None,
    };

    if token.is_some() && user.is_none() {
        debug!("presented session token is unknown or expired");
    }

    request
        .extensions_mut()
        .insert(SessionContext { token, user });

    next.run(request).await
}

/// The session gate: only requests carrying an authenticated user pass.
///
/// # Errors
/// Returns [`ApiError::Unauthenticated`] when there is no session user.
pub fn authorize(context: Option<&SessionContext>) -> Result<&User, ApiError> {
    context
        .and_then(SessionContext::user)
        .ok_or(ApiError::Unauthenticated)
}

/// Middleware form of [`authorize`] for protected routers.
pub async fn require_session(request: Request, next: Next) -> Response {
    if let Err(err) = authorize(request.extensions().get::<SessionContext>()) {
        return err.into_response();
    }
    next.run(request).await
}

/// Build a secure `HttpOnly` cookie for the session token.
pub(super) fn session_cookie(
    auth_state: &AuthState,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let config = auth_state.config();
    let name = config.session_cookie_name();
    let ttl_seconds = config.session_ttl_seconds();
    let mut cookie =
        format!("{name}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}");
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub(super) fn clear_session_cookie(
    auth_state: &AuthState,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let config = auth_state.config();
    let name = config.session_cookie_name();
    let mut cookie = format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn extract_session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(token) = extract_bearer_token(headers) {
        return Some(token);
    }
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let (Some(key), Some(val)) = (parts.next(), parts.next()) else {
                continue;
            };
            let val = val.trim();
            if key.trim() == cookie_name && !val.is_empty() {
                return Some(val.to_string());
            }
        }
    }
    None
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::AuthConfig;
    use crate::store::memory::MemoryStore;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            if let Ok(value) = HeaderValue::from_str(value) {
                headers.append(*name, value);
            }
        }
        headers
    }

    fn state(config: AuthConfig) -> AuthState {
        let store = Arc::new(MemoryStore::new());
        AuthState::new(config, store.clone(), store)
    }

    #[test]
    fn extracts_named_cookie() {
        let headers = headers(&[("cookie", "theme=dark; authgate_session=abc123; lang=en")]);
        assert_eq!(
            extract_session_token(&headers, "authgate_session"),
            Some("abc123".to_string())
        );
        assert_eq!(extract_session_token(&headers, "sid"), None);
    }

    #[test]
    fn ignores_empty_cookie_value() {
        let headers = headers(&[("cookie", "authgate_session=")]);
        assert_eq!(extract_session_token(&headers, "authgate_session"), None);
    }

    #[test]
    fn bearer_token_wins_over_cookie() {
        let headers = headers(&[
            ("authorization", "Bearer from-header"),
            ("cookie", "authgate_session=from-cookie"),
        ]);
        assert_eq!(
            extract_session_token(&headers, "authgate_session"),
            Some("from-header".to_string())
        );
    }

    #[test]
    fn blank_bearer_is_ignored() {
        let headers = headers(&[("authorization", "Bearer   ")]);
        assert_eq!(extract_bearer_token(&headers), None);
    }

    #[test]
    fn session_cookie_attributes() -> anyhow::Result<()> {
        let plain = state(AuthConfig::new().with_session_ttl_seconds(60));
        let cookie = session_cookie(&plain, "tok")?;
        assert_eq!(
            cookie.to_str()?,
            "authgate_session=tok; Path=/; HttpOnly; SameSite=Lax; Max-Age=60"
        );

        let secure = state(AuthConfig::new().with_session_cookie_secure(true));
        let cleared = clear_session_cookie(&secure)?;
        assert_eq!(
            cleared.to_str()?,
            "authgate_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0; Secure"
        );
        Ok(())
    }

    #[test]
    fn gate_requires_a_session_user() {
        assert!(matches!(authorize(None), Err(ApiError::Unauthenticated)));

        let anonymous = SessionContext {
            token: Some("stale".to_string()),
            user: None,
        };
        assert!(matches!(
            authorize(Some(&anonymous)),
            Err(ApiError::Unauthenticated)
        ));

        let signed_in = SessionContext {
            token: Some("live".to_string()),
            user: Some(User {
                id: 1,
                username: "sue".to_string(),
                password: "hash".to_string(),
            }),
        };
        assert_eq!(authorize(Some(&signed_in)).map(|u| u.id).ok(), Some(1));
    }
}
