//! Typed failures for the auth pipeline.
//!
//! Every variant owns its status code and client-facing message. Store,
//! session and internal failures are logged and rendered as a generic 500 so
//! no backend detail reaches the client.

use super::{types::MessageResponse, validate::ValidationError};
use crate::store::{SessionError, StoreError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

pub(crate) const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Username taken")]
    UsernameTaken,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("You shall not pass!")]
    Unauthenticated,
    #[error("user store failure: {0}")]
    Store(#[from] StoreError),
    #[error("session store failure: {0}")]
    Session(#[from] SessionError),
    #[error("failed to destroy session: {0}")]
    Logout(SessionError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(err) => err.status(),
            Self::UsernameTaken => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidCredentials | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Store(_) | Self::Session(_) | Self::Logout(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Validation(err) => err.message(),
            Self::UsernameTaken => "Username taken",
            Self::InvalidCredentials => "Invalid credentials",
            Self::Unauthenticated => "You shall not pass!",
            Self::Logout(_) => "Could not log out",
            Self::Store(_) | Self::Session(_) | Self::Internal(_) => INTERNAL_ERROR_MESSAGE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{self:#}");
        }
        (status, Json(MessageResponse::new(self.message()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handled_errors_map_to_documented_statuses() {
        assert_eq!(
            ApiError::from(ValidationError::UsernameRequired).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(ValidationError::PasswordTooShort).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::UsernameTaken.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn backend_errors_do_not_leak_detail() {
        let err = ApiError::Session(SessionError::Unavailable("redis://secret-host".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), INTERNAL_ERROR_MESSAGE);

        let err = ApiError::Logout(SessionError::Unavailable("boom".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Could not log out");
    }
}
