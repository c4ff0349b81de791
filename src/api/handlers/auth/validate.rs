//! Credential shape checks, run before any store access.
//!
//! Rules are evaluated in table order and the first violation wins.

use super::types::CredentialPayload;
use axum::http::StatusCode;

const MIN_PASSWORD_CHARS: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("username is required")]
    UsernameRequired,
    #[error("password is required")]
    PasswordRequired,
    #[error("Password must be longer than 3 chars")]
    PasswordTooShort,
}

impl ValidationError {
    /// Shape failures are 400; a present-but-short password is 422.
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::UsernameRequired | Self::PasswordRequired => StatusCode::BAD_REQUEST,
            Self::PasswordTooShort => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::UsernameRequired => "username is required",
            Self::PasswordRequired => "password is required",
            Self::PasswordTooShort => "Password must be longer than 3 chars",
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Field {
    Username,
    Password,
}

#[derive(Clone, Copy, Debug)]
enum Rule {
    /// Present and non-empty.
    Required,
    /// At least this many characters.
    MinLength(usize),
}

impl Rule {
    fn holds(self, value: Option<&str>) -> bool {
        match self {
            Self::Required => value.is_some_and(|v| !v.is_empty()),
            Self::MinLength(min) => value.is_some_and(|v| v.chars().count() >= min),
        }
    }
}

const RULES: [(Field, Rule, ValidationError); 3] = [
    (
        Field::Username,
        Rule::Required,
        ValidationError::UsernameRequired,
    ),
    (
        Field::Password,
        Rule::Required,
        ValidationError::PasswordRequired,
    ),
    (
        Field::Password,
        Rule::MinLength(MIN_PASSWORD_CHARS),
        ValidationError::PasswordTooShort,
    ),
];

/// Credentials that passed every rule.
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Validate a payload, returning the first violated rule.
///
/// # Errors
/// Returns the [`ValidationError`] of the first rule that does not hold.
pub fn validate(payload: CredentialPayload) -> Result<Credentials, ValidationError> {
    for (field, rule, error) in RULES {
        let value = match field {
            Field::Username => payload.username.as_deref(),
            Field::Password => payload.password.as_deref(),
        };
        if !rule.holds(value) {
            return Err(error);
        }
    }

    match (payload.username, payload.password) {
        (Some(username), Some(password)) => Ok(Credentials { username, password }),
        (None, _) => Err(ValidationError::UsernameRequired),
        (_, None) => Err(ValidationError::PasswordRequired),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(username: Option<&str>, password: Option<&str>) -> CredentialPayload {
        CredentialPayload {
            username: username.map(str::to_string),
            password: password.map(str::to_string),
        }
    }

    #[test]
    fn accepts_valid_credentials() -> Result<(), ValidationError> {
        let credentials = validate(payload(Some("sue"), Some("1234")))?;
        assert_eq!(credentials.username, "sue");
        assert_eq!(credentials.password, "1234");
        Ok(())
    }

    #[test]
    fn three_chars_is_long_enough() {
        assert!(validate(payload(Some("sue"), Some("abc"))).is_ok());
    }

    #[test]
    fn missing_username() {
        for username in [None, Some("")] {
            let err = validate(payload(username, Some("1234"))).err();
            assert_eq!(err, Some(ValidationError::UsernameRequired));
        }
    }

    #[test]
    fn missing_password() {
        for password in [None, Some("")] {
            let err = validate(payload(Some("sue"), password)).err();
            assert_eq!(err, Some(ValidationError::PasswordRequired));
        }
    }

    #[test]
    fn short_password() {
        for password in ["1", "12", "éé"] {
            let err = validate(payload(Some("sue"), Some(password))).err();
            assert_eq!(err, Some(ValidationError::PasswordTooShort));
        }
    }

    #[test]
    fn username_rule_is_checked_first() {
        let err = validate(payload(None, None)).err();
        assert_eq!(err, Some(ValidationError::UsernameRequired));
        let err = validate(payload(None, Some("1"))).err();
        assert_eq!(err, Some(ValidationError::UsernameRequired));
    }

    #[test]
    fn statuses_and_messages() {
        assert_eq!(
            ValidationError::UsernameRequired.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ValidationError::PasswordRequired.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ValidationError::PasswordTooShort.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ValidationError::PasswordTooShort.message(),
            "Password must be longer than 3 chars"
        );
        assert_eq!(
            ValidationError::UsernameRequired.to_string(),
            ValidationError::UsernameRequired.message()
        );
    }
}
