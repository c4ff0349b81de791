//! Request/response types for auth endpoints.

use crate::store::User;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Incoming `{username, password}` body. Both fields are optional here so the
/// validator can report which one is missing; a field that is not a JSON
/// string counts as missing without discarding the other one.
#[derive(ToSchema, Deserialize, Default)]
pub struct CredentialPayload {
    #[serde(default, deserialize_with = "string_or_none")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub password: Option<String>,
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(value) => Some(value),
        _ => None,
    })
}

impl std::fmt::Debug for CredentialPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPayload")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Every handled outcome is reported as `{"message": ...}`.
#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Public view of a user; the password hash never leaves the server.
#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}
