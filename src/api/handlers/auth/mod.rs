//! Auth handlers and supporting modules.
//!
//! Pipeline per endpoint:
//!
//! - **register:** validate → username must be free → argon2 hash → insert → `201 {id, username}`
//! - **login:** validate → username must resolve to exactly one account → verify →
//!   new session + cookie → `200 {"message": "welcome <username>!"}`
//! - **logout:** destroy the session (if any) and clear the cookie.
//!
//! ## Sessions
//!
//! Sessions live in a [`SessionStore`](crate::store::SessionStore). The cookie
//! carries a random token; the store keeps only its SHA-256. A middleware
//! resolves the token on every request into a [`SessionContext`], and
//! [`require_session`] guards protected routes with
//! `401 {"message": "You shall not pass!"}`.

mod checks;
pub mod error;
pub mod login;
pub mod logout;
pub mod password;
pub mod register;
pub mod session;
mod state;
pub mod types;
pub mod validate;

pub use error::ApiError;
pub use session::{require_session, resolve_session, SessionContext};
pub use state::{AuthConfig, AuthState};
