//! # authgate
//!
//! Session-based authentication for a JSON web API: registration, login,
//! logout and a session gate for protected routes.
//!
//! ## Endpoints
//!
//! - `POST /api/auth/register` `{username, password}` → `201 {id, username}`
//! - `POST /api/auth/login` `{username, password}` → `200 {"message": "welcome <username>!"}`
//!   and a session cookie
//! - `GET /api/auth/logout` → `200 {"message": "logged out"}` or `{"message": "no session"}`
//! - `GET /api/users` → users list, behind the session gate
//!
//! Handled failures are always `{"message": ...}` with a specific status:
//! validation (`400`/`422`), taken usernames (`422`), bad credentials or a
//! missing session (`401`).
//!
//! ## Storage
//!
//! Users and sessions go to Postgres when a DSN is configured (schema in
//! `sql/schema.sql`) and to an in-memory store otherwise. Passwords are
//! stored as argon2 PHC strings; session tokens only as SHA-256 digests.

pub mod api;
pub mod cli;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
