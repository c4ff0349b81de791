//! Auth state and configuration shared by every handler.

use crate::store::{SessionStore, UserStore};
use std::{sync::Arc, time::Duration};

const DEFAULT_SESSION_TTL_SECONDS: u64 = 24 * 60 * 60;
const DEFAULT_SESSION_COOKIE_NAME: &str = "authgate_session";

#[derive(Clone, Debug)]
pub struct AuthConfig {
    session_cookie_name: String,
    session_ttl_seconds: u64,
    session_cookie_secure: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            session_cookie_name: DEFAULT_SESSION_COOKIE_NAME.to_string(),
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            session_cookie_secure: false,
        }
    }

    #[must_use]
    pub fn with_session_cookie_name(mut self, name: String) -> Self {
        self.session_cookie_name = name;
        self
    }

    #[must_use]
    pub const fn with_session_ttl_seconds(mut self, seconds: u64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub const fn with_session_cookie_secure(mut self, secure: bool) -> Self {
        self.session_cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn session_cookie_name(&self) -> &str {
        &self.session_cookie_name
    }

    #[must_use]
    pub const fn session_ttl_seconds(&self) -> u64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub const fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_seconds)
    }

    #[must_use]
    pub const fn session_cookie_secure(&self) -> bool {
        self.session_cookie_secure
    }
}

/// Stores and config, injected into handlers as `Extension<Arc<AuthState>>`.
pub struct AuthState {
    config: AuthConfig,
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
}

impl AuthState {
    #[must_use]
    pub fn new(
        config: AuthConfig,
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            config,
            users,
            sessions,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn users(&self) -> &dyn UserStore {
        self.users.as_ref()
    }

    #[must_use]
    pub fn sessions(&self) -> &dyn SessionStore {
        self.sessions.as_ref()
    }
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_config_defaults() {
        let config = AuthConfig::new();
        assert_eq!(config.session_cookie_name(), "authgate_session");
        assert_eq!(config.session_ttl_seconds(), 86_400);
        assert_eq!(config.session_ttl(), Duration::from_secs(86_400));
        assert!(!config.session_cookie_secure());
    }

    #[test]
    fn auth_config_builders_override_defaults() {
        let config = AuthConfig::new()
            .with_session_cookie_name("sid".to_string())
            .with_session_ttl_seconds(60)
            .with_session_cookie_secure(true);
        assert_eq!(config.session_cookie_name(), "sid");
        assert_eq!(config.session_ttl_seconds(), 60);
        assert!(config.session_cookie_secure());
    }
}
