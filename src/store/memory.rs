//! In-process backend used when no DSN is configured, and by tests.
//!
//! Mirrors the Postgres behavior: usernames are unique, ids are assigned
//! sequentially starting at 1, and sessions are keyed by the token hash.

use super::{
    generate_session_token, hash_session_token, NewUser, SessionError, SessionStore, StoreError,
    User, UserStore,
};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;

#[derive(Debug)]
struct MemorySession {
    user: User,
    expires_at: Instant,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    sessions: RwLock<HashMap<Vec<u8>, MemorySession>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) sessions.
    pub async fn session_count(&self) -> usize {
        let now = Instant::now();
        self.sessions
            .read()
            .await
            .values()
            .filter(|session| session.expires_at > now)
            .count()
    }

    #[cfg(test)]
    pub(crate) async fn session_keys(&self) -> Vec<Vec<u8>> {
        self.sessions.read().await.keys().cloned().collect()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Vec<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .filter(|user| user.username == username)
            .cloned()
            .collect())
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|existing| existing.username == user.username) {
            return Err(StoreError::UniqueViolation);
        }

        let id = users.last().map_or(1, |last| last.id + 1);
        let user = User {
            id,
            username: user.username,
            password: user.password,
        };
        users.push(user.clone());

        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.read().await.clone())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create(&self, user: &User, ttl: Duration) -> Result<String, SessionError> {
        let token = generate_session_token()?;
        let now = Instant::now();
        let expires_at = now
            .checked_add(ttl)
            .ok_or_else(|| SessionError::Unavailable("session ttl overflow".to_string()))?;

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, session| session.expires_at > now);
        sessions.insert(
            hash_session_token(&token),
            MemorySession {
                user: user.clone(),
                expires_at,
            },
        );

        Ok(token)
    }

    async fn load(&self, token: &str) -> Result<Option<User>, SessionError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(&hash_session_token(token))
            .filter(|session| session.expires_at > Instant::now())
            .map(|session| session.user.clone()))
    }

    async fn destroy(&self, token: &str) -> Result<(), SessionError> {
        self.sessions
            .write()
            .await
            .remove(&hash_session_token(token));
        Ok(())
    }
}
