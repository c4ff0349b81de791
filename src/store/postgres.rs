//! Postgres backend (see `sql/schema.sql`).

use super::{
    generate_session_token, hash_session_token, NewUser, SessionError, SessionStore, StoreError,
    User, UserStore,
};
use async_trait::async_trait;
use sqlx::{postgres::PgRow, Connection, PgPool, Row};
use std::time::Duration;
use tracing::{info_span, Instrument};

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password: row.try_get("password")?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code == "23505"),
        _ => false,
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_username(&self, username: &str) -> Result<Vec<User>, StoreError> {
        let query = "SELECT id, username, password FROM users WHERE username = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let rows = sqlx::query(query)
            .bind(username)
            .fetch_all(&self.pool)
            .instrument(span)
            .await?;

        Ok(rows
            .iter()
            .map(user_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let query = r"
            INSERT INTO users (username, password)
            VALUES ($1, $2)
            RETURNING id, username, password
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(&user.username)
            .bind(&user.password)
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    StoreError::UniqueViolation
                } else {
                    StoreError::Database(err)
                }
            })?;

        Ok(user_from_row(&row)?)
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let query = "SELECT id, username, password FROM users ORDER BY id";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .instrument(span)
            .await?;

        Ok(rows
            .iter()
            .map(user_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self.pool.acquire().instrument(acquire_span).await?;
        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping().instrument(ping_span).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn create(&self, user: &User, ttl: Duration) -> Result<String, SessionError> {
        let token = generate_session_token()?;
        // Expired rows are pruned in the same statement as the insert.
        let query = r"
            WITH pruned AS (
                DELETE FROM sessions WHERE expires_at <= now()
            )
            INSERT INTO sessions (token_hash, user_id, expires_at)
            VALUES ($1, $2, now() + make_interval(secs => $3))
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(hash_session_token(&token))
            .bind(user.id)
            .bind(ttl.as_secs_f64())
            .execute(&self.pool)
            .instrument(span)
            .await?;

        Ok(token)
    }

    async fn load(&self, token: &str) -> Result<Option<User>, SessionError> {
        let query = r"
            SELECT u.id, u.username, u.password
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token_hash = $1 AND s.expires_at > now()
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(hash_session_token(token))
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn destroy(&self, token: &str) -> Result<(), SessionError> {
        let query = "DELETE FROM sessions WHERE token_hash = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DELETE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(hash_session_token(token))
            .execute(&self.pool)
            .instrument(span)
            .await?;

        Ok(())
    }
}
