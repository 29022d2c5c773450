//! Session token service
//!
//! Sessions are rows in PostgreSQL, not framework state: login mints an
//! opaque random token, the auth middleware resolves it back to a user on
//! every request, logout deletes it. Expiry is enforced at lookup time.

use anyhow::Result;
use chrono::{Duration, Utc};
use rand::RngCore;
use sqlx::PgPool;
use std::fmt::Write as _;
use tracing::info;
use uuid::Uuid;

use crate::models::Session;

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Session lifetime in seconds (default: 7 days)
    pub ttl_seconds: i64,
}

impl SessionConfig {
    /// Create a new SessionConfig from environment variables
    ///
    /// # Environment Variables
    /// - `SESSION_TTL_SECONDS`: session lifetime (default: 604800)
    pub fn from_env() -> Result<Self> {
        let ttl_seconds = std::env::var("SESSION_TTL_SECONDS")
            .unwrap_or_else(|_| "604800".to_string())
            .parse()
            .unwrap_or(604_800);

        Ok(SessionConfig { ttl_seconds })
    }
}

/// Session service backed by the `sessions` table
#[derive(Clone)]
pub struct SessionService {
    pool: PgPool,
    config: SessionConfig,
}

impl SessionService {
    /// Create a new session service
    pub fn new(pool: PgPool, config: SessionConfig) -> Self {
        Self { pool, config }
    }

    /// Generate an opaque session token (32 random bytes, hex)
    fn generate_token() -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        bytes.iter().fold(String::with_capacity(64), |mut out, b| {
            let _ = write!(out, "{:02x}", b);
            out
        })
    }

    /// Create a new session for a user and return it along with its token
    pub async fn create(&self, user_id: Uuid) -> Result<Session> {
        info!("Creating session for user: {}", user_id);

        let token = Self::generate_token();
        let expires_at = Utc::now() + Duration::seconds(self.config.ttl_seconds);

        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (token, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, token, user_id, expires_at, created_at
            "#,
        )
        .bind(&token)
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    /// Resolve a token to its session, if it exists and has not expired
    pub async fn find_valid(&self, token: &str) -> Result<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, token, user_id, expires_at, created_at
            FROM sessions
            WHERE token = $1 AND expires_at > now()
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Delete a session by token (logout); returns whether a row was removed
    pub async fn delete(&self, token: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove expired sessions; returns the number of rows deleted
    pub async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= now()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
