//! Session repository backed by `PostgreSQL`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use tradepost_core::{AccountId, SessionToken};

use super::RepositoryError;
use crate::models::SessionRecord;
use crate::store::SessionStore;

#[derive(sqlx::FromRow)]
struct SessionRow {
    token: String,
    account_id: i32,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl From<SessionRow> for SessionRecord {
    fn from(row: SessionRow) -> Self {
        Self {
            token: SessionToken::new(row.token),
            account_id: AccountId::new(row.account_id),
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}

/// `PostgreSQL` implementation of [`SessionStore`].
#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    /// Create a new session store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn find(&self, token: &SessionToken) -> Result<Option<SessionRecord>, RepositoryError> {
        let row: Option<SessionRow> = sqlx::query_as(
            "SELECT token, account_id, created_at, expires_at FROM sessions WHERE token = $1",
        )
        .bind(token.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SessionRecord::from))
    }

    async fn insert(&self, record: &SessionRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO sessions (token, account_id, created_at, expires_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(record.token.as_str())
        .bind(record.account_id)
        .bind(record.created_at)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "session"))?;

        Ok(())
    }

    async fn revoke(&self, token: &SessionToken) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn revoke_all_for(&self, account_id: AccountId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM sessions WHERE account_id = $1")
            .bind(account_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
