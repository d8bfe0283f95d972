//! Account repository backed by `PostgreSQL`.
//!
//! Queries are checked at runtime (`query_as`) so the crate builds without a
//! live database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use tradepost_core::{AccountId, AccountRole, Email};

use super::RepositoryError;
use crate::models::{Account, NewAccount, WholesalerFilter};
use crate::store::AccountStore;

const ACCOUNT_COLUMNS: &str =
    "id, email, name, role, wholesaler_approved, password_hash, active, created_at";

/// Database row for `accounts`.
#[derive(sqlx::FromRow)]
struct AccountRow {
    id: i32,
    email: String,
    name: String,
    role: AccountRole,
    wholesaler_approved: bool,
    password_hash: String,
    active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = RepositoryError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: AccountId::new(row.id),
            email,
            name: row.name,
            role: row.role,
            wholesaler_approved: row.wholesaler_approved,
            password_hash: row.password_hash,
            active: row.active,
            created_at: row.created_at,
        })
    }
}

/// `PostgreSQL` implementation of [`AccountStore`].
#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    /// Create a new account store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, RepositoryError> {
        let row: Option<AccountRow> = sqlx::query_as(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE LOWER(email) = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Account::try_from).transpose()
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        let row: Option<AccountRow> = sqlx::query_as(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Account::try_from).transpose()
    }

    async fn create(&self, account: NewAccount) -> Result<Account, RepositoryError> {
        let row: AccountRow = sqlx::query_as(&format!(
            "INSERT INTO accounts (email, name, role, password_hash) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(account.email.as_str())
        .bind(&account.name)
        .bind(account.role)
        .bind(&account.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "account"))?;

        Account::try_from(row)
    }

    async fn set_wholesaler_approval(
        &self,
        id: AccountId,
        approved: bool,
    ) -> Result<Account, RepositoryError> {
        let row: Option<AccountRow> = sqlx::query_as(&format!(
            "UPDATE accounts SET wholesaler_approved = $2, updated_at = NOW() \
             WHERE id = $1 AND role = 'wholesaler' \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(id)
        .bind(approved)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    async fn set_active(&self, id: AccountId, active: bool) -> Result<Account, RepositoryError> {
        let row: Option<AccountRow> = sqlx::query_as(&format!(
            "UPDATE accounts SET active = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    async fn list_wholesalers(
        &self,
        filter: WholesalerFilter,
    ) -> Result<Vec<Account>, RepositoryError> {
        let approved: Option<bool> = match filter {
            WholesalerFilter::Pending => Some(false),
            WholesalerFilter::Approved => Some(true),
            WholesalerFilter::All => None,
        };

        let rows: Vec<AccountRow> = sqlx::query_as(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts \
             WHERE role = 'wholesaler' \
               AND ($1::BOOLEAN IS NULL OR wholesaler_approved = $1) \
             ORDER BY created_at, id"
        ))
        .bind(approved)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Account::try_from).collect()
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
