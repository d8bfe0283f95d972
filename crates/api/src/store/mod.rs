//! Storage traits for accounts and sessions.
//!
//! Handlers and the session validator only see these traits. Production
//! wires in the `PostgreSQL` implementations from [`crate::db`]; tests and
//! local development use [`memory`].

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use tradepost_core::{AccountId, Email, SessionToken};

use crate::db::RepositoryError;
use crate::models::{Account, NewAccount, SessionRecord, WholesalerFilter};

pub use memory::{MemoryAccountStore, MemorySessionStore};

/// Persistence for issued sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Look up a session by token. Expired records are still returned.
    async fn find(&self, token: &SessionToken) -> Result<Option<SessionRecord>, RepositoryError>;

    /// Store a newly issued session.
    async fn insert(&self, record: &SessionRecord) -> Result<(), RepositoryError>;

    /// Delete a session. Returns whether it existed.
    async fn revoke(&self, token: &SessionToken) -> Result<bool, RepositoryError>;

    /// Delete every session of an account. Returns how many were removed.
    async fn revoke_all_for(&self, account_id: AccountId) -> Result<u64, RepositoryError>;

    /// Delete sessions expired at `now`. Returns how many were removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError>;
}

/// Persistence for accounts.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Look up an account by (lowercased) email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, RepositoryError>;

    /// Look up an account by id.
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError>;

    /// Create an account. Wholesalers start unapproved.
    ///
    /// Fails with [`RepositoryError::Conflict`] if the email is taken.
    async fn create(&self, account: NewAccount) -> Result<Account, RepositoryError>;

    /// Set a wholesaler's approval flag.
    ///
    /// Fails with [`RepositoryError::NotFound`] for unknown ids and for
    /// accounts that are not wholesalers.
    async fn set_wholesaler_approval(
        &self,
        id: AccountId,
        approved: bool,
    ) -> Result<Account, RepositoryError>;

    /// Activate or deactivate an account.
    async fn set_active(&self, id: AccountId, active: bool) -> Result<Account, RepositoryError>;

    /// List wholesalers, oldest first.
    async fn list_wholesalers(
        &self,
        filter: WholesalerFilter,
    ) -> Result<Vec<Account>, RepositoryError>;

    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
