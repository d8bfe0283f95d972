//! In-memory stores for tests and local development.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use tradepost_core::{AccountId, Email, SessionToken};

use super::{AccountStore, SessionStore};
use crate::db::RepositoryError;
use crate::models::{Account, NewAccount, SessionRecord, WholesalerFilter};

/// Sessions held in a map. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionRecord>>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions, expired ones included.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no sessions are stored.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn find(&self, token: &SessionToken) -> Result<Option<SessionRecord>, RepositoryError> {
        Ok(self.sessions.read().await.get(token.as_str()).cloned())
    }

    async fn insert(&self, record: &SessionRecord) -> Result<(), RepositoryError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(record.token.as_str()) {
            return Err(RepositoryError::Conflict("session already exists".to_string()));
        }
        sessions.insert(record.token.as_str().to_string(), record.clone());
        Ok(())
    }

    async fn revoke(&self, token: &SessionToken) -> Result<bool, RepositoryError> {
        Ok(self.sessions.write().await.remove(token.as_str()).is_some())
    }

    async fn revoke_all_for(&self, account_id: AccountId) -> Result<u64, RepositoryError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.account_id != account_id);
        Ok((before - sessions.len()) as u64)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired_at(now));
        Ok((before - sessions.len()) as u64)
    }
}

#[derive(Debug, Default)]
struct Accounts {
    next_id: i32,
    by_id: HashMap<AccountId, Account>,
}

/// Accounts held in a map. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryAccountStore {
    inner: Arc<RwLock<Accounts>>,
}

impl MemoryAccountStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner.by_id.values().find(|a| &a.email == email).cloned())
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        Ok(self.inner.read().await.by_id.get(&id).cloned())
    }

    async fn create(&self, account: NewAccount) -> Result<Account, RepositoryError> {
        let mut inner = self.inner.write().await;
        if inner.by_id.values().any(|a| a.email == account.email) {
            return Err(RepositoryError::Conflict("account already exists".to_string()));
        }

        inner.next_id += 1;
        let created = Account {
            id: AccountId::new(inner.next_id),
            email: account.email,
            name: account.name,
            role: account.role,
            wholesaler_approved: false,
            password_hash: account.password_hash,
            active: true,
            created_at: Utc::now(),
        };
        inner.by_id.insert(created.id, created.clone());
        Ok(created)
    }

    async fn set_wholesaler_approval(
        &self,
        id: AccountId,
        approved: bool,
    ) -> Result<Account, RepositoryError> {
        let mut inner = self.inner.write().await;
        let account = inner
            .by_id
            .get_mut(&id)
            .filter(|a| a.role == tradepost_core::AccountRole::Wholesaler)
            .ok_or(RepositoryError::NotFound)?;
        account.wholesaler_approved = approved;
        Ok(account.clone())
    }

    async fn set_active(&self, id: AccountId, active: bool) -> Result<Account, RepositoryError> {
        let mut inner = self.inner.write().await;
        let account = inner.by_id.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        account.active = active;
        Ok(account.clone())
    }

    async fn list_wholesalers(
        &self,
        filter: WholesalerFilter,
    ) -> Result<Vec<Account>, RepositoryError> {
        let inner = self.inner.read().await;
        let mut accounts: Vec<Account> = inner
            .by_id
            .values()
            .filter(|a| {
                a.role == tradepost_core::AccountRole::Wholesaler
                    && filter.includes(a.wholesaler_approved)
            })
            .cloned()
            .collect();
        accounts.sort_by_key(|a| (a.created_at, a.id));
        Ok(accounts)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use tradepost_core::AccountRole;

    use super::*;

    fn new_account(email: &str, role: AccountRole) -> NewAccount {
        NewAccount {
            email: Email::parse(email).unwrap(),
            name: "Test".to_string(),
            role,
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryAccountStore::new();
        store
            .create(new_account("a@example.com", AccountRole::Wholesaler))
            .await
            .unwrap();
        let err = store
            .create(new_account("A@Example.com", AccountRole::Admin))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_approval_only_applies_to_wholesalers() {
        let store = MemoryAccountStore::new();
        let admin = store
            .create(new_account("admin@example.com", AccountRole::Admin))
            .await
            .unwrap();
        let buyer = store
            .create(new_account("buyer@example.com", AccountRole::Wholesaler))
            .await
            .unwrap();

        assert!(matches!(
            store.set_wholesaler_approval(admin.id, true).await,
            Err(RepositoryError::NotFound)
        ));
        assert!(
            store
                .set_wholesaler_approval(buyer.id, true)
                .await
                .unwrap()
                .wholesaler_approved
        );

        let pending = store.list_wholesalers(WholesalerFilter::Pending).await.unwrap();
        let approved = store.list_wholesalers(WholesalerFilter::Approved).await.unwrap();
        assert!(pending.is_empty());
        assert_eq!(approved.len(), 1);
    }

    #[tokio::test]
    async fn test_purge_removes_only_expired() {
        let store = MemorySessionStore::new();
        let now = Utc::now();
        for (token, expires_at) in [("old", now), ("new", now + Duration::hours(1))] {
            store
                .insert(&SessionRecord {
                    token: SessionToken::new(token),
                    account_id: AccountId::new(1),
                    created_at: now - Duration::hours(2),
                    expires_at,
                })
                .await
                .unwrap();
        }

        assert_eq!(store.purge_expired(now).await.unwrap(), 1);
        assert!(store.find(&SessionToken::new("old")).await.unwrap().is_none());
        assert!(store.find(&SessionToken::new("new")).await.unwrap().is_some());
    }
}
