//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::db::{PgAccountStore, PgSessionStore};
use crate::services::{AuthService, SessionService};
use crate::store::{AccountStore, MemoryAccountStore, MemorySessionStore, SessionStore};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Stores are trait objects so the same
/// router runs against `PostgreSQL` in production and in-memory maps in
/// tests.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    sessions: Arc<dyn SessionStore>,
    accounts: Arc<dyn AccountStore>,
}

impl AppState {
    /// Create state over arbitrary stores.
    #[must_use]
    pub fn new(
        config: ApiConfig,
        sessions: Arc<dyn SessionStore>,
        accounts: Arc<dyn AccountStore>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                sessions,
                accounts,
            }),
        }
    }

    /// Create state backed by `PostgreSQL`.
    #[must_use]
    pub fn with_pool(config: ApiConfig, pool: PgPool) -> Self {
        Self::new(
            config,
            Arc::new(PgSessionStore::new(pool.clone())),
            Arc::new(PgAccountStore::new(pool)),
        )
    }

    /// Create state backed by in-memory stores.
    #[must_use]
    pub fn in_memory(config: ApiConfig) -> Self {
        Self::new(
            config,
            Arc::new(MemorySessionStore::new()),
            Arc::new(MemoryAccountStore::new()),
        )
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Session persistence.
    #[must_use]
    pub fn sessions(&self) -> &dyn SessionStore {
        self.inner.sessions.as_ref()
    }

    /// Account persistence.
    #[must_use]
    pub fn accounts(&self) -> &dyn AccountStore {
        self.inner.accounts.as_ref()
    }

    /// Session service over this state's stores.
    #[must_use]
    pub fn session_service(&self) -> SessionService<'_> {
        SessionService::new(self.sessions(), self.accounts())
    }

    /// Authentication service over this state's account store.
    #[must_use]
    pub fn auth_service(&self) -> AuthService<'_> {
        AuthService::new(self.accounts())
    }
}
