//! Session issuance and validation.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;

use tradepost_core::{Session, SessionToken};

use crate::db::RepositoryError;
use crate::models::{Account, SessionRecord};
use crate::store::{AccountStore, SessionStore};

/// Bytes of entropy in a session token.
const TOKEN_BYTES: usize = 32;

/// Generate a fresh 256-bit token, base64url encoded without padding.
#[must_use]
pub fn generate_token() -> SessionToken {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    SessionToken::new(URL_SAFE_NO_PAD.encode(bytes))
}

/// Why a token did not validate. Only ever logged; callers see one outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// No session with this token.
    Unknown,
    /// The session reached its expiry.
    Expired,
    /// The owning account is deactivated or gone.
    Deactivated,
}

impl InvalidReason {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Expired => "expired",
            Self::Deactivated => "deactivated",
        }
    }
}

/// Result of validating a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// The token resolves to a live session.
    Valid(Session),
    /// The token must be discarded by whoever holds it.
    Invalid(InvalidReason),
}

impl SessionStatus {
    /// The session, if valid.
    #[must_use]
    pub fn into_session(self) -> Option<Session> {
        match self {
            Self::Valid(session) => Some(session),
            Self::Invalid(_) => None,
        }
    }
}

/// Issues, validates and revokes sessions.
pub struct SessionService<'a> {
    sessions: &'a dyn SessionStore,
    accounts: &'a dyn AccountStore,
}

impl<'a> SessionService<'a> {
    /// Create a session service over the given stores.
    #[must_use]
    pub const fn new(sessions: &'a dyn SessionStore, accounts: &'a dyn AccountStore) -> Self {
        Self { sessions, accounts }
    }

    /// Resolve a token to a session.
    ///
    /// Read-only. Role and approval come from the account as it is now, so
    /// approving a wholesaler takes effect on their next request.
    ///
    /// # Errors
    ///
    /// Returns an error only if a store cannot be read.
    #[tracing::instrument(skip_all)]
    pub async fn validate(
        &self,
        token: &SessionToken,
        now: DateTime<Utc>,
    ) -> Result<SessionStatus, RepositoryError> {
        let status = self.resolve(token, now).await?;
        if let SessionStatus::Invalid(reason) = &status {
            tracing::debug!(reason = reason.as_str(), "Session rejected");
        }
        Ok(status)
    }

    async fn resolve(
        &self,
        token: &SessionToken,
        now: DateTime<Utc>,
    ) -> Result<SessionStatus, RepositoryError> {
        let Some(record) = self.sessions.find(token).await? else {
            return Ok(SessionStatus::Invalid(InvalidReason::Unknown));
        };
        if record.is_expired_at(now) {
            return Ok(SessionStatus::Invalid(InvalidReason::Expired));
        }

        let account = match self.accounts.find_by_id(record.account_id).await? {
            Some(account) if account.active => account,
            _ => return Ok(SessionStatus::Invalid(InvalidReason::Deactivated)),
        };

        Ok(SessionStatus::Valid(Session {
            token: record.token,
            user: account.user_ref(),
            role: account.session_role(),
            expires_at: record.expires_at,
        }))
    }

    /// Issue a new session for an authenticated account.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be stored.
    #[tracing::instrument(skip_all, fields(account_id = %account.id))]
    pub async fn issue(
        &self,
        account: &Account,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<Session, RepositoryError> {
        let record = SessionRecord {
            token: generate_token(),
            account_id: account.id,
            created_at: now,
            expires_at: now + ttl,
        };
        self.sessions.insert(&record).await?;
        tracing::info!(expires_at = %record.expires_at, "Session issued");

        Ok(Session {
            token: record.token,
            user: account.user_ref(),
            role: account.session_role(),
            expires_at: record.expires_at,
        })
    }

    /// Revoke a session. Unknown tokens are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub async fn revoke(&self, token: &SessionToken) -> Result<bool, RepositoryError> {
        self.sessions.revoke(token).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tradepost_core::{AccountRole, Email, Role};

    use super::*;
    use crate::models::NewAccount;
    use crate::store::{MemoryAccountStore, MemorySessionStore};

    struct Fixture {
        sessions: MemorySessionStore,
        accounts: MemoryAccountStore,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                sessions: MemorySessionStore::new(),
                accounts: MemoryAccountStore::new(),
            }
        }

        fn service(&self) -> SessionService<'_> {
            SessionService::new(&self.sessions, &self.accounts)
        }

        async fn account(&self, email: &str, role: AccountRole) -> Account {
            self.accounts
                .create(NewAccount {
                    email: Email::parse(email).unwrap(),
                    name: "Test".to_string(),
                    role,
                    password_hash: String::new(),
                })
                .await
                .unwrap()
        }
    }

    #[test]
    fn test_tokens_are_unique_and_url_safe() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 43);
        assert!(
            a.as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[tokio::test]
    async fn test_unknown_token_is_invalid() {
        let fx = Fixture::new();
        let status = fx
            .service()
            .validate(&SessionToken::new("nope"), Utc::now())
            .await
            .unwrap();
        assert_eq!(status, SessionStatus::Invalid(InvalidReason::Unknown));
    }

    #[tokio::test]
    async fn test_session_expires_at_boundary() {
        let fx = Fixture::new();
        let admin = fx.account("admin@example.com", AccountRole::Admin).await;
        let now = Utc::now();
        let session = fx
            .service()
            .issue(&admin, Duration::hours(1), now)
            .await
            .unwrap();

        let before = fx
            .service()
            .validate(&session.token, session.expires_at - Duration::seconds(1))
            .await
            .unwrap();
        assert_eq!(before, SessionStatus::Valid(session.clone()));

        let at = fx
            .service()
            .validate(&session.token, session.expires_at)
            .await
            .unwrap();
        assert_eq!(at, SessionStatus::Invalid(InvalidReason::Expired));
    }

    #[tokio::test]
    async fn test_deactivated_account_invalidates_session() {
        let fx = Fixture::new();
        let admin = fx.account("admin@example.com", AccountRole::Admin).await;
        let now = Utc::now();
        let session = fx
            .service()
            .issue(&admin, Duration::hours(1), now)
            .await
            .unwrap();

        fx.accounts.set_active(admin.id, false).await.unwrap();

        let status = fx.service().validate(&session.token, now).await.unwrap();
        assert_eq!(status, SessionStatus::Invalid(InvalidReason::Deactivated));
    }

    #[tokio::test]
    async fn test_approval_is_read_live() {
        let fx = Fixture::new();
        let buyer = fx.account("buyer@example.com", AccountRole::Wholesaler).await;
        let now = Utc::now();
        let session = fx
            .service()
            .issue(&buyer, Duration::hours(1), now)
            .await
            .unwrap();
        assert_eq!(session.role, Role::Wholesaler { approved: false });

        fx.accounts
            .set_wholesaler_approval(buyer.id, true)
            .await
            .unwrap();

        let resolved = fx
            .service()
            .validate(&session.token, now)
            .await
            .unwrap()
            .into_session()
            .unwrap();
        assert_eq!(resolved.role, Role::Wholesaler { approved: true });
    }

    #[tokio::test]
    async fn test_revoked_token_is_invalid() {
        let fx = Fixture::new();
        let admin = fx.account("admin@example.com", AccountRole::Admin).await;
        let now = Utc::now();
        let session = fx
            .service()
            .issue(&admin, Duration::hours(1), now)
            .await
            .unwrap();

        assert!(fx.service().revoke(&session.token).await.unwrap());
        assert!(!fx.service().revoke(&session.token).await.unwrap());
        assert_eq!(
            fx.service().validate(&session.token, now).await.unwrap(),
            SessionStatus::Invalid(InvalidReason::Unknown)
        );
    }
}
