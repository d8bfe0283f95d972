//! Stored session rows.

use chrono::{DateTime, Utc};

use tradepost_core::{AccountId, SessionToken};

/// A persisted session.
///
/// Only the owning account is recorded. Role and approval are read from the
/// account whenever the session is validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    /// Bearer token identifying the session.
    pub token: SessionToken,
    /// Account the session belongs to.
    pub account_id: AccountId,
    /// When the session was issued.
    pub created_at: DateTime<Utc>,
    /// Instant after which the session is invalid.
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Whether the session has expired at `now`. The boundary counts as expired.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
