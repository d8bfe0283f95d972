//! Session types.
//!
//! A [`Session`] is created by login on the backend and is read-only
//! everywhere else. Clients only ever see the [`SessionDescriptor`], which
//! omits the token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AccountId, Email, Role};

/// Opaque bearer credential.
///
/// `Debug` is redacted so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a raw token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the token and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

/// The identity behind a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    /// Account id.
    pub id: AccountId,
    /// Account email.
    pub email: Email,
    /// Display name.
    pub name: String,
}

/// A resolved, unexpired session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Bearer credential that identifies this session.
    pub token: SessionToken,
    /// Who the session belongs to.
    pub user: UserRef,
    /// Role at the time of resolution; never changes for a session.
    pub role: Role,
    /// Instant after which the session is no longer valid.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session has expired at `now`.
    ///
    /// A session is already expired at the exact instant of `expires_at`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Token-free view of the session for API responses.
    #[must_use]
    pub fn descriptor(&self) -> SessionDescriptor {
        SessionDescriptor {
            user: self.user.clone(),
            role: self.role,
            expires_at: self.expires_at,
        }
    }
}

/// Session view returned by the session endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescriptor {
    /// Who the session belongs to.
    pub user: UserRef,
    /// Role, flattened into `role` / `wholesaler_approved` fields.
    #[serde(flatten)]
    pub role: Role,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn session(expires_at: DateTime<Utc>) -> Session {
        Session {
            token: SessionToken::new("tok-123"),
            user: UserRef {
                id: AccountId::new(7),
                email: Email::parse("buyer@example.com").unwrap(),
                name: "Buyer".to_string(),
            },
            role: Role::Wholesaler { approved: true },
            expires_at,
        }
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = SessionToken::new("very-secret-token");
        let debug = format!("{token:?}");
        assert!(!debug.contains("very-secret-token"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_expiry_boundary_is_expired() {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let s = session(at);
        assert!(!s.is_expired_at(at - Duration::seconds(1)));
        assert!(s.is_expired_at(at));
        assert!(s.is_expired_at(at + Duration::seconds(1)));
    }

    #[test]
    fn test_descriptor_round_trip_omits_token() {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let descriptor = session(at).descriptor();
        let json = serde_json::to_value(&descriptor).unwrap();

        assert_eq!(json["role"], "wholesaler");
        assert_eq!(json["wholesaler_approved"], true);
        assert_eq!(json["user"]["email"], "buyer@example.com");
        assert!(!json.to_string().contains("tok-123"));

        let back: SessionDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(back, descriptor);
    }
}
