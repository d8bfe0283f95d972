//! Account domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tradepost_core::{AccountId, AccountRole, Email, Role, UserRef};

/// A stored account (domain type).
///
/// `Debug` is implemented manually so the password hash never reaches logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    /// Unique account ID.
    pub id: AccountId,
    /// Login email, stored lowercased.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Stored account kind. Never changes after creation.
    pub role: AccountRole,
    /// Approval flag; only meaningful for wholesalers.
    pub wholesaler_approved: bool,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Deactivated accounts cannot sign in and their sessions stop validating.
    pub active: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// The session role this account currently resolves to.
    #[must_use]
    pub const fn session_role(&self) -> Role {
        Role::from_account(self.role, self.wholesaler_approved)
    }

    /// Identity embedded in sessions.
    #[must_use]
    pub fn user_ref(&self) -> UserRef {
        UserRef {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }

    /// Public view without the password hash.
    #[must_use]
    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.session_role(),
            active: self.active,
            created_at: self.created_at,
        }
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("role", &self.role)
            .field("wholesaler_approved", &self.wholesaler_approved)
            .field("password_hash", &"[REDACTED]")
            .field("active", &self.active)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Fields required to create an account.
#[derive(Clone)]
pub struct NewAccount {
    /// Login email.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Account kind.
    pub role: AccountRole,
    /// Argon2id PHC string.
    pub password_hash: String,
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("role", &self.role)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

/// Account view returned by admin endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    /// Account ID.
    pub id: AccountId,
    /// Login email.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Current role, flattened into `role` / `wholesaler_approved`.
    #[serde(flatten)]
    pub role: Role,
    /// Whether the account may sign in.
    pub active: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// Which wholesalers to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WholesalerFilter {
    /// Awaiting approval.
    #[default]
    Pending,
    /// Already approved.
    Approved,
    /// Every wholesaler.
    All,
}

impl WholesalerFilter {
    /// Whether a wholesaler with this approval flag is included.
    #[must_use]
    pub const fn includes(self, approved: bool) -> bool {
        match self {
            Self::Pending => !approved,
            Self::Approved => approved,
            Self::All => true,
        }
    }
}

impl std::str::FromStr for WholesalerFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "all" => Ok(Self::All),
            _ => Err(format!("invalid wholesaler filter: {s}")),
        }
    }
}
