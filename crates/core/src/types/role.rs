//! Account roles, session roles and login portals.

use serde::{Deserialize, Serialize};

/// Stored account kind.
///
/// This is what the accounts table records. The approval flag of a
/// wholesaler lives next to it, and the two are combined into a [`Role`]
/// whenever a session is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "account_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    /// Store administrator.
    Admin,
    /// Wholesale buyer.
    Wholesaler,
}

impl std::fmt::Display for AccountRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Wholesaler => write!(f, "wholesaler"),
        }
    }
}

impl std::str::FromStr for AccountRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "wholesaler" => Ok(Self::Wholesaler),
            _ => Err(format!("invalid account role: {s}")),
        }
    }
}

/// Role carried by a session.
///
/// A closed variant so that every guard is an exhaustive match rather than a
/// string comparison. Serialized flat as `{"role": "wholesaler",
/// "wholesaler_approved": false}` so it can be embedded in descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Role {
    /// Store administrator.
    Admin,
    /// Wholesale buyer, usable only once approved by an administrator.
    Wholesaler {
        /// Whether an administrator has approved this wholesaler.
        #[serde(rename = "wholesaler_approved")]
        approved: bool,
    },
}

impl Role {
    /// Combine a stored account kind with its approval flag.
    ///
    /// The flag is ignored for administrators.
    #[must_use]
    pub const fn from_account(kind: AccountRole, wholesaler_approved: bool) -> Self {
        match kind {
            AccountRole::Admin => Self::Admin,
            AccountRole::Wholesaler => Self::Wholesaler {
                approved: wholesaler_approved,
            },
        }
    }

    /// The stored account kind behind this role.
    #[must_use]
    pub const fn account_role(self) -> AccountRole {
        match self {
            Self::Admin => AccountRole::Admin,
            Self::Wholesaler { .. } => AccountRole::Wholesaler,
        }
    }
}

/// Front-end application a login targets.
///
/// Each portal keeps its own credential: a distinct cookie on the server side
/// and a distinct storage key on the client side, so being signed in to the
/// admin dashboard says nothing about the wholesaler portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Portal {
    /// Admin dashboard.
    Admin,
    /// Wholesaler portal.
    #[serde(alias = "wholesaler")]
    Wholesale,
}

impl Portal {
    /// All portals, in cookie precedence order.
    pub const ALL: [Self; 2] = [Self::Admin, Self::Wholesale];

    /// Whether an account of the given kind may sign in through this portal.
    #[must_use]
    pub const fn admits(self, kind: AccountRole) -> bool {
        matches!(
            (self, kind),
            (Self::Admin, AccountRole::Admin) | (Self::Wholesale, AccountRole::Wholesaler)
        )
    }

    /// Name of the credential cookie the backend sets for this portal.
    #[must_use]
    pub const fn cookie_name(self) -> &'static str {
        match self {
            Self::Admin => "tp_admin_token",
            Self::Wholesale => "tp_wholesaler_token",
        }
    }

    /// Storage key under which the client keeps this portal's token.
    #[must_use]
    pub const fn token_storage_key(self) -> &'static str {
        match self {
            Self::Admin => "tradepost.admin.token",
            Self::Wholesale => "tradepost.wholesale.token",
        }
    }

    /// Route the client redirects to when no usable token is present.
    #[must_use]
    pub const fn login_route(self) -> &'static str {
        match self {
            Self::Admin => "/login",
            Self::Wholesale => "/wholesale/login",
        }
    }
}

impl std::fmt::Display for Portal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Wholesale => write!(f, "wholesale"),
        }
    }
}

impl std::str::FromStr for Portal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "wholesale" | "wholesaler" => Ok(Self::Wholesale),
            _ => Err(format!("invalid portal: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_account_ignores_flag_for_admin() {
        assert_eq!(Role::from_account(AccountRole::Admin, false), Role::Admin);
        assert_eq!(Role::from_account(AccountRole::Admin, true), Role::Admin);
        assert_eq!(
            Role::from_account(AccountRole::Wholesaler, false),
            Role::Wholesaler { approved: false }
        );
    }

    #[test]
    fn test_role_serializes_flat() {
        let json = serde_json::to_value(Role::Wholesaler { approved: true }).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"role": "wholesaler", "wholesaler_approved": true})
        );

        let json = serde_json::to_value(Role::Admin).unwrap();
        assert_eq!(json, serde_json::json!({"role": "admin"}));
    }

    #[test]
    fn test_portal_admits_only_its_role() {
        assert!(Portal::Admin.admits(AccountRole::Admin));
        assert!(!Portal::Admin.admits(AccountRole::Wholesaler));
        assert!(Portal::Wholesale.admits(AccountRole::Wholesaler));
        assert!(!Portal::Wholesale.admits(AccountRole::Admin));
    }

    #[test]
    fn test_portal_cookie_names_are_distinct() {
        assert_ne!(
            Portal::Admin.cookie_name(),
            Portal::Wholesale.cookie_name()
        );
    }

    #[test]
    fn test_account_role_round_trip_str() {
        assert_eq!("admin".parse::<AccountRole>().unwrap(), AccountRole::Admin);
        assert_eq!(AccountRole::Wholesaler.to_string(), "wholesaler");
        assert!("viewer".parse::<AccountRole>().is_err());
    }
}
