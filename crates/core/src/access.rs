//! Guard policies and access decisions.
//!
//! The same [`Policy::evaluate`] runs in the backend extractors (over a
//! [`Session`]) and in the client route intercept (over a
//! [`SessionDescriptor`]), so a page the client lets through is never one the
//! server would refuse for a different reason.
//!
//! Two asymmetries are deliberate:
//! - a missing token and an invalid token collapse into the same
//!   [`AccessDecision::Unauthorized`], so callers cannot probe which tokens
//!   exist;
//! - a wholesaler that is not yet approved gets
//!   [`ForbiddenReason::PendingApproval`], distinct from
//!   [`ForbiddenReason::RoleMismatch`], because waiting fixes the former and
//!   nothing fixes the latter.

use serde::{Deserialize, Serialize};

use crate::types::{Role, Session, SessionDescriptor};

/// Anything that carries a [`Role`] and can therefore be authorized.
pub trait Principal {
    /// Role of the principal.
    fn role(&self) -> Role;
}

impl Principal for Session {
    fn role(&self) -> Role {
        self.role
    }
}

impl Principal for SessionDescriptor {
    fn role(&self) -> Role {
        self.role
    }
}

impl Principal for Role {
    fn role(&self) -> Role {
        *self
    }
}

/// The three enforcement policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Any valid session.
    Authenticated,
    /// Administrators only.
    Admin,
    /// Approved wholesalers only.
    ApprovedWholesaler,
}

/// Why a valid session was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForbiddenReason {
    /// The operation needs an administrator.
    AdminRequired,
    /// The operation needs a wholesaler and the caller is something else.
    RoleMismatch,
    /// The caller is a wholesaler awaiting approval.
    PendingApproval,
}

impl ForbiddenReason {
    /// Short machine-stable reason string returned in 403 bodies.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AdminRequired => "admin access required",
            Self::RoleMismatch => "role mismatch",
            Self::PendingApproval => "pending approval",
        }
    }

    /// Sentence suitable for showing to the user.
    #[must_use]
    pub const fn user_message(self) -> &'static str {
        match self {
            Self::AdminRequired => "This area is only available to store administrators.",
            Self::RoleMismatch => "This area is only available to wholesale accounts.",
            Self::PendingApproval => {
                "Your wholesale account is pending approval. \
                 You will get access as soon as an administrator approves it."
            }
        }
    }
}

impl std::fmt::Display for ForbiddenReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of evaluating a policy. Never stored; recomputed per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision<P = Session> {
    /// No usable credential (missing, unknown, expired or deactivated).
    Unauthorized,
    /// Valid credential, insufficient role.
    Forbidden(ForbiddenReason),
    /// Access granted; carries the resolved principal.
    Authorized(P),
}

impl<P> AccessDecision<P> {
    /// Convert into a `Result`, with `None` standing for `Unauthorized`.
    ///
    /// # Errors
    ///
    /// Returns `Err(None)` when unauthorized and `Err(Some(reason))` when
    /// forbidden.
    pub fn into_result(self) -> Result<P, Option<ForbiddenReason>> {
        match self {
            Self::Unauthorized => Err(None),
            Self::Forbidden(reason) => Err(Some(reason)),
            Self::Authorized(principal) => Ok(principal),
        }
    }

    /// Whether access was granted.
    #[must_use]
    pub const fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized(_))
    }
}

impl Policy {
    /// Check a role against this policy.
    ///
    /// # Errors
    ///
    /// Returns the [`ForbiddenReason`] when the role does not satisfy the
    /// policy.
    pub const fn permits(self, role: Role) -> Result<(), ForbiddenReason> {
        match (self, role) {
            (Self::Authenticated, _)
            | (Self::Admin, Role::Admin)
            | (Self::ApprovedWholesaler, Role::Wholesaler { approved: true }) => Ok(()),
            (Self::Admin, Role::Wholesaler { .. }) => Err(ForbiddenReason::AdminRequired),
            (Self::ApprovedWholesaler, Role::Admin) => Err(ForbiddenReason::RoleMismatch),
            (Self::ApprovedWholesaler, Role::Wholesaler { approved: false }) => {
                Err(ForbiddenReason::PendingApproval)
            }
        }
    }

    /// Evaluate the policy for an optional, already validated principal.
    ///
    /// `None` means no valid session could be resolved, for whatever reason.
    pub fn evaluate<P: Principal>(self, principal: Option<P>) -> AccessDecision<P> {
        let Some(principal) = principal else {
            return AccessDecision::Unauthorized;
        };

        match self.permits(principal.role()) {
            Ok(()) => AccessDecision::Authorized(principal),
            Err(reason) => AccessDecision::Forbidden(reason),
        }
    }
}
