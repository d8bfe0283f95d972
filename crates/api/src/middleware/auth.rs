//! Access guard extractors.
//!
//! Each extractor runs the token carrier, the session validator and one
//! [`Policy`], in that order:
//!
//! ```rust,ignore
//! async fn approve(
//!     RequireAdmin(admin): RequireAdmin,
//!     Path(id): Path<i32>,
//! ) -> impl IntoResponse {
//!     format!("{} approved {id}", admin.user.name)
//! }
//! ```
//!
//! On success the resolved [`Session`] is also inserted into the request
//! extensions. Portal cookies are tried in order until one validates, so a
//! stale admin cookie does not shadow a live wholesaler cookie. Missing and
//! invalid tokens produce the same 401 body; it clears every portal cookie
//! except one that was presented and never checked.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use tradepost_core::{AccessDecision, ForbiddenReason, Policy, Portal, Session};

use super::token::{TokenSource, clear_cookies, portal_cookies, presented_tokens};
use crate::db::RepositoryError;
use crate::error::{AppError, set_sentry_user};
use crate::state::AppState;

/// Why a guard refused a request.
#[derive(Debug)]
pub enum GuardRejection {
    /// No usable session.
    Unauthorized {
        /// Portal cookies to delete.
        clear: Vec<Portal>,
        /// Whether the clearing cookies carry `Secure`.
        secure_cookies: bool,
    },
    /// Valid session, insufficient role.
    Forbidden(ForbiddenReason),
    /// The session store could not be read.
    Store(RepositoryError),
}

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized {
                clear,
                secure_cookies,
            } => {
                let mut response = AppError::Unauthorized.into_response();
                clear_cookies(response.headers_mut(), &clear, secure_cookies);
                response
            }
            Self::Forbidden(reason) => AppError::Forbidden(reason).into_response(),
            Self::Store(err) => AppError::Database(err).into_response(),
        }
    }
}

/// Run the guard for `policy` against a request.
///
/// # Errors
///
/// Returns a [`GuardRejection`] when the policy denies access.
#[tracing::instrument(skip_all, fields(policy = ?policy))]
pub async fn authorize(
    parts: &mut Parts,
    state: &AppState,
    policy: Policy,
) -> Result<Session, GuardRejection> {
    let secure_cookies = state.config().secure_cookies();

    let presented = presented_tokens(&parts.headers);
    let service = state.session_service();
    let now = Utc::now();

    let mut session = None;
    let mut rejected = Vec::new();
    for candidate in &presented {
        match service
            .validate(&candidate.token, now)
            .await
            .map_err(GuardRejection::Store)?
            .into_session()
        {
            Some(found) => {
                session = Some(found);
                break;
            }
            None => rejected.push(candidate.source),
        }
    }

    match policy.evaluate(session) {
        AccessDecision::Authorized(session) => {
            set_sentry_user(&session.user.id, Some(session.user.email.as_str()));
            parts.extensions.insert(session.clone());
            Ok(session)
        }
        AccessDecision::Forbidden(reason) => {
            tracing::info!(reason = reason.as_str(), "Access forbidden");
            Err(GuardRejection::Forbidden(reason))
        }
        AccessDecision::Unauthorized => Err(GuardRejection::Unauthorized {
            clear: cookies_to_clear(&portal_cookies(&parts.headers), &rejected),
            secure_cookies,
        }),
    }
}

/// Portals whose cookie is absent or failed validation.
///
/// A cookie left unchecked because a bearer header took precedence is kept.
fn cookies_to_clear(sent: &[Portal], rejected: &[TokenSource]) -> Vec<Portal> {
    Portal::ALL
        .into_iter()
        .filter(|&portal| {
            !sent.contains(&portal) || rejected.contains(&TokenSource::Cookie(portal))
        })
        .collect()
}

macro_rules! guard_extractor {
    ($(#[$doc:meta])* $name:ident, $policy:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name(pub Session);

        impl<S> FromRequestParts<S> for $name
        where
            S: Send + Sync,
            AppState: FromRef<S>,
        {
            type Rejection = GuardRejection;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &S,
            ) -> Result<Self, Self::Rejection> {
                let state = AppState::from_ref(state);
                authorize(parts, &state, $policy).await.map(Self)
            }
        }
    };
}

guard_extractor!(
    /// Any valid session.
    RequireAuthenticated,
    Policy::Authenticated
);

guard_extractor!(
    /// Administrators only; others get 403 "admin access required".
    RequireAdmin,
    Policy::Admin
);

guard_extractor!(
    /// Approved wholesalers only. Administrators get 403 "role mismatch",
    /// unapproved wholesalers 403 "pending approval".
    RequireApprovedWholesaler,
    Policy::ApprovedWholesaler
);
