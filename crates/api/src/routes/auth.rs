//! Login, logout and session lookup.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use tradepost_core::{Portal, SessionDescriptor, SessionToken};

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{
    RequireAuthenticated, clear_all_cookies, presented_tokens, session_cookie,
};
use crate::state::AppState;

/// Login request body.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub portal: Portal,
}

/// Login response body. The token is also set as the portal cookie.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: SessionToken,
    pub session: SessionDescriptor,
}

/// Handle `POST /api/auth/login`.
#[tracing::instrument(skip_all, fields(portal = tracing::field::Empty))]
pub async fn login(
    State(state): State<AppState>,
    body: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(body) = body?;
    tracing::Span::current().record("portal", tracing::field::display(body.portal));
    let account = state
        .auth_service()
        .login(&body.email, &body.password, body.portal)
        .await?;

    let config = state.config();
    let session = state
        .session_service()
        .issue(&account, config.session_ttl, Utc::now())
        .await?;

    set_sentry_user(&account.id, Some(account.email.as_str()));

    let cookie = session_cookie(
        body.portal,
        &session.token,
        config.session_ttl,
        config.secure_cookies(),
    )
    .ok_or_else(|| AppError::Internal("session token is not a valid cookie value".to_string()))?;

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);

    let response = LoginResponse {
        token: session.token.clone(),
        session: session.descriptor(),
    };
    Ok((headers, Json(response)).into_response())
}

/// Handle `POST /api/auth/logout`.
///
/// Revokes every token the request carries. Always succeeds. A store
/// failure while revoking is logged, not returned: the client has already
/// dropped its copy of the token.
#[tracing::instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let service = state.session_service();
    for presented in presented_tokens(&headers) {
        match service.revoke(&presented.token).await {
            Ok(revoked) => tracing::info!(revoked, source = ?presented.source, "Logout"),
            Err(e) => tracing::warn!(error = %e, "Failed to revoke session on logout"),
        }
    }
    clear_sentry_user();

    let mut response = StatusCode::NO_CONTENT.into_response();
    clear_all_cookies(response.headers_mut(), state.config().secure_cookies());
    response
}

/// Handle `GET /api/auth/session`.
pub async fn session(
    RequireAuthenticated(session): RequireAuthenticated,
) -> Json<SessionDescriptor> {
    Json(session.descriptor())
}
