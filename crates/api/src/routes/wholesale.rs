//! Wholesaler self-service routes.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;

use tradepost_core::{AccountRole, SessionDescriptor};

use crate::error::Result;
use crate::middleware::RequireApprovedWholesaler;
use crate::models::AccountSummary;
use crate::state::AppState;

/// Registration request body.
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Handle `POST /api/wholesale/register`.
///
/// The new account is pending until an administrator approves it.
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    body: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AccountSummary>)> {
    let Json(body) = body?;
    let account = state
        .auth_service()
        .register(&body.email, &body.name, &body.password, AccountRole::Wholesaler)
        .await?;

    Ok((StatusCode::CREATED, Json(account.summary())))
}

/// Handle `GET /api/wholesale/account`.
pub async fn account(
    RequireApprovedWholesaler(session): RequireApprovedWholesaler,
) -> Json<SessionDescriptor> {
    Json(session.descriptor())
}
