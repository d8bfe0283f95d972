//! Administrator routes for wholesaler management.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use tradepost_core::AccountId;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireAdmin;
use crate::models::{AccountSummary, WholesalerFilter};
use crate::state::AppState;

/// Query parameters for the wholesaler list.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub status: WholesalerFilter,
}

/// Handle `GET /api/admin/wholesalers`.
pub async fn list_wholesalers(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<AccountSummary>>> {
    let accounts = state.accounts().list_wholesalers(query.status).await?;
    Ok(Json(accounts.iter().map(|a| a.summary()).collect()))
}

/// Handle `POST /api/admin/wholesalers/{id}/approve`.
///
/// Unknown ids and non-wholesaler accounts both give 404.
#[tracing::instrument(skip(admin, state), fields(admin_id = %admin.user.id))]
pub async fn approve_wholesaler(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<AccountSummary>> {
    let account = state
        .accounts()
        .set_wholesaler_approval(AccountId::new(id), true)
        .await?;

    tracing::info!(account_id = %account.id, "Wholesaler approved");
    add_breadcrumb(
        "admin",
        "Wholesaler approved",
        &[("account_id", &account.id.to_string())],
    );

    Ok(Json(account.summary()))
}
