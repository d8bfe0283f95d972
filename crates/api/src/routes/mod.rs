//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                              - Liveness
//! GET  /health/ready                        - Readiness (store reachable)
//!
//! # Auth
//! POST /api/auth/login                      - Password login for a portal (rate limited)
//! POST /api/auth/logout                     - Revoke the presented token, clear cookies
//! GET  /api/auth/session                    - Session descriptor for the presented token
//!
//! # Wholesale
//! POST /api/wholesale/register              - Create a pending wholesaler account
//! GET  /api/wholesale/account               - Caller's descriptor (approved wholesalers)
//!
//! # Admin (requires admin)
//! GET  /api/admin/wholesalers?status=...    - List wholesalers
//! POST /api/admin/wholesalers/{id}/approve  - Approve a wholesaler
//! ```

pub mod admin;
pub mod auth;
pub mod health;
pub mod wholesale;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{auth_rate_limiter, rate_limited_json};
use crate::state::AppState;

/// Create the auth routes router.
///
/// Only the login route is rate limited.
pub fn auth_routes(rate_limit: bool) -> Router<AppState> {
    let login = Router::new().route("/login", post(auth::login));
    let login = if rate_limit {
        login
            .layer(auth_rate_limiter())
            .layer(axum::middleware::map_response(rate_limited_json))
    } else {
        login
    };

    Router::new()
        .merge(login)
        .route("/logout", post(auth::logout))
        .route("/session", get(auth::session))
}

/// Create the wholesale routes router.
pub fn wholesale_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(wholesale::register))
        .route("/account", get(wholesale::account))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/wholesalers", get(admin::list_wholesalers))
        .route("/wholesalers/{id}/approve", post(admin::approve_wholesaler))
}

/// All routes.
pub fn routes(rate_limit: bool) -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/auth", auth_routes(rate_limit))
        .nest("/api/wholesale", wholesale_routes())
        .nest("/api/admin", admin_routes())
}
