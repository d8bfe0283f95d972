//! Integration tests for Tradepost.
//!
//! Everything runs in-process against in-memory stores; no database or
//! external service is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tradepost-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `api_access` - Guards, login and admin routes driven through the router
//! - `client_flow` - Client session cache, cart and checkout against a served API

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;

use tradepost_api::models::Account;
use tradepost_api::store::AccountStore;
use tradepost_api::{ApiConfig, AppState};
use tradepost_core::AccountRole;
use url::Url;

/// Password used for every seeded account.
pub const PASSWORD: &str = "correct horse battery staple";

/// Fresh state over in-memory stores, rate limiting off.
///
/// # Panics
///
/// Never in practice; the base URL is a constant.
#[must_use]
pub fn test_state() -> AppState {
    let base_url = Url::parse("http://localhost:3000").expect("valid base URL");
    AppState::in_memory(ApiConfig::local(base_url))
}

/// Create an account with [`PASSWORD`].
///
/// # Panics
///
/// Panics if the account cannot be created.
pub async fn seed_account(
    state: &AppState,
    email: &str,
    role: AccountRole,
    approved: bool,
) -> Account {
    let account = state
        .auth_service()
        .register(email, "Test Account", PASSWORD, role)
        .await
        .expect("Failed to seed account");

    if approved {
        state
            .accounts()
            .set_wholesaler_approval(account.id, true)
            .await
            .expect("Failed to approve wholesaler")
    } else {
        account
    }
}

/// An API served on an ephemeral local port.
pub struct TestServer {
    pub base_url: Url,
    pub state: AppState,
}

/// Serve the API router on `127.0.0.1:0`.
///
/// # Panics
///
/// Panics if the listener cannot be bound.
pub async fn spawn_server() -> TestServer {
    let state = test_state();
    let app = tradepost_api::app(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr: SocketAddr = listener.local_addr().expect("listener address");

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("Test server failed");
    });

    TestServer {
        base_url: Url::parse(&format!("http://{addr}")).expect("valid server URL"),
        state,
    }
}
