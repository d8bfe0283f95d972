//! Integration tests for the client library against a served API.
//!
//! Covers the session cache lifecycle (login, revalidation, approval,
//! logout) and checkout through a stub messaging gateway.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tradepost_api::store::AccountStore;
use tradepost_client::{
    ApiClient, FileStorage, HttpGateway, Navigator, OrderDispatcher, Revalidation, SessionCache,
    SessionCheck, checkout,
};
use tradepost_core::{
    AccessDecision, AccountRole, Cart, CartLine, Contact, CountryCode, DispatchState,
    ForbiddenReason, MessageComposer, Policy, Portal, SessionToken,
};
use tradepost_integration_tests::{PASSWORD, seed_account, spawn_server};
use url::Url;

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<String>>>);

impl Navigator for Recorder {
    fn navigate(&self, path: &str) {
        self.0.lock().expect("navigator lock").push(path.to_string());
    }
}

impl Recorder {
    fn last(&self) -> Option<String> {
        self.0.lock().expect("navigator lock").last().cloned()
    }
}

// ============================================================================
// Session cache
// ============================================================================

#[tokio::test]
async fn test_pending_wholesaler_gains_access_after_approval() {
    let server = spawn_server().await;
    let account =
        seed_account(&server.state, "buyer@example.com", AccountRole::Wholesaler, false).await;

    let dir = tempfile::tempdir().expect("tempdir");
    let storage = FileStorage::open(dir.path()).expect("storage");
    let api = ApiClient::new(server.base_url.clone()).expect("api client");
    let navigator = Recorder::default();
    let mut cache = SessionCache::new(Portal::Wholesale, storage, api, navigator.clone());

    cache
        .login("buyer@example.com", PASSWORD)
        .await
        .expect("login");
    assert!(cache.has_token());
    assert_eq!(
        cache.access(Policy::ApprovedWholesaler),
        AccessDecision::Forbidden(ForbiddenReason::PendingApproval)
    );

    server
        .state
        .accounts()
        .set_wholesaler_approval(account.id, true)
        .await
        .expect("approve");

    assert!(matches!(cache.revalidate().await, Revalidation::Valid(_)));
    assert!(cache.access(Policy::ApprovedWholesaler).is_authorized());
    assert!(navigator.last().is_none());
}

#[tokio::test]
async fn test_revoked_token_is_purged_on_revalidation() {
    let server = spawn_server().await;
    seed_account(&server.state, "admin@example.com", AccountRole::Admin, false).await;

    let dir = tempfile::tempdir().expect("tempdir");
    let api = ApiClient::new(server.base_url.clone()).expect("api client");
    let navigator = Recorder::default();
    let mut cache = SessionCache::new(
        Portal::Admin,
        FileStorage::open(dir.path()).expect("storage"),
        api.clone(),
        navigator.clone(),
    );

    cache
        .login("admin@example.com", PASSWORD)
        .await
        .expect("login");
    let token = cache.token().expect("cached token");

    // Revoked elsewhere, e.g. from another tab.
    api.logout(&token).await.expect("server logout");

    assert_eq!(cache.revalidate().await, Revalidation::Rejected);
    assert!(!cache.has_token());
    assert_eq!(navigator.last().as_deref(), Some("/login"));
}

#[tokio::test]
async fn test_logout_revokes_server_side() {
    let server = spawn_server().await;
    seed_account(&server.state, "admin@example.com", AccountRole::Admin, false).await;

    let dir = tempfile::tempdir().expect("tempdir");
    let api = ApiClient::new(server.base_url.clone()).expect("api client");
    let mut cache = SessionCache::new(
        Portal::Admin,
        FileStorage::open(dir.path()).expect("storage"),
        api.clone(),
        Recorder::default(),
    );

    cache
        .login("admin@example.com", PASSWORD)
        .await
        .expect("login");
    let token: SessionToken = cache.token().expect("cached token");

    cache.logout().await;

    assert!(!cache.has_token());
    assert_eq!(
        api.validate_session(&token).await.expect("validate"),
        SessionCheck::Rejected(401)
    );
}

#[tokio::test]
async fn test_unreachable_api_keeps_token() {
    let dir = tempfile::tempdir().expect("tempdir");
    let storage = FileStorage::open(dir.path()).expect("storage");
    tradepost_client::TokenStore::new(Portal::Admin, storage.clone())
        .save(&SessionToken::new("cached"))
        .expect("save token");

    let unused = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = unused.local_addr().expect("addr");
    drop(unused);

    let api = ApiClient::new(Url::parse(&format!("http://{addr}")).expect("url")).expect("client");
    let mut cache = SessionCache::new(Portal::Admin, storage, api, Recorder::default());

    assert_eq!(cache.revalidate().await, Revalidation::Unreachable);
    assert!(cache.has_token());
}

// ============================================================================
// Checkout
// ============================================================================

type Inbox = Arc<Mutex<Vec<Value>>>;

async fn spawn_gateway(accept: bool) -> (Url, Inbox) {
    let inbox: Inbox = Arc::default();
    let router = Router::new()
        .route(
            "/messages",
            post(
                move |State(inbox): State<Inbox>, Json(body): Json<Value>| async move {
                    inbox.lock().expect("inbox lock").push(body);
                    if accept {
                        (StatusCode::OK, Json(json!({ "success": true })))
                    } else {
                        (
                            StatusCode::UNPROCESSABLE_ENTITY,
                            Json(json!({ "error": "recipient is not on WhatsApp" })),
                        )
                    }
                },
            ),
        )
        .with_state(inbox.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind gateway");
    let addr = listener.local_addr().expect("gateway address");
    tokio::spawn(async move { axum::serve(listener, router).await.expect("gateway") });

    (
        Url::parse(&format!("http://{addr}/messages")).expect("gateway url"),
        inbox,
    )
}

fn dispatcher(url: Url) -> OrderDispatcher<HttpGateway> {
    let composer = MessageComposer::new(CountryCode::parse("+263").expect("country code"), "$")
        .with_store_phone("0242700000");
    let gateway = HttpGateway::new(url, None, Duration::from_secs(5)).expect("gateway");
    OrderDispatcher::new(composer, gateway)
}

fn contact() -> Contact {
    Contact {
        name: "Tendai".to_string(),
        phone: Some("0771234567".to_string()),
        email: None,
    }
}

fn fill(cart: &mut Cart<FileStorage>) {
    cart.add(CartLine::new("A", "Widget", Decimal::from(10), 2))
        .expect("add A");
    cart.add(CartLine::new("B", "Gadget", Decimal::from(5), 1))
        .expect("add B");
}

#[tokio::test]
async fn test_checkout_sends_order_and_clears_persisted_cart() {
    let (url, inbox) = spawn_gateway(true).await;
    let dir = tempfile::tempdir().expect("tempdir");

    let mut cart = Cart::load(FileStorage::open(dir.path()).expect("storage"));
    fill(&mut cart);
    let dispatcher = dispatcher(url);

    let receipt = checkout(&mut cart, &dispatcher, contact(), "Deliver Friday".to_string())
        .await
        .expect("checkout");

    assert_eq!(receipt.total, Decimal::from(25));
    assert_eq!(dispatcher.state(), DispatchState::Sent);

    let sent = inbox.lock().expect("inbox lock").clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["phone"], "+263771234567");
    let body = sent[0]["message"].as_str().expect("message text");
    assert!(body.contains("Deliver Friday"));
    assert!(body.contains("Total: $25.00"));

    let reloaded = Cart::load(FileStorage::open(dir.path()).expect("storage"));
    assert!(reloaded.is_empty());
}

#[tokio::test]
async fn test_refused_checkout_keeps_cart_and_reports_reason() {
    let (url, _) = spawn_gateway(false).await;
    let dir = tempfile::tempdir().expect("tempdir");

    let mut cart = Cart::load(FileStorage::open(dir.path()).expect("storage"));
    fill(&mut cart);
    let dispatcher = dispatcher(url);

    let err = checkout(&mut cart, &dispatcher, contact(), "Deliver Friday".to_string())
        .await
        .expect_err("gateway refuses");

    let shown = dispatcher.failure_message(&err);
    assert!(shown.contains("recipient is not on WhatsApp"));
    assert!(shown.contains("+263242700000"));
    assert!(matches!(dispatcher.state(), DispatchState::Failed(_)));

    let reloaded = Cart::load(FileStorage::open(dir.path()).expect("storage"));
    assert_eq!(reloaded.total_items(), 3);
}
