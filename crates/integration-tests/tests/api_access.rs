//! Integration tests for session validation and role-gated access.
//!
//! The router is driven with `oneshot` over in-memory stores.

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use tower::ServiceExt;
use tradepost_api::AppState;
use tradepost_api::models::SessionRecord;
use tradepost_api::store::{AccountStore, SessionStore};
use tradepost_core::{AccountRole, SessionToken};
use tradepost_integration_tests::{PASSWORD, seed_account, test_state};

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Router failed");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Body is not JSON")
    };
    (status, headers, body)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("valid request")
}

fn post_json(uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

async fn login(app: &Router, email: &str, portal: &str) -> String {
    let (status, _, body) = send(
        app,
        post_json(
            "/api/auth/login",
            None,
            &json!({ "email": email, "password": PASSWORD, "portal": portal }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["token"].as_str().expect("token in body").to_string()
}

fn cleared_cookies(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().expect("ascii cookie").to_string())
        .filter(|c| c.contains("Max-Age=0"))
        .collect()
}

fn setup() -> (AppState, Router) {
    let state = test_state();
    let app = tradepost_api::app(state.clone());
    (state, app)
}

// ============================================================================
// Unauthenticated
// ============================================================================

#[tokio::test]
async fn test_missing_and_unknown_tokens_are_indistinguishable() {
    let (_, app) = setup();

    let (missing_status, missing_headers, missing_body) =
        send(&app, get("/api/auth/session", None)).await;
    let (unknown_status, unknown_headers, unknown_body) =
        send(&app, get("/api/auth/session", Some("not-a-real-token"))).await;

    assert_eq!(missing_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing_body, unknown_body);

    // Both portal cookies are cleared so the client drops its stale copy.
    assert_eq!(cleared_cookies(&missing_headers).len(), 2);
    assert_eq!(cleared_cookies(&unknown_headers).len(), 2);
}

#[tokio::test]
async fn test_expired_session_is_unauthorized_on_every_guard() {
    let (state, app) = setup();
    let admin = seed_account(&state, "admin@example.com", AccountRole::Admin, false).await;

    let now = Utc::now();
    state
        .sessions()
        .insert(&SessionRecord {
            token: SessionToken::new("expired-token"),
            account_id: admin.id,
            created_at: now - Duration::hours(2),
            expires_at: now - Duration::seconds(1),
        })
        .await
        .expect("insert session");

    for uri in [
        "/api/auth/session",
        "/api/admin/wholesalers",
        "/api/wholesale/account",
    ] {
        let (status, _, _) = send(&app, get(uri, Some("expired-token"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn test_deactivation_invalidates_existing_sessions() {
    let (state, app) = setup();
    let admin = seed_account(&state, "admin@example.com", AccountRole::Admin, false).await;
    let token = login(&app, "admin@example.com", "admin").await;

    state
        .accounts()
        .set_active(admin.id, false)
        .await
        .expect("deactivate");

    let (status, _, _) = send(&app, get("/api/auth/session", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Forbidden reasons
// ============================================================================

#[tokio::test]
async fn test_pending_wholesaler_and_admin_get_distinct_reasons() {
    let (state, app) = setup();
    seed_account(&state, "pending@example.com", AccountRole::Wholesaler, false).await;
    seed_account(&state, "admin@example.com", AccountRole::Admin, false).await;

    let pending = login(&app, "pending@example.com", "wholesale").await;
    let admin = login(&app, "admin@example.com", "admin").await;

    let (status, _, body) = send(&app, get("/api/wholesale/account", Some(&pending))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "error": "forbidden", "reason": "pending approval" }));

    let (status, _, body) = send(&app, get("/api/wholesale/account", Some(&admin))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["reason"], "role mismatch");
}

#[tokio::test]
async fn test_wholesaler_cannot_reach_admin_routes() {
    let (state, app) = setup();
    seed_account(&state, "buyer@example.com", AccountRole::Wholesaler, true).await;
    let token = login(&app, "buyer@example.com", "wholesale").await;

    let (status, _, body) = send(&app, get("/api/admin/wholesalers", Some(&token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["reason"], "admin access required");
}

#[tokio::test]
async fn test_approval_takes_effect_without_new_login() {
    let (state, app) = setup();
    seed_account(&state, "admin@example.com", AccountRole::Admin, false).await;
    let wholesaler =
        seed_account(&state, "pending@example.com", AccountRole::Wholesaler, false).await;

    let admin = login(&app, "admin@example.com", "admin").await;
    let buyer = login(&app, "pending@example.com", "wholesale").await;

    let (status, _, _) = send(&app, get("/api/wholesale/account", Some(&buyer))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, body) = send(
        &app,
        post_json(
            &format!("/api/admin/wholesalers/{}/approve", wholesaler.id),
            Some(&admin),
            &json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, _, body) = send(&app, get("/api/wholesale/account", Some(&buyer))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "wholesaler");
    assert_eq!(body["wholesaler_approved"], true);
}

// ============================================================================
// Login, cookies and logout
// ============================================================================

#[tokio::test]
async fn test_login_is_refused_through_the_wrong_portal() {
    let (state, app) = setup();
    seed_account(&state, "admin@example.com", AccountRole::Admin, false).await;

    let (status, _, body) = send(
        &app,
        post_json(
            "/api/auth/login",
            None,
            &json!({ "email": "admin@example.com", "password": PASSWORD, "portal": "wholesale" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid credentials");
}

#[tokio::test]
async fn test_login_cookie_authenticates_and_bearer_takes_precedence() {
    let (state, app) = setup();
    seed_account(&state, "buyer@example.com", AccountRole::Wholesaler, true).await;

    let (status, headers, body) = send(
        &app,
        post_json(
            "/api/auth/login",
            None,
            &json!({ "email": "buyer@example.com", "password": PASSWORD, "portal": "wholesale" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["wholesaler_approved"], true);

    let set_cookie = headers
        .get(header::SET_COOKIE)
        .expect("login sets a cookie")
        .to_str()
        .expect("ascii cookie");
    assert!(set_cookie.starts_with("tp_wholesaler_token="));
    assert!(set_cookie.contains("HttpOnly"));
    let cookie = set_cookie.split(';').next().expect("cookie pair").to_string();

    let with_cookie = Request::get("/api/auth/session")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .expect("valid request");
    let (status, _, _) = send(&app, with_cookie).await;
    assert_eq!(status, StatusCode::OK);

    // A bad bearer token is not rescued by a good cookie.
    let both = Request::get("/api/auth/session")
        .header(header::AUTHORIZATION, "Bearer wrong")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .expect("valid request");
    let (status, _, _) = send(&app, both).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

fn with_cookie(uri: &str, bearer: Option<&str>, cookie: &str) -> Request<Body> {
    let mut builder = Request::get(uri).header(header::COOKIE, cookie);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("valid request")
}

#[tokio::test]
async fn test_stale_admin_cookie_does_not_shadow_wholesaler_cookie() {
    let (state, app) = setup();
    seed_account(&state, "buyer@example.com", AccountRole::Wholesaler, true).await;
    let token = login(&app, "buyer@example.com", "wholesale").await;
    let cookies = format!("tp_admin_token=stale-admin; tp_wholesaler_token={token}");

    let (status, headers, body) =
        send(&app, with_cookie("/api/wholesale/account", None, &cookies)).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["role"], "wholesaler");
    assert!(cleared_cookies(&headers).is_empty());
}

#[tokio::test]
async fn test_unauthorized_clears_only_failed_or_absent_cookies() {
    let (state, app) = setup();
    seed_account(&state, "buyer@example.com", AccountRole::Wholesaler, true).await;
    let token = login(&app, "buyer@example.com", "wholesale").await;
    let live = format!("tp_wholesaler_token={token}");

    // A stale wholesaler cookie is cleared along with the absent admin one.
    let (status, headers, _) = send(
        &app,
        with_cookie("/api/auth/session", None, "tp_wholesaler_token=stale"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(cleared_cookies(&headers).len(), 2);

    // A bad bearer wins over a live cookie, but the cookie is not deleted.
    let (status, headers, _) =
        send(&app, with_cookie("/api/auth/session", Some("wrong"), &live)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let cleared = cleared_cookies(&headers);
    assert_eq!(cleared.len(), 1);
    assert!(cleared[0].starts_with("tp_admin_token="));
}

#[tokio::test]
async fn test_logout_revokes_the_token() {
    let (state, app) = setup();
    seed_account(&state, "admin@example.com", AccountRole::Admin, false).await;
    let token = login(&app, "admin@example.com", "admin").await;

    let (status, headers, _) =
        send(&app, post_json("/api/auth/logout", Some(&token), &json!({}))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(cleared_cookies(&headers).len(), 2);

    let (status, _, _) = send(&app, get("/api/auth/session", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Logging out again, or without a token, still succeeds.
    let (status, _, _) = send(&app, post_json("/api/auth/logout", None, &json!({}))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

// ============================================================================
// Registration and administration
// ============================================================================

#[tokio::test]
async fn test_registration_creates_pending_wholesaler() {
    let (_, app) = setup();
    let body = json!({ "email": "new@example.com", "name": "New Buyer", "password": PASSWORD });

    let (status, _, created) = send(&app, post_json("/api/wholesale/register", None, &body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["role"], "wholesaler");
    assert_eq!(created["wholesaler_approved"], false);
    assert!(created.get("password_hash").is_none());

    let (status, _, _) = send(&app, post_json("/api/wholesale/register", None, &body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_approving_unknown_or_admin_ids_is_not_found() {
    let (state, app) = setup();
    let admin_account = seed_account(&state, "admin@example.com", AccountRole::Admin, false).await;
    let admin = login(&app, "admin@example.com", "admin").await;

    for id in [9999, admin_account.id.as_i32()] {
        let (status, _, _) = send(
            &app,
            post_json(
                &format!("/api/admin/wholesalers/{id}/approve"),
                Some(&admin),
                &json!({}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND, "id {id}");
    }
}

#[tokio::test]
async fn test_wholesaler_list_filters_by_status() {
    let (state, app) = setup();
    seed_account(&state, "admin@example.com", AccountRole::Admin, false).await;
    seed_account(&state, "pending@example.com", AccountRole::Wholesaler, false).await;
    seed_account(&state, "approved@example.com", AccountRole::Wholesaler, true).await;
    let admin = login(&app, "admin@example.com", "admin").await;

    let emails = |body: &Value| -> Vec<String> {
        body.as_array()
            .expect("array body")
            .iter()
            .map(|a| a["email"].as_str().expect("email").to_string())
            .collect()
    };

    let (_, _, pending) = send(&app, get("/api/admin/wholesalers", Some(&admin))).await;
    assert_eq!(emails(&pending), vec!["pending@example.com".to_string()]);

    let (_, _, all) = send(&app, get("/api/admin/wholesalers?status=all", Some(&admin))).await;
    assert_eq!(all.as_array().expect("array body").len(), 2);
}
