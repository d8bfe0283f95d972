//! Bearer token transport.
//!
//! A token is taken from `Authorization: Bearer <token>` first and from the
//! portal cookies second. Every guard goes through [`presented_tokens`], so
//! the precedence is the same everywhere.

use axum::http::{
    HeaderMap, HeaderValue,
    header::{AUTHORIZATION, COOKIE, SET_COOKIE},
};
use chrono::Duration;
use cookie::{Cookie, SameSite};

use tradepost_core::{Portal, SessionToken};

const BEARER_PREFIX: &str = "Bearer ";

/// Where a presented token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Bearer,
    Cookie(Portal),
}

/// A token as presented by a request.
#[derive(Debug, Clone)]
pub struct PresentedToken {
    pub token: SessionToken,
    pub source: TokenSource,
}

/// Tokens carried by a request, in the order they should be tried.
///
/// A bearer header is the only candidate when present. Otherwise each
/// portal cookie is a candidate, in [`Portal::ALL`] order. Blank values
/// count as absent.
#[must_use]
pub fn presented_tokens(headers: &HeaderMap) -> Vec<PresentedToken> {
    if let Some(token) = bearer_token(headers) {
        return vec![PresentedToken {
            token: SessionToken::new(token),
            source: TokenSource::Bearer,
        }];
    }
    Portal::ALL
        .iter()
        .filter_map(|&portal| {
            cookie_value(headers, portal.cookie_name()).map(|token| PresentedToken {
                token: SessionToken::new(token),
                source: TokenSource::Cookie(portal),
            })
        })
        .collect()
}

/// Portals whose session cookie the request carries, whether or not a
/// bearer header takes precedence over it.
#[must_use]
pub fn portal_cookies(headers: &HeaderMap) -> Vec<Portal> {
    Portal::ALL
        .into_iter()
        .filter(|portal| cookie_value(headers, portal.cookie_name()).is_some())
        .collect()
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let prefix = value.get(..BEARER_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(BEARER_PREFIX) {
        return None;
    }
    value
        .get(BEARER_PREFIX.len()..)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
}

/// Find a cookie by name across all `Cookie` headers.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == name)
        .map(|c| c.value_trimmed().trim().to_string())
        .filter(|v| !v.is_empty())
}

fn base_cookie(portal: Portal, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((portal.cookie_name(), value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// `Set-Cookie` value carrying a portal's session token.
#[must_use]
pub fn session_cookie(
    portal: Portal,
    token: &SessionToken,
    max_age: Duration,
    secure: bool,
) -> Option<HeaderValue> {
    let mut cookie = base_cookie(portal, token.as_str().to_string(), secure);
    cookie.set_max_age(cookie::time::Duration::seconds(max_age.num_seconds().max(0)));
    HeaderValue::from_str(&cookie.to_string()).ok()
}

/// `Set-Cookie` value that deletes a portal's session cookie.
#[must_use]
pub fn clear_cookie(portal: Portal, secure: bool) -> Option<HeaderValue> {
    let mut cookie = base_cookie(portal, String::new(), secure);
    cookie.make_removal();
    HeaderValue::from_str(&cookie.to_string()).ok()
}

/// Append deletion cookies for `portals`.
pub fn clear_cookies(headers: &mut HeaderMap, portals: &[Portal], secure: bool) {
    for &portal in portals {
        if let Some(value) = clear_cookie(portal, secure) {
            headers.append(SET_COOKIE, value);
        }
    }
}

/// Append deletion cookies for every portal.
pub fn clear_all_cookies(headers: &mut HeaderMap, secure: bool) {
    clear_cookies(headers, &Portal::ALL, secure);
}
