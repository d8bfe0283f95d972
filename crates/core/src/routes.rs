//! Client route allow-lists and navigation decisions.
//!
//! Every front-end runs [`RouteAccess::decide`] before a protected page
//! renders. The decision is pure; performing the redirect is left to the
//! caller so it can be tested without a browser.

use serde::{Deserialize, Serialize};

use crate::types::Portal;

/// A path pattern exempt from the login redirect.
///
/// Parsed from strings: a trailing `/*` makes a prefix pattern
/// (`/auth/*` matches `/auth` and everything below it), anything else is an
/// exact match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum RoutePattern {
    /// Matches exactly this path.
    Exact(String),
    /// Matches this path and every path below it.
    Prefix(String),
}

impl RoutePattern {
    /// Whether the normalized `path` matches this pattern.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(p) => p == path,
            Self::Prefix(p) if p == "/" => true,
            Self::Prefix(p) => {
                path == p
                    || path
                        .strip_prefix(p.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
        }
    }
}

impl From<&str> for RoutePattern {
    fn from(s: &str) -> Self {
        s.strip_suffix("/*").map_or_else(
            || Self::Exact(normalize_path(s).to_string()),
            |prefix| Self::Prefix(normalize_path(prefix).to_string()),
        )
    }
}

impl From<String> for RoutePattern {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<RoutePattern> for String {
    fn from(p: RoutePattern) -> Self {
        match p {
            RoutePattern::Exact(path) => path,
            RoutePattern::Prefix(path) if path == "/" => "/*".to_string(),
            RoutePattern::Prefix(path) => format!("{path}/*"),
        }
    }
}

/// What the route intercept should do with a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Render the requested page.
    Render,
    /// Leave for the login route before anything protected is requested.
    RedirectToLogin {
        /// Login route to navigate to.
        login: String,
        /// Originally requested path, for returning after login.
        return_to: String,
    },
}

/// Declarative route access control for one front-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteAccess {
    login_route: String,
    public: Vec<RoutePattern>,
}

impl RouteAccess {
    /// Create an allow-list. The login route is always public.
    #[must_use]
    pub fn new<I, P>(login_route: &str, public: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<RoutePattern>,
    {
        let login_route = normalize_path(login_route).to_string();
        let mut public: Vec<RoutePattern> = public.into_iter().map(Into::into).collect();
        if !public.iter().any(|p| p.matches(&login_route)) {
            public.push(RoutePattern::Exact(login_route.clone()));
        }
        Self {
            login_route,
            public,
        }
    }

    /// Default allow-list for a portal.
    #[must_use]
    pub fn for_portal(portal: Portal) -> Self {
        match portal {
            Portal::Admin => Self::new(portal.login_route(), ["/auth/*"]),
            Portal::Wholesale => {
                Self::new(portal.login_route(), ["/wholesale/register", "/auth/*"])
            }
        }
    }

    /// The login route.
    #[must_use]
    pub fn login_route(&self) -> &str {
        &self.login_route
    }

    /// Whether `path` bypasses the token check.
    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        let path = normalize_path(path);
        self.public.iter().any(|p| p.matches(path))
    }

    /// Decide what to do with a navigation to `path`.
    ///
    /// Only token presence is considered here. Whether the token is still
    /// valid is checked asynchronously after render.
    #[must_use]
    pub fn decide(&self, path: &str, has_token: bool) -> NavigationDecision {
        if has_token || self.is_public(path) {
            return NavigationDecision::Render;
        }
        NavigationDecision::RedirectToLogin {
            login: self.login_route.clone(),
            return_to: path.to_string(),
        }
    }
}

/// Drop any query string or fragment and trailing slashes (except for `/`).
fn normalize_path(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_and_prefix_patterns() {
        let exact = RoutePattern::from("/login");
        assert!(exact.matches("/login"));
        assert!(!exact.matches("/login/extra"));

        let prefix = RoutePattern::from("/auth/*");
        assert!(prefix.matches("/auth"));
        assert!(prefix.matches("/auth/callback"));
        assert!(!prefix.matches("/authors"));
    }

    #[test]
    fn test_login_route_is_always_public() {
        let access = RouteAccess::new("/signin", Vec::<&str>::new());
        assert!(access.is_public("/signin"));
        assert_eq!(access.decide("/signin", false), NavigationDecision::Render);
    }

    #[test]
    fn test_protected_route_without_token_redirects() {
        let access = RouteAccess::for_portal(Portal::Admin);
        assert_eq!(
            access.decide("/products?page=2", false),
            NavigationDecision::RedirectToLogin {
                login: "/login".to_string(),
                return_to: "/products?page=2".to_string(),
            }
        );
    }

    #[test]
    fn test_protected_route_with_token_renders() {
        let access = RouteAccess::for_portal(Portal::Wholesale);
        assert_eq!(access.decide("/wholesale/orders", true), NavigationDecision::Render);
    }

    #[test]
    fn test_public_route_ignores_query_and_trailing_slash() {
        let access = RouteAccess::for_portal(Portal::Wholesale);
        assert!(access.is_public("/wholesale/register/"));
        assert!(access.is_public("/auth/callback?code=abc"));
        assert!(!access.is_public("/wholesale"));
    }

    #[test]
    fn test_pattern_string_form() {
        assert_eq!(String::from(RoutePattern::from("/auth/*")), "/auth/*");
        assert_eq!(String::from(RoutePattern::from("/login/")), "/login");
    }
}
