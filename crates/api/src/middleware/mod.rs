//! HTTP middleware and extractors.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (binary only)
//! 2. `TraceLayer` (span with an empty `request_id` field)
//! 3. Request ID (fills in the span field)
//! 4. CORS
//! 5. Security headers
//! 6. Login rate limiting (login route only)

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod token;

pub use auth::{
    GuardRejection, RequireAdmin, RequireApprovedWholesaler, RequireAuthenticated, authorize,
};
pub use rate_limit::{auth_rate_limiter, rate_limited_json};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use token::{
    PresentedToken, TokenSource, clear_all_cookies, clear_cookie, clear_cookies, portal_cookies,
    presented_tokens, session_cookie,
};
