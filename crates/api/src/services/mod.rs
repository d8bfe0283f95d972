//! Business logic between the HTTP handlers and the stores.

pub mod auth;
pub mod session;

pub use auth::{AuthError, AuthService};
pub use session::{InvalidReason, SessionService, SessionStatus, generate_token};
