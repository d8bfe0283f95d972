//! Domain models for the API.
//!
//! These are validated domain objects, separate from database row types.

pub mod account;
pub mod session;

pub use account::{Account, AccountSummary, NewAccount, WholesalerFilter};
pub use session::SessionRecord;
