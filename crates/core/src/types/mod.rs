//! Core types for Tradepost.
//!
//! This module provides type-safe wrappers for identities and sessions.

pub mod email;
pub mod id;
pub mod role;
pub mod session;

pub use email::{Email, EmailError};
pub use id::AccountId;
pub use role::{AccountRole, Portal, Role};
pub use session::{Session, SessionDescriptor, SessionToken, UserRef};
