//! Tradepost Core - Shared session, access-control, cart and dispatch types.
//!
//! This crate provides the logic shared by every Tradepost component:
//! - `api` - Backend that issues and validates sessions
//! - `client` - Front-end library (admin dashboard, wholesaler portal, storefront)
//! - `cli` - Command-line tools for accounts, carts and dispatch
//!
//! # Architecture
//!
//! The core crate holds types, traits and pure decision logic only - no
//! network access and no database queries. Guard decisions computed here are
//! used verbatim by the server-side extractors and by the client-side route
//! intercept, so both sides agree on what a session may do.
//!
//! # Modules
//!
//! - [`types`] - Ids, emails, roles, portals and sessions
//! - [`access`] - Guard policies and access decisions
//! - [`routes`] - Client route allow-lists and navigation decisions
//! - [`storage`] - Key-value storage backend trait
//! - [`cart`] - Versioned, write-through cart aggregator
//! - [`phone`] - Destination phone normalization
//! - [`message`] - Outbound message composition
//! - [`dispatch`] - Dispatch state machine

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod access;
pub mod cart;
pub mod dispatch;
pub mod message;
pub mod phone;
pub mod routes;
pub mod storage;
pub mod types;

pub use access::{AccessDecision, ForbiddenReason, Policy, Principal};
pub use cart::{CART_SCHEMA_VERSION, CART_STORAGE_KEY, Cart, CartLine};
pub use dispatch::{DispatchError, DispatchState};
pub use message::{Contact, DispatchRequest, MessageComposer, OrderMessage, ValidationError};
pub use phone::{CountryCode, CountryCodeError, normalize_phone};
pub use routes::{NavigationDecision, RouteAccess, RoutePattern};
pub use storage::{MemoryStorage, Storage, StorageError};
pub use types::*;
