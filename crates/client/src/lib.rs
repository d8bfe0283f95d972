//! Tradepost client library.
//!
//! Everything a front-end needs that is not rendering:
//! - [`session`] - Token cache, route intercept and revalidation
//! - [`storage`] - Durable file-backed [`Storage`](tradepost_core::Storage)
//! - [`api`] - HTTP client for the Tradepost API
//! - [`gateway`] - Messaging gateway client
//! - [`dispatcher`] - Single-flight order dispatcher
//! - [`checkout`] - Cart checkout over the dispatcher

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod checkout;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod gateway;
pub mod session;
pub mod storage;

pub use api::{ApiClient, LoginResult, SessionCheck};
pub use checkout::{CheckoutReceipt, checkout};
pub use config::{ClientConfig, ConfigError};
pub use dispatcher::OrderDispatcher;
pub use error::ClientError;
pub use gateway::{GatewayError, HttpGateway, MessagingGateway};
pub use session::{Navigator, Revalidation, SessionCache, SessionEndpoint, TokenStore};
pub use storage::FileStorage;
