//! Client error types.

use thiserror::Error;
use tradepost_core::StorageError;

/// Errors from calls to the Tradepost API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// `error` field of the body, or the status reason.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Local storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A URL could not be built.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ClientError {
    /// Whether the server definitively rejected the credential.
    #[must_use]
    pub const fn is_auth_rejection(&self) -> bool {
        matches!(self, Self::Api { status: 401 | 403, .. })
    }
}
