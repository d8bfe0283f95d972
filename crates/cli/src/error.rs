//! CLI error type.

use thiserror::Error;
use tradepost_api::db::RepositoryError;
use tradepost_api::services::AuthError;
use tradepost_client::{ConfigError, GatewayError};
use tradepost_core::StorageError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Client configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// A migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// No account with this email.
    #[error("No account with email: {0}")]
    AccountNotFound(String),

    /// Local cart storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The messaging gateway is not configured or could not be set up.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Dispatch failed; carries the user-facing explanation.
    #[error("{0}")]
    Dispatch(String),
}
