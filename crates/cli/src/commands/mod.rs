//! Command implementations.
//!
//! Database commands read `API_DATABASE_URL` (falling back to
//! `DATABASE_URL`). Cart and dispatch commands use the client settings,
//! see [`tradepost_client::ClientConfig`].

pub mod account;
pub mod cart;
pub mod dispatch;
pub mod migrate;
pub mod sessions;
pub mod wholesaler;

use secrecy::SecretString;
use sqlx::PgPool;
use tradepost_api::db::{PgAccountStore, PgSessionStore};

use crate::error::CliError;

/// Connect to the API database.
async fn connect() -> Result<PgPool, CliError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("API_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
        .ok_or(CliError::MissingEnvVar("API_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(tradepost_api::db::create_pool(&database_url).await?)
}

/// Connect and build the account and session stores.
async fn stores() -> Result<(PgAccountStore, PgSessionStore), CliError> {
    let pool = connect().await?;
    Ok((PgAccountStore::new(pool.clone()), PgSessionStore::new(pool)))
}
