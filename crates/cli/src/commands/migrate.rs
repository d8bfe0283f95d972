//! Database migration command.
//!
//! Migrations live in `crates/api/migrations/` and are embedded in the API
//! crate, so the CLI and the server always agree on the schema.

use crate::error::CliError;

/// Apply pending migrations.
pub async fn run() -> Result<(), CliError> {
    let pool = super::connect().await?;

    tracing::info!("Running migrations...");
    tradepost_api::db::run_migrations(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
