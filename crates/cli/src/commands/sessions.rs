//! Session maintenance commands.

use chrono::Utc;
use tradepost_api::store::SessionStore;

use crate::error::CliError;

/// Delete every session that has expired.
pub async fn purge() -> Result<(), CliError> {
    let (_, sessions) = super::stores().await?;

    let purged = sessions.purge_expired(Utc::now()).await?;
    tracing::info!(purged, "Purged expired sessions");
    Ok(())
}
