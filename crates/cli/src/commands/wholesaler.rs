//! Wholesaler approval commands.

use tradepost_api::models::WholesalerFilter;
use tradepost_api::store::AccountStore;
use tradepost_core::AccountId;

use crate::error::CliError;

/// Approve a wholesaler, or withdraw approval.
pub async fn approve(id: i32, approved: bool) -> Result<(), CliError> {
    let (accounts, _) = super::stores().await?;

    let account = accounts
        .set_wholesaler_approval(AccountId::new(id), approved)
        .await?;

    tracing::info!(
        id = %account.id,
        email = %account.email,
        status = if approved { "approved" } else { "pending" },
        "Wholesaler updated"
    );
    Ok(())
}

/// Print wholesalers matching `filter`.
#[allow(clippy::print_stdout)]
pub async fn list(filter: WholesalerFilter) -> Result<(), CliError> {
    let (accounts, _) = super::stores().await?;

    let wholesalers = accounts.list_wholesalers(filter).await?;
    if wholesalers.is_empty() {
        println!("No wholesalers found.");
        return Ok(());
    }

    for account in wholesalers {
        println!(
            "{:>6}  {:<32}  {:<24}  {:<9}  {}{}",
            account.id.to_string(),
            account.email.as_str(),
            account.name,
            if account.wholesaler_approved { "approved" } else { "pending" },
            account.created_at.format("%Y-%m-%d"),
            if account.active { "" } else { "  (deactivated)" },
        );
    }
    Ok(())
}
