//! Account management commands.

use tradepost_api::services::AuthService;
use tradepost_api::store::{AccountStore, SessionStore};
use tradepost_core::{AccountRole, Email};

use crate::error::CliError;

/// Create an account, optionally pre-approving a wholesaler.
pub async fn create(
    email: &str,
    name: &str,
    password: &str,
    role: AccountRole,
    approved: bool,
) -> Result<(), CliError> {
    let (accounts, _) = super::stores().await?;

    tracing::info!(email, %role, "Creating account");
    let mut account = AuthService::new(&accounts)
        .register(email, name, password, role)
        .await?;

    if approved && role == AccountRole::Wholesaler {
        account = accounts.set_wholesaler_approval(account.id, true).await?;
    } else if approved {
        tracing::warn!("--approved only applies to wholesalers; ignored");
    }

    tracing::info!(
        id = %account.id,
        email = %account.email,
        role = %account.role,
        approved = account.wholesaler_approved,
        "Account created"
    );
    Ok(())
}

/// Activate or deactivate an account. Deactivation also revokes its sessions.
pub async fn set_active(email: &str, active: bool) -> Result<(), CliError> {
    let parsed = Email::parse(email).map_err(tradepost_api::services::AuthError::from)?;
    let (accounts, sessions) = super::stores().await?;

    let account = accounts
        .find_by_email(&parsed)
        .await?
        .ok_or_else(|| CliError::AccountNotFound(email.to_owned()))?;

    let account = accounts.set_active(account.id, active).await?;
    if active {
        tracing::info!(email = %account.email, "Account reactivated");
    } else {
        let revoked = sessions.revoke_all_for(account.id).await?;
        tracing::info!(email = %account.email, revoked, "Account deactivated");
    }
    Ok(())
}
