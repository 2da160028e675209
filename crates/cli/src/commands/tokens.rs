//! Confirmation token commands.
//!
//! # Usage
//!
//! ```bash
//! mp-cli token issue -e buyer@example.com
//! mp-cli token confirm <KEY>
//! ```

use marketplace_store::services::AccountService;

use super::users::find_user;
use super::{CommandError, connect};

/// Issue a token for the account under `email` and print its key.
///
/// # Errors
///
/// Returns `CommandError::UnknownUser` if no account uses this email.
pub async fn issue(email: &str) -> Result<(), CommandError> {
    let (config, pool) = connect().await?;
    let user = find_user(&pool, email).await?;

    let generator = config.token_generator();
    let token = AccountService::new(&pool, &generator)
        .issue_confirmation_token(user.id)
        .await?;

    tracing::info!("{}", token.for_owner(&user.email));
    #[allow(clippy::print_stdout)]
    {
        println!("{}", token.key);
    }
    Ok(())
}

/// Redeem `key`, activating its account.
///
/// # Errors
///
/// Returns `CommandError::Account` if the key is unknown.
pub async fn confirm(key: &str) -> Result<(), CommandError> {
    let (config, pool) = connect().await?;

    let generator = config.token_generator();
    let user = AccountService::new(&pool, &generator)
        .confirm_email(key)
        .await?;

    tracing::info!("Email confirmed! {} is now active", user.email);
    Ok(())
}
