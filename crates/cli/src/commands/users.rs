//! Account management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a buyer account (inactive until confirmed)
//! mp-cli user create -e buyer@example.com -p 'password123'
//!
//! # Create an active shop owner
//! mp-cli user create -e shop@example.com -p 'password123' --shop --active
//!
//! # Create a superuser
//! mp-cli user createsuperuser -e admin@example.com -p 'password123'
//!
//! # Activate without a token
//! mp-cli user activate -e buyer@example.com
//! ```

use secrecy::SecretString;

use marketplace_core::{Email, UserType};
use marketplace_store::db::UserRepository;
use marketplace_store::models::{AccountFlags, User, UserProfile};
use marketplace_store::services::AccountService;

use super::{CommandError, connect};

/// Optional settings of `user create`.
#[derive(Debug, Default)]
pub struct CreateOptions {
    pub shop: bool,
    pub active: bool,
    pub first_name: String,
    pub last_name: String,
}

impl CreateOptions {
    fn profile(&self) -> UserProfile {
        UserProfile {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            user_type: if self.shop {
                UserType::Shop
            } else {
                UserType::Buyer
            },
            ..UserProfile::default()
        }
    }

    const fn flags(&self) -> AccountFlags {
        AccountFlags {
            is_active: Some(self.active),
            is_staff: None,
            is_superuser: None,
        }
    }
}

/// Create an ordinary account.
///
/// # Errors
///
/// Returns `CommandError::Account` if the email is invalid or already taken.
pub async fn create(
    email: &str,
    password: Option<String>,
    options: CreateOptions,
) -> Result<User, CommandError> {
    let (config, pool) = connect().await?;
    let generator = config.token_generator();
    let accounts = AccountService::new(&pool, &generator);

    let password = password.map(SecretString::from);
    let user = accounts
        .create_user(email, password.as_ref(), options.profile(), options.flags())
        .await?;

    tracing::info!(
        "User created! ID: {}, Email: {}, Type: {}, Active: {}",
        user.id,
        user.email,
        user.user_type,
        user.is_active
    );
    if password.is_none() {
        tracing::warn!("Note: User has no usable password and cannot log in until one is set.");
    }

    Ok(user)
}

/// Create a superuser.
///
/// # Errors
///
/// Returns `CommandError::Account` if the email is invalid or already taken.
pub async fn create_superuser(email: &str, password: String) -> Result<User, CommandError> {
    let (config, pool) = connect().await?;
    let generator = config.token_generator();
    let accounts = AccountService::new(&pool, &generator);

    let user = accounts
        .create_superuser(
            email,
            &SecretString::from(password),
            UserProfile::default(),
            AccountFlags::default(),
        )
        .await?;

    tracing::info!("Superuser created! ID: {}, Email: {}", user.id, user.email);
    Ok(user)
}

/// Activate the account registered under `email`.
///
/// # Errors
///
/// Returns `CommandError::UnknownUser` if no account uses this email.
pub async fn activate(email: &str) -> Result<(), CommandError> {
    let (config, pool) = connect().await?;
    let user = find_user(&pool, email).await?;

    let generator = config.token_generator();
    AccountService::new(&pool, &generator)
        .activate(user.id)
        .await?;

    tracing::info!("User {} is now active", user.email);
    Ok(())
}

/// Resolve a user by (normalized) email.
pub(super) async fn find_user(pool: &sqlx::PgPool, email: &str) -> Result<User, CommandError> {
    let normalized = Email::normalize(email)
        .map_err(|e| CommandError::InvalidArgument(format!("{email}: {e}")))?;

    UserRepository::new(pool)
        .get_by_email(&normalized)
        .await?
        .ok_or_else(|| CommandError::UnknownUser(normalized.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_options_profile() {
        let options = CreateOptions {
            shop: true,
            first_name: "Ann".to_owned(),
            ..CreateOptions::default()
        };
        let profile = options.profile();
        assert_eq!(profile.user_type, UserType::Shop);
        assert_eq!(profile.first_name, "Ann");
        assert!(profile.company.is_empty());
    }

    #[test]
    fn test_create_options_flags_leave_privileges_default() {
        let flags = CreateOptions::default().flags();
        assert_eq!(flags.is_active, Some(false));
        assert_eq!(flags.is_staff, None);
        assert_eq!(flags.is_superuser, None);
    }
}
