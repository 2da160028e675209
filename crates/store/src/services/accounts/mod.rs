//! Account service.
//!
//! Creates users and superusers, authenticates them, and runs the email
//! confirmation flow: a new account starts inactive, a confirmation token is
//! issued, and redeeming that token activates the account.

mod error;

pub use error::AccountError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;

use marketplace_core::{Email, TokenGenerator, UserId, ValidationError};

use crate::db::RepositoryError;
use crate::db::tokens::TokenRepository;
use crate::db::users::UserRepository;
use crate::models::user::NewUser;
use crate::models::{AccountFlags, ConfirmEmailToken, User, UserProfile};

/// Minimum password length for self-service registration and resets.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Prefix of a password value that can never verify.
const UNUSABLE_PASSWORD_PREFIX: char = '!';

/// Account service.
///
/// Handles user creation, login, and the confirmation token lifecycle.
pub struct AccountService<'a> {
    pool: &'a PgPool,
    users: UserRepository<'a>,
    tokens: TokenRepository<'a>,
    generator: &'a dyn TokenGenerator,
}

impl<'a> AccountService<'a> {
    /// Create a new account service.
    #[must_use]
    pub fn new(pool: &'a PgPool, generator: &'a dyn TokenGenerator) -> Self {
        Self {
            pool,
            users: UserRepository::new(pool),
            tokens: TokenRepository::new(pool, generator),
            generator,
        }
    }

    // =========================================================================
    // User manager
    // =========================================================================

    /// Create an ordinary account.
    ///
    /// Staff and superuser default to false and the account starts inactive
    /// unless `flags` says otherwise. Without a password the account gets an
    /// unusable one.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidEmail` if the email is empty or malformed.
    /// Returns `AccountError::Validation` if a profile field is too long.
    /// Returns `AccountError::UserAlreadyExists` if the email is taken.
    pub async fn create_user(
        &self,
        email: &str,
        password: Option<&SecretString>,
        profile: UserProfile,
        flags: AccountFlags,
    ) -> Result<User, AccountError> {
        self.create(
            email,
            password,
            profile,
            flags.is_active.unwrap_or(false),
            flags.is_staff.unwrap_or(false),
            flags.is_superuser.unwrap_or(false),
        )
        .await
    }

    /// Create a privileged account.
    ///
    /// Staff, superuser and active default to true. Explicitly passing false
    /// for staff or superuser is rejected before anything is written.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Validation` if either privilege flag is false.
    /// Otherwise as [`AccountService::create_user`].
    pub async fn create_superuser(
        &self,
        email: &str,
        password: &SecretString,
        profile: UserProfile,
        flags: AccountFlags,
    ) -> Result<User, AccountError> {
        let (is_staff, is_superuser) = superuser_flags(flags)?;

        let user = self
            .create(
                email,
                Some(password),
                profile,
                flags.is_active.unwrap_or(true),
                is_staff,
                is_superuser,
            )
            .await?;

        tracing::info!(user_id = %user.id, email = %user.email, "Superuser created");
        Ok(user)
    }

    async fn create(
        &self,
        email: &str,
        password: Option<&SecretString>,
        profile: UserProfile,
        is_active: bool,
        is_staff: bool,
        is_superuser: bool,
    ) -> Result<User, AccountError> {
        let email = Email::normalize(email)?;
        profile.validate()?;

        let password_hash = match password {
            Some(password) => hash_password(password.expose_secret())?,
            None => self.unusable_password(),
        };

        let user = self
            .users
            .create(&NewUser {
                email,
                password_hash,
                profile,
                is_active,
                is_staff,
                is_superuser,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AccountError::UserAlreadyExists,
                other => AccountError::from(other),
            })?;

        tracing::info!(
            user_id = %user.id,
            email = %user.email,
            user_type = %user.user_type,
            is_active,
            "User created"
        );
        Ok(user)
    }

    fn unusable_password(&self) -> String {
        format!(
            "{UNUSABLE_PASSWORD_PREFIX}{}",
            self.generator.generate_token()
        )
    }

    /// Self-service registration: validate the password, create an inactive
    /// account and issue its confirmation token.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::WeakPassword` if the password is too short.
    /// Otherwise as [`AccountService::create_user`].
    pub async fn register(
        &self,
        email: &str,
        password: &SecretString,
        profile: UserProfile,
    ) -> Result<(User, ConfirmEmailToken), AccountError> {
        validate_password(password.expose_secret())?;

        let user = self
            .create_user(email, Some(password), profile, AccountFlags::default())
            .await?;
        let token = self.tokens.issue(user.id).await?;

        Ok((user, token))
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidCredentials` if the email/password is wrong.
    /// Returns `AccountError::InactiveAccount` if the account is not active yet.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<User, AccountError> {
        let email = Email::normalize(email).map_err(|_| AccountError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        verify_password(password.expose_secret(), &password_hash)?;

        if !user.is_active {
            return Err(AccountError::InactiveAccount);
        }

        self.users.touch_last_login(user.id).await?;
        tracing::debug!(user_id = %user.id, "User authenticated");
        Ok(user)
    }

    /// Set a new password.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::WeakPassword` if the password is too short.
    /// Returns `AccountError::UserNotFound` if the user doesn't exist.
    pub async fn set_password(
        &self,
        user_id: UserId,
        password: &SecretString,
    ) -> Result<(), AccountError> {
        validate_password(password.expose_secret())?;
        let password_hash = hash_password(password.expose_secret())?;
        self.users.set_password_hash(user_id, &password_hash).await?;
        Ok(())
    }

    /// Activate an account directly, bypassing the token flow.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::UserNotFound` if the user doesn't exist.
    pub async fn activate(&self, user_id: UserId) -> Result<(), AccountError> {
        self.users.set_active(user_id, true).await?;
        tracing::info!(user_id = %user_id, "User activated");
        Ok(())
    }

    // =========================================================================
    // Confirmation tokens
    // =========================================================================

    /// Issue a confirmation token for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Validation` if the user doesn't exist.
    pub async fn issue_confirmation_token(
        &self,
        user_id: UserId,
    ) -> Result<ConfirmEmailToken, AccountError> {
        Ok(self.tokens.issue(user_id).await?)
    }

    /// Redeem a confirmation key: activate its user and discard all of the
    /// user's outstanding tokens.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidToken` if the key is unknown.
    pub async fn confirm_email(&self, key: &str) -> Result<User, AccountError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let token = TokenRepository::lock_by_key(&mut tx, key)
            .await?
            .ok_or(AccountError::InvalidToken)?;

        UserRepository::activate_in(&mut tx, token.user_id).await?;
        TokenRepository::delete_for_user_in(&mut tx, token.user_id).await?;
        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(user_id = %token.user_id, "Email confirmed, user activated");

        self.users
            .get_by_id(token.user_id)
            .await?
            .ok_or(AccountError::UserNotFound)
    }

    /// Redeem a key to set a new password.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::WeakPassword` if the password is too short.
    /// Returns `AccountError::InvalidToken` if the key is unknown.
    pub async fn reset_password(
        &self,
        key: &str,
        new_password: &SecretString,
    ) -> Result<(), AccountError> {
        validate_password(new_password.expose_secret())?;
        let password_hash = hash_password(new_password.expose_secret())?;

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let token = TokenRepository::lock_by_key(&mut tx, key)
            .await?
            .ok_or(AccountError::InvalidToken)?;

        UserRepository::set_password_hash_in(&mut tx, token.user_id, &password_hash).await?;
        TokenRepository::delete_for_user_in(&mut tx, token.user_id).await?;
        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(user_id = %token.user_id, "Password reset");
        Ok(())
    }

    /// Delete an account and everything it owns.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::UserNotFound` if the user doesn't exist.
    pub async fn delete_user(&self, user_id: UserId) -> Result<(), AccountError> {
        if self.users.delete(user_id).await? {
            Ok(())
        } else {
            Err(AccountError::UserNotFound)
        }
    }
}

/// Resolve the privilege flags of a superuser, defaulting both to true.
fn superuser_flags(flags: AccountFlags) -> Result<(bool, bool), ValidationError> {
    let is_staff = flags.is_staff.unwrap_or(true);
    let is_superuser = flags.is_superuser.unwrap_or(true);

    if !is_staff {
        return Err(ValidationError::new(
            "is_staff",
            "Superuser must have is_staff=True.",
        ));
    }
    if !is_superuser {
        return Err(ValidationError::new(
            "is_superuser",
            "Superuser must have is_superuser=True.",
        ));
    }

    Ok((is_staff, is_superuser))
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AccountError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AccountError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AccountError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AccountError::PasswordHash)
}

/// Verify a password against a stored hash. Unusable markers never match.
fn verify_password(password: &str, hash: &str) -> Result<(), AccountError> {
    if hash.starts_with(UNUSABLE_PASSWORD_PREFIX) {
        return Err(AccountError::InvalidCredentials);
    }

    let parsed_hash = PasswordHash::new(hash).map_err(|_| AccountError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AccountError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_superuser_flags_default_to_true() {
        assert_eq!(superuser_flags(AccountFlags::default()), Ok((true, true)));
    }

    #[test]
    fn test_superuser_requires_staff() {
        let flags = AccountFlags {
            is_staff: Some(false),
            ..AccountFlags::default()
        };
        let err = superuser_flags(flags).unwrap_err();
        assert_eq!(err.field, "is_staff");
        assert_eq!(err.message, "Superuser must have is_staff=True.");
    }

    #[test]
    fn test_superuser_requires_superuser_flag() {
        let flags = AccountFlags {
            is_staff: Some(true),
            is_superuser: Some(false),
            is_active: None,
        };
        let err = superuser_flags(flags).unwrap_err();
        assert_eq!(err.field, "is_superuser");
    }

    #[test]
    fn test_hash_is_not_plaintext_and_verifies() {
        let hash = hash_password("correct horse").unwrap();
        assert!(!hash.contains("correct horse"));
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AccountError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_same_password_hashes_differently() {
        assert_ne!(
            hash_password("password1").unwrap(),
            hash_password("password1").unwrap()
        );
    }

    #[test]
    fn test_unusable_password_never_verifies() {
        assert!(verify_password("", "!abc").is_err());
        assert!(verify_password("!abc", "!abc").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn test_error_classification() {
        assert!(AccountError::WeakPassword(String::new()).is_validation());
        assert!(!AccountError::InvalidToken.is_validation());
        assert!(matches!(
            AccountError::from(RepositoryError::NotFound),
            AccountError::UserNotFound
        ));
    }
}
