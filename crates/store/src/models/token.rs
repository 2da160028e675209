//! Confirmation token domain type.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use marketplace_core::limits::TOKEN_KEY_MAX;
use marketplace_core::{ConfirmEmailTokenId, Email, TokenGenerator, UserId, ValidationError};

/// A one-time key bound to a user, used to activate the account or reset its
/// password.
///
/// A token that has not been saved yet has no `id`. Its `key` may be left
/// empty; saving fills it from the injected [`TokenGenerator`]. Once set the
/// key never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmEmailToken {
    pub id: Option<ConfirmEmailTokenId>,
    pub user_id: UserId,
    pub key: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl ConfirmEmailToken {
    /// An unsaved token for `user_id` with no key yet.
    #[must_use]
    pub const fn new(user_id: UserId) -> Self {
        Self {
            id: None,
            user_id,
            key: String::new(),
            created_at: None,
        }
    }

    /// An unsaved token with a caller-chosen key.
    #[must_use]
    pub fn with_key(user_id: UserId, key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::new(user_id)
        }
    }

    /// Whether the token has been persisted.
    #[must_use]
    pub const fn is_saved(&self) -> bool {
        self.id.is_some()
    }

    /// Fill the key from `generator` if it is still empty.
    ///
    /// Returns `true` if a key was generated, `false` if one was already set.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the resulting key is empty or does not
    /// fit the key column.
    pub fn ensure_key(&mut self, generator: &dyn TokenGenerator) -> Result<bool, ValidationError> {
        let generated = if self.key.is_empty() {
            self.key = generator.generate_token();
            true
        } else {
            false
        };

        if self.key.is_empty() {
            return Err(ValidationError::new("key", "generator returned an empty key"));
        }
        if self.key.chars().count() > TOKEN_KEY_MAX {
            return Err(ValidationError::new(
                "key",
                format!("must be at most {TOKEN_KEY_MAX} characters"),
            ));
        }

        Ok(generated)
    }
}

/// Display adapter naming the token's owner by email.
#[derive(Debug, Clone, Copy)]
pub struct OwnedToken<'a> {
    token: &'a ConfirmEmailToken,
    owner: &'a Email,
}

impl ConfirmEmailToken {
    /// Render as `Password reset token for user {email}`.
    ///
    /// The token only stores the owner's ID, so the caller supplies the email.
    #[must_use]
    pub const fn for_owner<'a>(&'a self, owner: &'a Email) -> OwnedToken<'a> {
        OwnedToken { token: self, owner }
    }
}

impl fmt::Display for OwnedToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Password reset token for user {}", self.owner)
    }
}

impl<'a> OwnedToken<'a> {
    /// The wrapped token.
    #[must_use]
    pub const fn token(&self) -> &'a ConfirmEmailToken {
        self.token
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use marketplace_core::RandomTokenGenerator;

    use super::*;

    #[test]
    fn test_ensure_key_fills_empty_key() {
        let mut token = ConfirmEmailToken::new(UserId::new(1));
        let generated = token.ensure_key(&RandomTokenGenerator::default());
        assert_eq!(generated, Ok(true));
        assert!(!token.key.is_empty());
        assert!(token.key.len() <= TOKEN_KEY_MAX);
    }

    #[test]
    fn test_ensure_key_keeps_existing_key() {
        let calls = AtomicUsize::new(0);
        let generator = || {
            calls.fetch_add(1, Ordering::SeqCst);
            "fresh".to_owned()
        };

        let mut token = ConfirmEmailToken::new(UserId::new(1));
        assert_eq!(token.ensure_key(&generator), Ok(true));
        assert_eq!(token.key, "fresh");

        let before = token.key.clone();
        assert_eq!(token.ensure_key(&generator), Ok(false));
        assert_eq!(token.key, before);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_caller_supplied_key_is_kept() {
        let mut token = ConfirmEmailToken::with_key(UserId::new(9), "mine");
        assert_eq!(token.ensure_key(&|| "other".to_owned()), Ok(false));
        assert_eq!(token.key, "mine");
    }

    #[test]
    fn test_rejects_empty_generated_key() {
        let mut token = ConfirmEmailToken::new(UserId::new(1));
        let err = token.ensure_key(&String::new).unwrap_err();
        assert_eq!(err.field, "key");
    }

    #[test]
    fn test_rejects_oversized_key() {
        let mut token = ConfirmEmailToken::with_key(UserId::new(1), "k".repeat(65));
        assert!(token.ensure_key(&RandomTokenGenerator::default()).is_err());
    }

    #[test]
    fn test_display_names_owner_email() {
        let token = ConfirmEmailToken::new(UserId::new(3));
        let owner = Email::parse("buyer@example.com").unwrap();
        assert_eq!(
            token.for_owner(&owner).to_string(),
            "Password reset token for user buyer@example.com"
        );
        assert_eq!(token.for_owner(&owner).token().user_id, UserId::new(3));
    }
}
