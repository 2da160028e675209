//! User domain types.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use marketplace_core::limits::{COMPANY_MAX, PERSON_NAME_MAX};
use marketplace_core::{Email, UserId, UserType, ValidationError, check_length};

/// A marketplace account (domain type).
///
/// The password hash is deliberately absent; it is only read back through
/// [`crate::db::UserRepository::get_password_hash`].
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Normalized email address, the login identifier.
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub company: String,
    pub position: String,
    /// Inactive accounts cannot authenticate.
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    /// Shop owner or buyer.
    pub user_type: UserType,
    /// When the account was created.
    pub date_joined: DateTime<Utc>,
    /// Last successful authentication.
    pub last_login: Option<DateTime<Utc>>,
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.email)
    }
}

/// Optional profile fields supplied at registration.
#[derive(Debug, Clone, Default)]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub company: String,
    pub position: String,
    pub user_type: UserType,
}

impl UserProfile {
    /// Check every field against its column width.
    ///
    /// # Errors
    ///
    /// Returns the first field that does not fit.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_length("first_name", &self.first_name, PERSON_NAME_MAX)?;
        check_length("last_name", &self.last_name, PERSON_NAME_MAX)?;
        check_length("company", &self.company, COMPANY_MAX)?;
        check_length("position", &self.position, COMPANY_MAX)?;
        Ok(())
    }
}

/// Permission flags requested by the caller.
///
/// `None` means "use the default for this kind of account".
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountFlags {
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
}

/// Fully resolved values for a new `market.user` row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub password_hash: String,
    pub profile: UserProfile,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}
