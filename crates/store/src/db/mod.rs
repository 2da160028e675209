//! Database operations for the marketplace `PostgreSQL` schema.
//!
//! # Schema: `market`
//!
//! ## Tables
//!
//! - `user` - Accounts (shop owners and buyers)
//! - `shop` - One per owning user
//! - `category`, `category_shop` - Categories and the shops offering them
//! - `product`, `parameter` - Catalog entries and attribute definitions
//! - `product_info`, `product_parameter` - Shop listings and their attribute values
//! - `contact` - Delivery addresses
//! - `order`, `order_item` - Orders and their line items
//! - `confirm_email_token` - One-time activation / password reset keys
//!
//! Every relationship is a foreign key with `ON DELETE CASCADE`.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/store/migrations/` and run via:
//! ```bash
//! cargo run -p marketplace-cli -- migrate
//! ```

pub mod catalog;
pub mod contacts;
pub mod orders;
pub mod shops;
pub mod tokens;
pub mod users;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use marketplace_core::ValidationError;

use crate::config::StoreConfig;

pub use catalog::CatalogRepository;
pub use contacts::ContactRepository;
pub use orders::OrderRepository;
pub use shops::ShopRepository;
pub use tokens::TokenRepository;
pub use users::UserRepository;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Input rejected before or by a guarded constraint.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
}

/// Create a `PostgreSQL` connection pool from the store configuration.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(config: &StoreConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(config.database_url.expose_secret())
        .await
}

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the history diverges.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    tracing::info!("Running marketplace migrations...");
    MIGRATOR.run(pool).await?;
    tracing::info!("Marketplace migrations complete");
    Ok(())
}

/// Named constraints with a caller-facing meaning.
///
/// Unique constraints map to [`RepositoryError::Conflict`], everything else to
/// [`RepositoryError::Validation`] on the given field.
const KNOWN_CONSTRAINTS: &[(&str, &str, &str)] = &[
    ("user_email_key", "email", "email already exists"),
    ("user_email_not_blank", "email", "the given email must be set"),
    ("shop_user_id_key", "user_id", "user already owns a shop"),
    ("category_shop_pkey", "shop_id", "shop already offers this category"),
    (
        "confirm_email_token_key_key",
        "key",
        "token key already exists",
    ),
    (
        "confirm_email_token_key_not_blank",
        "key",
        "key must not be empty",
    ),
    (
        "order_contact_owner_fkey",
        "contact_id",
        "contact does not belong to the order's user",
    ),
    ("product_info_price_check", "price", "must not be negative"),
    (
        "product_info_price_rrc_check",
        "price_rrc",
        "must not be negative",
    ),
    ("order_item_quantity_check", "quantity", "must not be negative"),
];

/// Whether `err` is a unique violation of `constraint`.
pub(crate) fn is_unique_violation_of(err: &sqlx::Error, constraint: &str) -> bool {
    matches!(err, sqlx::Error::Database(db_err)
        if db_err.is_unique_violation() && db_err.constraint() == Some(constraint))
}

/// Translate constraint violations into domain errors.
///
/// Generic foreign key and check violations become validation errors too;
/// everything else stays a database error.
pub(crate) fn map_write_error(err: sqlx::Error) -> RepositoryError {
    let sqlx::Error::Database(ref db_err) = err else {
        return RepositoryError::Database(err);
    };

    let known = db_err
        .constraint()
        .and_then(|name| KNOWN_CONSTRAINTS.iter().find(|(c, _, _)| *c == name));

    if db_err.is_unique_violation() {
        let message = known.map_or_else(
            || {
                let constraint = db_err.constraint().unwrap_or("a unique constraint");
                format!("duplicate value violates {constraint}")
            },
            |(_, _, message)| (*message).to_owned(),
        );
        return RepositoryError::Conflict(message);
    }

    if db_err.is_foreign_key_violation() || db_err.is_check_violation() {
        let error = known.map_or_else(
            || ValidationError::new("reference", db_err.message().to_owned()),
            |(_, field, message)| ValidationError::new(*field, *message),
        );
        return RepositoryError::Validation(error);
    }

    RepositoryError::Database(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_constraints_are_unique() {
        let mut names: Vec<&str> = KNOWN_CONSTRAINTS.iter().map(|(n, _, _)| *n).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), KNOWN_CONSTRAINTS.len());
    }

    #[test]
    fn test_non_database_errors_pass_through() {
        let err = map_write_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, RepositoryError::Database(sqlx::Error::RowNotFound)));
        assert!(!is_unique_violation_of(&sqlx::Error::RowNotFound, "user_email_key"));
    }

    #[test]
    fn test_migrations_are_embedded() {
        assert_eq!(MIGRATOR.iter().count(), 4);
    }
}
