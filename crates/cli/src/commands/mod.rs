//! Command implementations.
//!
//! # Environment Variables
//!
//! - `MARKETPLACE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! See [`marketplace_store::config`] for the optional pool settings.

pub mod admin;
pub mod migrate;
pub mod tokens;
pub mod users;

use sqlx::PgPool;
use thiserror::Error;

use marketplace_store::admin::AdminError;
use marketplace_store::db::{self, RepositoryError};
use marketplace_store::services::AccountError;
use marketplace_store::{ConfigError, StoreConfig};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Repository error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Account operation failed.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// Admin operation failed.
    #[error(transparent)]
    Admin(#[from] AdminError),

    /// No account with this email.
    #[error("No user with email: {0}")]
    UnknownUser(String),

    /// Malformed command argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Load configuration and open a pool.
async fn connect() -> Result<(StoreConfig, PgPool), CommandError> {
    let config = StoreConfig::from_env()?;

    tracing::info!("Connecting to marketplace database...");
    let pool = db::create_pool(&config).await?;

    Ok((config, pool))
}
