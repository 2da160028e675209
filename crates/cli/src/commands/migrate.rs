//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! mp-cli migrate
//! ```
//!
//! Migrations are embedded from `crates/store/migrations/`:
//! ```text
//! migrations/
//! ├── 20260301000001_create_users.sql
//! ├── 20260301000002_create_catalog.sql
//! ├── 20260301000003_create_orders.sql
//! └── 20260301000004_create_confirm_email_tokens.sql
//! ```

use marketplace_store::db;

use super::{CommandError, connect};

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let (_, pool) = connect().await?;

    db::run_migrations(&pool).await?;

    let applied = db::MIGRATOR.iter().count();
    tracing::info!(migrations = applied, "Schema is up to date");
    Ok(())
}
