//! Admin registry commands.
//!
//! # Usage
//!
//! ```bash
//! mp-cli admin entities
//! mp-cli admin list user --limit 20
//! mp-cli admin show order 42
//! mp-cli admin edit order 42 '{"state": "confirmed"}'
//! mp-cli admin delete shop 7
//! ```
//!
//! Rows are printed as one JSON object per line.

use serde_json::{Map, Value};

use marketplace_store::admin::{AdminSite, ENTITIES};

use super::{CommandError, connect};

/// Print every registered entity.
pub fn entities() {
    #[allow(clippy::print_stdout)]
    {
        for meta in ENTITIES {
            println!(
                "{:<20} {:<28} {}",
                meta.name, meta.table, meta.verbose_name_plural
            );
        }
    }
}

/// Print one page of `entity`.
///
/// # Errors
///
/// Returns `CommandError::Admin` for an unknown entity.
pub async fn list(entity: &str, limit: i64, offset: i64) -> Result<(), CommandError> {
    let (_, pool) = connect().await?;
    let site = AdminSite::new(&pool);

    let total = site.count(entity).await?;
    let rows = site.list(entity, limit, offset).await?;

    #[allow(clippy::print_stdout)]
    {
        for row in &rows {
            println!("{row}");
        }
    }
    tracing::info!(entity, shown = rows.len(), total, offset, "Listed rows");
    Ok(())
}

/// Print a single row.
///
/// # Errors
///
/// Returns `CommandError::Admin` for an unknown entity.
pub async fn show(entity: &str, id: i32) -> Result<(), CommandError> {
    let (_, pool) = connect().await?;

    match AdminSite::new(&pool).get(entity, id).await? {
        Some(row) => {
            #[allow(clippy::print_stdout)]
            {
                println!("{row:#}");
            }
        }
        None => tracing::warn!("No {entity} with ID {id}"),
    }
    Ok(())
}

/// Apply a JSON object of changes to a row.
///
/// # Errors
///
/// Returns `CommandError::InvalidArgument` if `changes` is not a JSON object.
/// Returns `CommandError::Admin` if the edit is rejected.
pub async fn edit(entity: &str, id: i32, changes: &str) -> Result<(), CommandError> {
    let changes = parse_changes(changes)?;
    let (_, pool) = connect().await?;

    match AdminSite::new(&pool).update(entity, id, &changes).await? {
        Some(row) => {
            #[allow(clippy::print_stdout)]
            {
                println!("{row:#}");
            }
        }
        None => tracing::warn!("No {entity} with ID {id}"),
    }
    Ok(())
}

/// Delete a row; dependent rows go with it.
///
/// # Errors
///
/// Returns `CommandError::Admin` for an unknown entity.
pub async fn delete(entity: &str, id: i32) -> Result<(), CommandError> {
    let (_, pool) = connect().await?;

    if AdminSite::new(&pool).delete(entity, id).await? {
        tracing::info!("Deleted {entity} {id}");
    } else {
        tracing::warn!("No {entity} with ID {id}");
    }
    Ok(())
}

fn parse_changes(raw: &str) -> Result<Map<String, Value>, CommandError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(CommandError::InvalidArgument(
            "changes must be a JSON object".to_owned(),
        )),
        Err(e) => Err(CommandError::InvalidArgument(format!("changes: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_changes() {
        let map = parse_changes(r#"{"state": "confirmed"}"#).ok();
        assert_eq!(
            map.and_then(|m| m.get("state").cloned()),
            Some(Value::from("confirmed"))
        );
        assert!(parse_changes("[1, 2]").is_err());
        assert!(parse_changes("not json").is_err());
    }
}
