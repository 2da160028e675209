//! Generic admin operations over registered entities.
//!
//! Rows leave the database as JSON objects built by `PostgreSQL` itself
//! (`jsonb_build_object` / `to_jsonb`), so no per-entity row type is needed.
//! Edits go through `jsonb_populate_record`, which casts every value to the
//! column's declared type.

use serde_json::{Map, Value};
use sqlx::PgPool;
use thiserror::Error;

use marketplace_core::ValidationError;

use super::{ENTITIES, EntityMeta, entity};
use crate::db::{RepositoryError, map_write_error};

/// Largest page a list view returns.
pub const MAX_PAGE_SIZE: i64 = 500;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// No entity is registered under this name.
    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    /// The requested change was rejected.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for AdminError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Validation(e) => Self::Validation(e),
            other => Self::Repository(other),
        }
    }
}

impl From<sqlx::Error> for AdminError {
    fn from(err: sqlx::Error) -> Self {
        RepositoryError::from(err).into()
    }
}

/// Admin site bound to a connection pool.
pub struct AdminSite<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminSite<'a> {
    /// Create a new admin site.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All registered entities.
    #[must_use]
    pub const fn entities(&self) -> &'static [EntityMeta] {
        ENTITIES
    }

    /// One page of `entity`, list columns only, in the entity's ordering.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::UnknownEntity` if the entity isn't registered.
    pub async fn list(
        &self,
        entity_name: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Value>, AdminError> {
        let meta = lookup(entity_name)?;

        let rows = sqlx::query_as::<_, (Value,)>(&list_sql(meta))
            .bind(limit.clamp(1, MAX_PAGE_SIZE))
            .bind(offset.max(0))
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(|(row,)| row).collect())
    }

    /// Full row of `entity` with `id`, hidden columns removed.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::UnknownEntity` if the entity isn't registered.
    pub async fn get(&self, entity_name: &str, id: i32) -> Result<Option<Value>, AdminError> {
        let meta = lookup(entity_name)?;

        let row = sqlx::query_as::<_, (Value,)>(&format!(
            "SELECT to_jsonb(t) - $2::text[] FROM {} AS t WHERE t.id = $1",
            meta.table
        ))
        .bind(id)
        .bind(meta.hidden)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(row,)| row))
    }

    /// Apply `changes` to the row of `entity` with `id`.
    ///
    /// Returns the updated row, or `None` if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::UnknownEntity` if the entity isn't registered.
    /// Returns `AdminError::Validation` for an empty change set, a column the
    /// admin may not write, a value of the wrong type, or a violated constraint.
    pub async fn update(
        &self,
        entity_name: &str,
        id: i32,
        changes: &Map<String, Value>,
    ) -> Result<Option<Value>, AdminError> {
        let meta = lookup(entity_name)?;
        let columns = check_changes(meta, changes)?;

        let row = sqlx::query_as::<_, (Value,)>(&update_sql(meta, &columns))
            .bind(Value::Object(changes.clone()))
            .bind(id)
            .bind(meta.hidden)
            .fetch_optional(self.pool)
            .await
            .map_err(map_edit_error)?;

        if row.is_some() {
            tracing::info!(entity = meta.name, id, columns = ?columns, "Admin edit applied");
        }
        Ok(row.map(|(row,)| row))
    }

    /// Delete the row of `entity` with `id` and everything that cascades
    /// from it.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::UnknownEntity` if the entity isn't registered.
    pub async fn delete(&self, entity_name: &str, id: i32) -> Result<bool, AdminError> {
        let meta = lookup(entity_name)?;

        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", meta.table))
            .bind(id)
            .execute(self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(entity = meta.name, id, "Admin delete (cascade)");
        }
        Ok(deleted)
    }

    /// Number of rows of `entity`.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::UnknownEntity` if the entity isn't registered.
    pub async fn count(&self, entity_name: &str) -> Result<i64, AdminError> {
        let meta = lookup(entity_name)?;

        let (count,) = sqlx::query_as::<_, (i64,)>(&format!("SELECT COUNT(*) FROM {}", meta.table))
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }
}

fn lookup(name: &str) -> Result<&'static EntityMeta, AdminError> {
    entity(name).ok_or_else(|| AdminError::UnknownEntity(name.to_owned()))
}

/// Validate an edit and return the columns it touches.
fn check_changes<'c>(
    meta: &EntityMeta,
    changes: &'c Map<String, Value>,
) -> Result<Vec<&'c str>, ValidationError> {
    if changes.is_empty() {
        return Err(ValidationError::new("changes", "nothing to update"));
    }

    changes
        .keys()
        .map(|column| {
            if meta.is_editable(column) {
                Ok(column.as_str())
            } else {
                Err(ValidationError::new(
                    "changes",
                    format!("{column} is not an editable {} field", meta.verbose_name),
                ))
            }
        })
        .collect()
}

fn list_sql(meta: &EntityMeta) -> String {
    let fields = meta
        .list_display
        .iter()
        .map(|column| format!("'{column}', \"{column}\""))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "SELECT jsonb_build_object({fields}) FROM {} ORDER BY {} LIMIT $1 OFFSET $2",
        meta.table, meta.ordering
    )
}

/// `columns` must already be checked against the entity's editable list.
fn update_sql(meta: &EntityMeta, columns: &[&str]) -> String {
    let assignments = columns
        .iter()
        .map(|column| format!("\"{column}\" = r.\"{column}\""))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r"
        UPDATE {table} AS t SET {assignments}
        FROM jsonb_populate_record(NULL::{table}, $1) AS r
        WHERE t.id = $2
        RETURNING to_jsonb(t) - $3::text[]
        ",
        table = meta.table
    )
}

/// Like [`map_write_error`], but values `PostgreSQL` cannot cast to the
/// column type and missing required values are validation errors too.
fn map_edit_error(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err {
        let code = db_err.code().unwrap_or_default();
        // 22xxx: data exception, 23502: not-null violation
        if code.starts_with("22") || code == "23502" {
            return ValidationError::new("changes", db_err.message().to_owned()).into();
        }
    }
    map_write_error(err)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn changes(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_check_changes_accepts_editable_columns() {
        let meta = entity("shop").unwrap();
        let edit = changes(json!({"name": "Gadgets", "state": false}));
        let mut columns = check_changes(meta, &edit).unwrap();
        columns.sort_unstable();
        assert_eq!(columns, ["name", "state"]);
    }

    #[test]
    fn test_check_changes_rejects_read_only_columns() {
        let meta = entity("user").unwrap();
        for column in ["id", "password", "email", "nonexistent"] {
            let edit = changes(json!({ column: "x" }));
            let err = check_changes(meta, &edit).unwrap_err();
            assert!(err.message.contains(column), "{column}");
        }
    }

    #[test]
    fn test_check_changes_rejects_empty_edit() {
        let meta = entity("category").unwrap();
        assert!(check_changes(meta, &Map::new()).is_err());
    }

    #[test]
    fn test_list_sql_uses_entity_ordering() {
        let sql = list_sql(entity("order").unwrap());
        assert!(sql.starts_with("SELECT jsonb_build_object('id', \"id\", 'user_id', \"user_id\""));
        assert!(sql.contains("FROM market.order ORDER BY created_at DESC, id DESC"));
    }

    #[test]
    fn test_update_sql_assigns_only_given_columns() {
        let sql = update_sql(entity("product_info").unwrap(), &["price"]);
        assert!(sql.contains("SET \"price\" = r.\"price\""));
        assert!(!sql.contains("quantity"));
        assert!(sql.contains("NULL::market.product_info"));
    }

    #[test]
    fn test_unknown_entity() {
        assert!(matches!(lookup("person"), Err(AdminError::UnknownEntity(name)) if name == "person"));
    }

    #[test]
    fn test_repository_validation_becomes_admin_validation() {
        let err = AdminError::from(RepositoryError::Validation(ValidationError::new(
            "price",
            "must not be negative",
        )));
        assert!(matches!(err, AdminError::Validation(e) if e.field == "price"));
    }
}
