//! Contact repository.

use sqlx::PgPool;

use marketplace_core::{ContactId, UserId};

use super::{RepositoryError, map_write_error};
use crate::models::{Contact, ContactDetails};

const CONTACT_COLUMNS: &str =
    "id, user_id, city, street, house, structure, building, apartment, phone";

/// Repository for user delivery contacts.
pub struct ContactRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContactRepository<'a> {
    /// Create a new contact repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add a contact for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for invalid details or an unknown user.
    pub async fn create(
        &self,
        user_id: UserId,
        details: &ContactDetails,
    ) -> Result<Contact, RepositoryError> {
        details.validate()?;

        let contact = sqlx::query_as::<_, Contact>(&format!(
            r"
            INSERT INTO market.contact
                (user_id, city, street, house, structure, building, apartment, phone)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {CONTACT_COLUMNS}
            "
        ))
        .bind(user_id)
        .bind(&details.city)
        .bind(&details.street)
        .bind(&details.house)
        .bind(&details.structure)
        .bind(&details.building)
        .bind(&details.apartment)
        .bind(&details.phone)
        .fetch_one(self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(contact)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ContactId) -> Result<Option<Contact>, RepositoryError> {
        let contact = sqlx::query_as::<_, Contact>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM market.contact WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(contact)
    }

    /// All contacts of a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Contact>, RepositoryError> {
        let contacts = sqlx::query_as::<_, Contact>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM market.contact WHERE user_id = $1 ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(contacts)
    }

    /// Replace the address fields of a contact owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such contact belongs to the user.
    pub async fn update(
        &self,
        user_id: UserId,
        id: ContactId,
        details: &ContactDetails,
    ) -> Result<Contact, RepositoryError> {
        details.validate()?;

        sqlx::query_as::<_, Contact>(&format!(
            r"
            UPDATE market.contact
            SET city = $1, street = $2, house = $3, structure = $4,
                building = $5, apartment = $6, phone = $7
            WHERE id = $8 AND user_id = $9
            RETURNING {CONTACT_COLUMNS}
            "
        ))
        .bind(&details.city)
        .bind(&details.street)
        .bind(&details.house)
        .bind(&details.structure)
        .bind(&details.building)
        .bind(&details.apartment)
        .bind(&details.phone)
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a contact owned by `user_id`. Orders delivered to it go too.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, user_id: UserId, id: ContactId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM market.contact WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
