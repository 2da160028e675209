//! Shop repository.

use sqlx::PgPool;

use marketplace_core::{CategoryId, ShopId, UserId};

use super::{RepositoryError, map_write_error};
use crate::models::shop::{Shop, ShopDetails};
use crate::models::Category;

/// Repository for shops and the categories they offer.
pub struct ShopRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ShopRepository<'a> {
    /// Create a new shop repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create the shop owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for invalid details or an unknown user.
    /// Returns `RepositoryError::Conflict` if the user already owns a shop.
    pub async fn create(
        &self,
        user_id: UserId,
        details: &ShopDetails,
    ) -> Result<Shop, RepositoryError> {
        details.validate()?;

        let shop = sqlx::query_as::<_, Shop>(
            r"
            INSERT INTO market.shop (name, url, state, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, url, state, user_id
            ",
        )
        .bind(&details.name)
        .bind(details.url.as_deref())
        .bind(details.state)
        .bind(user_id)
        .fetch_one(self.pool)
        .await
        .map_err(map_write_error)?;

        tracing::info!(shop_id = %shop.id, user_id = %user_id, "Shop created");
        Ok(shop)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ShopId) -> Result<Option<Shop>, RepositoryError> {
        let shop = sqlx::query_as::<_, Shop>(
            "SELECT id, name, url, state, user_id FROM market.shop WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(shop)
    }

    /// The shop owned by `user_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_user(&self, user_id: UserId) -> Result<Option<Shop>, RepositoryError> {
        let shop = sqlx::query_as::<_, Shop>(
            "SELECT id, name, url, state, user_id FROM market.shop WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(shop)
    }

    /// All shops ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Shop>, RepositoryError> {
        let shops = sqlx::query_as::<_, Shop>(
            "SELECT id, name, url, state, user_id FROM market.shop ORDER BY name, id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(shops)
    }

    /// Replace name, url and state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the shop doesn't exist.
    pub async fn update(&self, id: ShopId, details: &ShopDetails) -> Result<Shop, RepositoryError> {
        details.validate()?;

        sqlx::query_as::<_, Shop>(
            r"
            UPDATE market.shop SET name = $1, url = $2, state = $3
            WHERE id = $4
            RETURNING id, name, url, state, user_id
            ",
        )
        .bind(&details.name)
        .bind(details.url.as_deref())
        .bind(details.state)
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or(RepositoryError::NotFound)
    }

    /// Open or close the shop for orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the shop doesn't exist.
    pub async fn set_state(&self, id: ShopId, state: bool) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE market.shop SET state = $1 WHERE id = $2")
            .bind(state)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Offer `category_id` in this shop. Offering it twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if either side doesn't exist.
    pub async fn add_category(
        &self,
        shop_id: ShopId,
        category_id: CategoryId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO market.category_shop (category_id, shop_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            ",
        )
        .bind(category_id)
        .bind(shop_id)
        .execute(self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }

    /// Stop offering `category_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_category(
        &self,
        shop_id: ShopId,
        category_id: CategoryId,
    ) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM market.category_shop WHERE category_id = $1 AND shop_id = $2")
                .bind(category_id)
                .bind(shop_id)
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Categories offered by the shop, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn categories(&self, shop_id: ShopId) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>(
            r"
            SELECT c.id, c.name
            FROM market.category c
            JOIN market.category_shop cs ON cs.category_id = c.id
            WHERE cs.shop_id = $1
            ORDER BY c.name, c.id
            ",
        )
        .bind(shop_id)
        .fetch_all(self.pool)
        .await?;

        Ok(categories)
    }

    /// Delete the shop and, by cascade, its listings and their order items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ShopId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM market.shop WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
