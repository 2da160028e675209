//! Order repository.
//!
//! Orders are always listed newest first. State changes go through
//! [`OrderRepository::transition`], which enforces the order lifecycle.

use sqlx::PgPool;

use marketplace_core::{
    ContactId, OrderId, OrderItemId, OrderState, ProductInfoId, UserId, ValidationError,
};

use super::{RepositoryError, map_write_error};
use crate::models::{Order, OrderItem};

const ORDER_COLUMNS: &str = "id, user_id, state, created_at, contact_id";
const ORDER_ITEM_COLUMNS: &str = "id, order_id, product_id, shop_id, product_info_id, quantity";

/// Repository for orders and their line items.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an order for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if the contact belongs to another
    /// user or the user doesn't exist.
    pub async fn create(
        &self,
        user_id: UserId,
        state: OrderState,
        contact_id: Option<ContactId>,
    ) -> Result<Order, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            r"
            INSERT INTO market.order (user_id, state, contact_id)
            VALUES ($1, $2, $3)
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(user_id)
        .bind(state)
        .bind(contact_id)
        .fetch_one(self.pool)
        .await
        .map_err(map_write_error)?;

        tracing::debug!(order_id = %order.id, user_id = %user_id, state = %state, "Order created");
        Ok(order)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM market.order WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// Orders of a user, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            r"
            SELECT {ORDER_COLUMNS} FROM market.order
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// Move an order to `target`.
    ///
    /// The current state is locked for the duration of the check.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Validation` if the lifecycle forbids the move.
    pub async fn transition(
        &self,
        id: OrderId,
        target: OrderState,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, (OrderState,)>(
            "SELECT state FROM market.order WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .map(|(state,)| state)
        .ok_or(RepositoryError::NotFound)?;

        if !current.can_transition_to(target) {
            return Err(ValidationError::new(
                "state",
                format!("cannot move order from {current} to {target}"),
            )
            .into());
        }

        let order = sqlx::query_as::<_, Order>(&format!(
            "UPDATE market.order SET state = $1 WHERE id = $2 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(target)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(order_id = %id, from = %current, to = %target, "Order state changed");
        Ok(order)
    }

    /// Attach or detach the delivery contact.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Validation` if the contact belongs to another user.
    pub async fn set_contact(
        &self,
        id: OrderId,
        contact_id: Option<ContactId>,
    ) -> Result<Order, RepositoryError> {
        sqlx::query_as::<_, Order>(&format!(
            "UPDATE market.order SET contact_id = $1 WHERE id = $2 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(contact_id)
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete an order and its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM market.order WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Line items
    // =========================================================================

    /// Add `quantity` units of a listing to an order.
    ///
    /// Product and shop are copied from the listing so the item always agrees
    /// with it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for a negative quantity, an
    /// unknown listing or an unknown order.
    pub async fn add_item(
        &self,
        order_id: OrderId,
        product_info_id: ProductInfoId,
        quantity: i32,
    ) -> Result<OrderItem, RepositoryError> {
        if quantity < 0 {
            return Err(ValidationError::new("quantity", "must not be negative").into());
        }

        sqlx::query_as::<_, OrderItem>(&format!(
            r"
            INSERT INTO market.order_item (order_id, product_id, shop_id, product_info_id, quantity)
            SELECT $1, pi.product_id, pi.shop_id, pi.id, $3
            FROM market.product_info pi
            WHERE pi.id = $2
            RETURNING {ORDER_ITEM_COLUMNS}
            "
        ))
        .bind(order_id)
        .bind(product_info_id)
        .bind(quantity)
        .fetch_optional(self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or_else(|| {
            ValidationError::new("product_info_id", "listing does not exist").into()
        })
    }

    /// Items of an order in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ORDER_ITEM_COLUMNS} FROM market.order_item WHERE order_id = $1 ORDER BY id"
        ))
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// Remove a single line item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_item(&self, id: OrderItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM market.order_item WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
