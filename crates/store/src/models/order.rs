//! Order domain types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use marketplace_core::{
    ContactId, OrderId, OrderItemId, OrderState, ProductId, ProductInfoId, ShopId, UserId,
};

/// An order placed by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub state: OrderState,
    /// When the order was created; lists are sorted newest first.
    pub created_at: DateTime<Utc>,
    /// Delivery contact. Always owned by `user_id` when present.
    pub contact_id: Option<ContactId>,
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} ({})", self.id, self.created_at, self.state)
    }
}

/// A line item: a quantity of one shop listing.
///
/// `product_id` and `shop_id` always match the referenced listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub shop_id: ShopId,
    pub product_info_id: ProductInfoId,
    pub quantity: i32,
}
