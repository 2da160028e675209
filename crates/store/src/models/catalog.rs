//! Catalog domain types: categories, products, parameters and listings.

use std::fmt;

use serde::Serialize;

use marketplace_core::{
    CategoryId, ParameterId, ProductId, ProductInfoId, ProductParameterId, ShopId,
};

/// A product category, offered by any number of shops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A product; deleted together with its category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Model designator.
    pub model: String,
    pub category_id: CategoryId,
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A named attribute definition such as "color", shared across products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Parameter {
    pub id: ParameterId,
    pub name: String,
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A shop's listing of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ProductInfo {
    pub id: ProductInfoId,
    pub product_id: ProductId,
    pub shop_id: ShopId,
    /// Units in stock.
    pub quantity: i32,
    pub price: i32,
    /// Recommended retail price.
    pub price_rrc: i32,
}

/// Stock and pricing for a new listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listing {
    pub quantity: i32,
    pub price: i32,
    pub price_rrc: i32,
}

/// The value of a parameter for one listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ProductParameter {
    pub id: ProductParameterId,
    pub product_info_id: ProductInfoId,
    pub parameter_id: ParameterId,
    /// Name of the parameter, joined in for display.
    pub parameter_name: String,
    pub value: String,
}

impl fmt::Display for ProductParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.product_info_id, self.parameter_name, self.value
        )
    }
}
