//! Catalog repository: categories, products, parameters and shop listings.

use sqlx::PgPool;

use marketplace_core::limits::{LONG_TEXT_MAX, NAME_MAX};
use marketplace_core::{
    CategoryId, ParameterId, ProductId, ProductInfoId, ShopId, ValidationError, check_length,
};

use super::{RepositoryError, map_write_error};
use crate::models::catalog::Listing;
use crate::models::{Category, Parameter, Product, ProductInfo, ProductParameter, Shop};

const PRODUCT_INFO_COLUMNS: &str = "id, product_id, shop_id, quantity, price, price_rrc";

fn check_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("name", "must not be empty"));
    }
    check_length("name", name, NAME_MAX)
}

fn check_listing(listing: &Listing) -> Result<(), ValidationError> {
    if listing.price < 0 {
        return Err(ValidationError::new("price", "must not be negative"));
    }
    if listing.price_rrc < 0 {
        return Err(ValidationError::new("price_rrc", "must not be negative"));
    }
    Ok(())
}

/// Repository for the product catalog.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if the name is empty or too long.
    pub async fn create_category(&self, name: &str) -> Result<Category, RepositoryError> {
        check_name(name)?;

        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO market.category (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(category)
    }

    /// All categories ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT id, name FROM market.category ORDER BY name, id")
                .fetch_all(self.pool)
                .await?;

        Ok(categories)
    }

    /// Shops offering the category, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn shops_for_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Shop>, RepositoryError> {
        let shops = sqlx::query_as::<_, Shop>(
            r"
            SELECT s.id, s.name, s.url, s.state, s.user_id
            FROM market.shop s
            JOIN market.category_shop cs ON cs.shop_id = s.id
            WHERE cs.category_id = $1
            ORDER BY s.name, s.id
            ",
        )
        .bind(category_id)
        .fetch_all(self.pool)
        .await?;

        Ok(shops)
    }

    /// Delete a category and, by cascade, its products and everything hanging
    /// off them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_category(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM market.category WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for invalid fields or an unknown category.
    pub async fn create_product(
        &self,
        category_id: CategoryId,
        name: &str,
        model: &str,
    ) -> Result<Product, RepositoryError> {
        check_name(name)?;
        check_length("model", model, LONG_TEXT_MAX)?;

        let product = sqlx::query_as::<_, Product>(
            r"
            INSERT INTO market.product (name, model, category_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, model, category_id
            ",
        )
        .bind(name)
        .bind(model)
        .bind(category_id)
        .fetch_one(self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(product)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, model, category_id FROM market.product WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Products of a category ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn products_in_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT id, name, model, category_id FROM market.product
            WHERE category_id = $1
            ORDER BY name, id
            ",
        )
        .bind(category_id)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_product(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM market.product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// Find a parameter by name, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if the name is empty or too long.
    pub async fn get_or_create_parameter(&self, name: &str) -> Result<Parameter, RepositoryError> {
        check_name(name)?;

        let existing = sqlx::query_as::<_, Parameter>(
            "SELECT id, name FROM market.parameter WHERE name = $1 ORDER BY id LIMIT 1",
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        if let Some(parameter) = existing {
            return Ok(parameter);
        }

        let parameter = sqlx::query_as::<_, Parameter>(
            "INSERT INTO market.parameter (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(parameter)
    }

    /// All parameters ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_parameters(&self) -> Result<Vec<Parameter>, RepositoryError> {
        let parameters = sqlx::query_as::<_, Parameter>(
            "SELECT id, name FROM market.parameter ORDER BY name, id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(parameters)
    }

    // =========================================================================
    // Listings
    // =========================================================================

    /// List `product_id` in `shop_id` with the given stock and prices.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for negative prices or unknown references.
    pub async fn create_listing(
        &self,
        product_id: ProductId,
        shop_id: ShopId,
        listing: &Listing,
    ) -> Result<ProductInfo, RepositoryError> {
        check_listing(listing)?;

        let info = sqlx::query_as::<_, ProductInfo>(&format!(
            r"
            INSERT INTO market.product_info (product_id, shop_id, quantity, price, price_rrc)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PRODUCT_INFO_COLUMNS}
            "
        ))
        .bind(product_id)
        .bind(shop_id)
        .bind(listing.quantity)
        .bind(listing.price)
        .bind(listing.price_rrc)
        .fetch_one(self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(info)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_listing(
        &self,
        id: ProductInfoId,
    ) -> Result<Option<ProductInfo>, RepositoryError> {
        let info = sqlx::query_as::<_, ProductInfo>(&format!(
            "SELECT {PRODUCT_INFO_COLUMNS} FROM market.product_info WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(info)
    }

    /// All listings of a product across shops.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn listings_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ProductInfo>, RepositoryError> {
        let infos = sqlx::query_as::<_, ProductInfo>(&format!(
            "SELECT {PRODUCT_INFO_COLUMNS} FROM market.product_info WHERE product_id = $1 ORDER BY id"
        ))
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(infos)
    }

    /// All listings of a shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn listings_for_shop(
        &self,
        shop_id: ShopId,
    ) -> Result<Vec<ProductInfo>, RepositoryError> {
        let infos = sqlx::query_as::<_, ProductInfo>(&format!(
            "SELECT {PRODUCT_INFO_COLUMNS} FROM market.product_info WHERE shop_id = $1 ORDER BY id"
        ))
        .bind(shop_id)
        .fetch_all(self.pool)
        .await?;

        Ok(infos)
    }

    /// Replace stock and prices of a listing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the listing doesn't exist.
    pub async fn update_listing(
        &self,
        id: ProductInfoId,
        listing: &Listing,
    ) -> Result<ProductInfo, RepositoryError> {
        check_listing(listing)?;

        sqlx::query_as::<_, ProductInfo>(&format!(
            r"
            UPDATE market.product_info SET quantity = $1, price = $2, price_rrc = $3
            WHERE id = $4
            RETURNING {PRODUCT_INFO_COLUMNS}
            "
        ))
        .bind(listing.quantity)
        .bind(listing.price)
        .bind(listing.price_rrc)
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a listing and, by cascade, its parameter values and order items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_listing(&self, id: ProductInfoId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM market.product_info WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Listing parameters
    // =========================================================================

    /// Record the value of `parameter_id` for a listing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if the value is too long or a
    /// reference doesn't exist.
    pub async fn set_parameter_value(
        &self,
        product_info_id: ProductInfoId,
        parameter_id: ParameterId,
        value: &str,
    ) -> Result<ProductParameter, RepositoryError> {
        check_length("value", value, LONG_TEXT_MAX)?;

        let parameter = sqlx::query_as::<_, ProductParameter>(
            r"
            WITH inserted AS (
                INSERT INTO market.product_parameter (product_info_id, parameter_id, value)
                VALUES ($1, $2, $3)
                RETURNING id, product_info_id, parameter_id, value
            )
            SELECT i.id, i.product_info_id, i.parameter_id, p.name AS parameter_name, i.value
            FROM inserted i
            JOIN market.parameter p ON p.id = i.parameter_id
            ",
        )
        .bind(product_info_id)
        .bind(parameter_id)
        .bind(value)
        .fetch_one(self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(parameter)
    }

    /// Parameter values of a listing ordered by parameter name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn parameters_for_listing(
        &self,
        product_info_id: ProductInfoId,
    ) -> Result<Vec<ProductParameter>, RepositoryError> {
        let parameters = sqlx::query_as::<_, ProductParameter>(
            r"
            SELECT pp.id, pp.product_info_id, pp.parameter_id,
                   p.name AS parameter_name, pp.value
            FROM market.product_parameter pp
            JOIN market.parameter p ON p.id = pp.parameter_id
            WHERE pp.product_info_id = $1
            ORDER BY p.name, pp.id
            ",
        )
        .bind(product_info_id)
        .fetch_all(self.pool)
        .await?;

        Ok(parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_name() {
        assert!(check_name("Phones").is_ok());
        assert!(check_name("  ").is_err());
        assert!(check_name(&"n".repeat(31)).is_err());
    }

    #[test]
    fn test_check_listing_rejects_negative_prices() {
        let ok = Listing {
            quantity: -1,
            price: 0,
            price_rrc: 10,
        };
        assert!(check_listing(&ok).is_ok());

        let bad = Listing { price: -5, ..ok };
        assert_eq!(check_listing(&bad).err().map(|e| e.field), Some("price"));

        let bad_rrc = Listing { price_rrc: -1, ..ok };
        assert_eq!(
            check_listing(&bad_rrc).err().map(|e| e.field),
            Some("price_rrc")
        );
    }
}
