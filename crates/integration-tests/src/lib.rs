//! Integration tests for the marketplace store.
//!
//! # Running Tests
//!
//! ```bash
//! # Point the tests at a scratch database
//! export MARKETPLACE_DATABASE_URL=postgres://localhost/marketplace_test
//!
//! # Run integration tests (they are ignored by default)
//! cargo test -p marketplace-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `accounts` - User manager, login and confirmation tokens
//! - `orders` - Order lifecycle, contacts and line items
//! - `cascade` - Cascading deletes across the schema
//! - `admin_site` - Generic admin operations
//!
//! Every test creates its own users with unique emails, so tests can share
//! one database and run in parallel.

#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use secrecy::SecretString;
use sqlx::PgPool;
use uuid::Uuid;

use marketplace_core::{RandomTokenGenerator, UserType};
use marketplace_store::StoreConfig;
use marketplace_store::db::{self, CatalogRepository, ShopRepository};
use marketplace_store::models::{
    AccountFlags, Listing, Product, ProductInfo, Shop, ShopDetails, User, UserProfile,
};
use marketplace_store::services::AccountService;

/// Password used for every test account.
pub const TEST_PASSWORD: &str = "integration-password";

/// Shared state of one test.
pub struct TestContext {
    pub pool: PgPool,
    pub generator: RandomTokenGenerator,
}

impl TestContext {
    /// Connect using `MARKETPLACE_DATABASE_URL` and apply migrations.
    pub async fn new() -> Self {
        let config = StoreConfig::from_env().expect("MARKETPLACE_DATABASE_URL must be set");
        let pool = db::create_pool(&config)
            .await
            .expect("Failed to connect to test database");
        db::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        Self {
            pool,
            generator: config.token_generator(),
        }
    }

    /// Account service using the default key generator.
    #[must_use]
    pub fn accounts(&self) -> AccountService<'_> {
        AccountService::new(&self.pool, &self.generator)
    }

    /// Create an inactive buyer with the test password.
    pub async fn create_user(&self, prefix: &str) -> User {
        self.accounts()
            .create_user(
                &unique_email(prefix),
                Some(&password()),
                UserProfile::default(),
                AccountFlags::default(),
            )
            .await
            .expect("Failed to create test user")
    }

    /// Create a shop owner together with their shop.
    pub async fn create_shop(&self, name: &str) -> (User, Shop) {
        let profile = UserProfile {
            user_type: UserType::Shop,
            ..UserProfile::default()
        };
        let owner = self
            .accounts()
            .create_user(
                &unique_email("shop"),
                Some(&password()),
                profile,
                AccountFlags::default(),
            )
            .await
            .expect("Failed to create shop owner");
        let shop = ShopRepository::new(&self.pool)
            .create(owner.id, &ShopDetails::named(name))
            .await
            .expect("Failed to create shop");
        (owner, shop)
    }

    /// Create a category, a product in it, and a listing of that product
    /// in `shop`.
    pub async fn create_listing(&self, shop: &Shop) -> (Product, ProductInfo) {
        let catalog = CatalogRepository::new(&self.pool);
        let category = catalog
            .create_category("Phones")
            .await
            .expect("Failed to create category");
        ShopRepository::new(&self.pool)
            .add_category(shop.id, category.id)
            .await
            .expect("Failed to link category");
        let product = catalog
            .create_product(category.id, "Phone", "X-100")
            .await
            .expect("Failed to create product");
        let listing = catalog
            .create_listing(
                product.id,
                shop.id,
                &Listing {
                    quantity: 10,
                    price: 1000,
                    price_rrc: 1200,
                },
            )
            .await
            .expect("Failed to create listing");
        (product, listing)
    }

    /// Number of rows in `table` matching `column = id`.
    pub async fn count_where(&self, table: &str, column: &str, id: i32) -> i64 {
        let (count,) = sqlx::query_as::<_, (i64,)>(&format!(
            "SELECT COUNT(*) FROM market.{table} WHERE {column} = $1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .expect("Failed to count rows");
        count
    }
}

/// A fresh, never used email address.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@Example.COM", Uuid::new_v4().simple())
}

/// The shared test password.
#[must_use]
pub fn password() -> SecretString {
    SecretString::from(TEST_PASSWORD)
}
