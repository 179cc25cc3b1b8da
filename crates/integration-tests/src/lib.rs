//! Integration tests for the Emporium storefront schema.
//!
//! # Running Tests
//!
//! Database tests are `#[ignore]`d by default. Point `TEST_DATABASE_URL` at a
//! scratch `PostgreSQL` database and run the ignored tests:
//!
//! ```bash
//! TEST_DATABASE_URL=postgres://localhost/emporium_test \
//!     cargo test -p emporium-integration-tests -- --ignored
//! ```
//!
//! Migrations are applied on connect. Every helper creates rows with unique
//! names, so tests can share one database and run in parallel.

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use emporium_core::{CategoryId, Price};
use emporium_store::db::{CategoryRepository, CustomerRepository, ProductRepository};
use emporium_store::models::{
    Category, CategoryInput, Customer, CustomerInput, Product, ProductInput,
};

/// Environment variable naming the scratch database.
pub const TEST_DATABASE_URL: &str = "TEST_DATABASE_URL";

/// Connect to the test database and bring its schema up to date.
pub async fn test_pool() -> PgPool {
    let url = std::env::var(TEST_DATABASE_URL)
        .unwrap_or_else(|_| "postgres://localhost/emporium_test".to_owned());

    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .expect("Failed to connect to test database");

    emporium_store::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// A short random suffix for names that must not collide between tests.
#[must_use]
pub fn unique(prefix: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}", id.get(..12).unwrap_or(id.as_str()))
}

/// Insert a category with a unique title.
pub async fn create_category(pool: &PgPool) -> Category {
    let input = CategoryInput::new(&unique("Category"), "").expect("valid category");
    CategoryRepository::new(pool)
        .create(&input)
        .await
        .expect("Failed to create category")
}

/// Insert a product with a unique name (and so a unique slug).
pub async fn create_product(
    pool: &PgPool,
    category_id: CategoryId,
    price: &str,
    inventory: i32,
) -> Product {
    let input = ProductInput::new(
        &unique("Product"),
        None,
        "Test product",
        category_id,
        Price::parse(price).expect("valid price"),
        inventory,
    )
    .expect("valid product");
    ProductRepository::new(pool)
        .create(&input)
        .await
        .expect("Failed to create product")
}

/// Insert a customer with a unique email address.
pub async fn create_customer(pool: &PgPool) -> Customer {
    let email = format!("{}@example.com", unique("customer"));
    let input = CustomerInput::new("Test", "Customer", &email, "+1 555 0100", None)
        .expect("valid customer");
    CustomerRepository::new(pool)
        .create(&input)
        .await
        .expect("Failed to create customer")
}
