//! Database operations for the storefront `PostgreSQL` schema.
//!
//! # Schema: `store`
//!
//! ## Tables
//!
//! - `category` - Product groupings, listed by creation time
//! - `discount` - Percentage reductions
//! - `product` - Catalog entries (price `NUMERIC(6,2)`, unique slug)
//! - `product_discount` - Product/discount join
//! - `customer` - Customer contact details
//! - `address` - One address per customer, keyed by the customer
//! - `customer_order` - Orders with a `p`/`u`/`c` status code
//! - `order_item` - Order lines with a unit price snapshot
//! - `comment` - Product reviews awaiting moderation
//! - `cart` / `cart_item` - Pre-order staging
//!
//! ## Delete rules
//!
//! | Parent | Child | Rule |
//! |---|---|---|
//! | category | product | restrict |
//! | customer | customer_order | restrict |
//! | customer_order | order_item | restrict |
//! | product | order_item | restrict |
//! | customer | address | cascade |
//! | product | comment, cart_item, product_discount | cascade |
//! | cart | cart_item | cascade |
//! | discount | product_discount | cascade |
//!
//! # Migrations
//!
//! Migrations live in `crates/store/migrations/`, one per schema revision,
//! and are embedded at compile time. Run them via:
//! ```bash
//! cargo run -p emporium-cli -- migrate
//! ```

pub mod carts;
pub mod categories;
pub mod comments;
pub mod customers;
pub mod discounts;
pub mod orders;
pub mod products;

use secrecy::ExposeSecret;
use serde::Serialize;
use sqlx::PgPool;
use sqlx::error::ErrorKind;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use emporium_core::FieldError;

use crate::config::StoreConfig;

pub use carts::CartRepository;
pub use categories::CategoryRepository;
pub use comments::CommentRepository;
pub use customers::CustomerRepository;
pub use discounts::DiscountRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Input failed field validation before reaching the database.
    #[error("validation error: {0}")]
    Validation(#[from] FieldError),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Unique constraint violation (e.g., duplicate order line).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Delete refused because other rows still reference the entity.
    #[error("entity is still referenced ({0})")]
    Protected(String),

    /// Insert or update pointed at a row that does not exist.
    #[error("referenced entity does not exist ({0})")]
    InvalidReference(String),

    /// A check constraint rejected the row.
    #[error("check constraint failed: {0}")]
    CheckViolation(String),

    /// A status change that the lifecycle does not allow.
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// Current status label.
        from: &'static str,
        /// Requested status label.
        to: &'static str,
    },

    /// The order is paid or canceled, so its lines are fixed.
    #[error("order is {0} and its lines can no longer change")]
    OrderFinal(&'static str),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

impl RepositoryError {
    /// Map a sqlx error to a repository error.
    ///
    /// Constraint violations become `Conflict`, `InvalidReference`, or
    /// `CheckViolation`; undecodable columns become `DataCorruption`.
    pub(crate) fn classify(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            let constraint = db_err.constraint().unwrap_or_default().to_owned();
            match db_err.kind() {
                ErrorKind::UniqueViolation => return Self::Conflict(constraint),
                ErrorKind::ForeignKeyViolation => return Self::InvalidReference(constraint),
                ErrorKind::CheckViolation => return Self::CheckViolation(constraint),
                _ => {}
            }
        }
        if let sqlx::Error::ColumnDecode { ref source, .. } = err {
            return Self::DataCorruption(source.to_string());
        }
        Self::Database(err)
    }

    /// Map an error raised by a `DELETE`.
    ///
    /// A foreign-key violation here means a `RESTRICT` rule fired.
    pub(crate) fn from_delete(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && matches!(db_err.kind(), ErrorKind::ForeignKeyViolation)
        {
            return Self::Protected(db_err.constraint().unwrap_or_default().to_owned());
        }
        Self::classify(err)
    }

    /// Whether this error is a uniqueness conflict on `constraint`.
    #[must_use]
    pub fn is_conflict_on(&self, constraint: &str) -> bool {
        matches!(self, Self::Conflict(c) if c == constraint)
    }
}

/// Create a `PostgreSQL` connection pool from configuration.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(config: &StoreConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.pool.max_connections)
        .min_connections(config.pool.min_connections)
        .acquire_timeout(config.pool.acquire_timeout)
        .connect(config.database_url.expose_secret())
        .await
}

/// Apply any pending schema migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the applied history does
/// not match the embedded one.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    tracing::info!(
        available = MIGRATOR.iter().count(),
        "Running store migrations"
    );
    MIGRATOR.run(pool).await?;
    tracing::info!("Store migrations complete");
    Ok(())
}

/// Row counts for every table in the schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct TableCounts {
    pub categories: i64,
    pub discounts: i64,
    pub products: i64,
    pub customers: i64,
    pub addresses: i64,
    pub orders: i64,
    pub order_items: i64,
    pub comments: i64,
    pub carts: i64,
    pub cart_items: i64,
}

/// Count the rows of every table in one round trip.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn table_counts(pool: &PgPool) -> Result<TableCounts, RepositoryError> {
    let counts = sqlx::query_as::<_, TableCounts>(
        r"
        SELECT
            (SELECT COUNT(*) FROM store.category) AS categories,
            (SELECT COUNT(*) FROM store.discount) AS discounts,
            (SELECT COUNT(*) FROM store.product) AS products,
            (SELECT COUNT(*) FROM store.customer) AS customers,
            (SELECT COUNT(*) FROM store.address) AS addresses,
            (SELECT COUNT(*) FROM store.customer_order) AS orders,
            (SELECT COUNT(*) FROM store.order_item) AS order_items,
            (SELECT COUNT(*) FROM store.comment) AS comments,
            (SELECT COUNT(*) FROM store.cart) AS carts,
            (SELECT COUNT(*) FROM store.cart_item) AS cart_items
        ",
    )
    .fetch_one(pool)
    .await?;

    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_embedded_in_revision_order() {
        let versions: Vec<i64> = MIGRATOR.iter().map(|m| m.version).collect();
        assert_eq!(versions.len(), 5);
        assert!(versions.windows(2).all(|w| w.first() < w.get(1)));
    }

    #[test]
    fn test_validation_errors_convert() {
        let err: RepositoryError = FieldError::Blank { field: "title" }.into();
        assert!(matches!(err, RepositoryError::Validation(_)));
        assert_eq!(err.to_string(), "validation error: title cannot be blank");
    }

    #[test]
    fn test_non_database_errors_pass_through() {
        let err = RepositoryError::from_delete(sqlx::Error::RowNotFound);
        assert!(matches!(err, RepositoryError::Database(sqlx::Error::RowNotFound)));
    }

    #[test]
    fn test_classify_maps_decode_failures_to_corruption() {
        let err = RepositoryError::classify(sqlx::Error::ColumnDecode {
            index: "\"status\"".to_owned(),
            source: "unknown order status code \"x\"".into(),
        });
        assert!(matches!(err, RepositoryError::DataCorruption(ref m) if m.contains("\"x\"")));

        let err = RepositoryError::classify(sqlx::Error::RowNotFound);
        assert!(matches!(err, RepositoryError::Database(sqlx::Error::RowNotFound)));
    }

    #[test]
    fn test_order_final_message_names_status() {
        let err = RepositoryError::OrderFinal("Paid");
        assert_eq!(err.to_string(), "order is Paid and its lines can no longer change");
    }

    #[test]
    fn test_conflict_matching() {
        let err = RepositoryError::Conflict("cart_item_cart_product_key".to_owned());
        assert!(err.is_conflict_on("cart_item_cart_product_key"));
        assert!(!err.is_conflict_on("product_slug_key"));
    }
}
