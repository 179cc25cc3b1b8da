//! Product repository.

use sqlx::PgPool;

use emporium_core::{CategoryId, DiscountRate, FieldError, Price, ProductId, Slug};

use super::RepositoryError;
use crate::models::{Product, ProductInput};

const PRODUCT_COLUMNS: &str = "id, name, slug, description, category_id, price, inventory, created_at, updated_at";

/// Filter and paging for product listings.
#[derive(Debug, Clone, Copy)]
pub struct ProductFilter {
    /// Only products in this category.
    pub category_id: Option<CategoryId>,
    /// Maximum rows returned.
    pub limit: i64,
    /// Rows skipped before the first returned.
    pub offset: i64,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            category_id: None,
            limit: 100,
            offset: 0,
        }
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken and
    /// `RepositoryError::InvalidReference` if the category does not exist.
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            r"
            INSERT INTO store.product (name, slug, description, category_id, price, inventory)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(input.name.as_str())
        .bind(&input.slug)
        .bind(&input.description)
        .bind(input.category_id)
        .bind(input.price)
        .bind(input.inventory)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::classify)?;

        tracing::debug!(product_id = %product.id, slug = %product.slug, "Created product");
        Ok(product)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM store.product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::classify)?;

        Ok(product)
    }

    /// Get a product by its slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &Slug) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM store.product WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::classify)?;

        Ok(product)
    }

    /// List products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM store.product
            WHERE ($1::INTEGER IS NULL OR category_id = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "
        ))
        .bind(filter.category_id)
        .bind(filter.limit.max(0))
        .bind(filter.offset.max(0))
        .fetch_all(self.pool)
        .await
        .map_err(RepositoryError::classify)?;

        Ok(products)
    }

    /// Replace a product's editable fields. `updated_at` is refreshed by a
    /// trigger.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist,
    /// `RepositoryError::Conflict` if the new slug is taken.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            r"
            UPDATE store.product
            SET name = $2, slug = $3, description = $4, category_id = $5,
                price = $6, inventory = $7
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(input.name.as_str())
        .bind(&input.slug)
        .bind(&input.description)
        .bind(input.category_id)
        .bind(input.price)
        .bind(input.inventory)
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::classify)?
        .ok_or(RepositoryError::NotFound)
    }

    /// Change stock by `delta` units in a single statement.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if stock would go below zero and
    /// `RepositoryError::NotFound` if the product does not exist.
    pub async fn adjust_inventory(
        &self,
        id: ProductId,
        delta: i32,
    ) -> Result<Product, RepositoryError> {
        let updated = sqlx::query_as::<_, Product>(&format!(
            r"
            UPDATE store.product
            SET inventory = inventory + $2
            WHERE id = $1 AND inventory + $2 >= 0
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(delta)
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::classify)?;

        if let Some(product) = updated {
            tracing::debug!(product_id = %id, delta, inventory = product.inventory, "Adjusted inventory");
            return Ok(product);
        }

        if self.get(id).await?.is_none() {
            return Err(RepositoryError::NotFound);
        }
        Err(FieldError::invalid(
            "inventory",
            format!("cannot remove {} units", -i64::from(delta)),
        )
        .into())
    }

    /// Delete a product. Comments, cart items, and discount links go with it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Protected` while any order references the
    /// product, and `RepositoryError::NotFound` if it does not exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM store.product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(RepositoryError::from_delete)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tracing::debug!(product_id = %id, "Deleted product");
        Ok(())
    }

    /// Current price with the largest attached discount applied.
    ///
    /// Discounts do not stack.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn effective_price(&self, id: ProductId) -> Result<Price, RepositoryError> {
        let row = sqlx::query_as::<_, (Price, Option<DiscountRate>)>(
            r"
            SELECT p.price, MAX(d.discount) AS best_discount
            FROM store.product p
            LEFT JOIN store.product_discount pd ON pd.product_id = p.id
            LEFT JOIN store.discount d ON d.id = pd.discount_id
            WHERE p.id = $1
            GROUP BY p.id
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::classify)?;

        let (price, best) = row.ok_or(RepositoryError::NotFound)?;
        Ok(best.map_or(price, |rate| price.apply_discount(rate)))
    }
}
