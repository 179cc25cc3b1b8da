//! Discount repository and the product/discount association.

use sqlx::PgPool;

use emporium_core::{DiscountId, ProductId};

use super::RepositoryError;
use crate::models::{Discount, DiscountInput};

/// Repository for discount database operations.
pub struct DiscountRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DiscountRepository<'a> {
    /// Create a new discount repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a discount.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &DiscountInput) -> Result<Discount, RepositoryError> {
        sqlx::query_as::<_, Discount>(
            r"
            INSERT INTO store.discount (discount, description)
            VALUES ($1, $2)
            RETURNING id, discount, description
            ",
        )
        .bind(input.discount)
        .bind(input.description.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::classify)
    }

    /// Get a discount by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: DiscountId) -> Result<Option<Discount>, RepositoryError> {
        let discount = sqlx::query_as::<_, Discount>(
            "SELECT id, discount, description FROM store.discount WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(discount)
    }

    /// List all discounts by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Discount>, RepositoryError> {
        let discounts = sqlx::query_as::<_, Discount>(
            "SELECT id, discount, description FROM store.discount ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(discounts)
    }

    /// Replace a discount's rate and description.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the discount does not exist.
    pub async fn update(
        &self,
        id: DiscountId,
        input: &DiscountInput,
    ) -> Result<Discount, RepositoryError> {
        sqlx::query_as::<_, Discount>(
            r"
            UPDATE store.discount
            SET discount = $2, description = $3
            WHERE id = $1
            RETURNING id, discount, description
            ",
        )
        .bind(id)
        .bind(input.discount)
        .bind(input.description.as_str())
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::classify)?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a discount. Its product associations go with it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the discount does not exist.
    pub async fn delete(&self, id: DiscountId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM store.discount WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(RepositoryError::from_delete)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Apply a discount to a product. Attaching twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if either side does not
    /// exist.
    pub async fn attach(
        &self,
        product_id: ProductId,
        discount_id: DiscountId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO store.product_discount (product_id, discount_id)
            VALUES ($1, $2)
            ON CONFLICT (product_id, discount_id) DO NOTHING
            ",
        )
        .bind(product_id)
        .bind(discount_id)
        .execute(self.pool)
        .await
        .map_err(RepositoryError::classify)?;

        Ok(())
    }

    /// Remove a discount from a product.
    ///
    /// Returns whether an association was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn detach(
        &self,
        product_id: ProductId,
        discount_id: DiscountId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM store.product_discount WHERE product_id = $1 AND discount_id = $2",
        )
        .bind(product_id)
        .bind(discount_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Discounts applied to a product, largest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Discount>, RepositoryError> {
        let discounts = sqlx::query_as::<_, Discount>(
            r"
            SELECT d.id, d.discount, d.description
            FROM store.discount d
            JOIN store.product_discount pd ON pd.discount_id = d.id
            WHERE pd.product_id = $1
            ORDER BY d.discount DESC, d.id
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(discounts)
    }
}
