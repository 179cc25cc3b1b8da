//! Category repository.

use sqlx::PgPool;

use emporium_core::CategoryId;

use super::RepositoryError;
use crate::models::{Category, CategoryInput};

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a category. `created_at` is set by the database.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &CategoryInput) -> Result<Category, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            r"
            INSERT INTO store.category (title, description)
            VALUES ($1, $2)
            RETURNING id, title, description, created_at
            ",
        )
        .bind(input.title.as_str())
        .bind(input.description.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::classify)?;

        tracing::debug!(category_id = %category.id, "Created category");
        Ok(category)
    }

    /// Get a category by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            r"
            SELECT id, title, description, created_at
            FROM store.category
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(category)
    }

    /// List all categories, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>(
            r"
            SELECT id, title, description, created_at
            FROM store.category
            ORDER BY created_at, id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(categories)
    }

    /// Replace a category's editable fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    pub async fn update(
        &self,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(
            r"
            UPDATE store.category
            SET title = $2, description = $3
            WHERE id = $1
            RETURNING id, title, description, created_at
            ",
        )
        .bind(id)
        .bind(input.title.as_str())
        .bind(input.description.as_str())
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::classify)?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Protected` while any product belongs to the
    /// category, and `RepositoryError::NotFound` if it does not exist.
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM store.category WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(RepositoryError::from_delete)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tracing::debug!(category_id = %id, "Deleted category");
        Ok(())
    }

    /// Number of products in a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn product_count(&self, id: CategoryId) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM store.product WHERE category_id = $1",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }
}
