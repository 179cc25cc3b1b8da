//! Product comment repository.

use sqlx::PgPool;

use emporium_core::{CommentId, CommentStatus, ProductId};

use super::RepositoryError;
use crate::models::{Comment, CommentInput};

/// Repository for comment database operations.
pub struct CommentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CommentRepository<'a> {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Submit a comment on a product. It starts out waiting for moderation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the product does not
    /// exist.
    pub async fn create(
        &self,
        product_id: ProductId,
        input: &CommentInput,
    ) -> Result<Comment, RepositoryError> {
        let comment = sqlx::query_as::<_, Comment>(
            r"
            INSERT INTO store.comment (product_id, name, body, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id, product_id, name, body, status, created_at
            ",
        )
        .bind(product_id)
        .bind(input.name.as_str())
        .bind(&input.body)
        .bind(CommentStatus::default())
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::classify)?;

        tracing::debug!(comment_id = %comment.id, product_id = %product_id, "Comment submitted");
        Ok(comment)
    }

    /// Get a comment by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CommentId) -> Result<Option<Comment>, RepositoryError> {
        sqlx::query_as::<_, Comment>(
            r"
            SELECT id, product_id, name, body, status, created_at
            FROM store.comment
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::classify)
    }

    /// Comments on a product, newest first, optionally limited to one status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
        status: Option<CommentStatus>,
    ) -> Result<Vec<Comment>, RepositoryError> {
        sqlx::query_as::<_, Comment>(
            r"
            SELECT id, product_id, name, body, status, created_at
            FROM store.comment
            WHERE product_id = $1 AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(product_id)
        .bind(status)
        .fetch_all(self.pool)
        .await
        .map_err(RepositoryError::classify)
    }

    /// Record a moderation decision.
    ///
    /// The update only applies if the comment is still in a state that may
    /// move to `decision`, so concurrent moderators cannot overwrite each
    /// other.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidTransition` if the comment was
    /// already moderated and `RepositoryError::NotFound` if it does not exist.
    pub async fn moderate(
        &self,
        id: CommentId,
        decision: CommentStatus,
    ) -> Result<Comment, RepositoryError> {
        let allowed_from: Vec<&'static str> = CommentStatus::ALL
            .into_iter()
            .filter(|s| s.can_transition_to(decision))
            .map(CommentStatus::code)
            .collect();

        let updated = sqlx::query_as::<_, Comment>(
            r"
            UPDATE store.comment
            SET status = $2
            WHERE id = $1 AND status = ANY($3)
            RETURNING id, product_id, name, body, status, created_at
            ",
        )
        .bind(id)
        .bind(decision)
        .bind(&allowed_from)
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::classify)?;

        if let Some(comment) = updated {
            tracing::info!(comment_id = %id, status = %decision, "Comment moderated");
            return Ok(comment);
        }

        let current = self.get(id).await?.ok_or(RepositoryError::NotFound)?;
        Err(RepositoryError::InvalidTransition {
            from: current.status.label(),
            to: decision.label(),
        })
    }

    /// Delete a comment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the comment does not exist.
    pub async fn delete(&self, id: CommentId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM store.comment WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
