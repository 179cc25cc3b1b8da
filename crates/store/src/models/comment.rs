//! Product comment (review) models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use emporium_core::{BoundedText, CommentId, CommentStatus, FieldError, ProductId};

/// Maximum length of the commenter's display name.
pub const COMMENTER_NAME_MAX: usize = 250;

/// A review left on a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: CommentId,
    pub product_id: ProductId,
    /// Display name of the author.
    pub name: String,
    pub body: String,
    /// Moderation state; new comments wait for review.
    pub status: CommentStatus,
    pub created_at: DateTime<Utc>,
}

/// Validated fields for a new comment.
#[derive(Debug, Clone)]
pub struct CommentInput {
    pub name: BoundedText,
    pub body: String,
}

impl CommentInput {
    /// Validate raw comment fields.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldError`] for a blank or oversized name or a blank body.
    pub fn new(name: &str, body: &str) -> Result<Self, FieldError> {
        let name = BoundedText::required("name", name, COMMENTER_NAME_MAX)?;
        let body = body.trim();
        if body.is_empty() {
            return Err(FieldError::Blank { field: "body" });
        }
        Ok(Self {
            name,
            body: body.to_owned(),
        })
    }
}
