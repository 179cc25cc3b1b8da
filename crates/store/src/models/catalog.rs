//! Catalog models: categories, discounts, and products.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use emporium_core::{
    BoundedText, CategoryId, DiscountId, DiscountRate, FieldError, Price, ProductId, Slug,
};

/// Maximum length of a category title.
pub const CATEGORY_TITLE_MAX: usize = 250;
/// Maximum length of a category description.
pub const CATEGORY_DESCRIPTION_MAX: usize = 500;
/// Maximum length of a discount description.
pub const DISCOUNT_DESCRIPTION_MAX: usize = 250;
/// Maximum length of a product name.
pub const PRODUCT_NAME_MAX: usize = 250;

/// A product grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    /// Unique category ID.
    pub id: CategoryId,
    /// Display title.
    pub title: String,
    /// Optional description (may be empty).
    pub description: String,
    /// When the category was created. Listings are ordered by this.
    pub created_at: DateTime<Utc>,
}

/// Validated fields for creating or updating a category.
#[derive(Debug, Clone)]
pub struct CategoryInput {
    /// Display title.
    pub title: BoundedText,
    /// Description, blank allowed.
    pub description: BoundedText,
}

impl CategoryInput {
    /// Validate raw category fields.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldError`] for a blank or oversized title, or an
    /// oversized description.
    pub fn new(title: &str, description: &str) -> Result<Self, FieldError> {
        Ok(Self {
            title: BoundedText::required("title", title, CATEGORY_TITLE_MAX)?,
            description: BoundedText::optional(
                "description",
                description,
                CATEGORY_DESCRIPTION_MAX,
            )?,
        })
    }
}

/// A percentage discount that can apply to many products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Discount {
    /// Unique discount ID.
    pub id: DiscountId,
    /// Reduction in percent.
    pub discount: DiscountRate,
    /// What the discount is for.
    pub description: String,
}

/// Validated fields for creating or updating a discount.
#[derive(Debug, Clone)]
pub struct DiscountInput {
    /// Reduction in percent.
    pub discount: DiscountRate,
    /// What the discount is for.
    pub description: BoundedText,
}

impl DiscountInput {
    /// Validate raw discount fields.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldError`] for an out-of-range rate or a blank or
    /// oversized description.
    pub fn new(percent: f64, description: &str) -> Result<Self, FieldError> {
        Ok(Self {
            discount: DiscountRate::new(percent)?,
            description: BoundedText::required(
                "description",
                description,
                DISCOUNT_DESCRIPTION_MAX,
            )?,
        })
    }
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// URL slug, unique across the catalog.
    pub slug: Slug,
    /// Long description.
    pub description: String,
    /// Owning category.
    pub category_id: CategoryId,
    /// Unit price.
    pub price: Price,
    /// Units in stock.
    pub inventory: i32,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last saved.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether at least one unit is in stock.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.inventory > 0
    }
}

/// Validated fields for creating or updating a product.
#[derive(Debug, Clone)]
pub struct ProductInput {
    /// Display name.
    pub name: BoundedText,
    /// URL slug. Derived from the name when not supplied.
    pub slug: Slug,
    /// Long description.
    pub description: String,
    /// Owning category.
    pub category_id: CategoryId,
    /// Unit price.
    pub price: Price,
    /// Units in stock.
    pub inventory: i32,
}

impl ProductInput {
    /// Validate raw product fields.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldError`] for a blank or oversized name, an invalid
    /// slug (or a name no slug can be derived from), a blank description, or
    /// negative inventory.
    pub fn new(
        name: &str,
        slug: Option<&str>,
        description: &str,
        category_id: CategoryId,
        price: Price,
        inventory: i32,
    ) -> Result<Self, FieldError> {
        let name = BoundedText::required("name", name, PRODUCT_NAME_MAX)?;
        let slug = match slug.map(str::trim).filter(|s| !s.is_empty()) {
            Some(explicit) => Slug::parse(explicit)?,
            None => Slug::from_title(name.as_str())?,
        };
        let description = description.trim();
        if description.is_empty() {
            return Err(FieldError::Blank {
                field: "description",
            });
        }
        if inventory < 0 {
            return Err(FieldError::invalid("inventory", "cannot be negative"));
        }
        Ok(Self {
            name,
            slug,
            description: description.to_owned(),
            category_id,
            price,
            inventory,
        })
    }
}
