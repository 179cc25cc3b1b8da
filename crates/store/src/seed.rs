//! Seed the catalog from a YAML fixture.
//!
//! The whole file is validated before anything is written, then inserted in
//! a single transaction, so a bad fixture never leaves a half-seeded catalog.
//!
//! ## YAML Format
//!
//! ```yaml
//! discounts:
//!   - description: Summer sale
//!     discount: 10.0
//!
//! categories:
//!   - title: Coffee
//!     description: Beans and grounds
//!     products:
//!       - name: House Blend
//!         slug: house-blend       # optional, derived from name
//!         description: Medium roast
//!         price: "12.50"
//!         inventory: 40
//!         discounts: [Summer sale] # optional, by description
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, instrument};

use emporium_core::{CategoryId, DiscountId, Price, ProductId};

use crate::db::RepositoryError;
use crate::models::{CategoryInput, DiscountInput, ProductInput};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The fixture file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The fixture is not valid YAML for [`SeedConfig`].
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The fixture parsed but contains invalid entries.
    #[error("{} validation error(s) in seed file", .0.len())]
    Invalid(Vec<String>),

    /// A database write failed; the transaction was rolled back.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for SeedError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::classify(err))
    }
}

/// A discount entry.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedDiscount {
    pub description: String,
    pub discount: f64,
}

/// A product entry, nested under its category.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedProduct {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    pub description: String,
    pub price: String,
    pub inventory: i32,
    /// Discount descriptions to attach.
    #[serde(default)]
    pub discounts: Vec<String>,
}

/// A category entry with its products.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedCategory {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
}

/// Full fixture file structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedConfig {
    #[serde(default)]
    pub discounts: Vec<SeedDiscount>,
    #[serde(default)]
    pub categories: Vec<SeedCategory>,
}

/// Counts of rows written by a seed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedResult {
    pub discounts: usize,
    pub categories: usize,
    pub products: usize,
    pub discount_links: usize,
}

/// Check every entry of a fixture without touching the database.
///
/// Returns one message per problem; an empty list means the fixture is valid.
#[must_use]
pub fn validate_config(config: &SeedConfig) -> Vec<String> {
    let mut errors = Vec::new();
    let mut discount_names = HashSet::new();

    for (i, discount) in config.discounts.iter().enumerate() {
        if let Err(e) = DiscountInput::new(discount.discount, &discount.description) {
            errors.push(format!("discounts[{i}]: {e}"));
        }
        if !discount_names.insert(discount.description.trim()) {
            errors.push(format!(
                "discounts[{i}]: duplicate description {:?}",
                discount.description
            ));
        }
    }

    let mut slugs = HashSet::new();
    for (ci, category) in config.categories.iter().enumerate() {
        if let Err(e) = CategoryInput::new(&category.title, &category.description) {
            errors.push(format!("categories[{ci}]: {e}"));
        }
        for (pi, product) in category.products.iter().enumerate() {
            let at = format!("categories[{ci}].products[{pi}]");
            match product_input(product, CategoryId::new(0)) {
                Ok(input) => {
                    if !slugs.insert(input.slug.as_str().to_owned()) {
                        errors.push(format!("{at}: duplicate slug {:?}", input.slug.as_str()));
                    }
                }
                Err(e) => errors.push(format!("{at}: {e}")),
            }
            for name in &product.discounts {
                if !discount_names.contains(name.trim()) {
                    errors.push(format!("{at}: unknown discount {name:?}"));
                }
            }
        }
    }

    errors
}

fn product_input(
    product: &SeedProduct,
    category_id: CategoryId,
) -> Result<ProductInput, emporium_core::FieldError> {
    let price = Price::parse(&product.price)?;
    ProductInput::new(
        &product.name,
        product.slug.as_deref(),
        &product.description,
        category_id,
        price,
        product.inventory,
    )
}

/// Seed the catalog from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, fails validation,
/// or a database write fails.
#[instrument(skip(pool, path), fields(path = %path.as_ref().display()))]
pub async fn seed_from_file<P: AsRef<Path>>(
    pool: &PgPool,
    path: P,
    clear_existing: bool,
) -> Result<SeedResult, SeedError> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Io {
            path: path.display().to_string(),
            source,
        })?;
    let config: SeedConfig = serde_yaml::from_str(&content)?;
    seed_from_config(pool, &config, clear_existing).await
}

/// Seed the catalog from an already-parsed fixture.
///
/// # Errors
///
/// Returns `SeedError::Invalid` if [`validate_config`] reports problems, and
/// `SeedError::Repository` if a write fails (including `Protected` when
/// `clear_existing` is set but orders still reference products).
#[instrument(skip(pool, config), fields(categories = config.categories.len()))]
pub async fn seed_from_config(
    pool: &PgPool,
    config: &SeedConfig,
    clear_existing: bool,
) -> Result<SeedResult, SeedError> {
    let errors = validate_config(config);
    if !errors.is_empty() {
        return Err(SeedError::Invalid(errors));
    }

    let mut tx = pool.begin().await?;
    let mut result = SeedResult::default();

    if clear_existing {
        for table in ["store.product", "store.discount", "store.category"] {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *tx)
                .await
                .map_err(RepositoryError::from_delete)?;
        }
        info!("Cleared existing catalog");
    }

    let mut discount_ids: HashMap<&str, DiscountId> = HashMap::new();
    for discount in &config.discounts {
        let input = DiscountInput::new(discount.discount, &discount.description)
            .map_err(RepositoryError::from)?;
        let id = sqlx::query_scalar::<_, DiscountId>(
            "INSERT INTO store.discount (discount, description) VALUES ($1, $2) RETURNING id",
        )
        .bind(input.discount)
        .bind(input.description.as_str())
        .fetch_one(&mut *tx)
        .await?;
        discount_ids.insert(discount.description.trim(), id);
        result.discounts += 1;
    }

    for category in &config.categories {
        let input = CategoryInput::new(&category.title, &category.description)
            .map_err(RepositoryError::from)?;
        let category_id = sqlx::query_scalar::<_, CategoryId>(
            "INSERT INTO store.category (title, description) VALUES ($1, $2) RETURNING id",
        )
        .bind(input.title.as_str())
        .bind(input.description.as_str())
        .fetch_one(&mut *tx)
        .await?;
        result.categories += 1;

        for product in &category.products {
            let input = product_input(product, category_id).map_err(RepositoryError::from)?;
            let product_id = sqlx::query_scalar::<_, ProductId>(
                r"
                INSERT INTO store.product (name, slug, description, category_id, price, inventory)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id
                ",
            )
            .bind(input.name.as_str())
            .bind(&input.slug)
            .bind(&input.description)
            .bind(input.category_id)
            .bind(input.price)
            .bind(input.inventory)
            .fetch_one(&mut *tx)
            .await?;
            result.products += 1;

            for name in &product.discounts {
                let Some(discount_id) = discount_ids.get(name.trim()) else {
                    continue;
                };
                sqlx::query(
                    "INSERT INTO store.product_discount (product_id, discount_id) VALUES ($1, $2)",
                )
                .bind(product_id)
                .bind(*discount_id)
                .execute(&mut *tx)
                .await?;
                result.discount_links += 1;
            }
        }
    }

    tx.commit().await?;

    info!(
        discounts = result.discounts,
        categories = result.categories,
        products = result.products,
        discount_links = result.discount_links,
        "Seeding complete"
    );
    Ok(result)
}
