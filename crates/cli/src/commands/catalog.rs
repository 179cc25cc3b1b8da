//! Catalog listing as JSON.

use serde::Serialize;
use sqlx::PgPool;

use emporium_core::{CategoryId, Price};
use emporium_store::db::ProductRepository;
use emporium_store::db::products::ProductFilter;
use emporium_store::models::Product;

use super::CommandError;

/// A product with its discounted price.
#[derive(Debug, Serialize)]
struct CatalogEntry {
    #[serde(flatten)]
    product: Product,
    effective_price: Price,
}

/// Print products (optionally one category's) as a JSON array on stdout.
///
/// # Errors
///
/// Returns `CommandError::Repository` if a query fails.
pub async fn run(pool: &PgPool, category: Option<i32>, limit: i64) -> Result<(), CommandError> {
    let products = ProductRepository::new(pool);
    let filter = ProductFilter {
        category_id: category.map(CategoryId::new),
        limit,
        ..ProductFilter::default()
    };

    let mut entries = Vec::new();
    for product in products.list(filter).await? {
        let effective_price = products.effective_price(product.id).await?;
        entries.push(CatalogEntry {
            product,
            effective_price,
        });
    }

    tracing::debug!(count = entries.len(), "Listing catalog");

    #[allow(clippy::print_stdout)]
    {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    }
    Ok(())
}
