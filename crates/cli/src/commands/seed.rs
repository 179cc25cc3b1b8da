//! Seed the catalog from a YAML fixture.
//!
//! See `emporium_store::seed` for the file format.

use std::path::Path;

use sqlx::PgPool;
use tracing::{error, info};

use emporium_store::SeedError;

use super::CommandError;

/// Load a catalog fixture into the database.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML fixture
/// * `clear_existing` - If true, delete the current catalog first
///
/// # Errors
///
/// Returns an error if the file cannot be read, fails validation, or a
/// database write fails. Nothing is written in any of those cases.
pub async fn catalog(
    pool: &PgPool,
    file_path: &Path,
    clear_existing: bool,
) -> Result<(), CommandError> {
    info!(path = %file_path.display(), clear_existing, "Loading catalog fixture");

    let result = match emporium_store::seed_from_file(pool, file_path, clear_existing).await {
        Ok(result) => result,
        Err(SeedError::Invalid(errors)) => {
            error!("Fixture validation failed:");
            for err in &errors {
                error!("  - {err}");
            }
            return Err(SeedError::Invalid(errors).into());
        }
        Err(e) => return Err(e.into()),
    };

    info!(
        categories = result.categories,
        products = result.products,
        discounts = result.discounts,
        "Catalog seeded"
    );
    Ok(())
}
