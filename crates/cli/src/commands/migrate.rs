//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! emporium migrate
//! ```
//!
//! Migrations are embedded from `crates/store/migrations/` and applied in
//! revision order. Already-applied revisions are skipped.

use sqlx::PgPool;

use super::CommandError;

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns `CommandError::Migration` if a migration fails or the applied
/// history diverges from the embedded one.
pub async fn run(pool: &PgPool) -> Result<(), CommandError> {
    emporium_store::run_migrations(pool).await?;
    Ok(())
}
