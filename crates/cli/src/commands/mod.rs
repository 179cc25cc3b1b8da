//! Subcommand implementations.

pub mod catalog;
pub mod migrate;
pub mod seed;
pub mod stats;

use thiserror::Error;

use emporium_store::{ConfigError, RepositoryError, SeedError};

/// Errors surfaced by any subcommand.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database connection failed: {0}")]
    Connect(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("seeding failed: {0}")]
    Seed(#[from] SeedError),

    #[error("failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
}
