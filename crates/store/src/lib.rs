//! Emporium storefront persistence.
//!
//! This crate owns the `store` `PostgreSQL` schema: the embedded migrations,
//! the row models and their validated inputs, one repository per aggregate,
//! and the YAML catalog seeder used by the CLI.
//!
//! # Example
//!
//! ```rust,ignore
//! use emporium_store::{StoreConfig, create_pool, db::CategoryRepository};
//!
//! let config = StoreConfig::from_env()?;
//! let pool = create_pool(&config).await?;
//! let categories = CategoryRepository::new(&pool).list().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod models;
pub mod seed;

pub use config::{ConfigError, PoolSettings, StoreConfig};
pub use db::{MIGRATOR, RepositoryError, TableCounts, create_pool, run_migrations, table_counts};
pub use seed::{SeedConfig, SeedError, SeedResult, seed_from_config, seed_from_file};
