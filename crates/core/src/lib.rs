//! Emporium Core - Shared value types for the storefront schema.
//!
//! This crate provides the types every other Emporium component agrees on:
//! - `store` - Repositories and migrations over `PostgreSQL`
//! - `cli` - Command-line tools for migrations, seeding, and inspection
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access. Enabling the `postgres` feature adds `sqlx` encode/decode support
//! so the same types can be bound directly into queries.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, slugs, prices, quantities, bounded text,
//!   and status enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
