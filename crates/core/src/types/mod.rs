//! Core types for Emporium.
//!
//! This module provides type-safe wrappers for the storefront's domain values.
//! Every constructor validates, so a value that exists is a value the schema
//! accepts.

pub mod discount;
pub mod email;
pub mod id;
pub mod price;
pub mod quantity;
pub mod slug;
pub mod status;
pub mod text;

pub use discount::DiscountRate;
pub use email::{Email, EmailError};
pub use id::*;
pub use price::Price;
pub use quantity::Quantity;
pub use slug::Slug;
pub use status::*;
pub use text::{BoundedText, FieldError};
