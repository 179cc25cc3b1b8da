//! Domain models for the storefront schema.
//!
//! Each entity comes in two shapes:
//! - the stored row (`Category`, `Product`, ...) as read back from `PostgreSQL`
//! - an input (`CategoryInput`, `ProductInput`, ...) whose constructor runs
//!   every field check, so repositories only ever bind validated values

pub mod cart;
pub mod catalog;
pub mod comment;
pub mod customer;
pub mod order;

pub use cart::{Cart, CartItem, CartLine, cart_total};
pub use catalog::{Category, CategoryInput, Discount, DiscountInput, Product, ProductInput};
pub use comment::{Comment, CommentInput};
pub use customer::{Address, AddressInput, Customer, CustomerInput};
pub use order::{Order, OrderItem};
