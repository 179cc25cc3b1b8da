//! Shopping cart repository.

use rust_decimal::Decimal;
use sqlx::PgPool;

use emporium_core::{CartId, CartItemId, FieldError, ProductId, Quantity};

use super::RepositoryError;
use crate::models::{Cart, CartItem, CartLine, cart_total};

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Open an empty cart with a fresh random ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self) -> Result<Cart, RepositoryError> {
        let cart = sqlx::query_as::<_, Cart>(
            "INSERT INTO store.cart (id) VALUES ($1) RETURNING id, created_at",
        )
        .bind(CartId::generate())
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::classify)?;

        tracing::debug!(cart_id = %cart.id, "Created cart");
        Ok(cart)
    }

    /// Get a cart by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CartId) -> Result<Option<Cart>, RepositoryError> {
        let cart =
            sqlx::query_as::<_, Cart>("SELECT id, created_at FROM store.cart WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        Ok(cart)
    }

    /// Delete a cart together with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the cart does not exist.
    pub async fn delete(&self, id: CartId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM store.cart WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(RepositoryError::from_delete)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Put `quantity` units of a product in the cart.
    ///
    /// A product already in the cart keeps its single row and has the
    /// quantity added to it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the cart or product does
    /// not exist, and `RepositoryError::Validation` if the merged quantity
    /// would exceed the `SMALLINT` range. The existing row is left unchanged.
    pub async fn add_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<CartItem, RepositoryError> {
        // The sum is widened so the guard itself cannot overflow.
        let item = sqlx::query_as::<_, CartItem>(
            r"
            INSERT INTO store.cart_item (cart_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (cart_id, product_id) DO UPDATE
            SET quantity = store.cart_item.quantity + EXCLUDED.quantity
            WHERE store.cart_item.quantity::INTEGER + EXCLUDED.quantity::INTEGER <= $4
            RETURNING id, cart_id, product_id, quantity
            ",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .bind(i32::from(i16::MAX))
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::classify)?
        .ok_or_else(|| {
            FieldError::invalid(
                "quantity",
                format!("cart would hold more than {} of this product", i16::MAX),
            )
        })?;

        tracing::debug!(cart_id = %cart_id, product_id = %product_id, quantity = %item.quantity, "Cart item saved");
        Ok(item)
    }

    /// Set the quantity of a cart item outright.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item is not in this cart.
    pub async fn set_item_quantity(
        &self,
        cart_id: CartId,
        item_id: CartItemId,
        quantity: Quantity,
    ) -> Result<CartItem, RepositoryError> {
        sqlx::query_as::<_, CartItem>(
            r"
            UPDATE store.cart_item
            SET quantity = $3
            WHERE id = $2 AND cart_id = $1
            RETURNING id, cart_id, product_id, quantity
            ",
        )
        .bind(cart_id)
        .bind(item_id)
        .bind(quantity)
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::classify)?
        .ok_or(RepositoryError::NotFound)
    }

    /// Remove an item from the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item is not in this cart.
    pub async fn remove_item(
        &self,
        cart_id: CartId,
        item_id: CartItemId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM store.cart_item WHERE id = $2 AND cart_id = $1")
            .bind(cart_id)
            .bind(item_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Items in the cart with current product names and prices.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, cart_id: CartId) -> Result<Vec<CartLine>, RepositoryError> {
        sqlx::query_as::<_, CartLine>(
            r"
            SELECT ci.id, ci.product_id, p.name AS product_name, ci.quantity, p.price AS unit_price
            FROM store.cart_item ci
            JOIN store.product p ON p.id = ci.product_id
            WHERE ci.cart_id = $1
            ORDER BY ci.id
            ",
        )
        .bind(cart_id)
        .fetch_all(self.pool)
        .await
        .map_err(RepositoryError::classify)
    }

    /// Cart value at current prices.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn total(&self, cart_id: CartId) -> Result<Decimal, RepositoryError> {
        let lines = self.items(cart_id).await?;
        Ok(cart_total(&lines))
    }
}
