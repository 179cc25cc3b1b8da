//! Order and order item repository.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use emporium_core::{
    CartId, CustomerId, FieldError, OrderId, OrderItemId, OrderStatus, ProductId, Quantity,
};

use super::RepositoryError;
use crate::models::{Order, OrderItem};

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Open a new, unpaid order for a customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the customer does not
    /// exist.
    pub async fn create(&self, customer_id: CustomerId) -> Result<Order, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(
            r"
            INSERT INTO store.customer_order (customer_id, status)
            VALUES ($1, $2)
            RETURNING id, customer_id, status, created_at
            ",
        )
        .bind(customer_id)
        .bind(OrderStatus::default())
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::classify)?;

        tracing::info!(order_id = %order.id, customer_id = %customer_id, "Created order");
        Ok(order)
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        sqlx::query_as::<_, Order>(
            "SELECT id, customer_id, status, created_at FROM store.customer_order WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::classify)
    }

    /// A customer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Order>, RepositoryError> {
        sqlx::query_as::<_, Order>(
            r"
            SELECT id, customer_id, status, created_at
            FROM store.customer_order
            WHERE customer_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(customer_id)
        .fetch_all(self.pool)
        .await
        .map_err(RepositoryError::classify)
    }

    /// Move an order to a new status.
    ///
    /// The current status is read under a row lock, so two concurrent
    /// changes cannot both succeed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidTransition` if the lifecycle does not
    /// allow the change and `RepositoryError::NotFound` if the order does not
    /// exist.
    pub async fn set_status(
        &self,
        id: OrderId,
        next: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_scalar::<_, OrderStatus>(
            "SELECT status FROM store.customer_order WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(RepositoryError::classify)?
        .ok_or(RepositoryError::NotFound)?;

        if !current.can_transition_to(next) {
            return Err(RepositoryError::InvalidTransition {
                from: current.label(),
                to: next.label(),
            });
        }

        let order = sqlx::query_as::<_, Order>(
            r"
            UPDATE store.customer_order
            SET status = $2
            WHERE id = $1
            RETURNING id, customer_id, status, created_at
            ",
        )
        .bind(id)
        .bind(next)
        .fetch_one(&mut *tx)
        .await
        .map_err(RepositoryError::classify)?;

        tx.commit().await?;

        tracing::info!(order_id = %id, from = %current, to = %next, "Order status changed");
        Ok(order)
    }

    /// Delete an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Protected` while the order has items and
    /// `RepositoryError::NotFound` if it does not exist.
    pub async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM store.customer_order WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(RepositoryError::from_delete)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Add a product line, snapshotting the product's current price.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the product is already on the
    /// order, `RepositoryError::InvalidReference` if the order or product
    /// does not exist, and `RepositoryError::OrderFinal` unless the order is
    /// unpaid.
    pub async fn add_item(
        &self,
        order_id: OrderId,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<OrderItem, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let status = sqlx::query_scalar::<_, OrderStatus>(
            "SELECT status FROM store.customer_order WHERE id = $1 FOR UPDATE",
        )
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(RepositoryError::classify)?
        .ok_or_else(|| RepositoryError::InvalidReference("order_item_order_fk".to_owned()))?;
        ensure_open(status)?;

        let item = sqlx::query_as::<_, OrderItem>(
            r"
            INSERT INTO store.order_item (order_id, product_id, quantity, unit_price)
            SELECT $1, p.id, $3, p.price
            FROM store.product p
            WHERE p.id = $2
            RETURNING id, order_id, product_id, quantity, unit_price
            ",
        )
        .bind(order_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_optional(&mut *tx)
        .await
        .map_err(RepositoryError::classify)?
        .ok_or_else(|| RepositoryError::InvalidReference("order_item_product_fk".to_owned()))?;

        tx.commit().await?;

        tracing::debug!(order_id = %order_id, product_id = %product_id, quantity = %quantity, "Added order item");
        Ok(item)
    }

    /// Change the quantity of an order line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line does not exist and
    /// `RepositoryError::OrderFinal` unless its order is unpaid.
    pub async fn update_item_quantity(
        &self,
        item_id: OrderItemId,
        quantity: Quantity,
    ) -> Result<OrderItem, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        lock_open_order_of(&mut *tx, item_id).await?;

        let item = sqlx::query_as::<_, OrderItem>(
            r"
            UPDATE store.order_item
            SET quantity = $2
            WHERE id = $1
            RETURNING id, order_id, product_id, quantity, unit_price
            ",
        )
        .bind(item_id)
        .bind(quantity)
        .fetch_optional(&mut *tx)
        .await
        .map_err(RepositoryError::classify)?
        .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;
        Ok(item)
    }

    /// Remove an order line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line does not exist and
    /// `RepositoryError::OrderFinal` unless its order is unpaid.
    pub async fn remove_item(&self, item_id: OrderItemId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        lock_open_order_of(&mut *tx, item_id).await?;

        let result = sqlx::query("DELETE FROM store.order_item WHERE id = $1")
            .bind(item_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;
        Ok(())
    }

    /// Lines of an order in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        sqlx::query_as::<_, OrderItem>(
            r"
            SELECT id, order_id, product_id, quantity, unit_price
            FROM store.order_item
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await
        .map_err(RepositoryError::classify)
    }

    /// Sum of snapshot price times quantity over all lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn total(&self, order_id: OrderId) -> Result<Decimal, RepositoryError> {
        let total = sqlx::query_scalar::<_, Decimal>(
            r"
            SELECT COALESCE(SUM(unit_price * quantity), 0)::NUMERIC
            FROM store.order_item
            WHERE order_id = $1
            ",
        )
        .bind(order_id)
        .fetch_one(self.pool)
        .await?;

        Ok(total)
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Turn a cart into an unpaid order for `customer_id`.
    ///
    /// Runs in one transaction: the order is created, every cart item becomes
    /// an order line priced at the product's current price, and the cart is
    /// deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the cart does not exist,
    /// `RepositoryError::Validation` if it is empty, and
    /// `RepositoryError::InvalidReference` if the customer does not exist.
    pub async fn place_from_cart(
        &self,
        customer_id: CustomerId,
        cart_id: CartId,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let item_count = sqlx::query_scalar::<_, i64>(
            r"
            SELECT (SELECT COUNT(*) FROM store.cart_item WHERE cart_id = c.id)
            FROM store.cart c
            WHERE c.id = $1
            FOR UPDATE
            ",
        )
        .bind(cart_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        if item_count == 0 {
            return Err(
                FieldError::invalid("cart", "cannot place an order from an empty cart").into(),
            );
        }

        let order = sqlx::query_as::<_, Order>(
            r"
            INSERT INTO store.customer_order (customer_id, status)
            VALUES ($1, $2)
            RETURNING id, customer_id, status, created_at
            ",
        )
        .bind(customer_id)
        .bind(OrderStatus::default())
        .fetch_one(&mut *tx)
        .await
        .map_err(RepositoryError::classify)?;

        sqlx::query(
            r"
            INSERT INTO store.order_item (order_id, product_id, quantity, unit_price)
            SELECT $1, ci.product_id, ci.quantity, p.price
            FROM store.cart_item ci
            JOIN store.product p ON p.id = ci.product_id
            WHERE ci.cart_id = $2
            ",
        )
        .bind(order.id)
        .bind(cart_id)
        .execute(&mut *tx)
        .await
        .map_err(RepositoryError::classify)?;

        sqlx::query("DELETE FROM store.cart WHERE id = $1")
            .bind(cart_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            order_id = %order.id,
            cart_id = %cart_id,
            lines = item_count,
            "Placed order from cart"
        );
        Ok(order)
    }
}

/// Lock the order owning `item_id` and check that its lines may change.
async fn lock_open_order_of(
    conn: &mut PgConnection,
    item_id: OrderItemId,
) -> Result<(), RepositoryError> {
    let status = sqlx::query_scalar::<_, OrderStatus>(
        r"
        SELECT o.status
        FROM store.order_item i
        JOIN store.customer_order o ON o.id = i.order_id
        WHERE i.id = $1
        FOR UPDATE OF o
        ",
    )
    .bind(item_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(RepositoryError::classify)?
    .ok_or(RepositoryError::NotFound)?;

    ensure_open(status)
}

/// Only unpaid orders take line changes.
const fn ensure_open(status: OrderStatus) -> Result<(), RepositoryError> {
    if status.is_final() {
        return Err(RepositoryError::OrderFinal(status.label()));
    }
    Ok(())
}
