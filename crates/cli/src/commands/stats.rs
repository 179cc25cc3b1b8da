//! Row count report.

use sqlx::PgPool;
use tracing::info;

use super::CommandError;

/// Log the number of rows in every table.
///
/// # Errors
///
/// Returns `CommandError::Repository` if the count query fails.
pub async fn run(pool: &PgPool) -> Result<(), CommandError> {
    let counts = emporium_store::table_counts(pool).await?;

    info!(
        categories = counts.categories,
        discounts = counts.discounts,
        products = counts.products,
        customers = counts.customers,
        addresses = counts.addresses,
        orders = counts.orders,
        order_items = counts.order_items,
        comments = counts.comments,
        carts = counts.carts,
        cart_items = counts.cart_items,
        "Table row counts"
    );
    Ok(())
}
