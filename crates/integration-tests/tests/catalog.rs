//! Integration tests for categories, products, and discounts.
//!
//! These tests require a scratch `PostgreSQL` database at `TEST_DATABASE_URL`.
//!
//! Run with: cargo test -p emporium-integration-tests -- --ignored

use rust_decimal::Decimal;

use emporium_core::{CartId, Price, ProductId, Quantity, Slug};
use emporium_integration_tests::{create_category, create_product, test_pool, unique};
use emporium_store::RepositoryError;
use emporium_store::db::products::ProductFilter;
use emporium_store::db::{
    CartRepository, CategoryRepository, CommentRepository, DiscountRepository, ProductRepository,
};
use emporium_store::models::{CategoryInput, CommentInput, DiscountInput, ProductInput};

fn price(s: &str) -> Price {
    Price::parse(s).expect("valid price")
}

// ============================================================================
// Categories
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL at TEST_DATABASE_URL"]
async fn test_category_crud() {
    let pool = test_pool().await;
    let repo = CategoryRepository::new(&pool);

    let title = unique("Teaware");
    let created = repo
        .create(&CategoryInput::new(&title, "Cups and pots").expect("valid"))
        .await
        .expect("create");
    assert_eq!(created.title, title);

    let renamed = repo
        .update(created.id, &CategoryInput::new("Tea Ware", "").expect("valid"))
        .await
        .expect("update");
    assert_eq!(renamed.title, "Tea Ware");
    assert!(renamed.description.is_empty());
    assert_eq!(renamed.created_at, created.created_at);

    let listed = repo.list().await.expect("list");
    assert!(listed.iter().any(|c| c.id == created.id));

    repo.delete(created.id).await.expect("delete");
    assert!(repo.get(created.id).await.expect("get").is_none());
    assert!(matches!(
        repo.delete(created.id).await,
        Err(RepositoryError::NotFound)
    ));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL at TEST_DATABASE_URL"]
async fn test_category_with_products_is_protected() {
    let pool = test_pool().await;
    let category = create_category(&pool).await;
    let product = create_product(&pool, category.id, "5.00", 1).await;

    let repo = CategoryRepository::new(&pool);
    assert_eq!(repo.product_count(category.id).await.expect("count"), 1);

    let err = repo.delete(category.id).await.expect_err("should be protected");
    assert!(
        matches!(err, RepositoryError::Protected(ref c) if c == "product_category_fk"),
        "unexpected error: {err:?}"
    );

    ProductRepository::new(&pool)
        .delete(product.id)
        .await
        .expect("delete product");
    repo.delete(category.id).await.expect("delete empty category");
}

// ============================================================================
// Products
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL at TEST_DATABASE_URL"]
async fn test_product_slug_lookup_and_uniqueness() {
    let pool = test_pool().await;
    let category = create_category(&pool).await;
    let repo = ProductRepository::new(&pool);

    let name = unique("Moka Pot");
    let input = ProductInput::new(&name, None, "Stovetop", category.id, price("30.00"), 4)
        .expect("valid");
    let product = repo.create(&input).await.expect("create");
    assert_eq!(product.slug.as_str(), name.to_lowercase().replace(' ', "-"));

    let found = repo
        .get_by_slug(&product.slug)
        .await
        .expect("lookup")
        .expect("present");
    assert_eq!(found.id, product.id);

    let err = repo.create(&input).await.expect_err("duplicate slug");
    assert!(err.is_conflict_on("product_slug_key"), "unexpected error: {err:?}");

    let missing = Slug::parse(&unique("missing")).expect("valid slug");
    assert!(repo.get_by_slug(&missing).await.expect("lookup").is_none());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL at TEST_DATABASE_URL"]
async fn test_product_update_refreshes_updated_at() {
    let pool = test_pool().await;
    let category = create_category(&pool).await;
    let product = create_product(&pool, category.id, "9.99", 3).await;
    let repo = ProductRepository::new(&pool);

    let input = ProductInput::new(
        &product.name,
        Some(product.slug.as_str()),
        "Now with a longer description",
        category.id,
        price("11.49"),
        3,
    )
    .expect("valid");
    let updated = repo.update(product.id, &input).await.expect("update");

    assert_eq!(updated.price, price("11.49"));
    assert_eq!(updated.created_at, product.created_at);
    assert!(updated.updated_at >= product.updated_at);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL at TEST_DATABASE_URL"]
async fn test_product_list_filters_by_category() {
    let pool = test_pool().await;
    let first = create_category(&pool).await;
    let second = create_category(&pool).await;
    let a = create_product(&pool, first.id, "1.00", 1).await;
    let b = create_product(&pool, first.id, "2.00", 1).await;
    create_product(&pool, second.id, "3.00", 1).await;

    let listed = ProductRepository::new(&pool)
        .list(ProductFilter {
            category_id: Some(first.id),
            ..ProductFilter::default()
        })
        .await
        .expect("list");

    // Newest first.
    let ids: Vec<_> = listed.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![b.id, a.id]);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL at TEST_DATABASE_URL"]
async fn test_inventory_never_goes_negative() {
    let pool = test_pool().await;
    let category = create_category(&pool).await;
    let product = create_product(&pool, category.id, "4.00", 2).await;
    let repo = ProductRepository::new(&pool);

    let restocked = repo.adjust_inventory(product.id, 5).await.expect("restock");
    assert_eq!(restocked.inventory, 7);

    let err = repo
        .adjust_inventory(product.id, -8)
        .await
        .expect_err("would go negative");
    assert!(matches!(err, RepositoryError::Validation(_)));

    let sold_out = repo.adjust_inventory(product.id, -7).await.expect("sell all");
    assert_eq!(sold_out.inventory, 0);
    assert!(!sold_out.in_stock());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL at TEST_DATABASE_URL"]
async fn test_product_delete_cascades_comments_and_cart_items() {
    let pool = test_pool().await;
    let category = create_category(&pool).await;
    let product = create_product(&pool, category.id, "6.00", 10).await;

    let comments = CommentRepository::new(&pool);
    let comment = comments
        .create(product.id, &CommentInput::new("Ada", "Lovely").expect("valid"))
        .await
        .expect("comment");

    let carts = CartRepository::new(&pool);
    let cart = carts.create().await.expect("cart");
    carts
        .add_item(cart.id, product.id, Quantity::new(2).expect("valid"))
        .await
        .expect("add to cart");

    ProductRepository::new(&pool)
        .delete(product.id)
        .await
        .expect("delete product");

    assert!(comments.get(comment.id).await.expect("get").is_none());
    assert!(carts.items(cart.id).await.expect("items").is_empty());
    assert!(carts.get(cart.id).await.expect("get").is_some());
}

// ============================================================================
// Discounts
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL at TEST_DATABASE_URL"]
async fn test_effective_price_uses_best_discount() {
    let pool = test_pool().await;
    let category = create_category(&pool).await;
    let product = create_product(&pool, category.id, "20.00", 1).await;
    let products = ProductRepository::new(&pool);
    let discounts = DiscountRepository::new(&pool);

    assert_eq!(
        products.effective_price(product.id).await.expect("price"),
        price("20.00")
    );

    let small = discounts
        .create(&DiscountInput::new(10.0, &unique("Loyalty")).expect("valid"))
        .await
        .expect("create");
    let large = discounts
        .create(&DiscountInput::new(25.0, &unique("Clearance")).expect("valid"))
        .await
        .expect("create");

    discounts.attach(product.id, small.id).await.expect("attach");
    discounts.attach(product.id, large.id).await.expect("attach");
    // Attaching twice is a no-op.
    discounts.attach(product.id, large.id).await.expect("attach again");

    let attached = discounts.list_for_product(product.id).await.expect("list");
    assert_eq!(
        attached.iter().map(|d| d.id).collect::<Vec<_>>(),
        vec![large.id, small.id]
    );
    assert_eq!(
        products.effective_price(product.id).await.expect("price"),
        price("15.00")
    );

    assert!(discounts.detach(product.id, large.id).await.expect("detach"));
    assert!(!discounts.detach(product.id, large.id).await.expect("detach"));
    assert_eq!(
        products.effective_price(product.id).await.expect("price"),
        price("18.00")
    );

    // Deleting a discount drops its links but leaves the product.
    discounts.delete(small.id).await.expect("delete discount");
    assert!(
        discounts
            .list_for_product(product.id)
            .await
            .expect("list")
            .is_empty()
    );
    assert!(products.get(product.id).await.expect("get").is_some());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL at TEST_DATABASE_URL"]
async fn test_attach_to_missing_product_is_invalid_reference() {
    let pool = test_pool().await;
    let discounts = DiscountRepository::new(&pool);
    let discount = discounts
        .create(&DiscountInput::new(5.0, &unique("Ghost")).expect("valid"))
        .await
        .expect("create");

    let err = discounts
        .attach(ProductId::new(i32::MAX), discount.id)
        .await
        .expect_err("no such product");
    assert!(matches!(err, RepositoryError::InvalidReference(_)));
}

// ============================================================================
// Carts
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL at TEST_DATABASE_URL"]
async fn test_cart_merges_repeated_products() {
    let pool = test_pool().await;
    let category = create_category(&pool).await;
    let tea = create_product(&pool, category.id, "3.50", 10).await;
    let pot = create_product(&pool, category.id, "20.00", 10).await;
    let carts = CartRepository::new(&pool);
    let cart = carts.create().await.expect("cart");

    let first = carts
        .add_item(cart.id, tea.id, Quantity::new(1).expect("valid"))
        .await
        .expect("add");
    let merged = carts
        .add_item(cart.id, tea.id, Quantity::new(2).expect("valid"))
        .await
        .expect("add again");
    assert_eq!(merged.id, first.id);
    assert_eq!(merged.quantity.get(), 3);

    let pot_line = carts
        .add_item(cart.id, pot.id, Quantity::new(1).expect("valid"))
        .await
        .expect("add");

    let lines = carts.items(cart.id).await.expect("items");
    assert_eq!(lines.len(), 2);
    assert_eq!(carts.total(cart.id).await.expect("total"), Decimal::new(3050, 2));

    carts
        .set_item_quantity(cart.id, pot_line.id, Quantity::new(2).expect("valid"))
        .await
        .expect("set quantity");
    carts.remove_item(cart.id, first.id).await.expect("remove");
    assert_eq!(carts.total(cart.id).await.expect("total"), Decimal::new(4000, 2));

    assert!(matches!(
        carts.remove_item(cart.id, first.id).await,
        Err(RepositoryError::NotFound)
    ));

    carts.delete(cart.id).await.expect("delete");
    assert!(carts.get(cart.id).await.expect("get").is_none());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL at TEST_DATABASE_URL"]
async fn test_cart_merge_past_smallint_is_validation_error() {
    let pool = test_pool().await;
    let category = create_category(&pool).await;
    let product = create_product(&pool, category.id, "0.10", 1).await;
    let carts = CartRepository::new(&pool);
    let cart = carts.create().await.expect("cart");

    let full = carts
        .add_item(cart.id, product.id, Quantity::new(i32::from(i16::MAX)).expect("valid"))
        .await
        .expect("fill");
    let err = carts
        .add_item(cart.id, product.id, Quantity::new(1).expect("valid"))
        .await
        .expect_err("overflow");
    assert!(
        matches!(err, RepositoryError::Validation(ref e) if e.field() == "quantity"),
        "unexpected error: {err:?}"
    );

    let lines = carts.items(cart.id).await.expect("items");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines.first().map(|l| l.quantity), Some(full.quantity));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL at TEST_DATABASE_URL"]
async fn test_add_to_unknown_cart_is_invalid_reference() {
    let pool = test_pool().await;
    let category = create_category(&pool).await;
    let product = create_product(&pool, category.id, "1.00", 1).await;

    let err = CartRepository::new(&pool)
        .add_item(CartId::generate(), product.id, Quantity::new(1).expect("valid"))
        .await
        .expect_err("no such cart");
    assert!(
        matches!(err, RepositoryError::InvalidReference(ref c) if c == "cart_item_cart_fk"),
        "unexpected error: {err:?}"
    );
}
