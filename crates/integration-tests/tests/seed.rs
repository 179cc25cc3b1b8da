//! Integration tests for the YAML catalog seeder.
//!
//! The fixture checks run anywhere; the seeding tests require a scratch
//! `PostgreSQL` database at `TEST_DATABASE_URL`.

#![allow(clippy::indexing_slicing)]

use std::path::PathBuf;

use emporium_core::{Price, Slug};
use emporium_integration_tests::{test_pool, unique};
use emporium_store::db::{DiscountRepository, ProductRepository};
use emporium_store::seed::validate_config;
use emporium_store::{SeedConfig, SeedError, seed_from_config};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/catalog.yaml")
}

fn unique_config() -> (SeedConfig, String) {
    let slug = unique("seeded-kettle");
    let yaml = format!(
        r#"
discounts:
  - description: {discount}
    discount: 20
categories:
  - title: {category}
    products:
      - name: Gooseneck Kettle
        slug: {slug}
        description: Temperature controlled.
        price: "80.00"
        inventory: 3
        discounts: [{discount}]
"#,
        discount = unique("Launch"),
        category = unique("Kettles"),
    );
    let config = serde_yaml::from_str(&yaml).expect("valid YAML");
    (config, slug)
}

#[test]
fn test_sample_fixture_is_valid() {
    let content = std::fs::read_to_string(fixture_path()).expect("fixture exists");
    let config: SeedConfig = serde_yaml::from_str(&content).expect("fixture parses");

    assert_eq!(config.categories.len(), 3);
    assert_eq!(config.discounts.len(), 2);
    let errors = validate_config(&config);
    assert!(errors.is_empty(), "fixture has errors: {errors:?}");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL at TEST_DATABASE_URL"]
async fn test_seed_inserts_catalog() {
    let pool = test_pool().await;
    let (config, slug) = unique_config();

    let result = seed_from_config(&pool, &config, false)
        .await
        .expect("seed");
    assert_eq!(result.discounts, 1);
    assert_eq!(result.categories, 1);
    assert_eq!(result.products, 1);
    assert_eq!(result.discount_links, 1);

    let products = ProductRepository::new(&pool);
    let kettle = products
        .get_by_slug(&Slug::parse(&slug).expect("valid slug"))
        .await
        .expect("lookup")
        .expect("seeded");
    assert_eq!(kettle.inventory, 3);
    assert_eq!(
        DiscountRepository::new(&pool)
            .list_for_product(kettle.id)
            .await
            .expect("discounts")
            .len(),
        1
    );
    assert_eq!(
        products.effective_price(kettle.id).await.expect("price"),
        Price::parse("64.00").expect("valid")
    );
}

#[tokio::test]
#[ignore = "Requires PostgreSQL at TEST_DATABASE_URL"]
async fn test_seed_is_all_or_nothing() {
    let pool = test_pool().await;
    let (config, slug) = unique_config();
    seed_from_config(&pool, &config, false)
        .await
        .expect("first seed");

    // Same slug again: the product insert conflicts and the new category and
    // discount are rolled back with it.
    let err = seed_from_config(&pool, &config, false)
        .await
        .expect_err("duplicate slug");
    assert!(
        matches!(err, SeedError::Repository(ref e) if e.is_conflict_on("product_slug_key")),
        "unexpected error: {err:?}"
    );

    let category_title = &config.categories[0].title;
    let categories: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM store.category WHERE title = $1")
            .bind(category_title)
            .fetch_one(&pool)
            .await
            .expect("count");
    assert_eq!(categories, 1, "second run left rows behind for {slug}");
}

#[tokio::test]
async fn test_invalid_seed_never_touches_database() {
    // Lazy pool: validation fails before a connection is ever needed.
    let pool = sqlx::postgres::PgPoolOptions::new()
        .connect_lazy("postgres://localhost/unreachable")
        .expect("valid URL");
    let (mut config, _) = unique_config();
    config.categories[0].products[0].price = "not a price".to_owned();

    match seed_from_config(&pool, &config, false).await {
        Err(SeedError::Invalid(errors)) => {
            assert_eq!(errors.len(), 1);
            assert!(errors[0].starts_with("categories[0].products[0]: price"));
        }
        other => panic!("expected validation errors, got {other:?}"),
    }
}
