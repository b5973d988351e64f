//! Integration tests for the inventory ledger and the sale transaction
//! coordinator
//!
//! These tests require a live PostgreSQL instance (see `DATABASE_URL`).
//! They run serially because the managing-director invariant is a property
//! of the whole users table.

use common::database::{DatabaseConfig, init_pool};
use serial_test::serial;
use sqlx::PgPool;
use uuid::Uuid;

use api::error::ApiError;
use api::models::catalog::{NewCategory, NewProduct};
use api::models::inventory::UpsertStockRequest;
use api::models::sale::{NewSale, NewSaleItem, PaymentMethod};
use api::models::user::{CreateUserRequest, UpdateUserRequest};
use api::rbac::Role;
use api::repositories::{CatalogRepository, InventoryRepository, SaleRepository, UserRepository};

async fn test_pool() -> PgPool {
    let config = DatabaseConfig::from_env().expect("database config");
    let pool = init_pool(&config).await.expect("database pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    pool
}

fn unique_email() -> String {
    format!("{}@test.terrasol.example", Uuid::new_v4())
}

async fn seed_user(pool: &PgPool, role: Role) -> Uuid {
    let users = UserRepository::new(pool.clone());
    let user = users
        .create(&CreateUserRequest {
            email: unique_email(),
            password: "Sunlight42".to_string(),
            full_name: "Test Staff".to_string(),
            role,
            active: Some(true),
        })
        .await
        .expect("seed user");
    user.id
}

async fn seed_product(pool: &PgPool) -> Uuid {
    let catalog = CatalogRepository::new(pool.clone());
    let category = catalog
        .create_category(&NewCategory {
            name: format!("category-{}", Uuid::new_v4()),
            description: None,
        })
        .await
        .expect("seed category");

    let product = catalog
        .create_product(&NewProduct {
            category_id: category.id,
            name: "320W Solar Panel".to_string(),
            sku: format!("SKU-{}", Uuid::new_v4()),
            price: 100.0,
            cost_price: 70.0,
            description: None,
        })
        .await
        .expect("seed product");

    product.id
}

fn sale_payload(items: Vec<NewSaleItem>, discount: f64, tax: f64) -> NewSale {
    NewSale {
        customer_name: Some("Walk-in".to_string()),
        customer_phone: None,
        customer_email: None,
        items,
        discount_percent: discount,
        tax_percent: tax,
        payment_method: PaymentMethod::Cash,
    }
}

#[tokio::test]
#[serial]
async fn test_upsert_then_get_quantity_round_trip() {
    let pool = test_pool().await;
    let inventory = InventoryRepository::new(pool.clone());
    let product_id = seed_product(&pool).await;

    let item = inventory
        .upsert_stock(&UpsertStockRequest {
            product_id,
            location: "main-warehouse".to_string(),
            quantity: 42,
            min_stock_level: 5,
        })
        .await
        .expect("upsert");

    assert_eq!(item.quantity, 42);
    assert_eq!(item.min_stock_level, 5);

    let quantity = inventory
        .get_quantity(product_id, "main-warehouse")
        .await
        .expect("get quantity");
    assert_eq!(quantity, 42);

    // Idempotent read
    let again = inventory
        .get_quantity(product_id, "main-warehouse")
        .await
        .expect("get quantity again");
    assert_eq!(again, quantity);

    // Replacing the row keeps a single (product, location) pair
    let replaced = inventory
        .upsert_stock(&UpsertStockRequest {
            product_id,
            location: "main-warehouse".to_string(),
            quantity: 7,
            min_stock_level: 10,
        })
        .await
        .expect("replace");
    assert_eq!(replaced.id, item.id);
    assert_eq!(replaced.quantity, 7);

    // Unknown pair is a NotFound, not a zero
    let missing = inventory.get_quantity(product_id, "nowhere").await;
    assert!(matches!(missing, Err(ApiError::NotFound(_))));

    // A quantity at the minimum level shows up in the low-stock report
    let low = inventory.list_low_stock().await.expect("low stock");
    assert!(low.iter().any(|row| row.id == item.id));
}

#[tokio::test]
#[serial]
async fn test_sale_records_totals_and_decrements_stock() {
    let pool = test_pool().await;
    let inventory = InventoryRepository::new(pool.clone());
    let sales = SaleRepository::new(pool.clone());

    let cashier = seed_user(&pool, Role::Cashier).await;
    let tracked = seed_product(&pool).await;
    let untracked = seed_product(&pool).await;

    inventory
        .upsert_stock(&UpsertStockRequest {
            product_id: tracked,
            location: "main-warehouse".to_string(),
            quantity: 10,
            min_stock_level: 0,
        })
        .await
        .expect("stock");

    let payload = sale_payload(
        vec![
            NewSaleItem {
                product_id: tracked,
                quantity: 2,
                unit_price: 100.0,
            },
            NewSaleItem {
                product_id: untracked,
                quantity: 1,
                unit_price: 50.0,
            },
        ],
        10.0,
        5.0,
    );

    let detail = sales.create(cashier, &payload).await.expect("create sale");

    assert_eq!(detail.sale.total_amount, 250.0);
    assert_eq!(detail.sale.final_amount, 236.25);
    assert_eq!(detail.sale.created_by, cashier);
    assert_eq!(detail.items.len(), 2);

    // The tracked product's stock is reduced; the untracked product has no
    // inventory row and its stock step was silently skipped
    let remaining = inventory
        .get_quantity(tracked, "main-warehouse")
        .await
        .expect("quantity");
    assert_eq!(remaining, 8);

    // Hydrated result round-trips through get()
    let fetched = sales.get(detail.sale.id).await.expect("get sale");
    assert_eq!(fetched.sale.id, detail.sale.id);
    assert_eq!(fetched.items.len(), 2);
}

#[tokio::test]
#[serial]
async fn test_failed_sale_rolls_back_everything() {
    let pool = test_pool().await;
    let inventory = InventoryRepository::new(pool.clone());
    let sales = SaleRepository::new(pool.clone());

    let cashier = seed_user(&pool, Role::Cashier).await;
    let product = seed_product(&pool).await;

    inventory
        .upsert_stock(&UpsertStockRequest {
            product_id: product,
            location: "main-warehouse".to_string(),
            quantity: 10,
            min_stock_level: 0,
        })
        .await
        .expect("stock");

    let sales_before: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
        .fetch_one(&pool)
        .await
        .expect("count");

    // The second line item references a product that does not exist, so the
    // whole sale must roll back, first item included
    let payload = sale_payload(
        vec![
            NewSaleItem {
                product_id: product,
                quantity: 3,
                unit_price: 100.0,
            },
            NewSaleItem {
                product_id: Uuid::new_v4(),
                quantity: 1,
                unit_price: 50.0,
            },
        ],
        0.0,
        0.0,
    );

    let result = sales.create(cashier, &payload).await;
    assert!(matches!(result, Err(ApiError::NotFound(_))));

    let sales_after: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
        .fetch_one(&pool)
        .await
        .expect("count");
    assert_eq!(sales_after, sales_before);

    let quantity = inventory
        .get_quantity(product, "main-warehouse")
        .await
        .expect("quantity");
    assert_eq!(quantity, 10, "rolled-back sale must not touch stock");
}

#[tokio::test]
#[serial]
async fn test_concurrent_decrements_do_not_lose_updates() {
    let pool = test_pool().await;
    let inventory = InventoryRepository::new(pool.clone());
    let product = seed_product(&pool).await;

    inventory
        .upsert_stock(&UpsertStockRequest {
            product_id: product,
            location: "main-warehouse".to_string(),
            quantity: 5,
            min_stock_level: 0,
        })
        .await
        .expect("stock");

    let pool_a = pool.clone();
    let pool_b = pool.clone();
    let task_a =
        tokio::spawn(async move { InventoryRepository::decrement(&pool_a, product, 3).await });
    let task_b =
        tokio::spawn(async move { InventoryRepository::decrement(&pool_b, product, 3).await });

    task_a.await.expect("join").expect("decrement a");
    task_b.await.expect("join").expect("decrement b");

    // Both decrements must apply: 5 - 3 - 3 = -1 under the no-floor
    // policy, never a lost update leaving 2
    let quantity = inventory
        .get_quantity(product, "main-warehouse")
        .await
        .expect("quantity");
    assert_eq!(quantity, -1);
}

#[tokio::test]
#[serial]
async fn test_last_managing_director_cannot_be_removed() {
    let pool = test_pool().await;
    let users = UserRepository::new(pool.clone());

    // The invariant is table-global, so start from a clean users table
    sqlx::query("DELETE FROM sale_items")
        .execute(&pool)
        .await
        .expect("clean sale_items");
    sqlx::query("DELETE FROM sales")
        .execute(&pool)
        .await
        .expect("clean sales");
    sqlx::query("DELETE FROM media_items")
        .execute(&pool)
        .await
        .expect("clean media_items");
    sqlx::query("DELETE FROM users")
        .execute(&pool)
        .await
        .expect("clean users");

    let director = users
        .create(&CreateUserRequest {
            email: unique_email(),
            password: "Sunlight42".to_string(),
            full_name: "Sole Director".to_string(),
            role: Role::ManagingDirector,
            active: Some(true),
        })
        .await
        .expect("create director");

    // Deactivating the only active managing director is rejected
    let deactivate = UpdateUserRequest {
        active: Some(false),
        ..Default::default()
    };
    let result = users.update(director.id, &deactivate).await;
    assert!(matches!(result, Err(ApiError::Conflict(_))));

    // So is deleting them
    let result = users.delete(director.id).await;
    assert!(matches!(result, Err(ApiError::Conflict(_))));

    // And demoting them to another role
    let demote = UpdateUserRequest {
        role: Some(Role::Cashier),
        ..Default::default()
    };
    let result = users.update(director.id, &demote).await;
    assert!(matches!(result, Err(ApiError::Conflict(_))));

    let active_directors: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM users WHERE role = 'MANAGING_DIRECTOR' AND active",
    )
    .fetch_one(&pool)
    .await
    .expect("count");
    assert_eq!(active_directors, 1);

    // With a second active director in place, the first may step down
    users
        .create(&CreateUserRequest {
            email: unique_email(),
            password: "Sunlight42".to_string(),
            full_name: "Second Director".to_string(),
            role: Role::ManagingDirector,
            active: Some(true),
        })
        .await
        .expect("create second director");

    let updated = users
        .update(director.id, &deactivate)
        .await
        .expect("deactivate with successor");
    assert!(!updated.active);
}

#[tokio::test]
#[serial]
async fn test_duplicate_sku_is_a_conflict() {
    let pool = test_pool().await;
    let catalog = CatalogRepository::new(pool.clone());

    let category = catalog
        .create_category(&NewCategory {
            name: format!("category-{}", Uuid::new_v4()),
            description: None,
        })
        .await
        .expect("category");

    let sku = format!("SKU-{}", Uuid::new_v4());
    let new_product = |name: &str| NewProduct {
        category_id: category.id,
        name: name.to_string(),
        sku: sku.clone(),
        price: 10.0,
        cost_price: 5.0,
        description: None,
    };

    catalog
        .create_product(&new_product("First"))
        .await
        .expect("first product");

    let result = catalog.create_product(&new_product("Second")).await;
    assert!(matches!(result, Err(ApiError::Conflict(_))));
}
