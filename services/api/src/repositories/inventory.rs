//! Inventory ledger: stock levels per (product, location) pair

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult, conflict_on_fk};
use crate::models::inventory::{InventoryItem, InventoryItemWithProduct, UpsertStockRequest};

/// Inventory repository
#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    /// Create a new inventory repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Current quantity on hand for a (product, location) pair
    pub async fn get_quantity(&self, product_id: Uuid, location: &str) -> ApiResult<i32> {
        let quantity: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT quantity
            FROM inventory_items
            WHERE product_id = $1 AND location = $2
            "#,
        )
        .bind(product_id)
        .bind(location)
        .fetch_optional(&self.pool)
        .await?;

        quantity.ok_or_else(|| ApiError::NotFound("Inventory record".to_string()))
    }

    /// Create or replace the stock record for a (product, location) pair
    ///
    /// Replaces quantity and minimum stock level and refreshes the
    /// timestamp. Fails with NotFound when the product does not exist.
    pub async fn upsert_stock(&self, req: &UpsertStockRequest) -> ApiResult<InventoryItem> {
        let product_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM products WHERE id = $1)")
                .bind(req.product_id)
                .fetch_one(&self.pool)
                .await?;

        if !product_exists {
            return Err(ApiError::NotFound("Product".to_string()));
        }

        let item = sqlx::query_as::<_, InventoryItem>(
            r#"
            INSERT INTO inventory_items (product_id, location, quantity, min_stock_level)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (product_id, location) DO UPDATE
            SET quantity = EXCLUDED.quantity,
                min_stock_level = EXCLUDED.min_stock_level,
                last_updated = NOW()
            RETURNING id, product_id, location, quantity, min_stock_level, last_updated
            "#,
        )
        .bind(req.product_id)
        .bind(&req.location)
        .bind(req.quantity)
        .bind(req.min_stock_level)
        .fetch_one(&self.pool)
        .await?;

        info!(
            "Stock set to {} for product {} at {}",
            item.quantity, item.product_id, item.location
        );

        Ok(item)
    }

    /// Reduce stock for a product by `quantity`
    ///
    /// Picks the product's first inventory row (lowest location in sort
    /// order) and applies an atomic in-place decrement, refreshing the
    /// timestamp. Returns `None` when the product has no inventory row at
    /// all. The quantity is not floored at zero: concurrent sales may drive
    /// it negative, which the low-stock report surfaces.
    ///
    /// Takes an executor so the sale coordinator can run the decrement
    /// inside its own transaction.
    pub async fn decrement<'e, E>(
        executor: E,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Option<InventoryItem>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let item = sqlx::query_as::<_, InventoryItem>(
            r#"
            UPDATE inventory_items
            SET quantity = quantity - $2,
                last_updated = NOW()
            WHERE id = (
                SELECT id
                FROM inventory_items
                WHERE product_id = $1
                ORDER BY location
                LIMIT 1
            )
            RETURNING id, product_id, location, quantity, min_stock_level, last_updated
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .fetch_optional(executor)
        .await?;

        Ok(item)
    }

    /// All stock records, joined with their product
    pub async fn list(&self) -> ApiResult<Vec<InventoryItemWithProduct>> {
        let items = sqlx::query_as::<_, InventoryItemWithProduct>(
            r#"
            SELECT i.id, i.product_id, p.name AS product_name, p.sku AS product_sku,
                   i.location, i.quantity, i.min_stock_level, i.last_updated
            FROM inventory_items i
            JOIN products p ON p.id = i.product_id
            ORDER BY p.name, i.location
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Stock records at or below their minimum level, lowest quantity first
    pub async fn list_low_stock(&self) -> ApiResult<Vec<InventoryItemWithProduct>> {
        let items = sqlx::query_as::<_, InventoryItemWithProduct>(
            r#"
            SELECT i.id, i.product_id, p.name AS product_name, p.sku AS product_sku,
                   i.location, i.quantity, i.min_stock_level, i.last_updated
            FROM inventory_items i
            JOIN products p ON p.id = i.product_id
            WHERE i.quantity <= i.min_stock_level
            ORDER BY i.quantity ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Delete a stock record
    pub async fn delete(&self, id: Uuid) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM inventory_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| conflict_on_fk(e, "Inventory record is still referenced"))?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Inventory record".to_string()));
        }

        Ok(())
    }
}
