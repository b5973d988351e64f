//! Sale repository and transaction coordinator
//!
//! Recording a sale is the one multi-row write in the system: the sale row,
//! its line items, and the inventory decrements for every item commit or
//! roll back as a single unit. A line item whose product has no inventory
//! row records the sale line anyway and skips the stock step; this mirrors
//! products sold without tracked stock (services, made-to-order panels).

use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::sale::{
    NewSale, PaymentMethod, Sale, SaleDetail, SaleItemDetail, SaleQuery, SaleTotals, SalesSummary,
    SummaryQuery,
};
use crate::repositories::inventory::InventoryRepository;

/// Sale repository
#[derive(Clone)]
pub struct SaleRepository {
    pool: PgPool,
}

/// Map a sale row, parsing the stored payment method string
fn map_sale(row: &PgRow) -> ApiResult<Sale> {
    let payment_method: String = row.get("payment_method");
    let payment_method = payment_method
        .parse::<PaymentMethod>()
        .map_err(ApiError::Internal)?;

    Ok(Sale {
        id: row.get("id"),
        customer_name: row.get("customer_name"),
        customer_phone: row.get("customer_phone"),
        customer_email: row.get("customer_email"),
        discount_percent: row.get("discount_percent"),
        tax_percent: row.get("tax_percent"),
        total_amount: row.get("total_amount"),
        final_amount: row.get("final_amount"),
        payment_method,
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
    })
}

impl SaleRepository {
    /// Create a new sale repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Validate-then-commit a sale as a single atomic unit
    ///
    /// The payload must already have passed
    /// [`crate::validation::validate_new_sale`]. Line items are processed in
    /// the order supplied by the caller; any failure rolls the whole sale
    /// back, including inventory decrements already applied for earlier
    /// items.
    pub async fn create(&self, created_by: Uuid, payload: &NewSale) -> ApiResult<SaleDetail> {
        let totals = SaleTotals::compute(
            &payload.items,
            payload.discount_percent,
            payload.tax_percent,
        );

        let mut tx = self.pool.begin().await?;

        // Every referenced product must exist before anything is written
        for item in &payload.items {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM products WHERE id = $1)")
                    .bind(item.product_id)
                    .fetch_one(&mut *tx)
                    .await?;

            if !exists {
                return Err(ApiError::NotFound(format!("Product {}", item.product_id)));
            }
        }

        let sale_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO sales (customer_name, customer_phone, customer_email,
                               discount_percent, tax_percent, total_amount, final_amount,
                               payment_method, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(&payload.customer_name)
        .bind(&payload.customer_phone)
        .bind(&payload.customer_email)
        .bind(payload.discount_percent)
        .bind(payload.tax_percent)
        .bind(totals.subtotal)
        .bind(totals.final_amount)
        .bind(payload.payment_method.as_str())
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        for item in &payload.items {
            sqlx::query(
                r#"
                INSERT INTO sale_items (sale_id, product_id, quantity, unit_price)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(sale_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .execute(&mut *tx)
            .await?;

            // Products without an inventory row skip the stock step; the
            // sale line itself still stands
            InventoryRepository::decrement(&mut *tx, item.product_id, item.quantity).await?;
        }

        tx.commit().await?;

        info!(
            "Sale {} recorded: {} items, final amount {:.2}",
            sale_id,
            payload.items.len(),
            totals.final_amount
        );

        self.get(sale_id).await
    }

    /// Fetch a sale with its line items and product references
    pub async fn get(&self, sale_id: Uuid) -> ApiResult<SaleDetail> {
        let row = sqlx::query(
            r#"
            SELECT id, customer_name, customer_phone, customer_email,
                   discount_percent, tax_percent, total_amount, final_amount,
                   payment_method, created_by, created_at
            FROM sales
            WHERE id = $1
            "#,
        )
        .bind(sale_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Sale".to_string()))?;

        let sale = map_sale(&row)?;

        let item_rows = sqlx::query(
            r#"
            SELECT si.id, si.product_id, p.name AS product_name, p.sku AS product_sku,
                   si.quantity, si.unit_price
            FROM sale_items si
            JOIN products p ON p.id = si.product_id
            WHERE si.sale_id = $1
            ORDER BY si.id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        let items = item_rows
            .into_iter()
            .map(|row| SaleItemDetail {
                id: row.get("id"),
                product_id: row.get("product_id"),
                product_name: row.get("product_name"),
                product_sku: row.get("product_sku"),
                quantity: row.get("quantity"),
                unit_price: row.get("unit_price"),
            })
            .collect();

        Ok(SaleDetail { sale, items })
    }

    /// Paginated sale listing, most recent first
    pub async fn list(&self, query: &SaleQuery) -> ApiResult<(Vec<Sale>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) as i64 * limit as i64;

        let rows = sqlx::query(
            r#"
            SELECT id, customer_name, customer_phone, customer_email,
                   discount_percent, tax_percent, total_amount, final_amount,
                   payment_method, created_by, created_at
            FROM sales
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let sales = rows
            .iter()
            .map(map_sale)
            .collect::<ApiResult<Vec<Sale>>>()?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok((sales, count))
    }

    /// Aggregated revenue figures over an optional date range
    pub async fn summary(&self, query: &SummaryQuery) -> ApiResult<SalesSummary> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS sale_count,
                   COALESCE(SUM(total_amount), 0) AS gross_total,
                   COALESCE(SUM(total_amount * discount_percent / 100), 0) AS discount_total,
                   COALESCE(SUM((total_amount - total_amount * discount_percent / 100)
                                * tax_percent / 100), 0) AS tax_total,
                   COALESCE(SUM(final_amount), 0) AS net_total
            FROM sales
            WHERE ($1::timestamptz IS NULL OR created_at >= $1)
              AND ($2::timestamptz IS NULL OR created_at < $2)
            "#,
        )
        .bind(query.from)
        .bind(query.to)
        .fetch_one(&self.pool)
        .await?;

        Ok(SalesSummary {
            sale_count: row.get("sale_count"),
            gross_total: row.get("gross_total"),
            discount_total: row.get("discount_total"),
            tax_total: row.get("tax_total"),
            net_total: row.get("net_total"),
        })
    }
}
