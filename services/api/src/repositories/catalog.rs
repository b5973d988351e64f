//! Catalog repository: categories and products

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult, conflict_on_fk, conflict_on_unique};
use crate::models::catalog::{
    Category, NewCategory, NewProduct, Product, ProductQuery, UpdateCategory, UpdateProduct,
};

/// Catalog repository
#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    /// Create a new catalog repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All categories, alphabetical
    pub async fn list_categories(&self) -> ApiResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, created_at, updated_at FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Create a category
    pub async fn create_category(&self, payload: &NewCategory) -> ApiResult<Category> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "A category with this name already exists"))?;

        info!("Category {} created", category.name);
        Ok(category)
    }

    /// Update a category
    pub async fn update_category(&self, id: Uuid, payload: &UpdateCategory) -> ApiResult<Category> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "A category with this name already exists"))?
        .ok_or_else(|| ApiError::NotFound("Category".to_string()))?;

        Ok(category)
    }

    /// Delete a category; rejected while products still reference it
    pub async fn delete_category(&self, id: Uuid) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                conflict_on_fk(e, "Category still has products and cannot be deleted")
            })?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Category".to_string()));
        }

        Ok(())
    }

    /// Paginated product listing with an optional category filter
    pub async fn list_products(&self, query: &ProductQuery) -> ApiResult<(Vec<Product>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) as i64 * limit as i64;

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, category_id, name, sku, price, cost_price, description,
                   created_at, updated_at
            FROM products
            WHERE ($1::uuid IS NULL OR category_id = $1)
            ORDER BY name
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(query.category_id)
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE ($1::uuid IS NULL OR category_id = $1)",
        )
        .bind(query.category_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((products, count))
    }

    /// Find a product by ID
    pub async fn find_product(&self, id: Uuid) -> ApiResult<Product> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, category_id, name, sku, price, cost_price, description,
                   created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product".to_string()))?;

        Ok(product)
    }

    /// Create a product
    pub async fn create_product(&self, payload: &NewProduct) -> ApiResult<Product> {
        let category_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1)")
                .bind(payload.category_id)
                .fetch_one(&self.pool)
                .await?;

        if !category_exists {
            return Err(ApiError::NotFound("Category".to_string()));
        }

        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (category_id, name, sku, price, cost_price, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, category_id, name, sku, price, cost_price, description,
                      created_at, updated_at
            "#,
        )
        .bind(payload.category_id)
        .bind(&payload.name)
        .bind(&payload.sku)
        .bind(payload.price)
        .bind(payload.cost_price)
        .bind(&payload.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "A product with this SKU already exists"))?;

        info!("Product {} ({}) created", product.name, product.sku);
        Ok(product)
    }

    /// Update a product
    pub async fn update_product(&self, id: Uuid, payload: &UpdateProduct) -> ApiResult<Product> {
        if let Some(category_id) = payload.category_id {
            let category_exists: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1)")
                    .bind(category_id)
                    .fetch_one(&self.pool)
                    .await?;

            if !category_exists {
                return Err(ApiError::NotFound("Category".to_string()));
            }
        }

        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET category_id = COALESCE($2, category_id),
                name = COALESCE($3, name),
                sku = COALESCE($4, sku),
                price = COALESCE($5, price),
                cost_price = COALESCE($6, cost_price),
                description = COALESCE($7, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, category_id, name, sku, price, cost_price, description,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(payload.category_id)
        .bind(&payload.name)
        .bind(&payload.sku)
        .bind(payload.price)
        .bind(payload.cost_price)
        .bind(&payload.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "A product with this SKU already exists"))?
        .ok_or_else(|| ApiError::NotFound("Product".to_string()))?;

        Ok(product)
    }

    /// Delete a product; rejected while inventory or sales reference it
    pub async fn delete_product(&self, id: Uuid) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                conflict_on_fk(
                    e,
                    "Product is referenced by inventory or sales and cannot be deleted",
                )
            })?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Product".to_string()));
        }

        Ok(())
    }
}
