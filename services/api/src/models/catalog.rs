//! Catalog models: categories and products

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Category entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New category creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

/// Category update payload
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    /// Stock-keeping unit, unique across the catalog
    pub sku: String,
    pub price: f64,
    pub cost_price: f64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New product creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub category_id: Uuid,
    pub name: String,
    pub sku: String,
    pub price: f64,
    pub cost_price: f64,
    pub description: Option<String>,
}

/// Product update payload
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateProduct {
    pub category_id: Option<Uuid>,
    pub name: Option<String>,
    pub sku: Option<String>,
    pub price: Option<f64>,
    pub cost_price: Option<f64>,
    pub description: Option<String>,
}

/// Query parameters for product listings
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProductQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub category_id: Option<Uuid>,
}
