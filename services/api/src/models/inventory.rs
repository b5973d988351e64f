//! Inventory models
//!
//! One row per (product, location) pair. Quantity is a plain integer and is
//! deliberately not clamped at zero: a decrement below zero records an
//! oversell instead of failing the sale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Stock record for one product at one location
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InventoryItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub location: String,
    pub quantity: i32,
    pub min_stock_level: i32,
    pub last_updated: DateTime<Utc>,
}

/// Stock record joined with its product for listings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InventoryItemWithProduct {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_sku: String,
    pub location: String,
    pub quantity: i32,
    pub min_stock_level: i32,
    pub last_updated: DateTime<Utc>,
}

/// Payload for creating or replacing a stock record
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertStockRequest {
    pub product_id: Uuid,
    pub location: String,
    pub quantity: i32,
    pub min_stock_level: i32,
}
