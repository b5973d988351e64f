//! CMS page models
//!
//! Pages hold the public site's content as JSON sections; only published
//! pages are served on the public surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// CMS page entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Page {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub content: serde_json::Value,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New page creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewPage {
    pub slug: String,
    pub title: String,
    pub content: serde_json::Value,
    #[serde(default)]
    pub published: bool,
}

/// Page update payload
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdatePage {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub content: Option<serde_json::Value>,
    pub published: Option<bool>,
}
