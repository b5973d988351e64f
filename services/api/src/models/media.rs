//! Media metadata models
//!
//! Files live on local disk; only their metadata is tracked here. Upload
//! mechanics are handled by the web layer, which registers the stored file
//! through the admin surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Media item metadata
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MediaItem {
    pub id: Uuid,
    pub file_name: String,
    /// Path relative to the upload root
    pub path: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub uploaded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Payload registering an already-stored file
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterMediaRequest {
    pub file_name: String,
    pub path: String,
    pub mime_type: String,
    pub size_bytes: i64,
}
