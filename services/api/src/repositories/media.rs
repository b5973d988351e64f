//! Media metadata repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::media::{MediaItem, RegisterMediaRequest};

const MEDIA_COLUMNS: &str = "id, file_name, path, mime_type, size_bytes, uploaded_by, created_at";

/// Media repository
#[derive(Clone)]
pub struct MediaRepository {
    pool: PgPool,
}

impl MediaRepository {
    /// Create a new media repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All media items, newest first
    pub async fn list(&self) -> ApiResult<Vec<MediaItem>> {
        let items = sqlx::query_as::<_, MediaItem>(&format!(
            "SELECT {MEDIA_COLUMNS} FROM media_items ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Find a media item by ID
    pub async fn find_by_id(&self, id: Uuid) -> ApiResult<MediaItem> {
        let item = sqlx::query_as::<_, MediaItem>(&format!(
            "SELECT {MEDIA_COLUMNS} FROM media_items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Media item".to_string()))?;

        Ok(item)
    }

    /// Register metadata for a file already stored on disk
    pub async fn register(
        &self,
        uploaded_by: Uuid,
        payload: &RegisterMediaRequest,
    ) -> ApiResult<MediaItem> {
        let item = sqlx::query_as::<_, MediaItem>(&format!(
            r#"
            INSERT INTO media_items (file_name, path, mime_type, size_bytes, uploaded_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {MEDIA_COLUMNS}
            "#
        ))
        .bind(&payload.file_name)
        .bind(&payload.path)
        .bind(&payload.mime_type)
        .bind(payload.size_bytes)
        .bind(uploaded_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(item)
    }

    /// Delete a media item's metadata
    pub async fn delete(&self, id: Uuid) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM media_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Media item".to_string()));
        }

        Ok(())
    }
}
