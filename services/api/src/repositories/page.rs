//! CMS page repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult, conflict_on_unique};
use crate::models::page::{NewPage, Page, UpdatePage};

const PAGE_COLUMNS: &str = "id, slug, title, content, published, created_at, updated_at";

/// Page repository
#[derive(Clone)]
pub struct PageRepository {
    pool: PgPool,
}

impl PageRepository {
    /// Create a new page repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a published page by slug (public surface)
    pub async fn find_published_by_slug(&self, slug: &str) -> ApiResult<Page> {
        let page = sqlx::query_as::<_, Page>(&format!(
            "SELECT {PAGE_COLUMNS} FROM pages WHERE slug = $1 AND published"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Page".to_string()))?;

        Ok(page)
    }

    /// All pages, including drafts (admin surface)
    pub async fn list(&self) -> ApiResult<Vec<Page>> {
        let pages = sqlx::query_as::<_, Page>(&format!(
            "SELECT {PAGE_COLUMNS} FROM pages ORDER BY slug"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(pages)
    }

    /// Find a page by ID
    pub async fn find_by_id(&self, id: Uuid) -> ApiResult<Page> {
        let page = sqlx::query_as::<_, Page>(&format!(
            "SELECT {PAGE_COLUMNS} FROM pages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Page".to_string()))?;

        Ok(page)
    }

    /// Create a page
    pub async fn create(&self, payload: &NewPage) -> ApiResult<Page> {
        let page = sqlx::query_as::<_, Page>(&format!(
            r#"
            INSERT INTO pages (slug, title, content, published)
            VALUES ($1, $2, $3, $4)
            RETURNING {PAGE_COLUMNS}
            "#
        ))
        .bind(&payload.slug)
        .bind(&payload.title)
        .bind(&payload.content)
        .bind(payload.published)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "A page with this slug already exists"))?;

        Ok(page)
    }

    /// Update a page
    pub async fn update(&self, id: Uuid, payload: &UpdatePage) -> ApiResult<Page> {
        let page = sqlx::query_as::<_, Page>(&format!(
            r#"
            UPDATE pages
            SET slug = COALESCE($2, slug),
                title = COALESCE($3, title),
                content = COALESCE($4, content),
                published = COALESCE($5, published),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PAGE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&payload.slug)
        .bind(&payload.title)
        .bind(&payload.content)
        .bind(payload.published)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "A page with this slug already exists"))?
        .ok_or_else(|| ApiError::NotFound("Page".to_string()))?;

        Ok(page)
    }

    /// Delete a page
    pub async fn delete(&self, id: Uuid) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM pages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Page".to_string()));
        }

        Ok(())
    }
}
