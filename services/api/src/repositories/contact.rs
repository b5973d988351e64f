//! Contact and quote-request message repository

use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::contact::{ContactMessage, MessageKind, MessageQuery, NewContactMessage};

/// Message repository
#[derive(Clone)]
pub struct ContactRepository {
    pool: PgPool,
}

/// Map a message row, parsing the stored kind string
fn map_message(row: &PgRow) -> ApiResult<ContactMessage> {
    let kind: String = row.get("kind");
    let kind = kind.parse::<MessageKind>().map_err(ApiError::Internal)?;

    Ok(ContactMessage {
        id: row.get("id"),
        kind,
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        subject: row.get("subject"),
        message: row.get("message"),
        product_id: row.get("product_id"),
        handled: row.get("handled"),
        created_at: row.get("created_at"),
    })
}

const MESSAGE_COLUMNS: &str =
    "id, kind, name, email, phone, subject, message, product_id, handled, created_at";

impl ContactRepository {
    /// Create a new message repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record an inbound message from the public site
    ///
    /// Quote requests may reference a catalog product; an unknown product
    /// reference is rejected rather than stored dangling.
    pub async fn create(
        &self,
        kind: MessageKind,
        payload: &NewContactMessage,
    ) -> ApiResult<ContactMessage> {
        if let Some(product_id) = payload.product_id {
            let product_exists: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM products WHERE id = $1)")
                    .bind(product_id)
                    .fetch_one(&self.pool)
                    .await?;

            if !product_exists {
                return Err(ApiError::NotFound("Product".to_string()));
            }
        }

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO contact_messages (kind, name, email, phone, subject, message, product_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(kind.as_str())
        .bind(&payload.name)
        .bind(&payload.email)
        .bind(&payload.phone)
        .bind(&payload.subject)
        .bind(&payload.message)
        .bind(payload.product_id)
        .fetch_one(&self.pool)
        .await?;

        let message = map_message(&row)?;
        info!("{} message received from {}", kind, message.email);
        Ok(message)
    }

    /// Admin listing with optional handled/kind filters, newest first
    pub async fn list(&self, query: &MessageQuery) -> ApiResult<Vec<ContactMessage>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM contact_messages
            WHERE ($1::boolean IS NULL OR handled = $1)
              AND ($2::text IS NULL OR kind = $2)
            ORDER BY created_at DESC
            "#
        ))
        .bind(query.handled)
        .bind(query.kind.map(|k| k.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_message).collect()
    }

    /// Find a message by ID
    pub async fn find_by_id(&self, id: Uuid) -> ApiResult<ContactMessage> {
        let row = sqlx::query(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM contact_messages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Message".to_string()))?;

        map_message(&row)
    }

    /// Mark a message as handled
    pub async fn mark_handled(&self, id: Uuid) -> ApiResult<ContactMessage> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE contact_messages
            SET handled = TRUE
            WHERE id = $1
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Message".to_string()))?;

        map_message(&row)
    }

    /// Delete a message
    pub async fn delete(&self, id: Uuid) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM contact_messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Message".to_string()));
        }

        Ok(())
    }
}
