//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::rbac::Role;

/// A single field-level validation failure
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed payload; nothing was persisted
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// No session or an invalid one; carries the originally requested
    /// path+query so the caller can be returned there after login
    #[error("Authentication required")]
    Unauthenticated { next: String },

    /// Authenticated but the role is outside the allowed set
    #[error("Insufficient role")]
    Forbidden {
        required: &'static [Role],
        current: Role,
    },

    /// Referenced entity does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Uniqueness or business-rule violation
    #[error("{0}")]
    Conflict(String),

    /// Underlying persistence failure; never leaks internals to the caller
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invariant violation inside the service; never leaks internals
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Build a validation error from a single field failure
    pub fn invalid(field: &str, message: &str) -> Self {
        ApiError::Validation(vec![FieldError::new(field, message)])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "Validation failed",
                    "fields": fields,
                }),
            ),
            ApiError::Unauthenticated { next } => (
                StatusCode::UNAUTHORIZED,
                json!({
                    "error": "Authentication required",
                    "login": "/login",
                    "next": next,
                }),
            ),
            ApiError::Forbidden { required, current } => {
                let allowed: Vec<&str> = required.iter().map(|r| r.as_str()).collect();
                (
                    StatusCode::FORBIDDEN,
                    json!({
                        "error": format!(
                            "Your role {} is not permitted here; allowed roles: {}",
                            current,
                            allowed.join(", ")
                        ),
                        "allowed_roles": allowed,
                        "your_role": current.as_str(),
                    }),
                )
            }
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                json!({ "error": format!("{what} not found") }),
            ),
            ApiError::Conflict(message) => {
                (StatusCode::CONFLICT, json!({ "error": message }))
            }
            ApiError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
            ApiError::Internal(message) => {
                tracing::error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

/// Map a sqlx unique-constraint violation to a [`ApiError::Conflict`] with
/// an explanatory message, leaving every other error untouched.
pub fn conflict_on_unique(e: sqlx::Error, message: &str) -> ApiError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return ApiError::Conflict(message.to_string());
        }
    }
    ApiError::Database(e)
}

/// Map a sqlx foreign-key violation to a [`ApiError::Conflict`], for deletes
/// blocked by dependent rows.
pub fn conflict_on_fk(e: sqlx::Error, message: &str) -> ApiError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_foreign_key_violation() {
            return ApiError::Conflict(message.to_string());
        }
    }
    ApiError::Database(e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_carries_fields() {
        let err = ApiError::invalid("items", "at least one line item is required");
        match err {
            ApiError::Validation(fields) => {
                assert_eq!(fields.len(), 1);
                assert_eq!(fields[0].field, "items");
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }
}
