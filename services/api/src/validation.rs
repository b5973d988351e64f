//! Input validation utilities
//!
//! Validators run at the boundary, before any persistence; they report
//! every failing field at once rather than stopping at the first.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{ApiError, FieldError};
use crate::models::contact::NewContactMessage;
use crate::models::sale::NewSale;
use crate::models::user::{CreateUserRequest, UpdateUserRequest};

/// Validate an email address format
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate a proposed sale payload
///
/// Checks shape only: non-empty item list, positive quantities and prices,
/// non-negative discount and tax. Product existence is the coordinator's
/// concern.
pub fn validate_new_sale(payload: &NewSale) -> Result<(), ApiError> {
    let mut errors = Vec::new();

    if payload.items.is_empty() {
        errors.push(FieldError::new(
            "items",
            "At least one line item is required",
        ));
    }

    for (i, item) in payload.items.iter().enumerate() {
        if item.quantity < 1 {
            errors.push(FieldError::new(
                format!("items[{i}].quantity"),
                "Quantity must be a positive integer",
            ));
        }
        if !item.unit_price.is_finite() || item.unit_price <= 0.0 {
            errors.push(FieldError::new(
                format!("items[{i}].unit_price"),
                "Unit price must be a positive number",
            ));
        }
    }

    if !payload.discount_percent.is_finite() || payload.discount_percent < 0.0 {
        errors.push(FieldError::new(
            "discount_percent",
            "Discount percentage must be non-negative",
        ));
    }

    if !payload.tax_percent.is_finite() || payload.tax_percent < 0.0 {
        errors.push(FieldError::new(
            "tax_percent",
            "Tax percentage must be non-negative",
        ));
    }

    if let Some(email) = &payload.customer_email {
        if !email.is_empty() {
            if let Err(message) = validate_email(email) {
                errors.push(FieldError::new("customer_email", message));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

/// Validate a public contact or quote message
pub fn validate_contact_message(payload: &NewContactMessage) -> Result<(), ApiError> {
    let mut errors = Vec::new();

    if payload.name.trim().is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    }

    if let Err(message) = validate_email(&payload.email) {
        errors.push(FieldError::new("email", message));
    }

    if payload.message.trim().is_empty() {
        errors.push(FieldError::new("message", "Message is required"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

/// Validate an admin user-creation payload
pub fn validate_create_user(payload: &CreateUserRequest) -> Result<(), ApiError> {
    let mut errors = Vec::new();

    if let Err(message) = validate_email(&payload.email) {
        errors.push(FieldError::new("email", message));
    }

    if payload.password.len() < 8 {
        errors.push(FieldError::new(
            "password",
            "Password must be at least 8 characters long",
        ));
    }

    if payload.full_name.trim().is_empty() {
        errors.push(FieldError::new("full_name", "Full name is required"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

/// Validate an admin user-update payload
pub fn validate_update_user(payload: &UpdateUserRequest) -> Result<(), ApiError> {
    let mut errors = Vec::new();

    if let Some(email) = &payload.email {
        if let Err(message) = validate_email(email) {
            errors.push(FieldError::new("email", message));
        }
    }

    if let Some(password) = &payload.password {
        if password.len() < 8 {
            errors.push(FieldError::new(
                "password",
                "Password must be at least 8 characters long",
            ));
        }
    }

    if let Some(full_name) = &payload.full_name {
        if full_name.trim().is_empty() {
            errors.push(FieldError::new("full_name", "Full name must not be empty"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sale::{NewSaleItem, PaymentMethod};
    use uuid::Uuid;

    fn sale(items: Vec<NewSaleItem>, discount: f64, tax: f64) -> NewSale {
        NewSale {
            customer_name: None,
            customer_phone: None,
            customer_email: None,
            items,
            discount_percent: discount,
            tax_percent: tax,
            payment_method: PaymentMethod::Cash,
        }
    }

    fn item(quantity: i32, unit_price: f64) -> NewSaleItem {
        NewSaleItem {
            product_id: Uuid::new_v4(),
            quantity,
            unit_price,
        }
    }

    fn field_names(err: ApiError) -> Vec<String> {
        match err {
            ApiError::Validation(fields) => fields.into_iter().map(|f| f.field).collect(),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_sale_passes() {
        let payload = sale(vec![item(2, 100.0), item(1, 50.0)], 10.0, 5.0);
        assert!(validate_new_sale(&payload).is_ok());
    }

    #[test]
    fn test_empty_items_rejected() {
        let err = validate_new_sale(&sale(vec![], 0.0, 0.0)).unwrap_err();
        assert_eq!(field_names(err), vec!["items"]);
    }

    #[test]
    fn test_bad_line_items_reported_per_field() {
        let payload = sale(vec![item(0, 100.0), item(1, -5.0)], 0.0, 0.0);
        let fields = field_names(validate_new_sale(&payload).unwrap_err());
        assert_eq!(fields, vec!["items[0].quantity", "items[1].unit_price"]);
    }

    #[test]
    fn test_negative_discount_and_tax_rejected() {
        let payload = sale(vec![item(1, 10.0)], -1.0, -0.5);
        let fields = field_names(validate_new_sale(&payload).unwrap_err());
        assert_eq!(fields, vec!["discount_percent", "tax_percent"]);
    }

    #[test]
    fn test_bad_customer_email_rejected() {
        let mut payload = sale(vec![item(1, 10.0)], 0.0, 0.0);
        payload.customer_email = Some("not-an-email".to_string());
        let fields = field_names(validate_new_sale(&payload).unwrap_err());
        assert_eq!(fields, vec!["customer_email"]);
    }

    #[test]
    fn test_contact_message_requires_name_email_message() {
        let payload = NewContactMessage {
            name: " ".to_string(),
            email: "bad".to_string(),
            phone: None,
            subject: None,
            message: String::new(),
            product_id: None,
        };
        let fields = field_names(validate_contact_message(&payload).unwrap_err());
        assert_eq!(fields, vec!["name", "email", "message"]);
    }
}
