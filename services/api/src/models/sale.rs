//! Sale models and the deterministic totals computation
//!
//! A sale is immutable once recorded: there is no update or delete surface.
//! Its line items are created together with it and live and die with it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Accepted payment methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    BankTransfer,
    MobileMoney,
}

impl PaymentMethod {
    /// Canonical string form, as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::MobileMoney => "mobile_money",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            "mobile_money" => Ok(PaymentMethod::MobileMoney),
            other => Err(format!("unknown payment method: {other}")),
        }
    }
}

/// Sale entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: Uuid,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub discount_percent: f64,
    pub tax_percent: f64,
    /// Pre-discount, pre-tax subtotal
    pub total_amount: f64,
    /// Amount actually charged
    pub final_amount: f64,
    pub payment_method: PaymentMethod,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// One line item of a recorded sale, joined with its product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleItemDetail {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_sku: String,
    pub quantity: i32,
    pub unit_price: f64,
}

/// Fully hydrated sale: the sale row plus its line items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleDetail {
    pub sale: Sale,
    pub items: Vec<SaleItemDetail>,
}

/// Line item of a proposed sale
#[derive(Debug, Clone, Deserialize)]
pub struct NewSaleItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: f64,
}

/// Payload for recording a sale
#[derive(Debug, Clone, Deserialize)]
pub struct NewSale {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub items: Vec<NewSaleItem>,
    #[serde(default)]
    pub discount_percent: f64,
    #[serde(default)]
    pub tax_percent: f64,
    pub payment_method: PaymentMethod,
}

/// Query parameters for sale listings
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SaleQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Query parameters for the sales summary report
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SummaryQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Aggregated sales figures over a date range
#[derive(Debug, Clone, Serialize)]
pub struct SalesSummary {
    pub sale_count: i64,
    pub gross_total: f64,
    pub discount_total: f64,
    pub tax_total: f64,
    pub net_total: f64,
}

/// Monetary totals of a sale, computed in a fixed order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaleTotals {
    pub subtotal: f64,
    pub discount_amount: f64,
    pub after_discount: f64,
    pub tax_amount: f64,
    pub final_amount: f64,
}

impl SaleTotals {
    /// Compute the totals for a list of line items
    ///
    /// The computation order is fixed: subtotal, then the discount over the
    /// subtotal, then tax over the discounted amount. Callers persist
    /// `subtotal` as the sale's total_amount and `final_amount` as the
    /// charged amount.
    pub fn compute(items: &[NewSaleItem], discount_percent: f64, tax_percent: f64) -> Self {
        let subtotal: f64 = items
            .iter()
            .map(|item| f64::from(item.quantity) * item.unit_price)
            .sum();
        let discount_amount = subtotal * discount_percent / 100.0;
        let after_discount = subtotal - discount_amount;
        let tax_amount = after_discount * tax_percent / 100.0;
        let final_amount = after_discount + tax_amount;

        SaleTotals {
            subtotal,
            discount_amount,
            after_discount,
            tax_amount,
            final_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i32, unit_price: f64) -> NewSaleItem {
        NewSaleItem {
            product_id: Uuid::new_v4(),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn test_totals_are_deterministic() {
        let items = [item(2, 100.0), item(1, 50.0)];
        let totals = SaleTotals::compute(&items, 10.0, 5.0);

        assert_eq!(totals.subtotal, 250.0);
        assert_eq!(totals.discount_amount, 25.0);
        assert_eq!(totals.after_discount, 225.0);
        assert_eq!(totals.tax_amount, 11.25);
        assert_eq!(totals.final_amount, 236.25);
    }

    #[test]
    fn test_totals_without_discount_or_tax() {
        let items = [item(3, 19.99)];
        let totals = SaleTotals::compute(&items, 0.0, 0.0);

        assert_eq!(totals.subtotal, 3.0 * 19.99);
        assert_eq!(totals.discount_amount, 0.0);
        assert_eq!(totals.final_amount, totals.subtotal);
    }

    #[test]
    fn test_totals_of_empty_item_list_are_zero() {
        // Validation rejects empty item lists before totals are computed;
        // the computation itself still behaves
        let totals = SaleTotals::compute(&[], 10.0, 5.0);
        assert_eq!(totals.subtotal, 0.0);
        assert_eq!(totals.final_amount, 0.0);
    }

    #[test]
    fn test_payment_method_round_trip() {
        for method in [
            PaymentMethod::Cash,
            PaymentMethod::Card,
            PaymentMethod::BankTransfer,
            PaymentMethod::MobileMoney,
        ] {
            assert_eq!(method.as_str().parse::<PaymentMethod>().unwrap(), method);
        }
        assert!("cheque".parse::<PaymentMethod>().is_err());
    }
}
