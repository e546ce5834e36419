//! Input validation for scheduling problems.
//!
//! Checks structural integrity of products and orders before a
//! [`ScheduleContext`](crate::models::ScheduleContext) is built. Detects:
//! - Duplicate IDs
//! - Orders referencing unknown products
//! - Non-positive processing times or ones longer than a year
//! - Non-finite or negative order values
//!
//! All issues are collected; validation does not stop at the first one.

use crate::models::{Order, Product};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Longest accepted unit processing time (hours): one year.
pub const MAX_UNIT_HOURS: f64 = 24.0 * 365.0;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// An order references a product that doesn't exist.
    InvalidProductReference,
    /// A product's unit processing time is not a positive finite number.
    InvalidProcessingTime,
    /// An order's value is negative or not finite.
    InvalidOrderValue,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates products and orders.
///
/// Checks:
/// 1. No duplicate product IDs
/// 2. No duplicate order IDs
/// 3. Every unit processing time is positive and at most [`MAX_UNIT_HOURS`]
/// 4. Every order value is finite and non-negative
/// 5. Every order's product exists
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(products: &[Product], orders: &[Order]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut product_ids = HashSet::new();
    for p in products {
        if !product_ids.insert(p.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate product ID: {}", p.id),
            ));
        }
        if !(p.unit_hours > 0.0 && p.unit_hours <= MAX_UNIT_HOURS) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidProcessingTime,
                format!(
                    "Product {} has invalid unit processing time {}",
                    p.id, p.unit_hours
                ),
            ));
        }
    }

    let mut order_ids = HashSet::new();
    for o in orders {
        if !order_ids.insert(o.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate order ID: {}", o.id),
            ));
        }
        if !o.total_value.is_finite() || o.total_value < 0.0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidOrderValue,
                format!("Order {} has invalid value {}", o.id, o.total_value),
            ));
        }
        if !product_ids.contains(&o.product_id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidProductReference,
                format!(
                    "Order '{}' references unknown product '{}'",
                    o.id, o.product_id
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn deadline() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 11, 27)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn sample_products() -> Vec<Product> {
        vec![Product::new(1, 4.0), Product::new(2, 3.0), Product::new(3, 2.0)]
    }

    fn sample_orders() -> Vec<Order> {
        vec![
            Order::new(1, 1, 2, 1000.0, deadline()),
            Order::new(2, 2, 1, 800.0, deadline()),
            Order::new(3, 3, 1, 600.0, deadline()),
        ]
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_input(&sample_products(), &sample_orders()).is_ok());
    }

    #[test]
    fn test_empty_input_is_valid() {
        assert!(validate_input(&[], &[]).is_ok());
    }

    #[test]
    fn test_duplicate_product_id() {
        let products = vec![Product::new(1, 4.0), Product::new(1, 2.0)];
        let errors = validate_input(&products, &[]).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("product")));
    }

    #[test]
    fn test_duplicate_order_id() {
        let orders = vec![
            Order::new(1, 1, 1, 100.0, deadline()),
            Order::new(1, 2, 1, 100.0, deadline()),
        ];
        let errors = validate_input(&sample_products(), &orders).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("order")));
    }

    #[test]
    fn test_invalid_product_reference() {
        let orders = vec![Order::new(1, 42, 1, 100.0, deadline())];
        let errors = validate_input(&sample_products(), &orders).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidProductReference));
    }

    #[test]
    fn test_invalid_processing_time() {
        for hours in [0.0, -1.0, f64::NAN, f64::INFINITY, MAX_UNIT_HOURS + 1.0, 1e10] {
            let errors = validate_input(&[Product::new(1, hours)], &[]).unwrap_err();
            assert_eq!(errors[0].kind, ValidationErrorKind::InvalidProcessingTime);
        }
        assert!(validate_input(&[Product::new(1, MAX_UNIT_HOURS)], &[]).is_ok());
    }

    #[test]
    fn test_invalid_order_value() {
        let orders = vec![Order::new(1, 1, 1, -5.0, deadline())];
        let errors = validate_input(&sample_products(), &orders).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::InvalidOrderValue);
    }

    #[test]
    fn test_multiple_errors() {
        let products = vec![Product::new(1, 0.0)];
        let orders = vec![
            Order::new(1, 9, 1, 100.0, deadline()),
            Order::new(1, 1, 1, f64::NAN, deadline()),
        ];
        let errors = validate_input(&products, &orders).unwrap_err();
        assert!(errors.len() >= 4);
    }
}
