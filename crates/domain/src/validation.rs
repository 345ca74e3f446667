//! Argument checks applied before any request is sent.

use uuid::Uuid;

use crate::errors::{ErpError, Result};

/// Upper bound for `$top` on `/customers`.
pub const MAX_CUSTOMER_LIMIT: u32 = 100;
/// Upper bound for `$top` on `/items` and `/salesOrders`.
pub const MAX_DOCUMENT_LIMIT: u32 = 1000;

/// Accept `None` or a value in `1..=max`.
pub fn check_limit(limit: Option<u32>, max: u32) -> Result<()> {
    match limit {
        Some(value) if value == 0 || value > max => {
            Err(ErpError::Validation(format!("limit must be between 1 and {max}, got {value}")))
        }
        _ => Ok(()),
    }
}

pub fn parse_order_id(order_id: &str) -> Result<Uuid> {
    Uuid::parse_str(order_id.trim())
        .map_err(|_| ErpError::Validation(format!("order_id must be a UUID, got '{order_id}'")))
}

pub fn require_non_blank<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ErpError::Validation(format!("{field} must not be empty")));
    }
    Ok(trimmed)
}

pub fn check_quantity(quantity: f64) -> Result<()> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(ErpError::Validation(format!("quantity must be a positive number, got {quantity}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_bounds() {
        assert!(check_limit(None, MAX_CUSTOMER_LIMIT).is_ok());
        assert!(check_limit(Some(1), MAX_CUSTOMER_LIMIT).is_ok());
        assert!(check_limit(Some(100), MAX_CUSTOMER_LIMIT).is_ok());
        assert!(check_limit(Some(101), MAX_CUSTOMER_LIMIT).is_err());
        assert!(check_limit(Some(0), MAX_DOCUMENT_LIMIT).is_err());
        assert!(check_limit(Some(1000), MAX_DOCUMENT_LIMIT).is_ok());
    }

    #[test]
    fn order_id_must_be_uuid() {
        assert!(parse_order_id("aaaaaaaa-bbbb-4ccc-8ddd-eeeeeeeeeeee").is_ok());
        let err = parse_order_id("S-ORD101001").unwrap_err();
        assert!(matches!(err, ErpError::Validation(_)));
    }

    #[test]
    fn quantity_must_be_positive_and_finite() {
        assert!(check_quantity(1.5).is_ok());
        assert!(check_quantity(0.0).is_err());
        assert!(check_quantity(-2.0).is_err());
        assert!(check_quantity(f64::NAN).is_err());
        assert!(check_quantity(f64::INFINITY).is_err());
    }

    #[test]
    fn blank_strings_rejected() {
        assert_eq!(require_non_blank("customer_number", " 10000 ").unwrap(), "10000");
        assert!(require_non_blank("customer_number", "   ").is_err());
    }
}
