//! # Input Validation
//!
//! Field-level validation rules, applied by the engine layer before any
//! business logic or database work runs. Each function checks one field and
//! returns a typed [`ValidationError`] on failure.
//!
//! Cross-entity rules (stock sufficiency, return bounds, payment caps) are
//! NOT here; those need current state and live with the operations that
//! enforce them.

use crate::error::ValidationError;
use crate::MAX_ITEM_QUANTITY;

/// Maximum length for business codes (product_code, consignment_code, ...).
pub const MAX_CODE_LENGTH: usize = 20;

/// Maximum length for names and free-form note fields.
pub const MAX_NAME_LENGTH: usize = 100;

// =============================================================================
// Validation Functions
// =============================================================================

/// Validates a business code: non-empty, bounded, no whitespace.
pub fn validate_code(field: &str, code: &str) -> Result<(), ValidationError> {
    if code.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    if code.len() > MAX_CODE_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_CODE_LENGTH,
        });
    }
    if code.chars().any(|c| c.is_whitespace()) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }
    Ok(())
}

/// Validates a name field: non-empty after trimming, bounded.
pub fn validate_name(field: &str, name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(())
}

/// Validates an item quantity: 1 ..= [`MAX_ITEM_QUANTITY`].
pub fn validate_quantity(field: &str, quantity: i64) -> Result<(), ValidationError> {
    if quantity < 1 || quantity > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }
    Ok(())
}

/// Validates a stock count: zero is fine, negative is not.
pub fn validate_stock(field: &str, stock: i64) -> Result<(), ValidationError> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates a price: must not be negative (zero allowed for giveaways).
pub fn validate_price(field: &str, price: i64) -> Result<(), ValidationError> {
    if price < 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a payment or sale amount: strictly positive.
pub fn validate_amount(field: &str, amount: i64) -> Result<(), ValidationError> {
    if amount <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_code() {
        assert!(validate_code("product_code", "KD-003").is_ok());
        assert!(validate_code("product_code", "").is_err());
        assert!(validate_code("product_code", "   ").is_err());
        assert!(validate_code("product_code", "KD 003").is_err());
        assert!(validate_code("product_code", &"X".repeat(21)).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Budi Santoso").is_ok());
        assert!(validate_name("name", "  ").is_err());
        assert!(validate_name("name", &"a".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity("quantity", 1).is_ok());
        assert!(validate_quantity("quantity", 9999).is_ok());
        assert!(validate_quantity("quantity", 0).is_err());
        assert!(validate_quantity("quantity", -3).is_err());
        assert!(validate_quantity("quantity", 10_000).is_err());
    }

    #[test]
    fn test_validate_stock_allows_zero() {
        assert!(validate_stock("stock", 0).is_ok());
        assert!(validate_stock("stock", -1).is_err());
    }

    #[test]
    fn test_validate_price_and_amount() {
        assert!(validate_price("price", 0).is_ok());
        assert!(validate_price("price", 95_000).is_ok());
        assert!(validate_price("price", -1).is_err());

        assert!(validate_amount("amount", 500_000).is_ok());
        assert!(validate_amount("amount", 0).is_err());
        assert!(validate_amount("amount", -500).is_err());
    }
}
