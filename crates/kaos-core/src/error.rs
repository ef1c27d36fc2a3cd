//! # Error Types
//!
//! Domain-specific error types for kaos-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kaos-core errors (this file)                                           │
//! │  ├── CoreError        - Business rule violations                        │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  kaos-db errors (separate crate)                                        │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  kaos-engine errors                                                     │
//! │  └── EngineError      - What callers see, with status-code mapping      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → EngineError → caller               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product code, quantities, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Reseller cannot be found.
    #[error("Reseller not found: {0}")]
    ResellerNotFound(String),

    /// Consignment cannot be found.
    #[error("Consignment not found: {0}")]
    ConsignmentNotFound(String),

    /// Sale cannot be found.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Insufficient stock to complete a stock-decrementing operation.
    ///
    /// ## When This Occurs
    /// - Consigning more units than the product has in stock
    /// - Direct sale requesting more than available
    #[error("Insufficient stock for {product_code}: available {available}, requested {requested}")]
    InsufficientStock {
        product_code: String,
        available: i64,
        requested: i64,
    },

    /// Product is referenced by consignment items and cannot be deleted.
    ///
    /// This is a historical-integrity rule: the reference blocks deletion
    /// even when every consigned unit has been returned.
    #[error("Product {product_code} is referenced by a consignment and cannot be deleted")]
    ProductInConsignment { product_code: String },

    /// A return entry names a product that is not part of the consignment.
    #[error("Product {product_id} is not part of this consignment")]
    ProductNotInConsignment { product_id: String },

    /// A return quantity exceeds the units still held by the reseller.
    #[error("Return of {requested} exceeds outstanding quantity ({available}) for {product_code}")]
    ReturnExceedsOutstanding {
        product_code: String,
        available: i64,
        requested: i64,
    },

    /// A payment would push `paid_amount` past `total_value`.
    ///
    /// The remaining balance is included so the caller can cap the retry.
    #[error("Payment of {amount} exceeds remaining balance ({remaining})")]
    PaymentExceedsBalance { remaining: i64, amount: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid code characters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product_code: "KD-003".to_string(),
            available: 5,
            requested: 10,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for KD-003: available 5, requested 10"
        );
    }

    #[test]
    fn test_payment_exceeds_balance_message() {
        let err = CoreError::PaymentExceedsBalance {
            remaining: 20000,
            amount: 25000,
        };
        assert_eq!(
            err.to_string(),
            "Payment of 25000 exceeds remaining balance (20000)"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "items".to_string(),
        };
        assert_eq!(err.to_string(), "items is required");

        let err = ValidationError::MustBePositive {
            field: "amount".to_string(),
        };
        assert_eq!(err.to_string(), "amount must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "product_code".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
