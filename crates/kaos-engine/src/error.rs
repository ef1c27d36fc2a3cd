//! # Engine Error Type
//!
//! Unified error type for engine operations.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Kaos Inventory                         │
//! │                                                                         │
//! │  Caller                       Engine                                    │
//! │  ──────                       ──────                                    │
//! │                                                                         │
//! │  engine.process_payment(id, amount)                                     │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Service Method                                                  │  │
//! │  │  Result<T, EngineError>                                          │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Database Error? ─── DbError::QueryFailed("...") ──┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Business Error? ─── CoreError::... ────────── EngineError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  Caller inspects error.code (or status_code()) and shows the message.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use kaos_core::CoreError;
use kaos_db::DbError;

/// Error returned from engine operations.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Consignment not found: abc-123"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for engine responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Not enough stock for a stock-decrementing operation (400)
    InsufficientStock,

    /// Payment amount rejected (400)
    PaymentError,

    /// State conflict: duplicate code, or product still in consignment (409)
    Conflict,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal error (500)
    Internal,
}

impl ErrorCode {
    /// The modeled HTTP-shaped status code for this error class.
    pub const fn status_code(&self) -> u16 {
        match self {
            ErrorCode::NotFound => 404,
            ErrorCode::ValidationError
            | ErrorCode::InsufficientStock
            | ErrorCode::PaymentError => 400,
            ErrorCode::Conflict => 409,
            ErrorCode::DatabaseError | ErrorCode::Internal => 500,
        }
    }
}

impl EngineError {
    /// Creates a new engine error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        EngineError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        EngineError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        EngineError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        EngineError::new(ErrorCode::Conflict, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        EngineError::new(ErrorCode::Internal, message)
    }

    /// The modeled HTTP-shaped status code.
    pub const fn status_code(&self) -> u16 {
        self.code.status_code()
    }
}

/// Converts database errors to engine errors.
impl From<DbError> for EngineError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => EngineError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => EngineError::new(
                ErrorCode::Conflict,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                EngineError::new(ErrorCode::Conflict, "Invalid reference")
            }
            DbError::ConnectionFailed(_) => {
                EngineError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                EngineError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                EngineError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                EngineError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                EngineError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                EngineError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to engine errors.
impl From<CoreError> for EngineError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => EngineError::not_found("Product", &id),
            CoreError::ResellerNotFound(id) => EngineError::not_found("Reseller", &id),
            CoreError::ConsignmentNotFound(id) => EngineError::not_found("Consignment", &id),
            CoreError::SaleNotFound(id) => EngineError::not_found("Sale", &id),
            CoreError::InsufficientStock {
                product_code,
                available,
                requested,
            } => EngineError::new(
                ErrorCode::InsufficientStock,
                format!(
                    "Insufficient stock for {}: {} available, {} requested",
                    product_code, available, requested
                ),
            ),
            CoreError::ProductInConsignment { product_code } => EngineError::new(
                ErrorCode::Conflict,
                format!(
                    "Product {} is referenced by a consignment and cannot be deleted",
                    product_code
                ),
            ),
            CoreError::ProductNotInConsignment { product_id } => EngineError::validation(format!(
                "Product {} is not part of this consignment",
                product_id
            )),
            CoreError::ReturnExceedsOutstanding {
                product_code,
                available,
                requested,
            } => EngineError::validation(format!(
                "Return of {} exceeds outstanding quantity ({}) for {}",
                requested, available, product_code
            )),
            CoreError::PaymentExceedsBalance { remaining, amount } => EngineError::new(
                ErrorCode::PaymentError,
                format!(
                    "Payment of {} exceeds remaining balance ({})",
                    amount, remaining
                ),
            ),
            CoreError::Validation(e) => EngineError::validation(e.to_string()),
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for EngineError {}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ErrorCode::NotFound.status_code(), 404);
        assert_eq!(ErrorCode::ValidationError.status_code(), 400);
        assert_eq!(ErrorCode::InsufficientStock.status_code(), 400);
        assert_eq!(ErrorCode::PaymentError.status_code(), 400);
        assert_eq!(ErrorCode::Conflict.status_code(), 409);
        assert_eq!(ErrorCode::DatabaseError.status_code(), 500);
    }

    #[test]
    fn test_core_error_mapping() {
        let err: EngineError = CoreError::ConsignmentNotFound("c-1".to_string()).into();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err: EngineError = CoreError::PaymentExceedsBalance {
            remaining: 100,
            amount: 200,
        }
        .into();
        assert_eq!(err.code, ErrorCode::PaymentError);
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_db_error_mapping() {
        let err: EngineError = DbError::duplicate("product_code", "KD-001").into();
        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(err.status_code(), 409);
    }
}
