//! # Error Types
//!
//! Typed errors for the order engine.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  meridian-core errors (this file)                                      │
//! │  ├── EngineError      - Aggregate error surfaced by cart operations    │
//! │  ├── ValidationError  - Bad quantity/price, empty cart, no customer    │
//! │  ├── StockError       - Out-of-stock / exceeds-stock hard failures     │
//! │  └── HistoryError     - Last-order-price overlay failures              │
//! │                                                                         │
//! │  meridian-orders errors (separate crate)                               │
//! │  └── ServiceError     - EngineError + collaborator (upstream) failures │
//! │                                                                         │
//! │  Flow: ValidationError/StockError/HistoryError → EngineError           │
//! │        → ServiceError → UI notice                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (item name, stock counts, indexes)
//! 3. Errors are enum variants, never String
//! 4. Below-cost pricing is NOT an error - it is a classification that the
//!    aggregate turns into a needs-confirmation outcome (see `session`)

use thiserror::Error;

// =============================================================================
// Engine Error
// =============================================================================

/// Aggregate error type surfaced by cart/session operations.
///
/// Every failure here is recoverable: the caller retries the operation or
/// adjusts its input. Nothing in the engine is fatal to the process.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Input validation failure (bad quantity/price, empty cart, no customer).
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Stock guard hard failure. Bypassed only by an explicit caller override.
    #[error(transparent)]
    Stock(#[from] StockError),

    /// Historical price overlay failure.
    #[error(transparent)]
    History(#[from] HistoryError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller input doesn't meet requirements. They block the
/// mutation and must be surfaced immediately with the specific reason.
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

    /// Value must not be negative (zero is allowed, e.g. free items).
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Line index does not exist in the current order.
    #[error("no order line at index {index} (order has {len} lines)")]
    UnknownLine { index: usize, len: usize },

    /// Operation requires at least one line in the order.
    #[error("order has no lines")]
    EmptyOrder,

    /// Operation requires a customer on the order.
    #[error("no customer selected on the order")]
    NoCustomer,

    /// Order has hit the maximum line count.
    #[error("order cannot have more than {max} lines")]
    TooManyLines { max: usize },
}

// =============================================================================
// Stock Error
// =============================================================================

/// Stock guard hard failures.
///
/// ## When These Occur
/// - Adding an item whose recorded stock is zero
/// - Requesting more units than the recorded stock
/// - Re-validating lines against live stock at submission time
///
/// ## User Workflow
/// ```text
/// Add line (qty: 5)
///      │
///      ▼
/// Stock guard: available=3
///      │
///      ▼
/// ExceedsStock { item: "Ceramic Mug", available: 3, requested: 5 }
///      │
///      ▼
/// UI shows: "Only 3 Ceramic Mug in stock" (caller may override)
/// ```
#[derive(Debug, Error)]
pub enum StockError {
    /// Item has no stock at all.
    #[error("{item} is out of stock")]
    OutOfStock { item: String },

    /// Requested quantity exceeds the recorded stock level.
    #[error("insufficient stock for {item}: available {available}, requested {requested}")]
    ExceedsStock {
        item: String,
        available: i64,
        requested: i64,
    },
}

// =============================================================================
// History Error
// =============================================================================

/// Historical price overlay failures.
///
/// These are user-correctable notices, not defects: the customer simply has
/// no prior order, or there is no overlay to undo.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The customer has no prior order to source prices from.
    #[error("customer has no prior order with usable prices")]
    NoPriorOrder,

    /// Restore requested while no overlay is active.
    #[error("no overlaid prices to restore")]
    NothingToRestore,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with EngineError.
pub type CoreResult<T> = Result<T, EngineError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_error_messages() {
        let err = StockError::ExceedsStock {
            item: "Ceramic Mug".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for Ceramic Mug: available 3, requested 5"
        );

        let err = StockError::OutOfStock {
            item: "Ceramic Mug".to_string(),
        };
        assert_eq!(err.to_string(), "Ceramic Mug is out of stock");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");

        let err = ValidationError::UnknownLine { index: 4, len: 2 };
        assert_eq!(err.to_string(), "no order line at index 4 (order has 2 lines)");
    }

    #[test]
    fn test_sub_errors_convert_to_engine_error() {
        let err: EngineError = ValidationError::EmptyOrder.into();
        assert!(matches!(err, EngineError::Validation(_)));

        let err: EngineError = HistoryError::NothingToRestore.into();
        assert!(matches!(err, EngineError::History(_)));

        let err: EngineError = StockError::OutOfStock {
            item: "x".to_string(),
        }
        .into();
        assert!(matches!(err, EngineError::Stock(_)));
    }
}
