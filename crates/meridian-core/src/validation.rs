//! # Validation Module
//!
//! Input validation for order-entry operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Admin console (TypeScript)                                   │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate operator feedback                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (engine entry points)                            │
//! │  ├── Quantity / price / discount bounds                                │
//! │  └── Identifier format                                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Order-persistence service (server side)                      │
//! │  └── Uniqueness, referential integrity, authorization                  │
//! │                                                                         │
//! │  Defense in depth: the engine never trusts the UI, the backend never   │
//! │  trusts the engine.                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_LINE_QUANTITY, MAX_ORDER_LINES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0); a zero/negative quantity on an *existing* line
///   is an implicit remove and is handled before this check
/// - Must not exceed MAX_LINE_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a unit price.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (promotional/free lines)
///
/// ## Example
/// ```rust
/// use meridian_core::money::Money;
/// use meridian_core::validation::validate_unit_price;
///
/// assert!(validate_unit_price(Money::from_cents(5000)).is_ok());
/// assert!(validate_unit_price(Money::zero()).is_ok());
/// assert!(validate_unit_price(Money::from_cents(-1)).is_err());
/// ```
pub fn validate_unit_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "unit price".to_string(),
        });
    }

    Ok(())
}

/// Validates a per-line discount against the line subtotal.
///
/// ## Rules
/// - Must be non-negative
/// - Must not exceed the line subtotal (a line cannot go negative through
///   discounting alone)
pub fn validate_discount(discount: Money, subtotal: Money) -> ValidationResult<()> {
    if discount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "discount".to_string(),
        });
    }

    if discount > subtotal {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: subtotal.cents(),
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates order size (number of lines) before appending another.
pub fn validate_line_count(current_lines: usize) -> ValidationResult<()> {
    if current_lines >= MAX_ORDER_LINES {
        return Err(ValidationError::TooManyLines {
            max: MAX_ORDER_LINES,
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a manually entered order number.
///
/// ## Rules
/// - Must not be empty
/// - Maximum 40 characters
pub fn validate_order_number(number: &str) -> ValidationResult<()> {
    let number = number.trim();

    if number.is_empty() {
        return Err(ValidationError::Required {
            field: "order number".to_string(),
        });
    }

    if number.len() > 40 {
        return Err(ValidationError::TooLong {
            field: "order number".to_string(),
            max: 40,
        });
    }

    Ok(())
}

/// Validates a catalog search query.
///
/// ## Rules
/// - Can be empty (returns default results)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates a catalog/customer identifier string format.
///
/// ## Rules
/// - Must be a valid UUID: 36 characters with hyphens
///
/// ## Example
/// ```rust
/// use meridian_core::validation::validate_id;
///
/// assert!(validate_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_id("not-an-id").is_err());
/// ```
pub fn validate_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_unit_price() {
        assert!(validate_unit_price(Money::from_cents(5000)).is_ok());
        assert!(validate_unit_price(Money::zero()).is_ok());
        assert!(validate_unit_price(Money::from_cents(-100)).is_err());
    }

    #[test]
    fn test_validate_discount() {
        let subtotal = Money::from_cents(10000);
        assert!(validate_discount(Money::zero(), subtotal).is_ok());
        assert!(validate_discount(Money::from_cents(10000), subtotal).is_ok());
        assert!(validate_discount(Money::from_cents(10001), subtotal).is_err());
        assert!(validate_discount(Money::from_cents(-1), subtotal).is_err());
    }

    #[test]
    fn test_validate_line_count() {
        assert!(validate_line_count(0).is_ok());
        assert!(validate_line_count(MAX_ORDER_LINES - 1).is_ok());
        assert!(validate_line_count(MAX_ORDER_LINES).is_err());
    }

    #[test]
    fn test_validate_order_number() {
        assert!(validate_order_number("SO-ACM-20250301-4821").is_ok());
        assert!(validate_order_number("").is_err());
        assert!(validate_order_number("   ").is_err());
        assert!(validate_order_number(&"X".repeat(50)).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  mug ").unwrap(), "mug");
        assert!(validate_search_query(&"q".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_id("").is_err());
        assert!(validate_id("123").is_err());
    }
}
