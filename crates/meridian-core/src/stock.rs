//! # Stock Guard
//!
//! Validates a requested quantity against a catalog snapshot's stock.
//!
//! The check is advisory at this layer: the aggregate hard-fails on either
//! outcome unless the caller passes an explicit override, and the UI decides
//! whether to block outright (recommended for out-of-stock) or prompt for
//! confirmation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::StockError;
use crate::types::CatalogItem;

/// Outcome of a stock check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum StockCheck {
    /// Requested quantity is coverable by recorded stock.
    Ok,
    /// Recorded stock is zero.
    OutOfStock,
    /// Requested quantity exceeds recorded stock.
    ExceedsStock { available: i64, requested: i64 },
}

impl StockCheck {
    /// True when the request passed the guard.
    #[inline]
    pub fn is_ok(&self) -> bool {
        matches!(self, StockCheck::Ok)
    }

    /// Converts the check into a hard failure for the aggregate, naming the
    /// item for the operator message.
    pub fn into_result(self, item: &CatalogItem) -> Result<(), StockError> {
        match self {
            StockCheck::Ok => Ok(()),
            StockCheck::OutOfStock => Err(StockError::OutOfStock {
                item: item.display_name.clone(),
            }),
            StockCheck::ExceedsStock {
                available,
                requested,
            } => Err(StockError::ExceedsStock {
                item: item.display_name.clone(),
                available,
                requested,
            }),
        }
    }
}

/// Checks a requested quantity against an item's recorded stock.
///
/// ## Rules
/// - `current_stock == 0` → `OutOfStock`
/// - `requested > current_stock` → `ExceedsStock`
/// - otherwise → `Ok`
///
/// Quantity edits that reduce a line to `<= 0` are an implicit remove and
/// never reach this guard.
pub fn check_quantity(item: &CatalogItem, requested: i64) -> StockCheck {
    let available = item.inventory.current_stock;

    if available == 0 {
        return StockCheck::OutOfStock;
    }

    if requested > available {
        return StockCheck::ExceedsStock {
            available,
            requested,
        };
    }

    StockCheck::Ok
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ItemId, StockLevel, TierPricing};

    fn item_with_stock(current_stock: i64) -> CatalogItem {
        CatalogItem {
            id: ItemId::new("550e8400-e29b-41d4-a716-446655440000"),
            is_variant: false,
            base_product_id: None,
            variant: None,
            name: "Mug".to_string(),
            display_name: "Ceramic Mug".to_string(),
            pricing: TierPricing::default(),
            inventory: StockLevel {
                current_stock,
                reorder_point: 5,
            },
            tax_rate_bps: None,
        }
    }

    #[test]
    fn test_zero_stock_is_out_of_stock() {
        let item = item_with_stock(0);
        assert_eq!(check_quantity(&item, 1), StockCheck::OutOfStock);
    }

    #[test]
    fn test_over_request_exceeds_stock() {
        let item = item_with_stock(3);
        assert_eq!(
            check_quantity(&item, 5),
            StockCheck::ExceedsStock {
                available: 3,
                requested: 5
            }
        );
    }

    #[test]
    fn test_within_stock_is_ok() {
        let item = item_with_stock(3);
        assert!(check_quantity(&item, 3).is_ok());
        assert!(check_quantity(&item, 1).is_ok());
    }

    #[test]
    fn test_into_result_names_the_item() {
        let item = item_with_stock(0);
        let err = check_quantity(&item, 1).into_result(&item).unwrap_err();
        assert_eq!(err.to_string(), "Ceramic Mug is out of stock");
    }
}
