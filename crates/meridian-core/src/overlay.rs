//! # Historical Price Overlay
//!
//! Reversible substitution of cart line prices with the customer's previous
//! order prices.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Overlay State Machine                                │
//! │                                                                         │
//! │                  apply(history)                                         │
//! │   ┌──────────┐ ───────────────────► ┌──────────┐                       │
//! │   │ Original │                      │ Overlaid │ ──┐ apply(history)    │
//! │   │          │ ◄─────────────────── │          │ ◄─┘ (re-capture,      │
//! │   └──────────┘  restore()           └──────────┘     idempotent)       │
//! │        ▲          clear()                │                              │
//! │        └──────────────────────────────── │  line removed:              │
//! │          (customer switch, order reset)  └─► forget(id) - entries      │
//! │                                              purged, state unchanged   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The aggregate validates customer/cart preconditions before fetching
//! history; this module owns the capture/rewrite/restore mechanics. History
//! is customer-scoped, so a customer switch must discard the overlay - a
//! stale mapping surviving a switch would silently misprice the next order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::cart::{CartLine, TaxContext};
use crate::error::HistoryError;
use crate::money::Money;
use crate::types::{ItemId, LastOrderPrices};

// =============================================================================
// Status Types
// =============================================================================

/// Per-line classification after an overlay apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OverlayLineStatus {
    /// The historical price differed and was applied.
    Updated,
    /// The historical price matched the current price.
    Unchanged,
    /// The item did not appear on the prior order; price left untouched.
    NotFound,
}

/// Provenance of the applied prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OverlaySource {
    pub order_number: String,
    #[ts(as = "String")]
    pub order_date: DateTime<Utc>,
}

/// Counts returned from an apply, for caller messaging
/// ("3 prices updated, 1 unchanged, 2 not on last order").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OverlaySummary {
    pub updated: usize,
    pub unchanged: usize,
    pub not_found: usize,
    pub source: OverlaySource,
}

/// Read-only projection of the overlay state for the UI.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OverlayStatus {
    pub is_applied: bool,
    pub line_status: HashMap<ItemId, OverlayLineStatus>,
    pub source: Option<OverlaySource>,
}

// =============================================================================
// Price Overlay
// =============================================================================

/// Per-session overlay state: captured originals and per-line statuses.
#[derive(Debug, Clone, Default)]
pub struct PriceOverlay {
    original_prices: HashMap<ItemId, Money>,
    line_status: HashMap<ItemId, OverlayLineStatus>,
    applied: bool,
    source: Option<OverlaySource>,
}

impl PriceOverlay {
    pub fn new() -> Self {
        PriceOverlay::default()
    }

    /// True while last-order prices are applied.
    #[inline]
    pub fn is_applied(&self) -> bool {
        self.applied
    }

    /// Applies last-order prices onto the given lines.
    ///
    /// Captures every line's current price first (a re-apply overwrites the
    /// prior capture, so the operation reads as idempotent to the user),
    /// then rewrites lines whose item has a differing historical price,
    /// recomputing tax via `ctx`. Returns classification counts.
    ///
    /// Fails with `NoPriorOrder` when the history map is empty; state is
    /// left untouched in that case.
    pub fn apply(
        &mut self,
        lines: &mut [CartLine],
        history: &LastOrderPrices,
        ctx: &TaxContext,
    ) -> Result<OverlaySummary, HistoryError> {
        if history.prices.is_empty() {
            return Err(HistoryError::NoPriorOrder);
        }

        self.original_prices.clear();
        self.line_status.clear();

        let mut updated = 0;
        let mut unchanged = 0;
        let mut not_found = 0;

        for line in lines.iter_mut() {
            self.original_prices
                .insert(line.item_id.clone(), line.unit_price);

            let status = match history.prices.get(&line.item_id) {
                Some(&historical) if historical != line.unit_price => {
                    // Overlay is not a manual edit; the flag is preserved
                    line.set_unit_price(historical, false, ctx);
                    updated += 1;
                    OverlayLineStatus::Updated
                }
                Some(_) => {
                    unchanged += 1;
                    OverlayLineStatus::Unchanged
                }
                None => {
                    not_found += 1;
                    OverlayLineStatus::NotFound
                }
            };
            self.line_status.insert(line.item_id.clone(), status);
        }

        let source = OverlaySource {
            order_number: history.order_number.clone(),
            order_date: history.order_date,
        };
        self.applied = true;
        self.source = Some(source.clone());

        Ok(OverlaySummary {
            updated,
            unchanged,
            not_found,
            source,
        })
    }

    /// Restores every captured price and clears the overlay.
    ///
    /// Returns the number of lines whose price was put back. Fails with
    /// `NothingToRestore` when no capture exists.
    pub fn restore(
        &mut self,
        lines: &mut [CartLine],
        ctx: &TaxContext,
    ) -> Result<usize, HistoryError> {
        if self.original_prices.is_empty() {
            return Err(HistoryError::NothingToRestore);
        }

        let mut restored = 0;
        for line in lines.iter_mut() {
            if let Some(&original) = self.original_prices.get(&line.item_id) {
                if original != line.unit_price {
                    line.set_unit_price(original, false, ctx);
                }
                restored += 1;
            }
        }

        self.original_prices.clear();
        self.line_status.clear();
        self.applied = false;
        self.source = None;

        Ok(restored)
    }

    /// Purges one item's entries after its line is removed. The overlay
    /// stays applied for the remaining lines.
    pub fn forget(&mut self, id: &ItemId) {
        self.original_prices.remove(id);
        self.line_status.remove(id);
    }

    /// Discards all overlay state (customer switch or order reset).
    pub fn clear(&mut self) {
        self.original_prices.clear();
        self.line_status.clear();
        self.applied = false;
        self.source = None;
    }

    /// Captured original price for an item, while overlaid.
    pub fn original_price(&self, id: &ItemId) -> Option<Money> {
        self.original_prices.get(id).copied()
    }

    /// Read-only projection for the UI.
    pub fn status(&self) -> OverlayStatus {
        OverlayStatus {
            is_applied: self.applied,
            line_status: self.line_status.clone(),
            source: self.source.clone(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CatalogItem, StockLevel, TierPricing};
    use chrono::TimeZone;

    const A: &str = "550e8400-e29b-41d4-a716-446655440000";
    const B: &str = "660e8400-e29b-41d4-a716-446655440000";
    const C: &str = "770e8400-e29b-41d4-a716-446655440000";

    fn line(id: &str, price_cents: i64, ctx: &TaxContext) -> CartLine {
        let item = CatalogItem {
            id: ItemId::new(id),
            is_variant: false,
            base_product_id: None,
            variant: None,
            name: format!("Item {id}"),
            display_name: format!("Item {id}"),
            pricing: TierPricing::default(),
            inventory: StockLevel {
                current_stock: 100,
                reorder_point: 0,
            },
            tax_rate_bps: None,
        };
        CartLine::new(item, 1, Money::from_cents(price_cents), ctx)
    }

    fn history(entries: &[(&str, i64)]) -> LastOrderPrices {
        LastOrderPrices {
            prices: entries
                .iter()
                .map(|(id, cents)| (ItemId::new(*id), Money::from_cents(*cents)))
                .collect(),
            order_number: "SO-ACM-20250110-1234".to_string(),
            order_date: Utc.with_ymd_and_hms(2025, 1, 10, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_apply_classifies_lines() {
        let ctx = TaxContext::default();
        let mut lines = vec![line(A, 5000, &ctx), line(B, 2500, &ctx), line(C, 900, &ctx)];
        let mut overlay = PriceOverlay::new();

        let summary = overlay
            .apply(&mut lines, &history(&[(A, 4200), (B, 2500)]), &ctx)
            .unwrap();

        assert_eq!(summary.updated, 1);
        assert_eq!(summary.unchanged, 1);
        assert_eq!(summary.not_found, 1);
        assert_eq!(summary.source.order_number, "SO-ACM-20250110-1234");

        assert!(overlay.is_applied());
        assert_eq!(lines[0].unit_price.cents(), 4200); // updated
        assert_eq!(lines[1].unit_price.cents(), 2500); // unchanged
        assert_eq!(lines[2].unit_price.cents(), 900); // not found, untouched

        let status = overlay.status();
        assert_eq!(
            status.line_status.get(&ItemId::new(A)),
            Some(&OverlayLineStatus::Updated)
        );
        assert_eq!(
            status.line_status.get(&ItemId::new(C)),
            Some(&OverlayLineStatus::NotFound)
        );
    }

    #[test]
    fn test_apply_recomputes_tax() {
        let ctx = TaxContext::default(); // 8% flat
        let mut lines = vec![line(A, 5000, &ctx)];
        let mut overlay = PriceOverlay::new();

        overlay
            .apply(&mut lines, &history(&[(A, 4200)]), &ctx)
            .unwrap();

        assert_eq!(lines[0].tax.cents(), 336); // 4200 * 8%
        assert_eq!(
            lines[0].line_total(),
            lines[0].subtotal() - lines[0].discount + lines[0].tax
        );
    }

    #[test]
    fn test_apply_restore_round_trip() {
        let ctx = TaxContext::default();
        let mut lines = vec![line(A, 5000, &ctx), line(B, 2500, &ctx)];
        let mut overlay = PriceOverlay::new();

        overlay
            .apply(&mut lines, &history(&[(A, 4200), (B, 2600)]), &ctx)
            .unwrap();
        let restored = overlay.restore(&mut lines, &ctx).unwrap();

        assert_eq!(restored, 2);
        assert_eq!(lines[0].unit_price.cents(), 5000);
        assert_eq!(lines[1].unit_price.cents(), 2500);
        assert!(!overlay.is_applied());
        assert!(overlay.status().line_status.is_empty());
    }

    #[test]
    fn test_reapply_overwrites_capture() {
        let ctx = TaxContext::default();
        let mut lines = vec![line(A, 5000, &ctx)];
        let mut overlay = PriceOverlay::new();

        overlay
            .apply(&mut lines, &history(&[(A, 4200)]), &ctx)
            .unwrap();
        // Second apply captures the already-overlaid price; the user sees
        // the same end state either way
        overlay
            .apply(&mut lines, &history(&[(A, 4200)]), &ctx)
            .unwrap();

        assert_eq!(overlay.original_price(&ItemId::new(A)).unwrap().cents(), 4200);
        overlay.restore(&mut lines, &ctx).unwrap();
        assert_eq!(lines[0].unit_price.cents(), 4200);
    }

    #[test]
    fn test_empty_history_is_no_prior_order() {
        let ctx = TaxContext::default();
        let mut lines = vec![line(A, 5000, &ctx)];
        let mut overlay = PriceOverlay::new();

        let err = overlay.apply(&mut lines, &history(&[]), &ctx).unwrap_err();
        assert!(matches!(err, HistoryError::NoPriorOrder));
        assert!(!overlay.is_applied());
        assert_eq!(lines[0].unit_price.cents(), 5000);
    }

    #[test]
    fn test_restore_without_capture() {
        let ctx = TaxContext::default();
        let mut lines = vec![line(A, 5000, &ctx)];
        let mut overlay = PriceOverlay::new();

        let err = overlay.restore(&mut lines, &ctx).unwrap_err();
        assert!(matches!(err, HistoryError::NothingToRestore));
    }

    #[test]
    fn test_forget_purges_one_item_only() {
        let ctx = TaxContext::default();
        let mut lines = vec![line(A, 5000, &ctx), line(B, 2500, &ctx)];
        let mut overlay = PriceOverlay::new();

        overlay
            .apply(&mut lines, &history(&[(A, 4200), (B, 2600)]), &ctx)
            .unwrap();
        overlay.forget(&ItemId::new(A));

        assert!(overlay.is_applied()); // state unchanged
        assert!(overlay.original_price(&ItemId::new(A)).is_none());
        assert!(overlay.original_price(&ItemId::new(B)).is_some());
        assert!(overlay
            .status()
            .line_status
            .contains_key(&ItemId::new(B)));
    }

    #[test]
    fn test_clear_discards_everything() {
        let ctx = TaxContext::default();
        let mut lines = vec![line(A, 5000, &ctx)];
        let mut overlay = PriceOverlay::new();

        overlay
            .apply(&mut lines, &history(&[(A, 4200)]), &ctx)
            .unwrap();
        overlay.clear();

        assert!(!overlay.is_applied());
        assert!(overlay.status().source.is_none());
        assert!(overlay.original_price(&ItemId::new(A)).is_none());
    }
}
