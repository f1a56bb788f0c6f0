//! # Margin Analyzer
//!
//! Classifies proposed sale prices against last known purchase costs and
//! aggregates order-level estimated profit.
//!
//! ## Where Costs Come From
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Cost Resolution Priority                            │
//! │                                                                         │
//! │  1. CostCache entry (last purchase price fetched on first add)         │
//! │  2. Snapshot's own cost tier (TierPricing.cost)                        │
//! │  3. Zero (no cost data - profit contribution equals revenue)           │
//! │                                                                         │
//! │  The cache is populated lazily, consulted, and never recomputed.       │
//! │  A failed upstream fetch is NOT cached, so a later add retries it.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The analyzer never blocks: a below-cost classification becomes a
//! caller-level confirmation gate in the aggregate, not an error here.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::cart::CartLine;
use crate::money::Money;
use crate::types::ItemId;

// =============================================================================
// Margin Status
// =============================================================================

/// Classification of a proposed sale price against a cost price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum MarginStatus {
    /// No cost is known for the item; no warning can be given.
    NoCostData,
    /// Sale price covers the cost.
    AtOrAboveCost,
    /// Sale price is below the last known purchase cost.
    BelowCost {
        /// Absolute loss per unit (cost - sale price).
        loss_per_unit: Money,
        /// Loss as a percentage of cost, for operator display.
        loss_percent: f64,
    },
}

impl MarginStatus {
    /// True when the line would sell below cost.
    #[inline]
    pub fn is_below_cost(&self) -> bool {
        matches!(self, MarginStatus::BelowCost { .. })
    }
}

/// Classifies a sale price against a cost price.
///
/// ## Example
/// ```rust
/// use meridian_core::margin::{evaluate_line, MarginStatus};
/// use meridian_core::money::Money;
///
/// let status = evaluate_line(Money::from_cents(8000), Some(Money::from_cents(10000)));
/// match status {
///     MarginStatus::BelowCost { loss_per_unit, loss_percent } => {
///         assert_eq!(loss_per_unit.cents(), 2000);
///         assert!((loss_percent - 20.0).abs() < 1e-9);
///     }
///     _ => panic!("expected below-cost"),
/// }
/// ```
pub fn evaluate_line(sale_price: Money, cost_price: Option<Money>) -> MarginStatus {
    let cost = match cost_price {
        Some(cost) => cost,
        None => return MarginStatus::NoCostData,
    };

    if sale_price >= cost {
        return MarginStatus::AtOrAboveCost;
    }

    let loss_per_unit = cost - sale_price;
    // cost > sale_price >= 0 here, so cost is strictly positive
    let loss_percent = loss_per_unit.cents() as f64 / cost.cents() as f64 * 100.0;

    MarginStatus::BelowCost {
        loss_per_unit,
        loss_percent,
    }
}

// =============================================================================
// Cost Cache
// =============================================================================

/// Per-session cache of last purchase prices, keyed by canonical item id.
///
/// A `Some(None)` entry records a *known* miss (the backend reported no
/// purchase history) so the margin analyzer degrades to `NoCostData`
/// instead of warning on a zero cost.
#[derive(Debug, Clone, Default)]
pub struct CostCache {
    entries: HashMap<ItemId, Option<Money>>,
}

impl CostCache {
    pub fn new() -> Self {
        CostCache {
            entries: HashMap::new(),
        }
    }

    /// Records a fetched cost (or a known miss) for an item.
    pub fn record(&mut self, id: ItemId, cost: Option<Money>) {
        self.entries.insert(id, cost);
    }

    /// Records the snapshot's own cost tier, only if nothing is cached yet.
    pub fn seed_from_snapshot(&mut self, id: ItemId, snapshot_cost: Option<Money>) {
        self.entries.entry(id).or_insert(snapshot_cost);
    }

    /// Cached cost for an item, if any entry exists.
    pub fn get(&self, id: &ItemId) -> Option<Option<Money>> {
        self.entries.get(id).copied()
    }

    /// Whether an entry (hit or known miss) exists for the item.
    pub fn contains(&self, id: &ItemId) -> bool {
        self.entries.contains_key(id)
    }

    /// Drops the entry for an item (line removed from the order).
    pub fn forget(&mut self, id: &ItemId) {
        self.entries.remove(id);
    }

    /// Drops every entry (order reset).
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Resolves the effective cost for a cart line: cache hit, then the
/// snapshot's own cost tier, then `None`.
pub fn resolve_line_cost(line: &CartLine, cache: &CostCache) -> Option<Money> {
    match cache.get(line.snapshot.cost_lookup_id()) {
        Some(cached) => cached.or(line.snapshot.pricing.cost),
        None => line.snapshot.pricing.cost,
    }
}

/// Estimated profit across the whole order.
///
/// Per line: cost resolves via [`resolve_line_cost`] with a zero fallback;
/// the contribution is `(unit_price - cost) * quantity`. Lines with no cost
/// data contribute their full revenue.
pub fn order_profit(lines: &[CartLine], cache: &CostCache) -> Money {
    lines
        .iter()
        .map(|line| {
            let cost = resolve_line_cost(line, cache).unwrap_or_else(Money::zero);
            (line.unit_price - cost).multiply_quantity(line.quantity)
        })
        .sum()
}

// =============================================================================
// Unit Tests
// =============================================================================
