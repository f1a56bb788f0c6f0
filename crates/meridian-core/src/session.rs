//! # Order Session
//!
//! Wires the aggregate together: one `OrderDraft` plus its overlay state and
//! cost cache, mutated through operations that run the stock guard and
//! margin analyzer in the right order.
//!
//! ## Operation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      add_line(item, qty, price)                         │
//! │                                                                         │
//! │  validate qty/price ──► stock guard ──► margin analyzer ──► commit     │
//! │        │                    │                 │                │        │
//! │        ▼                    ▼                 ▼                ▼        │
//! │  ValidationError      StockError        RequiresConfirmation  line     │
//! │  (hard fail)          (hard fail,       (soft gate: nothing   appended,│
//! │                       override_stock    mutated; caller       cache    │
//! │                       bypasses)         re-calls with         seeded   │
//! │                                         accept_below_cost)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The session is synchronous and single-owner: no locking, no I/O. The
//! orders crate wraps it for concurrency and performs the collaborator
//! fetches, handing results in as plain data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::cart::{reconcile_balance, BalanceSummary, CartLine, OrderDraft, OrderTotals};
use crate::error::{CoreResult, StockError, ValidationError};
use crate::margin::{evaluate_line, order_profit, resolve_line_cost, CostCache, MarginStatus};
use crate::money::Money;
use crate::order_number;
use crate::overlay::{OverlayStatus, OverlaySummary, PriceOverlay};
use crate::pricing::resolve_unit_price;
use crate::stock::check_quantity;
use crate::types::{
    CatalogItem, CustomerBalances, CustomerRef, ItemId, LastOrderPrices, OrderType, PriceTier,
    TaxRate,
};
use crate::validation::{
    validate_discount, validate_line_count, validate_order_number, validate_quantity,
    validate_unit_price,
};

// =============================================================================
// Policies & Outcomes
// =============================================================================

/// Caller-supplied overrides for the soft gates on a line mutation.
///
/// Defaults gate everything: stock violations hard-fail and a below-cost
/// price returns a needs-confirmation outcome. The UI re-calls with the
/// relevant flag set after the operator confirms.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AddPolicy {
    /// Commit even when the stock guard reports a violation.
    pub override_stock: bool,
    /// Commit even when the price is below the last known cost.
    pub accept_below_cost: bool,
}

/// Result of an add or price-edit operation.
///
/// `RequiresConfirmation` means nothing was mutated: the engine surfaces the
/// margin classification and waits for the caller to decide. This is a plain
/// result object - focus and dialog flow belong to the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum LineOutcome {
    Committed { index: usize, margin: MarginStatus },
    RequiresConfirmation { margin: MarginStatus },
}

impl LineOutcome {
    /// True when the mutation was applied.
    pub fn is_committed(&self) -> bool {
        matches!(self, LineOutcome::Committed { .. })
    }
}

/// Result of a quantity edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum QuantityOutcome {
    Updated { index: usize },
    /// The edit reduced the quantity to zero or below: implicit remove.
    Removed,
}

// =============================================================================
// Order Session
// =============================================================================

/// One in-progress order: draft + overlay state + cost cache.
///
/// All three live and die together - reset or successful submission discards
/// them as a unit, and nothing is shared across sessions.
#[derive(Debug, Clone)]
pub struct OrderSession {
    draft: OrderDraft,
    overlay: PriceOverlay,
    cost_cache: CostCache,
}

impl OrderSession {
    /// Creates an empty session with an auto-generated order number.
    pub fn new(at: DateTime<Utc>) -> Self {
        OrderSession {
            draft: OrderDraft::new(order_number::generate(None, at)),
            overlay: PriceOverlay::new(),
            cost_cache: CostCache::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Projections
    // -------------------------------------------------------------------------

    #[inline]
    pub fn draft(&self) -> &OrderDraft {
        &self.draft
    }

    #[inline]
    pub fn lines(&self) -> &[CartLine] {
        &self.draft.lines
    }

    #[inline]
    pub fn totals(&self) -> OrderTotals {
        self.draft.totals()
    }

    #[inline]
    pub fn overlay_status(&self) -> OverlayStatus {
        self.overlay.status()
    }

    /// Estimated profit across the order, from cached costs and snapshots.
    #[inline]
    pub fn order_profit(&self) -> Money {
        order_profit(&self.draft.lines, &self.cost_cache)
    }

    /// Order total reconciled against the customer's running balance.
    pub fn reconcile(&self, balances: &CustomerBalances) -> BalanceSummary {
        reconcile_balance(
            balances.pending_balance,
            balances.advance_balance,
            self.totals().total,
        )
    }

    // -------------------------------------------------------------------------
    // Cost cache access (used by the async fetch wrapper)
    // -------------------------------------------------------------------------

    /// Whether a cost entry (hit or known miss) exists for the lookup id.
    pub fn has_cost_for(&self, id: &ItemId) -> bool {
        self.cost_cache.contains(id)
    }

    /// Records a fetched last-purchase price (or a known miss).
    pub fn record_cost(&mut self, id: ItemId, cost: Option<Money>) {
        self.cost_cache.record(id, cost);
    }

    // -------------------------------------------------------------------------
    // Line mutations
    // -------------------------------------------------------------------------

    /// Adds a line for `item`.
    ///
    /// `unit_price` of `None` resolves the price from the order's tier.
    /// Stock violations hard-fail unless `policy.override_stock`; a
    /// below-cost price returns `RequiresConfirmation` (no mutation) unless
    /// `policy.accept_below_cost`.
    pub fn add_line(
        &mut self,
        item: &CatalogItem,
        quantity: i64,
        unit_price: Option<Money>,
        policy: AddPolicy,
    ) -> CoreResult<LineOutcome> {
        validate_line_count(self.draft.line_count())?;
        validate_quantity(quantity)?;

        let price = unit_price.unwrap_or_else(|| resolve_unit_price(item, self.draft.price_tier));
        validate_unit_price(price)?;

        if !policy.override_stock {
            check_quantity(item, quantity).into_result(item)?;
        }

        let cost_id = item.cost_lookup_id().clone();
        let known_cost = match self.cost_cache.get(&cost_id) {
            Some(cached) => cached.or(item.pricing.cost),
            None => item.pricing.cost,
        };
        let margin = evaluate_line(price, known_cost);

        if margin.is_below_cost() && !policy.accept_below_cost {
            return Ok(LineOutcome::RequiresConfirmation { margin });
        }

        let ctx = self.draft.tax_context();
        self.draft
            .lines
            .push(CartLine::new(item.clone(), quantity, price, &ctx));
        // Seed only a real snapshot cost: an absent cost must not occupy the
        // cache slot, or a failed upstream fetch could never be retried
        if let Some(snapshot_cost) = item.pricing.cost {
            self.cost_cache
                .seed_from_snapshot(cost_id, Some(snapshot_cost));
        }

        Ok(LineOutcome::Committed {
            index: self.draft.line_count() - 1,
            margin,
        })
    }

    /// Updates a line's quantity. `quantity <= 0` removes the line.
    pub fn update_quantity(
        &mut self,
        index: usize,
        quantity: i64,
        policy: AddPolicy,
    ) -> CoreResult<QuantityOutcome> {
        if quantity <= 0 {
            self.remove_line(index)?;
            return Ok(QuantityOutcome::Removed);
        }

        validate_quantity(quantity)?;

        let ctx = self.draft.tax_context();
        let line = self.draft.line_mut(index)?;

        if !policy.override_stock {
            check_quantity(&line.snapshot, quantity).into_result(&line.snapshot)?;
        }

        line.set_quantity(quantity, &ctx);
        Ok(QuantityOutcome::Updated { index })
    }

    /// Updates a line's unit price as an operator edit.
    ///
    /// The below-cost gate fires only when the edit *newly* crosses below
    /// cost - repricing an already-below-cost line does not re-prompt.
    pub fn update_unit_price(
        &mut self,
        index: usize,
        unit_price: Money,
        policy: AddPolicy,
    ) -> CoreResult<LineOutcome> {
        validate_unit_price(unit_price)?;

        let ctx = self.draft.tax_context();
        let line = self.draft.line(index)?;

        let cost = resolve_line_cost(line, &self.cost_cache);
        let previous = evaluate_line(line.unit_price, cost);
        let proposed = evaluate_line(unit_price, cost);

        if proposed.is_below_cost() && !previous.is_below_cost() && !policy.accept_below_cost {
            return Ok(LineOutcome::RequiresConfirmation { margin: proposed });
        }

        let line = self.draft.line_mut(index)?;
        line.set_unit_price(unit_price, true, &ctx);

        Ok(LineOutcome::Committed {
            index,
            margin: proposed,
        })
    }

    /// Sets a line's absolute discount.
    pub fn set_line_discount(&mut self, index: usize, discount: Money) -> CoreResult<()> {
        let line = self.draft.line_mut(index)?;
        validate_discount(discount, line.subtotal())?;
        line.set_discount(discount);
        Ok(())
    }

    /// Removes the line at `index`, purging its overlay and cost-cache
    /// entries.
    pub fn remove_line(&mut self, index: usize) -> CoreResult<CartLine> {
        let line = self.draft.take_line(index)?;
        self.overlay.forget(&line.item_id);
        self.cost_cache.forget(line.snapshot.cost_lookup_id());
        Ok(line)
    }

    /// Stable alphabetical sort by display name. Pure reordering.
    pub fn sort_lines_by_name(&mut self) {
        self.draft.sort_lines_by_name();
    }

    // -------------------------------------------------------------------------
    // Order-level flags
    // -------------------------------------------------------------------------

    /// Switches the price tier, re-resolving every line the operator has not
    /// manually priced. Returns the number of lines rewritten.
    pub fn set_price_tier(&mut self, tier: PriceTier) -> usize {
        self.draft.price_tier = tier;
        let ctx = self.draft.tax_context();

        let mut rewritten = 0;
        for line in &mut self.draft.lines {
            if line.manually_edited {
                continue;
            }
            let resolved = resolve_unit_price(&line.snapshot, tier);
            if resolved != line.unit_price {
                line.set_unit_price(resolved, false, &ctx);
                rewritten += 1;
            }
        }
        rewritten
    }

    /// Toggles tax exemption, recomputing every line's tax. Prices are
    /// untouched, so toggling back restores the previous tax amounts.
    pub fn set_tax_exempt(&mut self, exempt: bool) {
        self.draft.is_tax_exempt = exempt;
        self.draft.recompute_taxes();
    }

    /// Changes the flat tax rate used by lines without their own rate.
    pub fn set_flat_tax_rate(&mut self, rate: TaxRate) {
        self.draft.flat_tax_rate = rate;
        self.draft.recompute_taxes();
    }

    pub fn set_order_type(&mut self, order_type: OrderType) {
        self.draft.order_type = order_type;
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.draft.notes = notes.into();
    }

    /// Switches the active customer.
    ///
    /// History is customer-scoped, so any overlay state is discarded; the
    /// order number is regenerated when auto-numbering is on.
    pub fn set_customer(&mut self, customer: Option<CustomerRef>, at: DateTime<Utc>) {
        self.draft.customer = customer;
        self.overlay.clear();
        if self.draft.auto_number {
            self.regenerate_order_number(at);
        }
    }

    // -------------------------------------------------------------------------
    // Order number
    // -------------------------------------------------------------------------

    /// Regenerates the order number from the current customer and `at`.
    pub fn regenerate_order_number(&mut self, at: DateTime<Utc>) {
        let name = self.draft.customer.as_ref().map(|c| c.display_name.as_str());
        self.draft.order_number = order_number::generate(name, at);
    }

    /// Takes over the order number as free text (disables auto-numbering).
    pub fn set_manual_order_number(&mut self, number: &str) -> CoreResult<()> {
        validate_order_number(number)?;
        self.draft.order_number = number.trim().to_string();
        self.draft.auto_number = false;
        Ok(())
    }

    /// Re-enables auto-numbering and generates a fresh number.
    pub fn enable_auto_number(&mut self, at: DateTime<Utc>) {
        self.draft.auto_number = true;
        self.regenerate_order_number(at);
    }

    // -------------------------------------------------------------------------
    // Historical price overlay
    // -------------------------------------------------------------------------

    /// Applies the customer's last-order prices onto the current lines.
    ///
    /// Requires a customer and a non-empty cart; `NoPriorOrder` when the
    /// history map is empty. See [`PriceOverlay::apply`] for the mechanics.
    pub fn apply_last_prices(&mut self, history: &LastOrderPrices) -> CoreResult<OverlaySummary> {
        if self.draft.customer.is_none() {
            return Err(ValidationError::NoCustomer.into());
        }
        if self.draft.is_empty() {
            return Err(ValidationError::EmptyOrder.into());
        }

        let ctx = self.draft.tax_context();
        let summary = self.overlay.apply(&mut self.draft.lines, history, &ctx)?;
        Ok(summary)
    }

    /// Restores the pre-overlay prices. `NothingToRestore` when no overlay
    /// is active.
    pub fn restore_original_prices(&mut self) -> CoreResult<usize> {
        let ctx = self.draft.tax_context();
        let restored = self.overlay.restore(&mut self.draft.lines, &ctx)?;
        Ok(restored)
    }

    // -------------------------------------------------------------------------
    // Submission support & lifecycle
    // -------------------------------------------------------------------------

    /// Re-validates every line against live catalog data at submission time.
    ///
    /// Quantities are aggregated per item id (two lines of the same item
    /// compete for the same stock), and an item missing from the live
    /// catalog counts as out of stock. The draft is left untouched either
    /// way; the caller surfaces the stock error and the operator adjusts.
    pub fn revalidate_stock(&self, live_items: &[CatalogItem]) -> CoreResult<()> {
        let live: HashMap<&ItemId, &CatalogItem> =
            live_items.iter().map(|item| (&item.id, item)).collect();

        let mut requested: HashMap<&ItemId, i64> = HashMap::new();
        for line in &self.draft.lines {
            *requested.entry(&line.item_id).or_insert(0) += line.quantity;
        }

        for line in &self.draft.lines {
            let total = requested[&line.item_id];
            match live.get(&line.item_id) {
                Some(item) => check_quantity(item, total).into_result(item)?,
                None => {
                    return Err(StockError::OutOfStock {
                        item: line.snapshot.display_name.clone(),
                    }
                    .into())
                }
            }
        }

        Ok(())
    }

    /// Clears the session back to a fresh, empty order.
    ///
    /// Draft, overlay state and cost cache are discarded together; a new
    /// auto-generated order number is issued.
    pub fn reset(&mut self, at: DateTime<Utc>) {
        self.draft = OrderDraft::new(order_number::generate(None, at));
        self.overlay.clear();
        self.cost_cache.clear();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
