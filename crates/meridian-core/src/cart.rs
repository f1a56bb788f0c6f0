//! # Cart Aggregate
//!
//! The order draft: an ordered collection of cart lines plus order-level
//! flags, with derived totals and customer-balance reconciliation.
//!
//! ## Line Identity & Recompute Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         CartLine Lifecycle                              │
//! │                                                                         │
//! │  add ──► CartLine { snapshot frozen, qty, unit_price, tax }            │
//! │             │                                                           │
//! │             ├── edit qty    ──► recompute tax, total                   │
//! │             ├── edit price  ──► manually_edited = true, recompute      │
//! │             ├── tier switch ──► rewritten ONLY if !manually_edited     │
//! │             ├── overlay     ──► price swapped, manually_edited kept    │
//! │             └── tax toggle  ──► tax recomputed, price untouched        │
//! │                                                                         │
//! │  Identity is positional: lines are addressed by index and do not       │
//! │  survive removals. The snapshot survives catalog refreshes.            │
//! │                                                                         │
//! │  Invariant: line_total == subtotal - discount + tax after ANY mutation │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{CatalogItem, CustomerRef, ItemId, OrderType, PriceTier, TaxRate};
use crate::DEFAULT_FLAT_TAX_BPS;

// =============================================================================
// Tax Context
// =============================================================================

/// Order-level inputs to per-line tax computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TaxContext {
    /// When set, every line's tax is zero regardless of rates.
    pub is_exempt: bool,
    /// Flat rate applied to lines that carry no rate of their own.
    pub flat_rate: TaxRate,
}

impl Default for TaxContext {
    fn default() -> Self {
        TaxContext {
            is_exempt: false,
            flat_rate: TaxRate::from_bps(DEFAULT_FLAT_TAX_BPS),
        }
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// A line item on the order draft.
///
/// ## Design Notes
/// - `snapshot`: frozen copy of the catalog item at add time. Display and
///   margin checks read the snapshot, so a catalog refresh mid-order never
///   corrupts an in-progress order.
/// - `manually_edited`: explicit flag set by operator price edits. Tier
///   switches skip flagged lines; the flag is never inferred from value
///   equality.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Catalog item id (duplicated from the snapshot for keyed lookups).
    pub item_id: ItemId,

    /// Catalog item as it looked when the line was added.
    pub snapshot: CatalogItem,

    /// Units ordered. Always > 0; a zero/negative edit removes the line.
    pub quantity: i64,

    /// Price per unit. May diverge from the tier-resolved price.
    pub unit_price: Money,

    /// Absolute discount on this line.
    pub discount: Money,

    /// Computed tax for this line (zero when the order is tax-exempt).
    pub tax: Money,

    /// True once the operator has edited the price by hand.
    pub manually_edited: bool,
}

impl CartLine {
    /// Creates a line from a catalog snapshot, computing tax from `ctx`.
    pub fn new(snapshot: CatalogItem, quantity: i64, unit_price: Money, ctx: &TaxContext) -> Self {
        let mut line = CartLine {
            item_id: snapshot.id.clone(),
            snapshot,
            quantity,
            unit_price,
            discount: Money::zero(),
            tax: Money::zero(),
            manually_edited: false,
        };
        line.recompute_tax(ctx);
        line
    }

    /// Line subtotal (unit price × quantity), before discount and tax.
    #[inline]
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    /// Line total: `subtotal - discount + tax`.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.subtotal() - self.discount + self.tax
    }

    /// Rate used for this line: its own rate, else the order's flat rate.
    #[inline]
    pub fn effective_tax_rate(&self, ctx: &TaxContext) -> TaxRate {
        self.snapshot.tax_rate().unwrap_or(ctx.flat_rate)
    }

    /// Recomputes the tax amount from the current price and quantity.
    pub fn recompute_tax(&mut self, ctx: &TaxContext) {
        self.tax = if ctx.is_exempt {
            Money::zero()
        } else {
            self.subtotal().apply_rate(self.effective_tax_rate(ctx))
        };
    }

    /// Updates the quantity and re-derives tax. Caller has already handled
    /// the implicit-remove case (`quantity <= 0`).
    pub fn set_quantity(&mut self, quantity: i64, ctx: &TaxContext) {
        self.quantity = quantity;
        self.recompute_tax(ctx);
    }

    /// Updates the unit price and re-derives tax. `manual` marks operator
    /// edits; tier resolution and overlay passes leave the flag alone.
    pub fn set_unit_price(&mut self, unit_price: Money, manual: bool, ctx: &TaxContext) {
        self.unit_price = unit_price;
        if manual {
            self.manually_edited = true;
        }
        self.recompute_tax(ctx);
    }

    /// Updates the line discount. Tax is computed on the undiscounted
    /// subtotal, so no recompute is needed.
    pub fn set_discount(&mut self, discount: Money) {
        self.discount = discount;
    }
}

// =============================================================================
// Order Totals
// =============================================================================

/// Derived order totals for the summary panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub subtotal: Money,
    pub total_discount: Money,
    pub total_tax: Money,
    pub total: Money,
}

// =============================================================================
// Order Draft
// =============================================================================

/// The in-progress order: lines plus order-level flags.
///
/// ## Lifecycle
/// Created empty on "new order" or reset; mutated by every cart operation;
/// cleared back to empty when submission succeeds or the draft is discarded.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub order_type: OrderType,
    pub price_tier: PriceTier,
    pub is_tax_exempt: bool,
    /// Auto-generated or manually entered order identifier.
    pub order_number: String,
    /// False once the operator takes over the order number as free text.
    pub auto_number: bool,
    pub notes: String,
    pub customer: Option<CustomerRef>,
    /// Flat rate for lines without an item-specific rate.
    pub flat_tax_rate: TaxRate,
    pub lines: Vec<CartLine>,
}

impl OrderDraft {
    /// Creates an empty draft with the given order number.
    pub fn new(order_number: String) -> Self {
        OrderDraft {
            order_type: OrderType::default(),
            price_tier: PriceTier::default(),
            is_tax_exempt: false,
            order_number,
            auto_number: true,
            notes: String::new(),
            customer: None,
            flat_tax_rate: TaxRate::from_bps(DEFAULT_FLAT_TAX_BPS),
            lines: Vec::new(),
        }
    }

    /// Current tax inputs derived from order-level flags.
    #[inline]
    pub fn tax_context(&self) -> TaxContext {
        TaxContext {
            is_exempt: self.is_tax_exempt,
            flat_rate: self.flat_tax_rate,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[inline]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Borrow a line by index, failing with the index and current length.
    pub fn line(&self, index: usize) -> Result<&CartLine, ValidationError> {
        self.lines.get(index).ok_or(ValidationError::UnknownLine {
            index,
            len: self.lines.len(),
        })
    }

    /// Mutably borrow a line by index.
    pub fn line_mut(&mut self, index: usize) -> Result<&mut CartLine, ValidationError> {
        let len = self.lines.len();
        self.lines
            .get_mut(index)
            .ok_or(ValidationError::UnknownLine { index, len })
    }

    /// Removes and returns the line at `index`.
    pub fn take_line(&mut self, index: usize) -> Result<CartLine, ValidationError> {
        if index >= self.lines.len() {
            return Err(ValidationError::UnknownLine {
                index,
                len: self.lines.len(),
            });
        }
        Ok(self.lines.remove(index))
    }

    /// Stable alphabetical sort by display name, case-insensitive.
    /// Pure reordering: nothing is recomputed.
    pub fn sort_lines_by_name(&mut self) {
        self.lines
            .sort_by_key(|line| line.snapshot.display_name.to_lowercase());
    }

    /// Recomputes every line's tax (after an exempt toggle or flat-rate
    /// change). Prices are never touched here.
    pub fn recompute_taxes(&mut self) {
        let ctx = self.tax_context();
        for line in &mut self.lines {
            line.recompute_tax(&ctx);
        }
    }

    /// Derived totals across all lines.
    ///
    /// `subtotal = Σ unit_price × qty`; tax is summed per line (zero when
    /// exempt); `total = subtotal - total_discount + total_tax`.
    pub fn totals(&self) -> OrderTotals {
        let subtotal: Money = self.lines.iter().map(|l| l.subtotal()).sum();
        let total_discount: Money = self.lines.iter().map(|l| l.discount).sum();
        let total_tax: Money = self.lines.iter().map(|l| l.tax).sum();

        OrderTotals {
            subtotal,
            total_discount,
            total_tax,
            total: subtotal - total_discount + total_tax,
        }
    }
}

// =============================================================================
// Customer Balance Reconciliation
// =============================================================================

/// Order total reconciled against the customer's running balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSummary {
    /// Receivable minus advance. Negative means the house owes the customer.
    pub net_balance: Money,
    /// True when the net balance is a payable (credit held for the customer).
    pub is_payable: bool,
    /// Order total plus the net balance carried forward.
    pub grand_total: Money,
}

/// Reconciles an order total with the customer's receivable and advance.
/// Pure; mutates nothing.
///
/// ## Example
/// ```rust
/// use meridian_core::cart::reconcile_balance;
/// use meridian_core::money::Money;
///
/// let summary = reconcile_balance(
///     Money::from_cents(20000),
///     Money::from_cents(5000),
///     Money::from_cents(13500),
/// );
/// assert_eq!(summary.net_balance.cents(), 15000);
/// assert!(!summary.is_payable);
/// assert_eq!(summary.grand_total.cents(), 28500);
/// ```
pub fn reconcile_balance(receivable: Money, advance: Money, total: Money) -> BalanceSummary {
    let net_balance = receivable - advance;
    BalanceSummary {
        net_balance,
        is_payable: net_balance.is_negative(),
        grand_total: total + net_balance,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{StockLevel, TierPricing};

    fn item(id: &str, name: &str) -> CatalogItem {
        CatalogItem {
            id: ItemId::new(id),
            is_variant: false,
            base_product_id: None,
            variant: None,
            name: name.to_string(),
            display_name: name.to_string(),
            pricing: TierPricing::default(),
            inventory: StockLevel {
                current_stock: 100,
                reorder_point: 0,
            },
            tax_rate_bps: None,
        }
    }

    fn line(id: &str, name: &str, qty: i64, price_cents: i64, ctx: &TaxContext) -> CartLine {
        CartLine::new(item(id, name), qty, Money::from_cents(price_cents), ctx)
    }

    const A: &str = "550e8400-e29b-41d4-a716-446655440000";
    const B: &str = "660e8400-e29b-41d4-a716-446655440000";

    #[test]
    fn test_line_total_invariant() {
        let ctx = TaxContext::default(); // 8% flat
        let mut l = line(A, "Mug", 2, 5000, &ctx);

        assert_eq!(l.subtotal().cents(), 10000);
        assert_eq!(l.tax.cents(), 800);
        assert_eq!(l.line_total(), l.subtotal() - l.discount + l.tax);

        l.set_discount(Money::from_cents(500));
        assert_eq!(l.line_total().cents(), 10000 - 500 + 800);

        l.set_quantity(3, &ctx);
        assert_eq!(l.line_total(), l.subtotal() - l.discount + l.tax);

        l.set_unit_price(Money::from_cents(4500), true, &ctx);
        assert!(l.manually_edited);
        assert_eq!(l.line_total(), l.subtotal() - l.discount + l.tax);
    }

    #[test]
    fn test_exempt_context_zeroes_tax() {
        let ctx = TaxContext {
            is_exempt: true,
            ..TaxContext::default()
        };
        let l = line(A, "Mug", 2, 5000, &ctx);
        assert!(l.tax.is_zero());
        assert_eq!(l.line_total().cents(), 10000);
    }

    #[test]
    fn test_item_rate_overrides_flat_rate() {
        let ctx = TaxContext::default(); // 8% flat
        let mut it = item(A, "Mug");
        it.tax_rate_bps = Some(500); // 5%
        let l = CartLine::new(it, 1, Money::from_cents(10000), &ctx);
        assert_eq!(l.tax.cents(), 500);
    }

    #[test]
    fn test_totals_two_line_scenario() {
        // qty 2 @ 50.00 + qty 1 @ 25.00, flat 8%, not exempt
        let mut draft = OrderDraft::new("SO-GEN-20250301-0001".to_string());
        let ctx = draft.tax_context();
        draft.lines.push(line(A, "Mug", 2, 5000, &ctx));
        draft.lines.push(line(B, "Plate", 1, 2500, &ctx));

        let totals = draft.totals();
        assert_eq!(totals.subtotal.cents(), 12500);
        assert_eq!(totals.total_tax.cents(), 1000);
        assert_eq!(totals.total_discount.cents(), 0);
        assert_eq!(totals.total.cents(), 13500);
    }

    #[test]
    fn test_totals_empty_order() {
        let draft = OrderDraft::new("SO-GEN-20250301-0001".to_string());
        let totals = draft.totals();
        assert_eq!(totals.subtotal, Money::zero());
        assert_eq!(totals.total_discount, Money::zero());
        assert_eq!(totals.total_tax, Money::zero());
        assert_eq!(totals.total, Money::zero());
    }

    #[test]
    fn test_sort_lines_by_name_is_case_insensitive_and_stable() {
        let mut draft = OrderDraft::new("SO-GEN-20250301-0001".to_string());
        let ctx = draft.tax_context();
        draft.lines.push(line(A, "zinc plate", 1, 100, &ctx));
        draft.lines.push(line(B, "Anvil", 1, 200, &ctx));
        draft.lines.push(line(A, "anvil", 1, 300, &ctx));

        draft.sort_lines_by_name();

        let names: Vec<&str> = draft
            .lines
            .iter()
            .map(|l| l.snapshot.display_name.as_str())
            .collect();
        assert_eq!(names, vec!["Anvil", "anvil", "zinc plate"]);
        // Stable: equal keys keep insertion order
        assert_eq!(draft.lines[0].unit_price.cents(), 200);
        assert_eq!(draft.lines[1].unit_price.cents(), 300);
    }

    #[test]
    fn test_take_line_out_of_bounds() {
        let mut draft = OrderDraft::new("SO-GEN-20250301-0001".to_string());
        let err = draft.take_line(0).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownLine { index: 0, len: 0 }));
    }

    #[test]
    fn test_totals_serialize_camel_case_for_frontend() {
        let totals = OrderTotals {
            subtotal: Money::from_cents(12500),
            total_discount: Money::zero(),
            total_tax: Money::from_cents(1000),
            total: Money::from_cents(13500),
        };
        let json = serde_json::to_value(totals).unwrap();
        assert_eq!(json["subtotal"], 12500);
        assert_eq!(json["totalDiscount"], 0);
        assert_eq!(json["totalTax"], 1000);
        assert_eq!(json["total"], 13500);
    }

    #[test]
    fn test_reconcile_balance_receivable() {
        let summary = reconcile_balance(
            Money::from_cents(20000),
            Money::from_cents(5000),
            Money::from_cents(13500),
        );
        assert_eq!(summary.net_balance.cents(), 15000);
        assert!(!summary.is_payable);
        assert_eq!(summary.grand_total.cents(), 28500);
    }

    #[test]
    fn test_reconcile_balance_payable() {
        // Advance exceeds receivable: the order is partly pre-paid
        let summary = reconcile_balance(
            Money::from_cents(1000),
            Money::from_cents(6000),
            Money::from_cents(13500),
        );
        assert_eq!(summary.net_balance.cents(), -5000);
        assert!(summary.is_payable);
        assert_eq!(summary.grand_total.cents(), 8500);
    }
}
