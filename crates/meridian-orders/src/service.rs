//! # Order Service
//!
//! The async facade the admin console talks to. Wraps one [`SessionState`]
//! plus the injected collaborators, exposing:
//!
//! - synchronous passthroughs for every cart mutation, and
//! - the fetch-and-apply wrappers that suspend on collaborator I/O
//!   (last-purchase cost on first add, last-order prices, submission).
//!
//! ## Fetch-And-Apply Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. read what the fetch needs under the lock, release                  │
//! │  2. await the collaborator (NO lock held)                              │
//! │  3. on success: re-acquire lock, apply result synchronously            │
//! │  4. on failure: engine state untouched, retryable Upstream error       │
//! │                                                                         │
//! │  No internal de-duplication: while a fetch is in flight the UI must    │
//! │  disable the triggering control.                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use meridian_core::cart::{BalanceSummary, CartLine, OrderDraft, OrderTotals};
use meridian_core::money::Money;
use meridian_core::overlay::{OverlayStatus, OverlaySummary};
use meridian_core::session::{AddPolicy, LineOutcome, QuantityOutcome};
use meridian_core::types::{
    CatalogItem, CustomerBalances, CustomerRef, ItemId, OrderType, PriceTier, TaxRate,
};
use meridian_core::validation::validate_search_query;
use meridian_core::ValidationError;

use crate::error::{ServiceError, ServiceResult};
use crate::sources::{CatalogSource, OrderGateway, OrderHistory, OrderReceipt, PurchaseHistory};
use crate::state::SessionState;

/// Async order-entry facade: one session, four collaborator boundaries.
pub struct OrderService {
    state: SessionState,
    catalog: Arc<dyn CatalogSource>,
    purchases: Arc<dyn PurchaseHistory>,
    history: Arc<dyn OrderHistory>,
    gateway: Arc<dyn OrderGateway>,
}

impl OrderService {
    /// Creates a service with a fresh, empty order session.
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        purchases: Arc<dyn PurchaseHistory>,
        history: Arc<dyn OrderHistory>,
        gateway: Arc<dyn OrderGateway>,
    ) -> Self {
        OrderService {
            state: SessionState::new(),
            catalog,
            purchases,
            history,
            gateway,
        }
    }

    // -------------------------------------------------------------------------
    // Catalog
    // -------------------------------------------------------------------------

    /// Searches the catalog for sellable units.
    pub async fn search_catalog(&self, query: &str) -> ServiceResult<Vec<CatalogItem>> {
        let query = validate_search_query(query).map_err(ServiceError::from)?;
        debug!(query = %query, "search catalog");

        self.catalog
            .search_items(&query)
            .await
            .map_err(|err| ServiceError::upstream("catalog search", err))
    }

    // -------------------------------------------------------------------------
    // Line mutations
    // -------------------------------------------------------------------------

    /// Adds an item to the order.
    ///
    /// On the first add of an item, fetches its last purchase cost so margin
    /// warnings have data to work with. A failed fetch degrades silently:
    /// the add proceeds and the analyzer falls back to the snapshot's cost
    /// tier (or `NoCostData`). Nothing is cached on failure, so a later add
    /// of the same item retries the lookup.
    pub async fn add_item(
        &self,
        item: &CatalogItem,
        quantity: i64,
        unit_price: Option<Money>,
        policy: AddPolicy,
    ) -> ServiceResult<LineOutcome> {
        debug!(item = %item.id, quantity, "add item");

        let cost_id = item.cost_lookup_id().clone();
        let cached = self.state.with_session(|s| s.has_cost_for(&cost_id));
        if !cached {
            match self.purchases.last_purchase_price(&cost_id).await {
                Ok(cost) => self
                    .state
                    .with_session_mut(|s| s.record_cost(cost_id.clone(), cost)),
                Err(err) => {
                    warn!(item = %cost_id, error = %err,
                        "last purchase price unavailable, cost warnings degraded");
                }
            }
        }

        let outcome = self
            .state
            .with_session_mut(|s| s.add_line(item, quantity, unit_price, policy))?;
        Ok(outcome)
    }

    /// Updates a line's quantity (`<= 0` removes the line).
    pub fn update_quantity(
        &self,
        index: usize,
        quantity: i64,
        policy: AddPolicy,
    ) -> ServiceResult<QuantityOutcome> {
        debug!(index, quantity, "update quantity");
        let outcome = self
            .state
            .with_session_mut(|s| s.update_quantity(index, quantity, policy))?;
        Ok(outcome)
    }

    /// Updates a line's unit price as an operator edit.
    pub fn update_unit_price(
        &self,
        index: usize,
        unit_price: Money,
        policy: AddPolicy,
    ) -> ServiceResult<LineOutcome> {
        debug!(index, price = %unit_price, "update unit price");
        let outcome = self
            .state
            .with_session_mut(|s| s.update_unit_price(index, unit_price, policy))?;
        Ok(outcome)
    }

    /// Sets a line's absolute discount.
    pub fn set_line_discount(&self, index: usize, discount: Money) -> ServiceResult<()> {
        debug!(index, discount = %discount, "set line discount");
        self.state
            .with_session_mut(|s| s.set_line_discount(index, discount))?;
        Ok(())
    }

    /// Removes a line, returning it for undo-style UI affordances.
    pub fn remove_line(&self, index: usize) -> ServiceResult<CartLine> {
        debug!(index, "remove line");
        let line = self.state.with_session_mut(|s| s.remove_line(index))?;
        Ok(line)
    }

    /// Stable alphabetical sort of the lines by display name.
    pub fn sort_lines(&self) {
        debug!("sort lines by name");
        self.state.with_session_mut(|s| s.sort_lines_by_name());
    }

    // -------------------------------------------------------------------------
    // Order-level flags
    // -------------------------------------------------------------------------

    /// Switches the price tier; returns how many lines were re-resolved.
    pub fn set_price_tier(&self, tier: PriceTier) -> usize {
        debug!(?tier, "set price tier");
        self.state.with_session_mut(|s| s.set_price_tier(tier))
    }

    pub fn set_tax_exempt(&self, exempt: bool) {
        debug!(exempt, "set tax exempt");
        self.state.with_session_mut(|s| s.set_tax_exempt(exempt));
    }

    pub fn set_flat_tax_rate(&self, rate: TaxRate) {
        debug!(bps = rate.bps(), "set flat tax rate");
        self.state.with_session_mut(|s| s.set_flat_tax_rate(rate));
    }

    pub fn set_order_type(&self, order_type: OrderType) {
        self.state.with_session_mut(|s| s.set_order_type(order_type));
    }

    pub fn set_notes(&self, notes: &str) {
        self.state.with_session_mut(|s| s.set_notes(notes));
    }

    /// Switches the active customer, discarding any overlay state.
    pub fn set_customer(&self, customer: Option<CustomerRef>) {
        debug!(customer = ?customer.as_ref().map(|c| c.id.as_str()), "set customer");
        self.state
            .with_session_mut(|s| s.set_customer(customer, Utc::now()));
    }

    /// Takes over the order number as free text.
    pub fn set_manual_order_number(&self, number: &str) -> ServiceResult<()> {
        self.state
            .with_session_mut(|s| s.set_manual_order_number(number))?;
        Ok(())
    }

    /// Re-enables auto-numbering and issues a fresh number.
    pub fn enable_auto_number(&self) {
        self.state
            .with_session_mut(|s| s.enable_auto_number(Utc::now()));
    }

    /// Regenerates the order number on demand.
    pub fn regenerate_order_number(&self) {
        self.state
            .with_session_mut(|s| s.regenerate_order_number(Utc::now()));
    }

    /// Discards the draft and starts a fresh order.
    pub fn reset(&self) {
        debug!("reset order session");
        self.state.with_session_mut(|s| s.reset(Utc::now()));
    }

    // -------------------------------------------------------------------------
    // Historical price overlay
    // -------------------------------------------------------------------------

    /// Fetches the customer's last-order prices and overlays them onto the
    /// current lines. Fails before fetching when no customer is set or the
    /// cart is empty; an upstream failure leaves the cart untouched.
    pub async fn apply_last_prices(&self) -> ServiceResult<OverlaySummary> {
        let (customer, is_empty) = self
            .state
            .with_session(|s| (s.draft().customer.clone(), s.draft().is_empty()));

        let customer = customer.ok_or(ValidationError::NoCustomer)?;
        if is_empty {
            return Err(ValidationError::EmptyOrder.into());
        }

        debug!(customer = %customer.id, "apply last order prices");
        let history = self
            .history
            .last_order_prices(&customer.id)
            .await
            .map_err(|err| ServiceError::upstream("last order prices", err))?;

        let summary = self
            .state
            .with_session_mut(|s| s.apply_last_prices(&history))?;
        info!(
            updated = summary.updated,
            unchanged = summary.unchanged,
            not_found = summary.not_found,
            source = %summary.source.order_number,
            "last order prices applied"
        );
        Ok(summary)
    }

    /// Restores the pre-overlay prices.
    pub fn restore_original_prices(&self) -> ServiceResult<usize> {
        debug!("restore original prices");
        let restored = self.state.with_session_mut(|s| s.restore_original_prices())?;
        Ok(restored)
    }

    // -------------------------------------------------------------------------
    // Submission
    // -------------------------------------------------------------------------

    /// Submits the draft as a new order.
    ///
    /// Stock is re-validated against live catalog data first: quantities
    /// passed the guard at add time, but other terminals may have sold the
    /// stock since. On success the session resets to a fresh, empty order.
    pub async fn submit(&self) -> ServiceResult<OrderReceipt> {
        let draft = self.prepared_draft()?;
        debug!(order_number = %draft.order_number, lines = draft.line_count(), "submit order");

        self.revalidate_live_stock().await?;

        let receipt = self
            .gateway
            .create_order(&draft)
            .await
            .map_err(|err| ServiceError::upstream("order submission", err))?;

        self.state.with_session_mut(|s| s.reset(Utc::now()));
        info!(order_id = %receipt.id, order_number = %receipt.order_number, "order submitted");
        Ok(receipt)
    }

    /// Submits the draft as a revision of an existing order.
    pub async fn submit_revision(&self, order_id: &str) -> ServiceResult<OrderReceipt> {
        let draft = self.prepared_draft()?;
        debug!(order_id, order_number = %draft.order_number, "submit order revision");

        self.revalidate_live_stock().await?;

        let receipt = self
            .gateway
            .update_order(order_id, &draft)
            .await
            .map_err(|err| ServiceError::upstream("order submission", err))?;

        self.state.with_session_mut(|s| s.reset(Utc::now()));
        info!(order_id = %receipt.id, "order revision submitted");
        Ok(receipt)
    }

    fn prepared_draft(&self) -> ServiceResult<OrderDraft> {
        let draft = self.state.with_session(|s| s.draft().clone());
        if draft.is_empty() {
            return Err(ValidationError::EmptyOrder.into());
        }
        Ok(draft)
    }

    /// Fetches every distinct line item by id and runs the aggregate stock
    /// re-validation. Items missing from the live catalog are treated as
    /// out of stock by the engine.
    async fn revalidate_live_stock(&self) -> ServiceResult<()> {
        let ids: Vec<ItemId> = self.state.with_session(|s| {
            let mut ids: Vec<ItemId> = Vec::new();
            for line in s.lines() {
                if !ids.contains(&line.item_id) {
                    ids.push(line.item_id.clone());
                }
            }
            ids
        });

        let mut live = Vec::with_capacity(ids.len());
        for id in &ids {
            let item = self
                .catalog
                .item_by_id(id)
                .await
                .map_err(|err| ServiceError::upstream("live stock check", err))?;
            if let Some(item) = item {
                live.push(item);
            }
        }

        self.state.with_session(|s| s.revalidate_stock(&live))?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Read-only projections
    // -------------------------------------------------------------------------

    pub fn lines(&self) -> Vec<CartLine> {
        self.state.with_session(|s| s.lines().to_vec())
    }

    pub fn totals(&self) -> OrderTotals {
        self.state.with_session(|s| s.totals())
    }

    pub fn overlay_status(&self) -> OverlayStatus {
        self.state.with_session(|s| s.overlay_status())
    }

    /// Estimated profit across the order.
    pub fn order_profit(&self) -> Money {
        self.state.with_session(|s| s.order_profit())
    }

    pub fn draft(&self) -> OrderDraft {
        self.state.with_session(|s| s.draft().clone())
    }

    /// Order total reconciled against the customer's running balance.
    pub fn reconcile(&self, balances: &CustomerBalances) -> BalanceSummary {
        self.state.with_session(|s| s.reconcile(balances))
    }
}
