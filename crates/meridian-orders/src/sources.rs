//! # Collaborator Traits
//!
//! Abstract request/response boundaries to the systems the engine must not
//! touch directly. The UI shell injects REST-backed implementations; tests
//! inject stubs. Every trait is `Send + Sync` dyn-compatible so the service
//! can hold them as `Arc<dyn ...>`.
//!
//! ## The Boundaries
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CatalogSource    search + by-id lookup (products & variants merged)   │
//! │  PurchaseHistory  last purchase cost per base product                  │
//! │  OrderHistory     per-item prices from a customer's most recent order  │
//! │  OrderGateway     order persistence (create / update)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use meridian_core::money::Money;
use meridian_core::types::{CatalogItem, CustomerId, ItemId, LastOrderPrices};
use meridian_core::OrderDraft;

// =============================================================================
// Source Error
// =============================================================================

/// Failure of a collaborator call. The service layer wraps these as
/// retryable `Upstream` errors and never lets them partially apply.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// The collaborator could not be reached or refused the call.
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    /// The collaborator answered with something the engine cannot use.
    #[error("malformed collaborator response: {0}")]
    InvalidResponse(String),
}

/// Result type for collaborator calls.
pub type SourceResult<T> = Result<T, SourceError>;

// =============================================================================
// Catalog
// =============================================================================

/// Read-only catalog lookup.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Searches sellable units by name/code. Products and variants come
    /// back merged, variants flagged via `CatalogItem::is_variant`.
    async fn search_items(&self, query: &str) -> SourceResult<Vec<CatalogItem>>;

    /// Fetches one item by id, with live stock. `None` when the item no
    /// longer exists (deactivated or deleted since it was added).
    async fn item_by_id(&self, id: &ItemId) -> SourceResult<Option<CatalogItem>>;
}

// =============================================================================
// Purchase History
// =============================================================================

/// Last purchase (cost) price lookup, keyed by base product.
#[async_trait]
pub trait PurchaseHistory: Send + Sync {
    /// `Ok(None)` means the backend has no purchase history for the item -
    /// a *known* miss, cached as such.
    async fn last_purchase_price(&self, base_product_id: &ItemId) -> SourceResult<Option<Money>>;
}

// =============================================================================
// Order History
// =============================================================================

/// Per-item prices from a customer's most recent order.
#[async_trait]
pub trait OrderHistory: Send + Sync {
    /// An empty price map is a valid response and is classified by the
    /// engine as "no prior order".
    async fn last_order_prices(&self, customer_id: &CustomerId) -> SourceResult<LastOrderPrices>;
}

// =============================================================================
// Order Gateway
// =============================================================================

/// Identifiers returned by the order-persistence service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    pub id: String,
    /// The order number as persisted (the backend may normalize it).
    pub order_number: String,
}

/// Order persistence. Uniqueness of order numbers is enforced here, not in
/// the engine.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn create_order(&self, draft: &OrderDraft) -> SourceResult<OrderReceipt>;

    async fn update_order(&self, order_id: &str, draft: &OrderDraft) -> SourceResult<OrderReceipt>;
}
