//! # meridian-core: Pure Order-Composition Logic for Meridian ERP
//!
//! This crate is the **heart** of the sales-order entry screen. It contains
//! the order composition and dynamic pricing engine as pure functions and
//! local-state aggregates with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Meridian Order Engine Architecture                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               Admin Console (TypeScript frontend)               │   │
//! │  │    Item Search ──► Order Grid ──► Totals Panel ──► Submit      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                meridian-orders (async layer)                    │   │
//! │  │    collaborator traits, OrderService, fetch-and-apply          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ meridian-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌────────┐ ┌─────────┐ ┌──────────┐ │   │
//! │  │   │ pricing │ │  stock  │ │ margin │ │ overlay │ │   cart   │ │   │
//! │  │   │  tiers  │ │  guard  │ │analyzer│ │ history │ │ +session │ │   │
//! │  │   └─────────┘ └─────────┘ └────────┘ └─────────┘ └──────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            REST backend (catalog, customers, orders)            │   │
//! │  │          reached only through meridian-orders traits            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (CatalogItem, PriceTier, CustomerRef, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Engine error types
//! - [`validation`] - Input validation
//! - [`pricing`] - Tier price resolution with fallback chains
//! - [`stock`] - Stock guard (advisory oversell checks)
//! - [`margin`] - Below-cost classification and order profit
//! - [`overlay`] - Reversible last-order price overlay
//! - [`cart`] - CartLine, OrderDraft, totals, balance reconciliation
//! - [`session`] - OrderSession: draft + overlay + cost cache, wired
//! - [`order_number`] - Human-readable order identifier generation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input =
//!    same output (timestamps are passed in, never sampled)
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are cents (i64) - overlay
//!    round trips must be exact
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use meridian_core::money::Money;
//! use meridian_core::pricing::resolve_unit_price;
//! use meridian_core::types::{CatalogItem, ItemId, PriceTier, StockLevel, TierPricing};
//!
//! let item = CatalogItem {
//!     id: ItemId::new("550e8400-e29b-41d4-a716-446655440000"),
//!     is_variant: false,
//!     base_product_id: None,
//!     variant: None,
//!     name: "Mug".into(),
//!     display_name: "Ceramic Mug".into(),
//!     pricing: TierPricing {
//!         wholesale: Some(Money::from_cents(5000)),
//!         ..TierPricing::default()
//!     },
//!     inventory: StockLevel::default(),
//!     tax_rate_bps: None,
//! };
//!
//! // Distributor falls back through wholesale
//! let price = resolve_unit_price(&item, PriceTier::Distributor);
//! assert_eq!(price.cents(), 5000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod margin;
pub mod money;
pub mod order_number;
pub mod overlay;
pub mod pricing;
pub mod session;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use meridian_core::Money` instead of
// `use meridian_core::money::Money`

pub use cart::{reconcile_balance, BalanceSummary, CartLine, OrderDraft, OrderTotals, TaxContext};
pub use error::{CoreResult, EngineError, HistoryError, StockError, ValidationError};
pub use margin::{CostCache, MarginStatus};
pub use money::Money;
pub use overlay::{OverlayLineStatus, OverlayStatus, OverlaySummary, PriceOverlay};
pub use session::{AddPolicy, LineOutcome, OrderSession, QuantityOutcome};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed on a single order.
///
/// ## Business Reason
/// Prevents runaway orders and keeps the entry grid responsive.
/// Can be made configurable per-tenant in future versions.
pub const MAX_ORDER_LINES: usize = 100;

/// Maximum quantity of a single line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Default flat sales-tax rate in basis points (8%).
///
/// Applied only to lines whose catalog item carries no rate of its own;
/// injectable per order via [`cart::TaxContext`].
pub const DEFAULT_FLAT_TAX_BPS: u32 = 800;
