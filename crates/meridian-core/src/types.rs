//! # Domain Types
//!
//! Core domain types used throughout the order engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  CatalogItem    │   │  TierPricing    │   │   StockLevel    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (ItemId)    │   │  retail?        │   │  current_stock  │       │
//! │  │  is_variant     │   │  wholesale?     │   │  reorder_point  │       │
//! │  │  display_name   │   │  distributor?   │   └─────────────────┘       │
//! │  │  pricing        │   │  cost?          │                             │
//! │  │  inventory      │   └─────────────────┘                             │
//! │  └─────────────────┘                                                   │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   PriceTier     │   │   OrderType     │   │  CustomerRef    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Retail         │   │  Standard       │   │  id             │       │
//! │  │  Wholesale      │   │  Delivery       │   │  display_name   │       │
//! │  │  Distributor    │   │  Pickup         │   └─────────────────┘       │
//! │  │  Custom         │   └─────────────────┘                             │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Discipline
//! `CatalogItem` is an immutable snapshot supplied by the catalog
//! collaborator. The engine copies it onto each cart line at add time so a
//! catalog refresh mid-order never retroactively changes an in-progress
//! order. The engine never mutates a snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Identifiers
// =============================================================================

/// Canonical catalog item identifier.
///
/// ## Why a Newtype?
/// Three per-item maps key off this id (cost cache, overlay captures,
/// overlay statuses). A dedicated key type makes a string/reference key
/// mismatch a compile error instead of a silent cache miss.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        ItemId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Customer identifier (same discipline as [`ItemId`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(transparent)]
pub struct CustomerId(String);

impl CustomerId {
    pub fn new(id: impl Into<String>) -> Self {
        CustomerId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 800 bps = 8% (the default flat sales-tax rate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Price Tier
// =============================================================================

/// Pricing tier selected on an order.
///
/// Determines which pricing field is read from a catalog item by default;
/// see `pricing::resolve_unit_price` for the fallback chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PriceTier {
    /// Walk-in price. No fallback below it.
    Retail,
    /// Trade price, falls back to retail.
    Wholesale,
    /// Bulk/distributor price, falls back to wholesale then retail.
    Distributor,
    /// Free-form pricing. Resolution only supplies the initial suggestion;
    /// the operator overwrites line prices freely.
    Custom,
}

impl Default for PriceTier {
    fn default() -> Self {
        PriceTier::Retail
    }
}

// =============================================================================
// Tier Pricing
// =============================================================================

/// Per-tier price fields on a catalog item. Any tier may be absent.
///
/// `cost` is the item's last known purchase cost as recorded on the catalog
/// record itself; the margin analyzer prefers the per-session cost cache and
/// falls back to this field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TierPricing {
    pub retail: Option<Money>,
    pub wholesale: Option<Money>,
    pub distributor: Option<Money>,
    pub cost: Option<Money>,
}

// =============================================================================
// Stock Level
// =============================================================================

/// Inventory counters carried on a catalog snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockLevel {
    /// Units currently on hand.
    pub current_stock: i64,
    /// Reorder threshold (display only; the guard never reads it).
    pub reorder_point: i64,
}

// =============================================================================
// Catalog Item
// =============================================================================

/// Variant descriptor for items that are variants of a base product
/// (e.g. kind "Size", value "XL").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VariantInfo {
    pub kind: String,
    pub value: String,
}

/// A sellable unit: a base product or a product variant.
///
/// Supplied by the external catalog collaborator as an immutable snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CatalogItem {
    /// Unique identifier (UUID v4).
    pub id: ItemId,

    /// True when this item is a variant of a base product.
    pub is_variant: bool,

    /// Base product this variant belongs to (variants only).
    pub base_product_id: Option<ItemId>,

    /// Variant descriptor (variants only).
    pub variant: Option<VariantInfo>,

    /// Internal name.
    pub name: String,

    /// Name shown to the operator and on documents.
    pub display_name: String,

    /// Multi-tier pricing. Any tier may be absent.
    pub pricing: TierPricing,

    /// Inventory counters.
    pub inventory: StockLevel,

    /// Item-specific tax rate in basis points. `None` means the order's
    /// flat rate applies.
    pub tax_rate_bps: Option<u32>,
}

impl CatalogItem {
    /// Returns the item-specific tax rate, if one is set.
    #[inline]
    pub fn tax_rate(&self) -> Option<TaxRate> {
        self.tax_rate_bps.map(TaxRate::from_bps)
    }

    /// Id used for purchase-cost lookups: the base product for variants,
    /// the item itself otherwise.
    pub fn cost_lookup_id(&self) -> &ItemId {
        self.base_product_id.as_ref().unwrap_or(&self.id)
    }
}

// =============================================================================
// Order Type
// =============================================================================

/// Fulfilment type recorded on the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// Counter sale, fulfilled immediately.
    Standard,
    /// Delivered to the customer's address.
    Delivery,
    /// Prepared for customer pickup.
    Pickup,
}

impl Default for OrderType {
    fn default() -> Self {
        OrderType::Standard
    }
}

// =============================================================================
// Customer
// =============================================================================

/// Minimal customer reference carried on an order draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerRef {
    pub id: CustomerId,
    /// Business/display name; also the source of order-number initials.
    pub display_name: String,
}

/// Read-only balance fields from the external customer record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerBalances {
    /// Outstanding receivable the customer owes.
    pub pending_balance: Money,
    /// Advance payments held on account.
    pub advance_balance: Money,
    pub credit_limit: Money,
    pub current_balance: Money,
}

// =============================================================================
// Last Order Prices (history collaborator response)
// =============================================================================

/// Per-item prices from a customer's most recent order, as returned by the
/// order-history collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastOrderPrices {
    /// Unit price per catalog item on the prior order.
    pub prices: std::collections::HashMap<ItemId, Money>,
    /// Human-readable number of the prior order.
    pub order_number: String,
    /// When the prior order was placed.
    pub order_date: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
