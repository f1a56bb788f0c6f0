//! # Price Resolver
//!
//! Pure mapping from (catalog item, price tier) to a unit price.
//!
//! ## Fallback Chains
//! ```text
//! distributor → distributor ?? wholesale ?? retail ?? 0
//! wholesale   → wholesale ?? retail ?? 0
//! retail      → retail ?? 0
//! custom      → same chain as wholesale (initial suggestion only)
//! ```
//!
//! No side effects, no errors - resolution always produces a price,
//! defaulting to zero when no tier is populated.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{CatalogItem, PriceTier};

/// Resolves the unit price for an item at the given tier.
///
/// ## Example
/// ```rust
/// use meridian_core::money::Money;
/// use meridian_core::pricing::resolve_unit_price;
/// use meridian_core::types::{CatalogItem, ItemId, PriceTier, StockLevel, TierPricing};
///
/// let item = CatalogItem {
///     id: ItemId::new("550e8400-e29b-41d4-a716-446655440000"),
///     is_variant: false,
///     base_product_id: None,
///     variant: None,
///     name: "Mug".into(),
///     display_name: "Ceramic Mug".into(),
///     pricing: TierPricing {
///         wholesale: Some(Money::from_cents(5000)),
///         ..TierPricing::default()
///     },
///     inventory: StockLevel::default(),
///     tax_rate_bps: None,
/// };
///
/// // wholesale populated, retail absent
/// assert_eq!(resolve_unit_price(&item, PriceTier::Retail), Money::zero());
/// assert_eq!(
///     resolve_unit_price(&item, PriceTier::Distributor),
///     Money::from_cents(5000)
/// );
/// ```
pub fn resolve_unit_price(item: &CatalogItem, tier: PriceTier) -> Money {
    let p = &item.pricing;
    let resolved = match tier {
        PriceTier::Distributor => p.distributor.or(p.wholesale).or(p.retail),
        PriceTier::Wholesale | PriceTier::Custom => p.wholesale.or(p.retail),
        PriceTier::Retail => p.retail,
    };
    resolved.unwrap_or_else(Money::zero)
}

/// Both resolutions across a tier switch, for caller messaging.
///
/// The aggregate decides per line whether to rewrite the price (it skips
/// manually edited lines); this shape lets the UI explain what changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TierShift {
    pub from_price: Money,
    pub to_price: Money,
}

impl TierShift {
    /// True when the switch would actually change the price.
    #[inline]
    pub fn changes_price(&self) -> bool {
        self.from_price != self.to_price
    }
}

/// Resolves an item's price under both the outgoing and incoming tier.
pub fn resolve_tier_change(item: &CatalogItem, from: PriceTier, to: PriceTier) -> TierShift {
    TierShift {
        from_price: resolve_unit_price(item, from),
        to_price: resolve_unit_price(item, to),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ItemId, StockLevel, TierPricing};

    fn item_with_pricing(pricing: TierPricing) -> CatalogItem {
        CatalogItem {
            id: ItemId::new("550e8400-e29b-41d4-a716-446655440000"),
            is_variant: false,
            base_product_id: None,
            variant: None,
            name: "Item".to_string(),
            display_name: "Item".to_string(),
            pricing,
            inventory: StockLevel::default(),
            tax_rate_bps: None,
        }
    }

    #[test]
    fn test_retail_has_no_fallback() {
        let item = item_with_pricing(TierPricing {
            wholesale: Some(Money::from_cents(5000)),
            ..TierPricing::default()
        });
        assert_eq!(resolve_unit_price(&item, PriceTier::Retail), Money::zero());
    }

    #[test]
    fn test_retail_reads_retail_when_present() {
        let item = item_with_pricing(TierPricing {
            wholesale: Some(Money::from_cents(5000)),
            retail: Some(Money::from_cents(4000)),
            ..TierPricing::default()
        });
        assert_eq!(
            resolve_unit_price(&item, PriceTier::Retail),
            Money::from_cents(4000)
        );
    }

    #[test]
    fn test_distributor_falls_back_to_wholesale() {
        let item = item_with_pricing(TierPricing {
            wholesale: Some(Money::from_cents(5000)),
            ..TierPricing::default()
        });
        assert_eq!(
            resolve_unit_price(&item, PriceTier::Distributor),
            Money::from_cents(5000)
        );
    }

    #[test]
    fn test_distributor_prefers_own_tier() {
        let item = item_with_pricing(TierPricing {
            distributor: Some(Money::from_cents(3500)),
            wholesale: Some(Money::from_cents(5000)),
            retail: Some(Money::from_cents(6000)),
            ..TierPricing::default()
        });
        assert_eq!(
            resolve_unit_price(&item, PriceTier::Distributor),
            Money::from_cents(3500)
        );
    }

    #[test]
    fn test_custom_follows_wholesale_chain() {
        let item = item_with_pricing(TierPricing {
            wholesale: Some(Money::from_cents(5000)),
            retail: Some(Money::from_cents(6000)),
            ..TierPricing::default()
        });
        assert_eq!(
            resolve_unit_price(&item, PriceTier::Custom),
            Money::from_cents(5000)
        );
    }

    #[test]
    fn test_empty_pricing_resolves_to_zero() {
        let item = item_with_pricing(TierPricing::default());
        for tier in [
            PriceTier::Retail,
            PriceTier::Wholesale,
            PriceTier::Distributor,
            PriceTier::Custom,
        ] {
            assert_eq!(resolve_unit_price(&item, tier), Money::zero());
        }
    }

    #[test]
    fn test_tier_shift_change_detection() {
        let item = item_with_pricing(TierPricing {
            wholesale: Some(Money::from_cents(5000)),
            retail: Some(Money::from_cents(6000)),
            ..TierPricing::default()
        });

        let shift = resolve_tier_change(&item, PriceTier::Retail, PriceTier::Wholesale);
        assert_eq!(shift.from_price, Money::from_cents(6000));
        assert_eq!(shift.to_price, Money::from_cents(5000));
        assert!(shift.changes_price());

        let same = resolve_tier_change(&item, PriceTier::Wholesale, PriceTier::Custom);
        assert!(!same.changes_price());
    }
}
