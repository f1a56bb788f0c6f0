//! # Order Number Generator
//!
//! Derives a human-readable order identifier from customer identity and a
//! timestamp: `SO-{initials}-{YYYYMMDD}-{last4(epoch_millis)}`.
//!
//! The timestamp is an argument so generation stays pure; the orders layer
//! supplies `Utc::now()`. Backend uniqueness is enforced server-side - this
//! identifier only has to be readable and regenerable on demand. When the
//! operator turns auto-numbering off, the field becomes free text and this
//! module is no longer consulted.

use chrono::{DateTime, Utc};

/// Initials used when the order has no customer.
const NO_CUSTOMER_INITIALS: &str = "GEN";

/// Maximum letters drawn from the customer name.
const MAX_INITIALS: usize = 3;

/// Generates an order number for the given customer name and timestamp.
///
/// ## Example
/// ```rust
/// use chrono::TimeZone;
/// use meridian_core::order_number::generate;
///
/// let at = chrono::Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
/// let number = generate(Some("Acme Carbon Works"), at);
/// assert!(number.starts_with("SO-ACW-20250301-"));
///
/// let number = generate(None, at);
/// assert!(number.starts_with("SO-GEN-20250301-"));
/// ```
pub fn generate(customer_name: Option<&str>, at: DateTime<Utc>) -> String {
    let initials = customer_name
        .map(initials_of)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| NO_CUSTOMER_INITIALS.to_string());

    let date = at.format("%Y%m%d");
    let suffix = at.timestamp_millis().rem_euclid(10000);

    format!("SO-{initials}-{date}-{suffix:04}")
}

/// Up to three uppercase letters from the first letters of each word.
fn initials_of(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().find(|c| c.is_alphabetic()))
        .take(MAX_INITIALS)
        .flat_map(char::to_uppercase)
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
