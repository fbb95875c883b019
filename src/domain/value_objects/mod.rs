//! Value objects for the marketplace

use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tracking-id alphabet. Ambiguous glyphs (I, 1, O, 0) are excluded.
pub const TRACKING_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

const TRACKING_PREFIX: &str = "TRK-";
const TRACKING_SUFFIX_LEN: usize = 5;

/// Human-readable order identifier, `TRK-XXXXX`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackingId(String);

impl TrackingId {
    /// Draws five characters independently and uniformly from the alphabet.
    /// Collisions against already-issued ids are not checked.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut id = String::from(TRACKING_PREFIX);
        for _ in 0..TRACKING_SUFFIX_LEN {
            id.push(TRACKING_ALPHABET[rng.gen_range(0..TRACKING_ALPHABET.len())] as char);
        }
        Self(id)
    }

    /// Wraps an already-issued id verbatim (seed data, snapshots).
    pub fn from_raw(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Normalizes user input for lookup: trims whitespace, uppercases.
    pub fn normalize(input: &str) -> String {
        input.trim().to_uppercase()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Discount percentage, always within 0..=100.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Discount(u8);

impl Discount {
    /// Out-of-range inputs are clamped, not rejected.
    pub fn clamped(percent: i64) -> Self {
        Self(percent.clamp(0, 100) as u8)
    }

    pub fn percent(&self) -> u8 {
        self.0
    }

    pub fn is_active(&self) -> bool {
        self.0 > 0
    }

    /// Effective price: `price * (1 - percent/100)` when a discount is set,
    /// the listed price otherwise.
    pub fn apply(&self, price: Decimal) -> Decimal {
        if self.0 == 0 {
            return price;
        }
        price * (Decimal::ONE - Decimal::from(self.0) / Decimal::ONE_HUNDRED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_tracking_id_format() {
        for _ in 0..100 {
            let id = TrackingId::generate();
            let s = id.as_str();
            assert!(s.starts_with("TRK-"));
            assert_eq!(s.len(), 9);
            for b in s[4..].bytes() {
                assert!(TRACKING_ALPHABET.contains(&b), "unexpected char {}", b as char);
                assert!(!b"I1O0".contains(&b));
            }
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(TrackingId::normalize("  trk-9j2m4 "), "TRK-9J2M4");
    }

    #[test]
    fn test_discount_clamped() {
        assert_eq!(Discount::clamped(-10).percent(), 0);
        assert_eq!(Discount::clamped(150).percent(), 100);
        assert_eq!(Discount::clamped(35).percent(), 35);
    }

    #[test]
    fn test_discount_apply() {
        assert_eq!(Discount::clamped(0).apply(dec!(1000)), dec!(1000));
        assert_eq!(Discount::clamped(50).apply(dec!(500)), dec!(250));
        assert_eq!(Discount::clamped(100).apply(dec!(500)), dec!(0));
    }
}
