//! Total ordering over `f64` prices so they can key a `BTreeMap`.
//!
//! Prices entering a book are validated finite and positive, so
//! [`f64::total_cmp`] orders them exactly as `<` would.

use std::cmp::Ordering;

/// A price usable as an ordered map key.
#[derive(Debug, Clone, Copy)]
pub struct PriceKey(pub f64);

impl PriceKey {
    /// The wrapped price
    #[inline]
    pub fn price(self) -> f64 {
        self.0
    }
}

impl PartialEq for PriceKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PriceKey {}

impl PartialOrd for PriceKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PriceKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<f64> for PriceKey {
    fn from(price: f64) -> Self {
        Self(price)
    }
}
