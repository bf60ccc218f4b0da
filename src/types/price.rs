//! Fixed-point quantization of prices and quantities.
//!
//! Matching runs on `f64`, but state roots must not depend on how a float
//! happens to print. Before a resting order is hashed its price and
//! remaining quantity are rounded to a `u64` scaled by 10^8.
//!
//! ```
//! use goods_exchange::types::price::quantize;
//!
//! assert_eq!(quantize(2.5), Some(250_000_000));
//! assert_eq!(quantize(0.000000001), Some(0));
//! assert_eq!(quantize(-1.0), None);
//! ```

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// 10^8, eight decimal places
pub const SCALE: u64 = 100_000_000;

/// Values at or above this do not fit the fixed-point `u64` encoding
pub const MAX_VALUE: f64 = u64::MAX as f64 / SCALE as f64;

/// Tolerance for comparing accumulated float quantities
pub const EPSILON: f64 = 1e-9;

/// Round an `f64` to fixed-point.
///
/// `None` for negative, non-finite or out-of-range values.
pub fn quantize(value: f64) -> Option<u64> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    let scaled = Decimal::from_f64(value)?.checked_mul(Decimal::from(SCALE))?;
    scaled.round_dp(0).to_u64()
}

/// `|a - b| <= tolerance`
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantize() {
        assert_eq!(quantize(0.0), Some(0));
        assert_eq!(quantize(1.0), Some(SCALE));
        assert_eq!(quantize(0.25), Some(25_000_000));
        assert_eq!(quantize(-0.5), None);
        assert_eq!(quantize(f64::INFINITY), None);
        assert_eq!(quantize(f64::NAN), None);
    }

    #[test]
    fn test_quantize_rounds_sub_scale_noise() {
        // 0.1 + 0.2 is not exactly 0.3 in binary, but both quantize the same
        assert_eq!(quantize(0.1 + 0.2), quantize(0.3));
    }

    #[test]
    fn test_quantize_out_of_range() {
        assert_eq!(quantize(1e300), None);
    }

    #[test]
    fn test_quantize_range_edge() {
        assert_eq!(quantize(1.8e11), Some(18_000_000_000_000_000_000));
        assert_eq!(quantize(MAX_VALUE), None);
        assert_eq!(quantize(1.9e11), None);
    }

    #[test]
    fn test_approx_eq() {
        assert!(approx_eq(1.0, 1.0, 0.0));
        assert!(approx_eq(1.0, 1.0 + 1e-12, EPSILON));
        assert!(!approx_eq(1.0, 1.1, EPSILON));
    }
}
