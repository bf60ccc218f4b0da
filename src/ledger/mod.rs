//! Sparse good-to-quantity ledger used for all market accounting.
//!
//! ## Semantics
//!
//! - A good that is not present has an implicit quantity of 0.
//! - Quantities are `f64` and may go negative while deltas are accumulated.
//! - Ledger-with-ledger `+`/`-` work over the union of keys. Scaling by a
//!   scalar touches only keys already present.
//! - Iteration is ordered by [`GoodId`], so anything derived from a ledger
//!   (hashes, logs, snapshots) is deterministic.
//!
//! ## Comparisons
//!
//! The `all_*` predicates are not a partial order. They walk the keys of
//! `self` only and compare each against the other ledger's entry (0 when
//! absent). Keys that exist only in the other ledger are ignored, so
//! `a.all_lt(&b)` and `!a.all_ge(&b)` can disagree.
//!
//! ```
//! use goods_exchange::ledger::ResourceLedger;
//! use goods_exchange::types::GoodId;
//!
//! let a = ResourceLedger::from_iter([(GoodId(1), 1.0)]);
//! let b = ResourceLedger::from_iter([(GoodId(1), 2.0), (GoodId(2), -5.0)]);
//!
//! // Only good 1 is checked: 1 < 2
//! assert!(a.all_lt(&b));
//! // Good 2 is now checked too: -5 < 0 holds, 2 < 1 does not
//! assert!(!b.all_lt(&a));
//! ```

use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::types::GoodId;

static ZERO: f64 = 0.0;

/// Sparse mapping from good to quantity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceLedger {
    entries: BTreeMap<GoodId, f64>,
}

impl ResourceLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self { entries: BTreeMap::new() }
    }

    // ========================================================================
    // Access
    // ========================================================================

    /// Quantity of `good`, 0 if absent.
    #[inline]
    pub fn get(&self, good: GoodId) -> f64 {
        self.entries.get(&good).copied().unwrap_or(0.0)
    }

    /// Mutable quantity of `good`, inserting 0 if absent.
    #[inline]
    pub fn entry(&mut self, good: GoodId) -> &mut f64 {
        self.entries.entry(good).or_insert(0.0)
    }

    /// Overwrite the quantity of `good`.
    pub fn set(&mut self, good: GoodId, quantity: f64) {
        self.entries.insert(good, quantity);
    }

    /// Remove `good`, returning its quantity if it was present.
    pub fn remove(&mut self, good: GoodId) -> Option<f64> {
        self.entries.remove(&good)
    }

    /// Whether `good` has an explicit entry (even a zero one).
    pub fn contains(&self, good: GoodId) -> bool {
        self.entries.contains_key(&good)
    }

    /// Number of explicit entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ledger has no explicit entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(good, quantity)` pairs in good order.
    pub fn iter(&self) -> impl Iterator<Item = (GoodId, f64)> + '_ {
        self.entries.iter().map(|(good, qty)| (*good, *qty))
    }

    /// Iterate goods with an explicit entry.
    pub fn goods(&self) -> impl Iterator<Item = GoodId> + '_ {
        self.entries.keys().copied()
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Whether every entry is within `tolerance` of zero.
    pub fn is_zero(&self, tolerance: f64) -> bool {
        self.entries.values().all(|qty| qty.abs() <= tolerance)
    }

    // ========================================================================
    // Accounting helpers
    // ========================================================================

    /// Holds at least `other[k]` of every good `other` has a positive amount of.
    ///
    /// Non-positive entries in `other` are not requirements and are skipped.
    pub fn has_all_resources(&self, other: &ResourceLedger) -> bool {
        other
            .iter()
            .filter(|(_, qty)| *qty > 0.0)
            .all(|(good, qty)| self.get(good) >= qty)
    }

    /// Enough of every good in `amount` to move it out of this ledger.
    pub fn enough_to_transfer(&self, amount: &ResourceLedger) -> bool {
        amount.iter().all(|(good, qty)| self.get(good) >= qty)
    }

    /// Move `amount` from this ledger into `destination`.
    pub fn transfer_to(&mut self, destination: &mut ResourceLedger, amount: &ResourceLedger) {
        for (good, qty) in amount.iter() {
            *self.entry(good) -= qty;
            *destination.entry(good) += qty;
        }
    }

    /// Copy every entry of `other` over this ledger's entries.
    pub fn assign_from(&mut self, other: &ResourceLedger) {
        for (good, qty) in other.iter() {
            self.set(good, qty);
        }
    }

    /// `self += other * factor`
    pub fn multiply_add(&mut self, other: &ResourceLedger, factor: f64) {
        for (good, qty) in other.iter() {
            *self.entry(good) += qty * factor;
        }
    }

    /// Subtract `other`, clamping every touched entry at zero.
    pub fn remove_limited(&mut self, other: &ResourceLedger) {
        for (good, qty) in other.iter() {
            let held = self.entry(good);
            *held = (*held - qty).max(0.0);
        }
    }

    /// Subtract as much of `other` as is held and return what was removed.
    pub fn limited_remove(&mut self, other: &ResourceLedger) -> ResourceLedger {
        let mut removed = ResourceLedger::new();
        for (good, qty) in other.iter() {
            let held = self.entry(good);
            if *held > qty {
                *held -= qty;
                removed.set(good, qty);
            } else {
                removed.set(good, *held);
                *held = 0.0;
            }
        }
        removed
    }

    /// Add only the positive entries of `other`.
    pub fn add_positive(&mut self, other: &ResourceLedger) {
        for (good, qty) in other.iter().filter(|(_, qty)| *qty > 0.0) {
            *self.entry(good) += qty;
        }
    }

    /// Add the magnitude of the negative entries of `other`.
    pub fn add_negative(&mut self, other: &ResourceLedger) {
        for (good, qty) in other.iter().filter(|(_, qty)| *qty < 0.0) {
            *self.entry(good) += -qty;
        }
    }

    /// Same keys, every value set to `value`.
    pub fn unit_ledger(&self, value: f64) -> ResourceLedger {
        self.goods().map(|good| (good, value)).collect()
    }

    /// Same keys, every value clamped to `[min, max]`.
    pub fn clamp(&self, min: f64, max: f64) -> ResourceLedger {
        self.iter().map(|(good, qty)| (good, qty.clamp(min, max))).collect()
    }

    /// Divide key-wise by `divisor`.
    ///
    /// A zero divisor yields `on_zero`; a zero numerator yields 0 (even for a
    /// zero divisor it is `on_zero` that wins, since the divisor is checked
    /// first). Keys only in `self` are kept unchanged.
    pub fn safe_division(&self, divisor: &ResourceLedger, on_zero: f64) -> ResourceLedger {
        let mut result = self.clone();
        for (good, denominator) in divisor.iter() {
            let numerator = result.get(good);
            let value = if denominator == 0.0 {
                on_zero
            } else if numerator == 0.0 {
                0.0
            } else {
                numerator / denominator
            };
            result.set(good, value);
        }
        result
    }

    // ========================================================================
    // Reductions
    // ========================================================================

    /// Sum of all entries.
    pub fn sum(&self) -> f64 {
        self.entries.values().sum()
    }

    /// Smallest entry, 0 for an empty ledger.
    pub fn min(&self) -> f64 {
        self.entries.values().copied().reduce(f64::min).unwrap_or(0.0)
    }

    /// Largest entry, 0 for an empty ledger.
    pub fn max(&self) -> f64 {
        self.entries.values().copied().reduce(f64::max).unwrap_or(0.0)
    }

    /// Mean of all entries, 0 for an empty ledger.
    pub fn average(&self) -> f64 {
        if self.entries.is_empty() {
            0.0
        } else {
            self.sum() / self.entries.len() as f64
        }
    }

    /// `sum(self[k] * other[k])` over this ledger's keys.
    ///
    /// With `other` holding prices this is the value of the basket.
    pub fn multiply_and_sum(&self, other: &ResourceLedger) -> f64 {
        self.iter().map(|(good, qty)| qty * other.get(good)).sum()
    }

    // ========================================================================
    // Comparisons against another ledger (self-keyed)
    // ========================================================================

    fn compare_keys(&self, other: &ResourceLedger, op: impl Fn(f64, f64) -> bool) -> bool {
        self.iter().all(|(good, qty)| op(qty, other.get(good)))
    }

    /// Every entry of `self` is strictly less than the matching entry of `other`.
    pub fn all_lt(&self, other: &ResourceLedger) -> bool {
        self.compare_keys(other, |a, b| a < b)
    }

    /// Every entry of `self` is strictly greater than the matching entry of `other`.
    pub fn all_gt(&self, other: &ResourceLedger) -> bool {
        self.compare_keys(other, |a, b| a > b)
    }

    /// Every entry of `self` is at most the matching entry of `other`.
    pub fn all_le(&self, other: &ResourceLedger) -> bool {
        self.compare_keys(other, |a, b| a <= b)
    }

    /// Every entry of `self` is at least the matching entry of `other`.
    pub fn all_ge(&self, other: &ResourceLedger) -> bool {
        self.compare_keys(other, |a, b| a >= b)
    }

    /// Every entry of `self` equals the matching entry of `other`.
    pub fn all_eq(&self, other: &ResourceLedger) -> bool {
        self.compare_keys(other, |a, b| a == b)
    }

    // ========================================================================
    // Comparisons against a scalar
    // ========================================================================

    // An empty ledger behaves like a single zero entry.
    fn compare_scalar(&self, value: f64, op: impl Fn(f64, f64) -> bool) -> bool {
        if self.entries.is_empty() {
            return op(0.0, value);
        }
        self.entries.values().all(|qty| op(*qty, value))
    }

    /// Every entry is strictly less than `value`.
    pub fn lt_scalar(&self, value: f64) -> bool {
        self.compare_scalar(value, |a, b| a < b)
    }

    /// Every entry is strictly greater than `value`.
    pub fn gt_scalar(&self, value: f64) -> bool {
        self.compare_scalar(value, |a, b| a > b)
    }

    /// Every entry is at most `value`.
    pub fn le_scalar(&self, value: f64) -> bool {
        self.compare_scalar(value, |a, b| a <= b)
    }

    /// Every entry is at least `value`.
    pub fn ge_scalar(&self, value: f64) -> bool {
        self.compare_scalar(value, |a, b| a >= b)
    }

    /// Every entry equals `value`.
    pub fn eq_scalar(&self, value: f64) -> bool {
        self.compare_scalar(value, |a, b| a == b)
    }

    // ========================================================================
    // Scalar arithmetic on present keys
    // ========================================================================

    /// Add `value` to every present entry.
    pub fn add_scalar(&mut self, value: f64) {
        self.entries.values_mut().for_each(|qty| *qty += value);
    }

    /// Subtract `value` from every present entry.
    pub fn sub_scalar(&mut self, value: f64) {
        self.entries.values_mut().for_each(|qty| *qty -= value);
    }
}

// ============================================================================
// Construction and iteration
// ============================================================================

impl FromIterator<(GoodId, f64)> for ResourceLedger {
    fn from_iter<I: IntoIterator<Item = (GoodId, f64)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

impl Extend<(GoodId, f64)> for ResourceLedger {
    /// Accumulates: repeated goods are summed, not overwritten.
    fn extend<I: IntoIterator<Item = (GoodId, f64)>>(&mut self, iter: I) {
        for (good, qty) in iter {
            *self.entry(good) += qty;
        }
    }
}

impl<'a> IntoIterator for &'a ResourceLedger {
    type Item = (&'a GoodId, &'a f64);
    type IntoIter = btree_map::Iter<'a, GoodId, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Index<GoodId> for ResourceLedger {
    type Output = f64;

    fn index(&self, good: GoodId) -> &f64 {
        self.entries.get(&good).unwrap_or(&ZERO)
    }
}

impl IndexMut<GoodId> for ResourceLedger {
    fn index_mut(&mut self, good: GoodId) -> &mut f64 {
        self.entry(good)
    }
}

// ============================================================================
// Ledger (+/-) ledger over the union of keys
// ============================================================================

impl AddAssign<&ResourceLedger> for ResourceLedger {
    fn add_assign(&mut self, other: &ResourceLedger) {
        for (good, qty) in other.iter() {
            *self.entry(good) += qty;
        }
    }
}

impl SubAssign<&ResourceLedger> for ResourceLedger {
    fn sub_assign(&mut self, other: &ResourceLedger) {
        for (good, qty) in other.iter() {
            *self.entry(good) -= qty;
        }
    }
}

impl Add<&ResourceLedger> for &ResourceLedger {
    type Output = ResourceLedger;

    fn add(self, other: &ResourceLedger) -> ResourceLedger {
        let mut result = self.clone();
        result += other;
        result
    }
}

impl Sub<&ResourceLedger> for &ResourceLedger {
    type Output = ResourceLedger;

    fn sub(self, other: &ResourceLedger) -> ResourceLedger {
        let mut result = self.clone();
        result -= other;
        result
    }
}

impl Add for ResourceLedger {
    type Output = ResourceLedger;

    fn add(mut self, other: ResourceLedger) -> ResourceLedger {
        self += &other;
        self
    }
}

impl Sub for ResourceLedger {
    type Output = ResourceLedger;

    fn sub(mut self, other: ResourceLedger) -> ResourceLedger {
        self -= &other;
        self
    }
}

impl Neg for &ResourceLedger {
    type Output = ResourceLedger;

    fn neg(self) -> ResourceLedger {
        self.iter().map(|(good, qty)| (good, -qty)).collect()
    }
}

// ============================================================================
// Ledger (* /) ledger over the right operand's keys
// ============================================================================

impl MulAssign<&ResourceLedger> for ResourceLedger {
    fn mul_assign(&mut self, other: &ResourceLedger) {
        for (good, factor) in other.iter() {
            *self.entry(good) *= factor;
        }
    }
}

impl DivAssign<&ResourceLedger> for ResourceLedger {
    fn div_assign(&mut self, other: &ResourceLedger) {
        for (good, divisor) in other.iter() {
            *self.entry(good) /= divisor;
        }
    }
}

impl Mul<&ResourceLedger> for &ResourceLedger {
    type Output = ResourceLedger;

    fn mul(self, other: &ResourceLedger) -> ResourceLedger {
        let mut result = self.clone();
        result *= other;
        result
    }
}

impl Div<&ResourceLedger> for &ResourceLedger {
    type Output = ResourceLedger;

    fn div(self, other: &ResourceLedger) -> ResourceLedger {
        let mut result = self.clone();
        result /= other;
        result
    }
}

// ============================================================================
// Ledger (* /) scalar on present keys
// ============================================================================

impl MulAssign<f64> for ResourceLedger {
    fn mul_assign(&mut self, factor: f64) {
        self.entries.values_mut().for_each(|qty| *qty *= factor);
    }
}

impl DivAssign<f64> for ResourceLedger {
    fn div_assign(&mut self, divisor: f64) {
        self.entries.values_mut().for_each(|qty| *qty /= divisor);
    }
}

impl Mul<f64> for &ResourceLedger {
    type Output = ResourceLedger;

    fn mul(self, factor: f64) -> ResourceLedger {
        let mut result = self.clone();
        result *= factor;
        result
    }
}

impl Mul<f64> for ResourceLedger {
    type Output = ResourceLedger;

    fn mul(mut self, factor: f64) -> ResourceLedger {
        self *= factor;
        self
    }
}

impl Div<f64> for &ResourceLedger {
    type Output = ResourceLedger;

    fn div(self, divisor: f64) -> ResourceLedger {
        let mut result = self.clone();
        result /= divisor;
        result
    }
}

impl fmt::Display for ResourceLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (good, qty) in self.iter() {
            write!(f, " {},{}", good.0, qty)?;
        }
        write!(f, "}}")
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::price::{approx_eq, EPSILON};

    const WOOD: GoodId = GoodId(1);
    const ORE: GoodId = GoodId(2);
    const GRAIN: GoodId = GoodId(3);

    fn ledger(entries: &[(GoodId, f64)]) -> ResourceLedger {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_absent_key_is_zero() {
        let l = ResourceLedger::new();
        assert_eq!(l.get(WOOD), 0.0);
        assert_eq!(l[WOOD], 0.0);
        assert!(!l.contains(WOOD));
    }

    #[test]
    fn test_index_mut_inserts_zero() {
        let mut l = ResourceLedger::new();
        assert_eq!(l[WOOD], 0.0);
        l[WOOD] += 0.0;
        assert!(l.contains(WOOD));
        assert_eq!(l.len(), 1);

        *l.entry(ORE) -= 3.0;
        assert_eq!(l.get(ORE), -3.0);
    }

    #[test]
    fn test_add_assign_unions_keys() {
        let mut a = ledger(&[(WOOD, 1.0), (ORE, 2.0)]);
        let b = ledger(&[(ORE, 3.0), (GRAIN, 4.0)]);
        a += &b;

        assert_eq!(a, ledger(&[(WOOD, 1.0), (ORE, 5.0), (GRAIN, 4.0)]));
    }

    #[test]
    fn test_sub_inserts_right_only_keys_negated() {
        let a = ledger(&[(WOOD, 1.0)]);
        let b = ledger(&[(ORE, 2.5)]);
        let c = &a - &b;

        assert_eq!(c.get(WOOD), 1.0);
        assert_eq!(c.get(ORE), -2.5);
    }

    #[test]
    fn test_owned_add_and_sub() {
        let a = ledger(&[(WOOD, 2.0)]);
        let b = ledger(&[(WOOD, 1.0), (ORE, 1.0)]);

        assert_eq!(a.clone() + b.clone(), ledger(&[(WOOD, 3.0), (ORE, 1.0)]));
        assert_eq!(a - b, ledger(&[(WOOD, 1.0), (ORE, -1.0)]));
    }

    #[test]
    fn test_scalar_mul_does_not_add_keys() {
        let a = ledger(&[(WOOD, 2.0), (ORE, -1.0)]);
        let scaled = &a * 3.0;

        assert_eq!(scaled, ledger(&[(WOOD, 6.0), (ORE, -3.0)]));
        assert!(!scaled.contains(GRAIN));
    }

    #[test]
    fn test_scale_round_trip() {
        let a = ledger(&[(WOOD, 2.0), (ORE, 7.3), (GRAIN, -0.4)]);
        for s in [0.1, 3.0, -2.5, 1e6] {
            let back = (&a * s) * (1.0 / s);
            for (good, qty) in a.iter() {
                assert!(approx_eq(back.get(good), qty, 1e-6), "good {good} s {s}");
            }
        }
    }

    #[test]
    fn test_self_subtraction_is_zero() {
        let a = ledger(&[(WOOD, 2.0), (ORE, 7.3), (GRAIN, -0.4)]);
        let zero = &a - &a;

        assert_eq!(zero.len(), a.len());
        assert!(zero.is_zero(0.0));
    }

    #[test]
    fn test_ledger_mul_and_div_use_right_keys() {
        let a = ledger(&[(WOOD, 2.0), (ORE, 3.0)]);
        let factors = ledger(&[(ORE, 2.0), (GRAIN, 5.0)]);

        let product = &a * &factors;
        assert_eq!(product, ledger(&[(WOOD, 2.0), (ORE, 6.0), (GRAIN, 0.0)]));

        let quotient = &a / &ledger(&[(WOOD, 4.0)]);
        assert_eq!(quotient.get(WOOD), 0.5);
        assert_eq!(quotient.get(ORE), 3.0);
    }

    #[test]
    fn test_scalar_add_sub_div() {
        let mut a = ledger(&[(WOOD, 2.0), (ORE, 4.0)]);
        a.add_scalar(1.0);
        assert_eq!(a, ledger(&[(WOOD, 3.0), (ORE, 5.0)]));
        a.sub_scalar(3.0);
        assert_eq!(a, ledger(&[(WOOD, 0.0), (ORE, 2.0)]));
        assert_eq!(&a / 2.0, ledger(&[(WOOD, 0.0), (ORE, 1.0)]));
    }

    #[test]
    fn test_neg() {
        let a = ledger(&[(WOOD, 2.0), (ORE, -1.0)]);
        assert_eq!(-&a, ledger(&[(WOOD, -2.0), (ORE, 1.0)]));
    }

    #[test]
    fn test_clear() {
        let mut a = ledger(&[(WOOD, 2.0)]);
        a.clear();
        assert!(a.is_empty());
    }

    #[test]
    fn test_has_all_resources() {
        let stock = ledger(&[(WOOD, 5.0), (ORE, 1.0)]);

        assert!(stock.has_all_resources(&ledger(&[(WOOD, 5.0)])));
        assert!(stock.has_all_resources(&ledger(&[(WOOD, 2.0), (ORE, 1.0)])));
        assert!(!stock.has_all_resources(&ledger(&[(WOOD, 5.5)])));
        assert!(!stock.has_all_resources(&ledger(&[(GRAIN, 0.1)])));

        // Non-positive requirements are not requirements
        assert!(stock.has_all_resources(&ledger(&[(GRAIN, 0.0), (ORE, -4.0)])));
        assert!(stock.has_all_resources(&ResourceLedger::new()));
    }

    #[test]
    fn test_has_all_resources_is_reflexive() {
        let cases = [
            ResourceLedger::new(),
            ledger(&[(WOOD, 5.0)]),
            ledger(&[(WOOD, -5.0), (ORE, 0.0), (GRAIN, 1e-12)]),
        ];
        for l in &cases {
            assert!(l.has_all_resources(l));
        }
    }

    #[test]
    fn test_ledger_comparison_iterates_self_keys_only() {
        let small = ledger(&[(WOOD, 1.0)]);
        let big = ledger(&[(WOOD, 2.0), (ORE, 10.0)]);

        // small's only key is WOOD: 1 < 2
        assert!(small.all_lt(&big));
        assert!(small.all_le(&big));
        // big's ORE compares against small's implicit 0: 10 > 0, and 2 > 1
        assert!(big.all_gt(&small));
        assert!(big.all_ge(&small));
        assert!(!big.all_lt(&small));
    }

    #[test]
    fn test_ledger_comparison_is_not_a_partial_order() {
        let a = ledger(&[(WOOD, 1.0)]);
        let b = ledger(&[(WOOD, 1.0), (ORE, -3.0)]);

        // a: 1 < 1 fails, so !a.all_lt(b) ...
        assert!(!a.all_lt(&b));
        // ... and a >= b holds on a's keys
        assert!(a.all_ge(&b));
        // from b's side ORE is also checked: -3 >= 0 fails
        assert!(!b.all_ge(&a));
        assert!(b.all_le(&a));

        // Asymmetric equality
        assert!(a.all_eq(&b));
        assert!(!b.all_eq(&a));
    }

    #[test]
    fn test_empty_ledger_comparison_is_vacuous() {
        let empty = ResourceLedger::new();
        let other = ledger(&[(WOOD, -1.0)]);

        assert!(empty.all_lt(&other));
        assert!(empty.all_gt(&other));
    }

    #[test]
    fn test_scalar_comparisons() {
        let positive = ledger(&[(WOOD, 1.0), (ORE, 2.0)]);
        assert!(positive.gt_scalar(0.0));
        assert!(positive.ge_scalar(1.0));
        assert!(!positive.gt_scalar(1.0));
        assert!(positive.lt_scalar(3.0));
        assert!(positive.le_scalar(2.0));
        assert!(!positive.eq_scalar(1.0));

        let zeros = ledger(&[(WOOD, 0.0), (ORE, 0.0)]);
        assert!(zeros.eq_scalar(0.0));
    }

    #[test]
    fn test_empty_ledger_compares_as_zero() {
        let empty = ResourceLedger::new();
        assert!(empty.eq_scalar(0.0));
        assert!(empty.le_scalar(0.0));
        assert!(empty.ge_scalar(0.0));
        assert!(!empty.gt_scalar(0.0));
        assert!(!empty.lt_scalar(0.0));
        assert!(empty.lt_scalar(1.0));
    }

    #[test]
    fn test_transfer_to() {
        let mut from = ledger(&[(WOOD, 5.0)]);
        let mut to = ledger(&[(ORE, 1.0)]);
        from.transfer_to(&mut to, &ledger(&[(WOOD, 2.0)]));

        assert_eq!(from.get(WOOD), 3.0);
        assert_eq!(to.get(WOOD), 2.0);
        assert_eq!(to.get(ORE), 1.0);
    }

    #[test]
    fn test_enough_to_transfer() {
        let stock = ledger(&[(WOOD, 5.0)]);
        assert!(stock.enough_to_transfer(&ledger(&[(WOOD, 5.0)])));
        assert!(!stock.enough_to_transfer(&ledger(&[(WOOD, 5.0), (ORE, 1.0)])));
    }

    #[test]
    fn test_assign_from_and_multiply_add() {
        let mut a = ledger(&[(WOOD, 1.0), (ORE, 1.0)]);
        a.assign_from(&ledger(&[(ORE, 7.0)]));
        assert_eq!(a, ledger(&[(WOOD, 1.0), (ORE, 7.0)]));

        a.multiply_add(&ledger(&[(WOOD, 2.0), (GRAIN, 1.0)]), 0.5);
        assert_eq!(a, ledger(&[(WOOD, 2.0), (ORE, 7.0), (GRAIN, 0.5)]));
    }

    #[test]
    fn test_remove_limited_clamps_at_zero() {
        let mut a = ledger(&[(WOOD, 3.0), (ORE, 1.0)]);
        a.remove_limited(&ledger(&[(WOOD, 1.0), (ORE, 4.0), (GRAIN, 2.0)]));
        assert_eq!(a, ledger(&[(WOOD, 2.0), (ORE, 0.0), (GRAIN, 0.0)]));
    }

    #[test]
    fn test_limited_remove_reports_removed() {
        let mut a = ledger(&[(WOOD, 3.0), (ORE, 1.0)]);
        let removed = a.limited_remove(&ledger(&[(WOOD, 1.0), (ORE, 4.0)]));

        assert_eq!(removed, ledger(&[(WOOD, 1.0), (ORE, 1.0)]));
        assert_eq!(a, ledger(&[(WOOD, 2.0), (ORE, 0.0)]));
    }

    #[test]
    fn test_add_positive_and_negative() {
        let delta = ledger(&[(WOOD, 2.0), (ORE, -3.0)]);

        let mut produced = ResourceLedger::new();
        produced.add_positive(&delta);
        assert_eq!(produced, ledger(&[(WOOD, 2.0)]));

        let mut consumed = ResourceLedger::new();
        consumed.add_negative(&delta);
        assert_eq!(consumed, ledger(&[(ORE, 3.0)]));
    }

    #[test]
    fn test_unit_ledger_and_clamp() {
        let a = ledger(&[(WOOD, -2.0), (ORE, 0.5), (GRAIN, 9.0)]);
        assert_eq!(a.unit_ledger(1.0), ledger(&[(WOOD, 1.0), (ORE, 1.0), (GRAIN, 1.0)]));
        assert_eq!(a.clamp(0.0, 2.0), ledger(&[(WOOD, 0.0), (ORE, 0.5), (GRAIN, 2.0)]));
    }

    #[test]
    fn test_safe_division() {
        let supply = ledger(&[(WOOD, 4.0), (ORE, 0.0), (GRAIN, 3.0)]);
        let demand = ledger(&[(WOOD, 2.0), (ORE, 5.0), (GRAIN, 0.0)]);
        let ratio = supply.safe_division(&demand, f64::INFINITY);

        assert_eq!(ratio.get(WOOD), 2.0);
        assert_eq!(ratio.get(ORE), 0.0);
        assert_eq!(ratio.get(GRAIN), f64::INFINITY);
    }

    #[test]
    fn test_reductions() {
        let a = ledger(&[(WOOD, 2.0), (ORE, -1.0), (GRAIN, 5.0)]);
        assert_eq!(a.sum(), 6.0);
        assert_eq!(a.min(), -1.0);
        assert_eq!(a.max(), 5.0);
        assert!(approx_eq(a.average(), 2.0, EPSILON));

        let empty = ResourceLedger::new();
        assert_eq!(empty.sum(), 0.0);
        assert_eq!(empty.min(), 0.0);
        assert_eq!(empty.max(), 0.0);
        assert_eq!(empty.average(), 0.0);
    }

    #[test]
    fn test_multiply_and_sum_prices_a_basket() {
        let basket = ledger(&[(WOOD, 2.0), (ORE, 3.0)]);
        let prices = ledger(&[(WOOD, 1.5), (ORE, 10.0), (GRAIN, 99.0)]);
        assert_eq!(basket.multiply_and_sum(&prices), 33.0);
    }

    #[test]
    fn test_extend_accumulates() {
        let mut a = ResourceLedger::new();
        a.extend([(WOOD, 1.0), (WOOD, 2.0), (ORE, 1.0)]);
        assert_eq!(a, ledger(&[(WOOD, 3.0), (ORE, 1.0)]));
    }

    #[test]
    fn test_display() {
        let a = ledger(&[(ORE, 2.5), (WOOD, 1.0)]);
        assert_eq!(a.to_string(), "{ 1,1 2,2.5}");
        assert_eq!(ResourceLedger::new().to_string(), "{}");
    }
}
