//! # Cost-Basis Calculator
//!
//! The moving-average (weighted-average) cost blend applied on every stock
//! increase, standard for perpetual inventory accounting.
//!
//! ## The Blend
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Existing: 5 units @ $10.00          Incoming: 5 units @ $12.00         │
//! │                                                                         │
//! │  next = (10.00 × 5  +  12.00 × 5) / (5 + 5)  =  $11.00                  │
//! │                                                                         │
//! │  Special cases:                                                         │
//! │    existing stock 0 or cost 0  →  incoming unit cost (nothing to blend) │
//! │    incoming quantity ≤ 0       →  existing cost unchanged               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Irreversibility
//! Reversing a transaction undoes stock but NOT the blend: un-averaging a
//! moving average is not well-defined. The cost basis stays at its
//! post-blend value. This is a documented approximation, not a bug.
//!
//! ## Numeric Semantics
//! Integer cents with an i128 intermediate and half-up rounding, so repeated
//! small blends cannot drift the way floating arithmetic would.

use crate::money::Money;

/// Computes the next moving-average cost basis after a stock increase.
///
/// ## Arguments
/// * `existing_stock` - units on hand before the increase (variant-specific
///   or SKU-wide, depending on the transaction kind)
/// * `existing_cost` - current per-unit cost basis
/// * `incoming_qty` - units being added
/// * `incoming_cost` - per-unit cost of the incoming units
///
/// ## Example
/// ```rust
/// use replay_core::costing::next_cost_basis;
/// use replay_core::money::Money;
///
/// let next = next_cost_basis(5, Money::from_cents(1000), 5, Money::from_cents(1200));
/// assert_eq!(next.cents(), 1100);
/// ```
pub fn next_cost_basis(
    existing_stock: i64,
    existing_cost: Money,
    incoming_qty: i64,
    incoming_cost: Money,
) -> Money {
    if incoming_qty <= 0 {
        return existing_cost;
    }

    // No history to blend: take the incoming cost directly.
    if existing_stock <= 0 || existing_cost.is_zero() {
        return incoming_cost;
    }

    let total_qty = existing_stock as i128 + incoming_qty as i128;
    let blended_value = existing_cost.cents() as i128 * existing_stock as i128
        + incoming_cost.cents() as i128 * incoming_qty as i128;

    // Half-up rounding keeps round-trip stability across many small blends.
    let per_unit = (blended_value + total_qty / 2) / total_qty;
    Money::from_cents(per_unit as i64)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_average() {
        // 5 @ $10.00 blended with 5 @ $12.00 → $11.00
        let next = next_cost_basis(5, Money::from_cents(1000), 5, Money::from_cents(1200));
        assert_eq!(next.cents(), 1100);
    }

    #[test]
    fn test_zero_existing_stock_takes_incoming() {
        let next = next_cost_basis(0, Money::from_cents(1000), 3, Money::from_cents(1500));
        assert_eq!(next.cents(), 1500);
    }

    #[test]
    fn test_zero_existing_cost_takes_incoming() {
        let next = next_cost_basis(7, Money::zero(), 3, Money::from_cents(1500));
        assert_eq!(next.cents(), 1500);
    }

    #[test]
    fn test_non_positive_incoming_is_a_no_op() {
        let existing = Money::from_cents(1000);
        assert_eq!(next_cost_basis(5, existing, 0, Money::from_cents(9999)), existing);
        assert_eq!(next_cost_basis(5, existing, -2, Money::from_cents(9999)), existing);
    }

    #[test]
    fn test_uneven_blend_rounds_half_up() {
        // (1000×1 + 1001×2) / 3 = 1000.666... → 1001
        let next = next_cost_basis(1, Money::from_cents(1000), 2, Money::from_cents(1001));
        assert_eq!(next.cents(), 1001);

        // (1000×2 + 1001×1) / 3 = 1000.333... → 1000
        let next = next_cost_basis(2, Money::from_cents(1000), 1, Money::from_cents(1001));
        assert_eq!(next.cents(), 1000);
    }

    #[test]
    fn test_many_small_blends_stay_stable() {
        // Restocking one unit at the same cost must never move the basis.
        let mut cost = Money::from_cents(1234);
        let mut stock = 10;
        for _ in 0..500 {
            cost = next_cost_basis(stock, cost, 1, Money::from_cents(1234));
            stock += 1;
        }
        assert_eq!(cost.cents(), 1234);
    }

    #[test]
    fn test_large_values_do_not_overflow() {
        // Collector-grade prices times warehouse quantities still fit i128
        let next = next_cost_basis(
            1_000_000,
            Money::from_cents(50_000_000),
            1_000_000,
            Money::from_cents(70_000_000),
        );
        assert_eq!(next.cents(), 60_000_000);
    }
}
