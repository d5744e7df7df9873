//! # Financial Metrics Calculator
//!
//! Pure derivations of the money figures stamped onto transaction documents.
//! No I/O, no catalog access: everything is computed from line items and the
//! document's own monetary fields.
//!
//! ## Trade Rule Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  received > given   →  "up"    fee charged   diff owed + fee            │
//! │  given > received   →  "down"  no fee        nothing owed               │
//! │  received == given  →  "even"  flat fee      fee only                   │
//! │                                                                         │
//! │  cash_difference = max(0, received − given) + fee-when-applicable       │
//! │  (the store never pays out cash on a trade-down)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{Discount, NewAcquisitionLine, SaleLine, TradeType};
use crate::TRADE_FEE;

// =============================================================================
// Purchase Metrics
// =============================================================================

/// Expected performance of a supplier purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseMetrics {
    /// Σ(unit_selling_price × quantity).
    pub expected_revenue: Money,
    /// Expected revenue − total cost.
    pub expected_profit: Money,
    /// Profit as a share of revenue, in basis points. 0 when revenue is 0.
    pub margin_bps: i64,
}

/// Derives expected revenue, profit, and margin for an acquisition.
pub fn purchase_metrics(lines: &[NewAcquisitionLine], total_cost: Money) -> PurchaseMetrics {
    let expected_revenue = lines
        .iter()
        .map(|l| Money::from_cents(l.unit_selling_price_cents).multiply_quantity(l.quantity))
        .fold(Money::zero(), |acc, v| acc + v);

    let expected_profit = expected_revenue - total_cost;

    PurchaseMetrics {
        expected_revenue,
        expected_profit,
        margin_bps: expected_profit.ratio_bps(expected_revenue),
    }
}

// =============================================================================
// Trade Settlement
// =============================================================================

/// The balanced outcome of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeSettlement {
    pub trade_type: TradeType,
    /// Flat fee for up/even trades; zero for trade-downs.
    pub trade_fee: Money,
    /// What the customer owes. Never negative.
    pub cash_difference: Money,
}

/// Balances a trade from its two value totals.
///
/// ## Example
/// ```rust
/// use replay_core::metrics::trade_settlement;
/// use replay_core::money::Money;
/// use replay_core::types::TradeType;
/// use replay_core::TRADE_FEE;
///
/// // Customer trades up: owes the difference plus the fee
/// let s = trade_settlement(Money::from_cents(120_000), Money::from_cents(150_000));
/// assert_eq!(s.trade_type, TradeType::Up);
/// assert_eq!(s.cash_difference.cents(), 30_000 + TRADE_FEE.cents());
/// ```
pub fn trade_settlement(value_given: Money, value_received: Money) -> TradeSettlement {
    let trade_type = if value_received > value_given {
        TradeType::Up
    } else if value_given > value_received {
        TradeType::Down
    } else {
        TradeType::Even
    };

    let trade_fee = match trade_type {
        TradeType::Up | TradeType::Even => TRADE_FEE,
        TradeType::Down => Money::zero(),
    };

    let cash_difference = (value_received - value_given).max(Money::zero()) + trade_fee;

    TradeSettlement {
        trade_type,
        trade_fee,
        cash_difference,
    }
}

// =============================================================================
// Sale Totals
// =============================================================================

/// Every money figure stamped on a sale document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleTotals {
    pub subtotal: Money,
    pub discount_amount: Money,
    /// subtotal − discount + delivery fee.
    pub total_amount: Money,
    /// Σ(cost-basis snapshot × quantity).
    pub total_cost: Money,
    /// total_amount − delivery fee − total_cost (the fee is a pass-through,
    /// not margin).
    pub total_profit: Money,
    pub margin_bps: i64,
}

/// Derives the totals for a sale from its priced lines.
///
/// The discount is computed on the subtotal (percentage of it, or a fixed
/// amount capped at it) before the delivery fee is added.
pub fn sale_totals(lines: &[SaleLine], discount: Option<Discount>, delivery_fee: Money) -> SaleTotals {
    let subtotal = lines
        .iter()
        .map(|l| l.line_total())
        .fold(Money::zero(), |acc, v| acc + v);

    let discount_amount = discount
        .map(|d| d.amount(subtotal))
        .unwrap_or_else(Money::zero);

    let goods_revenue = subtotal - discount_amount;
    let total_amount = goods_revenue + delivery_fee;

    let total_cost = lines
        .iter()
        .map(|l| Money::from_cents(l.unit_cost_cents).multiply_quantity(l.quantity))
        .fold(Money::zero(), |acc, v| acc + v);

    let total_profit = goods_revenue - total_cost;

    SaleTotals {
        subtotal,
        discount_amount,
        total_amount,
        total_cost,
        total_profit,
        margin_bps: total_profit.ratio_bps(goods_revenue),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Variant;

    fn acq_line(qty: i64, sell: i64) -> NewAcquisitionLine {
        NewAcquisitionLine {
            barcode: "0123456789".to_string(),
            title: "Earthbound".to_string(),
            quantity: qty,
            unit_cost_cents: 0,
            unit_selling_price_cents: sell,
            is_new_sku: false,
            new_sku_list_price_cents: None,
        }
    }

    fn sale_line(price: i64, cost: i64, qty: i64) -> SaleLine {
        SaleLine {
            id: "l".to_string(),
            sale_id: "s".to_string(),
            position: 0,
            barcode: "0123456789".to_string(),
            title: "Earthbound".to_string(),
            unit_price_cents: price,
            unit_cost_cents: cost,
            quantity: qty,
            variant: Variant::WithCase,
        }
    }

    #[test]
    fn test_purchase_metrics() {
        let lines = vec![acq_line(2, 5000), acq_line(1, 10000)];
        let m = purchase_metrics(&lines, Money::from_cents(12000));

        assert_eq!(m.expected_revenue.cents(), 20000);
        assert_eq!(m.expected_profit.cents(), 8000);
        assert_eq!(m.margin_bps, 4000); // 40%
    }

    #[test]
    fn test_purchase_metrics_zero_revenue() {
        let m = purchase_metrics(&[], Money::from_cents(5000));
        assert_eq!(m.expected_revenue.cents(), 0);
        assert_eq!(m.expected_profit.cents(), -5000);
        assert_eq!(m.margin_bps, 0);
    }

    #[test]
    fn test_trade_down_no_fee_no_cash() {
        // given 1500, received 1200 → down, fee 0, nothing owed
        let s = trade_settlement(Money::from_cents(150_000), Money::from_cents(120_000));
        assert_eq!(s.trade_type, TradeType::Down);
        assert_eq!(s.trade_fee.cents(), 0);
        assert_eq!(s.cash_difference.cents(), 0);
    }

    #[test]
    fn test_trade_up_fee_plus_difference() {
        // given 1200, received 1500 → up, diff 300 + fee
        let s = trade_settlement(Money::from_cents(120_000), Money::from_cents(150_000));
        assert_eq!(s.trade_type, TradeType::Up);
        assert_eq!(s.trade_fee, TRADE_FEE);
        assert_eq!(s.cash_difference.cents(), 30_000 + TRADE_FEE.cents());
    }

    #[test]
    fn test_trade_even_flat_fee_only() {
        let s = trade_settlement(Money::from_cents(100_000), Money::from_cents(100_000));
        assert_eq!(s.trade_type, TradeType::Even);
        assert_eq!(s.trade_fee, TRADE_FEE);
        assert_eq!(s.cash_difference, TRADE_FEE);
    }

    #[test]
    fn test_sale_totals_percentage_discount() {
        let lines = vec![sale_line(10000, 4000, 2)];
        let t = sale_totals(&lines, Some(Discount::Percentage(1000)), Money::from_cents(500));

        assert_eq!(t.subtotal.cents(), 20000);
        assert_eq!(t.discount_amount.cents(), 2000);
        assert_eq!(t.total_amount.cents(), 18500);
        assert_eq!(t.total_cost.cents(), 8000);
        assert_eq!(t.total_profit.cents(), 10000);
        assert_eq!(t.margin_bps, 5556); // 10000/18000 rounded half-up
    }

    #[test]
    fn test_sale_totals_fixed_discount_capped() {
        let lines = vec![sale_line(1000, 400, 1)];
        let t = sale_totals(&lines, Some(Discount::Fixed(5000)), Money::zero());

        assert_eq!(t.subtotal.cents(), 1000);
        assert_eq!(t.discount_amount.cents(), 1000); // capped at subtotal
        assert_eq!(t.total_amount.cents(), 0);
        assert_eq!(t.total_profit.cents(), -400);
    }

    #[test]
    fn test_sale_totals_percentage_discount_capped() {
        // Over-100% percentages are rejected by validation; the cap keeps the
        // total non-negative even if one slips through another path.
        let lines = vec![sale_line(10000, 4000, 1)];
        let t = sale_totals(&lines, Some(Discount::Percentage(15000)), Money::zero());

        assert_eq!(t.subtotal.cents(), 10000);
        assert_eq!(t.discount_amount.cents(), 10000); // capped at subtotal
        assert_eq!(t.total_amount.cents(), 0);
    }

    #[test]
    fn test_sale_totals_no_discount() {
        let lines = vec![sale_line(9900, 4500, 1)];
        let t = sale_totals(&lines, None, Money::zero());

        assert_eq!(t.subtotal.cents(), 9900);
        assert_eq!(t.discount_amount.cents(), 0);
        assert_eq!(t.total_amount.cents(), 9900);
        assert_eq!(t.total_profit.cents(), 5400);
    }
}
