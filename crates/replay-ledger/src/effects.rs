//! # Stock Effects
//!
//! The common currency between the three transaction kinds and the engine.
//! Each kind lowers its line items into a list of `StockEffect`s; the engine
//! applies the list (fulfilling) or its inverse (reversing) without knowing
//! which kind produced it.
//!
//! ## Lowering Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Acquisition line                 → Increase (blends cost basis,        │
//! │                                      may create the SKU)               │
//! │  Sale line                        → Decrease (counts toward sold)       │
//! │  Trade `given` line               → Increase (customer's copy comes in, │
//! │                                      credit value is the unit cost)     │
//! │  Trade `received` line            → Decrease (store hands a copy out,   │
//! │                                      not a sale: sold count untouched)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use replay_core::{Acquisition, Money, SaleOrder, Trade, Variant};

/// Catalog details carried by an `Increase` whose barcode may not exist yet.
#[derive(Debug, Clone)]
pub struct NewSkuSeed {
    pub title: String,
    pub list_price_cents: i64,
}

/// Which stock counter the cost-basis blend weighs against.
///
/// Acquisitions do not distinguish variants, so their blend uses the
/// SKU-wide total; trade lines are variant-tracked and blend against the
/// counter they actually touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostingScope {
    Sku,
    Variant,
}

/// One physical consequence of fulfilling a transaction.
#[derive(Debug, Clone)]
pub enum StockEffect {
    /// Stock comes in: blend the cost basis, bump the variant counter.
    Increase {
        barcode: String,
        variant: Variant,
        quantity: i64,
        /// Per-unit cost entering the moving-average blend.
        unit_cost: Money,
        /// Stock counter the blend weighs against.
        costing: CostingScope,
        /// Present when the line is flagged as a brand-new SKU. Ignored if
        /// the barcode already exists (the increase proceeds normally).
        new_sku: Option<NewSkuSeed>,
    },
    /// Stock goes out: pre-validated decrement of the variant counter.
    Decrease {
        barcode: String,
        variant: Variant,
        quantity: i64,
        /// Sales move the cumulative sold counter; trades do not.
        counts_toward_sold: bool,
    },
}

impl StockEffect {
    pub fn barcode(&self) -> &str {
        match self {
            StockEffect::Increase { barcode, .. } => barcode,
            StockEffect::Decrease { barcode, .. } => barcode,
        }
    }
}

/// Lowers an acquisition's lines. All stock arrives boxed.
pub fn acquisition_effects(acquisition: &Acquisition) -> Vec<StockEffect> {
    acquisition
        .lines
        .iter()
        .map(|line| StockEffect::Increase {
            barcode: line.barcode.clone(),
            variant: Variant::WithCase,
            quantity: line.quantity,
            unit_cost: Money::from_cents(line.unit_cost_cents),
            costing: CostingScope::Sku,
            new_sku: line.is_new_sku.then(|| NewSkuSeed {
                title: line.title.clone(),
                list_price_cents: line
                    .new_sku_list_price_cents
                    .unwrap_or(line.unit_selling_price_cents),
            }),
        })
        .collect()
}

/// Lowers a sale's lines.
pub fn sale_effects(sale: &SaleOrder) -> Vec<StockEffect> {
    sale.lines
        .iter()
        .map(|line| StockEffect::Decrease {
            barcode: line.barcode.clone(),
            variant: line.variant,
            quantity: line.quantity,
            counts_toward_sold: true,
        })
        .collect()
}

/// Lowers both sides of a trade. The credit value of a `given` line is the
/// cost the store effectively paid for that copy, so it feeds the blend.
pub fn trade_effects(trade: &Trade) -> Vec<StockEffect> {
    let given = trade.given.iter().map(|line| StockEffect::Increase {
        barcode: line.barcode.clone(),
        variant: line.variant,
        quantity: line.quantity,
        unit_cost: Money::from_cents(line.unit_value_cents),
        costing: CostingScope::Variant,
        new_sku: line.is_new_sku.then(|| NewSkuSeed {
            title: line.title.clone(),
            list_price_cents: line.new_sku_list_price_cents.unwrap_or(line.unit_value_cents),
        }),
    });

    let received = trade.received.iter().map(|line| StockEffect::Decrease {
        barcode: line.barcode.clone(),
        variant: line.variant,
        quantity: line.quantity,
        counts_toward_sold: false,
    });

    given.chain(received).collect()
}
