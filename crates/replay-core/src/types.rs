//! # Domain Types
//!
//! Core domain types for the Replay ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │      Sku        │   │  Acquisition    │   │   SaleOrder     │        │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │        │
//! │  │  barcode (PK)   │   │  id (UUID)      │   │  id (UUID)      │        │
//! │  │  two variant    │   │  reference      │   │  reference      │        │
//! │  │  stock counters │   │  supplier       │   │  customer       │        │
//! │  │  cost_basis     │   │  lines (in)     │   │  lines (out)    │        │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘        │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │     Trade       │   │    Variant      │   │   Statuses      │        │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │        │
//! │  │  given (in)     │   │  WithCase ★     │   │  per kind, see  │        │
//! │  │  received (out) │   │  CartridgeOnly  │   │  lifecycle.rs   │        │
//! │  │  cash diff/fee  │   │  (★ = default)  │   │                 │        │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every transaction document has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - `reference`: human-readable business code (PO-/ORD-/TRD- prefixed)
//!
//! ## Snapshot Invariant
//! Every monetary value on a line item is frozen at transaction-creation
//! time and never recomputed from the live catalog, except that an active
//! sale price substitutes for the list price at the moment the line is
//! created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Variant
// =============================================================================

/// The physical form a SKU is stocked and sold in.
///
/// ## Why an Enum With a Default?
/// Line items that omit a variant mean "with case". That is a configuration
/// default, not a polymorphic type, so it lives here as `Default` rather
/// than as nullable fields scattered through the line-item shapes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Boxed copy: cartridge/disc plus original case.
    #[default]
    WithCase,
    /// Loose cartridge or disc, no case.
    CartridgeOnly,
}

impl Variant {
    /// Stable lowercase label, also the database TEXT representation.
    pub const fn label(&self) -> &'static str {
        match self {
            Variant::WithCase => "with_case",
            Variant::CartridgeOnly => "cartridge_only",
        }
    }

    /// The `skus` column holding this variant's counter.
    ///
    /// Used by the repository layer to build delta updates; both variants
    /// funnel through the same SQL templates.
    pub const fn stock_column(&self) -> &'static str {
        match self {
            Variant::WithCase => "stock_with_case",
            Variant::CartridgeOnly => "stock_cartridge_only",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// SKU (catalog entry)
// =============================================================================

/// A catalog entry, identified by barcode, tracked in two physical variants.
///
/// ## Invariant
/// `total_available()` is always derived from the two counters; it is a
/// projection, never a stored column.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sku {
    /// Barcode (10-13 digits) - business identity and primary key.
    pub barcode: String,

    /// Display title.
    pub title: String,

    /// Stock of boxed copies. Never negative.
    pub stock_with_case: i64,

    /// Stock of loose cartridges. Never negative.
    pub stock_cartridge_only: i64,

    /// Moving-average per-unit acquisition cost, in cents.
    pub cost_basis_cents: i64,

    /// Current list price in cents.
    pub list_price_cents: i64,

    /// Whether a promotional sale price is in effect.
    pub sale_active: bool,

    /// Promotional price; required and below list when `sale_active`.
    pub sale_price_cents: Option<i64>,

    /// Cumulative units sold across all fulfilled sales.
    pub units_sold: i64,

    /// Soft existence: SKUs referenced by history are never hard-deleted.
    pub is_active: bool,

    /// When the SKU was first created.
    pub created_at: DateTime<Utc>,

    /// When the SKU was last mutated.
    pub updated_at: DateTime<Utc>,

    /// Optimistic concurrency counter, bumped by every write.
    pub version: i64,
}

impl Sku {
    /// Derived total across both variants. Recomputed, never stored.
    #[inline]
    pub fn total_available(&self) -> i64 {
        self.stock_with_case + self.stock_cartridge_only
    }

    /// Stock counter for one variant.
    #[inline]
    pub fn stock(&self, variant: Variant) -> i64 {
        match variant {
            Variant::WithCase => self.stock_with_case,
            Variant::CartridgeOnly => self.stock_cartridge_only,
        }
    }

    /// Moving-average cost basis as Money.
    #[inline]
    pub fn cost_basis(&self) -> Money {
        Money::from_cents(self.cost_basis_cents)
    }

    /// The price a sale line is created at: the active sale price when one
    /// is in effect, otherwise the list price.
    pub fn effective_price(&self) -> Money {
        match (self.sale_active, self.sale_price_cents) {
            (true, Some(sale)) => Money::from_cents(sale),
            _ => Money::from_cents(self.list_price_cents),
        }
    }

    /// Checks whether a pre-validated decrement of `quantity` can succeed.
    pub fn can_fulfill(&self, variant: Variant, quantity: i64) -> bool {
        self.stock(variant) >= quantity
    }
}

// =============================================================================
// Discount
// =============================================================================

/// A discount applied to a sale's subtotal before the delivery fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Discount {
    /// Percentage of the subtotal, in basis points (1000 = 10%).
    Percentage(u32),
    /// Fixed amount in cents, capped at the subtotal.
    Fixed(i64),
}

impl Discount {
    /// Computes the discount amount for a given subtotal.
    ///
    /// Neither arm can exceed the subtotal, so the discounted revenue is
    /// never negative. Percentages use half-up integer rounding; validation
    /// rejects more than 10000 bps before a payload gets this far, the cap
    /// here is the backstop.
    pub fn amount(&self, subtotal: Money) -> Money {
        match *self {
            Discount::Percentage(bps) => subtotal.percentage_bps(bps).min(subtotal),
            Discount::Fixed(cents) => Money::from_cents(cents).min(subtotal).max(Money::zero()),
        }
    }
}

// =============================================================================
// Statuses
// =============================================================================

/// Acquisition status. `completed` is the fulfilled status; the
/// pending↔completed edge is reversible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum AcquisitionStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

/// Sale status. Stock is committed at `confirmed` (the fulfillment
/// boundary); `preparing`/`shipped`/`delivered` stay inside the fulfilled
/// region. `delivered` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    #[default]
    Pending,
    Confirmed,
    Preparing,
    Shipped,
    Delivered,
    Cancelled,
}

/// Trade status. `completed` is the fulfilled status; a completed trade
/// may be cancelled once (the reversal edge).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

// =============================================================================
// Trade Type
// =============================================================================

/// Who owes value after a trade is balanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum TradeType {
    /// Customer receives more value and pays the difference plus the fee.
    Up,
    /// Customer gives more value; no fee.
    Down,
    /// Equal value; flat fee only.
    Even,
}

// =============================================================================
// Acquisition
// =============================================================================

/// A line on a supplier purchase.
/// Monetary fields are snapshots taken at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AcquisitionLine {
    pub id: String,
    pub acquisition_id: String,
    /// Position within the document (stable line ordering).
    pub position: i64,
    pub barcode: String,
    pub title: String,
    pub quantity: i64,
    /// What the store pays per unit; the input to the cost-basis blend.
    pub unit_cost_cents: i64,
    /// Planned resale price per unit; drives expected revenue.
    pub unit_selling_price_cents: i64,
    /// Marks a barcode not yet in the catalog; fulfillment creates it.
    pub is_new_sku: bool,
    /// List price for the catalog entry created on fulfill.
    pub new_sku_list_price_cents: Option<i64>,
}

/// A supplier purchase: inbound stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Acquisition {
    pub id: String,
    pub reference: String,
    pub supplier_name: String,
    pub supplier_contact: Option<String>,
    pub status: AcquisitionStatus,
    /// What the store pays the supplier for the whole document.
    pub total_cost_cents: i64,
    /// Derived: Σ(unit_selling_price × quantity).
    pub expected_revenue_cents: i64,
    /// Derived: expected revenue − total cost.
    pub expected_profit_cents: i64,
    /// Derived: profit as a share of revenue, in basis points.
    pub margin_bps: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub lines: Vec<AcquisitionLine>,
}

// =============================================================================
// Sale
// =============================================================================

/// A line on a customer order.
/// Uses the snapshot pattern: prices are frozen at line-creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleLine {
    pub id: String,
    pub sale_id: String,
    pub position: i64,
    pub barcode: String,
    pub title: String,
    /// Unit price at creation time (sale price substituted when active).
    pub unit_price_cents: i64,
    /// Cost basis at creation time; drives the profit figures.
    pub unit_cost_cents: i64,
    pub quantity: i64,
    pub variant: Variant,
}

impl SaleLine {
    /// Line total before document-level discount.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

/// A customer order: outbound stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleOrder {
    pub id: String,
    pub reference: String,
    pub customer_name: String,
    pub customer_contact: Option<String>,
    pub status: SaleStatus,
    pub subtotal_cents: i64,
    pub discount: Option<Discount>,
    pub discount_amount_cents: i64,
    pub delivery_fee_cents: i64,
    /// subtotal − discount + delivery fee.
    pub total_cents: i64,
    /// Derived from cost-basis snapshots on the lines.
    pub total_cost_cents: i64,
    pub total_profit_cents: i64,
    pub margin_bps: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub lines: Vec<SaleLine>,
}

// =============================================================================
// Trade
// =============================================================================

/// A line on a trade, in either direction.
///
/// Direction is carried by which array the line sits in (`given` vs
/// `received`), mirroring the document shape at the API boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TradeLine {
    pub id: String,
    pub trade_id: String,
    pub position: i64,
    pub barcode: String,
    pub title: String,
    pub quantity: i64,
    /// Credited/charged value per unit, fixed at creation.
    pub unit_value_cents: i64,
    pub variant: Variant,
    /// Only meaningful on `given` lines: fulfillment creates the SKU.
    pub is_new_sku: bool,
    pub new_sku_list_price_cents: Option<i64>,
}

/// A barter transaction: `given` adds stock, `received` removes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: String,
    pub reference: String,
    pub customer_name: String,
    pub customer_contact: Option<String>,
    pub status: TradeStatus,
    /// Σ(unit_value × quantity) over `given` lines.
    pub value_given_cents: i64,
    /// Σ(unit_value × quantity) over `received` lines.
    pub value_received_cents: i64,
    /// What the customer owes: max(0, received − given) plus the fee when
    /// the trade is up/even. Never negative.
    pub cash_difference_cents: i64,
    pub trade_fee_cents: i64,
    pub trade_type: TradeType,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Customer → store. May introduce brand-new SKUs.
    pub given: Vec<TradeLine>,
    /// Store → customer. Must already exist with sufficient stock.
    pub received: Vec<TradeLine>,
}

// =============================================================================
// Request Payloads
// =============================================================================
// What `create` consumes. Field names match the API boundary; quantities
// and prices are validated before anything is persisted.

/// Line payload for a new acquisition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAcquisitionLine {
    pub barcode: String,
    pub title: String,
    pub quantity: i64,
    pub unit_cost_cents: i64,
    pub unit_selling_price_cents: i64,
    #[serde(default)]
    pub is_new_sku: bool,
    #[serde(default)]
    pub new_sku_list_price_cents: Option<i64>,
}

/// Payload for creating a supplier purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAcquisition {
    pub supplier_name: String,
    #[serde(default)]
    pub supplier_contact: Option<String>,
    pub total_cost_cents: i64,
    #[serde(default)]
    pub notes: Option<String>,
    pub lines: Vec<NewAcquisitionLine>,
}

/// Line payload for a new sale. `unit_price_cents` is optional: when
/// omitted, the catalog's effective price (sale price if active) is
/// snapshotted at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSaleLine {
    pub barcode: String,
    pub quantity: i64,
    #[serde(default)]
    pub variant: Option<Variant>,
    #[serde(default)]
    pub unit_price_cents: Option<i64>,
}

/// Payload for creating a customer order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSaleOrder {
    pub customer_name: String,
    #[serde(default)]
    pub customer_contact: Option<String>,
    #[serde(default)]
    pub discount: Option<Discount>,
    #[serde(default)]
    pub delivery_fee_cents: i64,
    #[serde(default)]
    pub notes: Option<String>,
    pub lines: Vec<NewSaleLine>,
}

/// Line payload for stock the customer hands over in a trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTradeGivenLine {
    pub barcode: String,
    pub title: String,
    pub quantity: i64,
    /// Negotiated credit per unit.
    pub unit_value_cents: i64,
    #[serde(default)]
    pub variant: Option<Variant>,
    #[serde(default)]
    pub is_new_sku: bool,
    #[serde(default)]
    pub new_sku_list_price_cents: Option<i64>,
}

/// Line payload for stock the customer takes in a trade.
/// `unit_value_cents` is optional; when omitted the catalog's effective
/// price is used, exactly like a sale line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTradeReceivedLine {
    pub barcode: String,
    pub quantity: i64,
    #[serde(default)]
    pub variant: Option<Variant>,
    #[serde(default)]
    pub unit_value_cents: Option<i64>,
}

/// Payload for creating a trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTrade {
    pub customer_name: String,
    #[serde(default)]
    pub customer_contact: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub given: Vec<NewTradeGivenLine>,
    pub received: Vec<NewTradeReceivedLine>,
}

/// Details for creating a SKU outside any transaction (catalog seeding,
/// manual entry).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSkuDetails {
    pub barcode: String,
    pub title: String,
    pub list_price_cents: i64,
    #[serde(default)]
    pub sale_active: bool,
    #[serde(default)]
    pub sale_price_cents: Option<i64>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sku() -> Sku {
        let now = Utc::now();
        Sku {
            barcode: "0123456789".to_string(),
            title: "Chrono Trigger".to_string(),
            stock_with_case: 3,
            stock_cartridge_only: 2,
            cost_basis_cents: 4500,
            list_price_cents: 9900,
            sale_active: false,
            sale_price_cents: None,
            units_sold: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    #[test]
    fn test_variant_default_is_with_case() {
        assert_eq!(Variant::default(), Variant::WithCase);
        assert_eq!(Variant::default().stock_column(), "stock_with_case");
    }

    #[test]
    fn test_total_available_is_derived() {
        let sku = sku();
        assert_eq!(sku.total_available(), 5);
        assert_eq!(sku.stock(Variant::WithCase), 3);
        assert_eq!(sku.stock(Variant::CartridgeOnly), 2);
    }

    #[test]
    fn test_effective_price_substitutes_active_sale() {
        let mut sku = sku();
        assert_eq!(sku.effective_price().cents(), 9900);

        sku.sale_active = true;
        sku.sale_price_cents = Some(7900);
        assert_eq!(sku.effective_price().cents(), 7900);

        // Sale flag without a price falls back to list
        sku.sale_price_cents = None;
        assert_eq!(sku.effective_price().cents(), 9900);
    }

    #[test]
    fn test_can_fulfill() {
        let sku = sku();
        assert!(sku.can_fulfill(Variant::CartridgeOnly, 2));
        assert!(!sku.can_fulfill(Variant::CartridgeOnly, 3));
    }

    #[test]
    fn test_discount_amount() {
        let subtotal = Money::from_cents(10000);
        assert_eq!(Discount::Percentage(1000).amount(subtotal).cents(), 1000);
        assert_eq!(Discount::Fixed(2500).amount(subtotal).cents(), 2500);
        // Fixed discount is capped at the subtotal
        assert_eq!(Discount::Fixed(99999).amount(subtotal).cents(), 10000);
    }

    #[test]
    fn test_sale_line_total() {
        let line = SaleLine {
            id: "l1".to_string(),
            sale_id: "s1".to_string(),
            position: 0,
            barcode: "0123456789".to_string(),
            title: "Chrono Trigger".to_string(),
            unit_price_cents: 9900,
            unit_cost_cents: 4500,
            quantity: 2,
            variant: Variant::WithCase,
        };
        assert_eq!(line.line_total().cents(), 19800);
    }
}
