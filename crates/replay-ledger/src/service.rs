//! # Ledger Service
//!
//! The one entry point for everything the storefront does: create
//! transaction documents, move them through their lifecycles, and read the
//! catalog. One implementation serves all three kinds; the differences live
//! in the lifecycle tables (replay-core) and the effect lowering
//! (effects.rs), not here.
//!
//! ## Transition Flow
//! ```text
//! transition_sale(id, requested)
//!      │
//!      ▼
//! load document ──────────────► TransactionNotFound
//!      │
//!      ▼
//! classify(current, requested) ► InvalidTransition
//!      │
//!      ├── NoOp ──► return document untouched (idempotent)
//!      │
//!      ▼ BEGIN
//! Fulfilling → apply effects    ── InsufficientStock ► ROLLBACK
//! Reversing  → revert effects
//! Neutral    → no catalog work
//!      │
//!      ▼
//! status CAS (WHERE status = current) ── raced ► ROLLBACK, Conflict
//!      │
//!      ▼ COMMIT
//! return re-read document
//! ```

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use replay_core::metrics::{purchase_metrics, sale_totals, trade_settlement};
use replay_core::validation::{
    validate_new_acquisition, validate_new_sale, validate_new_sku, validate_new_trade,
};
use replay_core::{
    classify, Acquisition, AcquisitionLine, AcquisitionStatus, CoreError, Money, NewAcquisition,
    NewSaleOrder, NewSkuDetails, NewTrade, SaleLine, SaleOrder, SaleStatus, Sku, Trade, TradeLine,
    TradeStatus, Transition,
};
use replay_db::{Database, DbError};

use crate::effects::{acquisition_effects, sale_effects, trade_effects, StockEffect};
use crate::engine::{apply_effects, revert_effects};
use crate::error::{LedgerError, LedgerResult};
use crate::reference::{reference_code, PREFIX_ACQUISITION, PREFIX_SALE, PREFIX_TRADE};

/// The ledger service.
///
/// Cheap to clone; every clone shares the underlying pool.
#[derive(Debug, Clone)]
pub struct Ledger {
    db: Database,
}

impl Ledger {
    /// Creates a ledger service over an initialized database.
    pub fn new(db: Database) -> Self {
        Ledger { db }
    }

    /// The underlying database handle, for read-only listing queries.
    pub fn database(&self) -> &Database {
        &self.db
    }

    // -------------------------------------------------------------------------
    // Catalog
    // -------------------------------------------------------------------------

    /// Gets a SKU by barcode.
    pub async fn sku(&self, barcode: &str) -> LedgerResult<Sku> {
        self.db
            .catalog()
            .get_by_barcode(barcode)
            .await?
            .ok_or_else(|| CoreError::SkuNotFound(barcode.to_string()).into())
    }

    /// Creates a catalog entry outside any transaction (manual entry).
    pub async fn create_sku(&self, details: NewSkuDetails) -> LedgerResult<Sku> {
        validate_new_sku(&details).map_err(CoreError::from)?;

        let now = Utc::now();
        let sku = Sku {
            barcode: details.barcode.trim().to_string(),
            title: details.title.trim().to_string(),
            stock_with_case: 0,
            stock_cartridge_only: 0,
            cost_basis_cents: 0,
            list_price_cents: details.list_price_cents,
            sale_active: details.sale_active,
            sale_price_cents: details.sale_price_cents,
            units_sold: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
            version: 0,
        };

        self.db.catalog().insert(&sku).await.map_err(|e| match e {
            DbError::UniqueViolation { .. } => {
                LedgerError::Core(CoreError::DuplicateBarcode(sku.barcode.clone()))
            }
            other => other.into(),
        })?;

        info!(barcode = %sku.barcode, "SKU created");
        Ok(sku)
    }

    /// Updates a SKU's pricing, enforcing the sale-price rule.
    pub async fn set_sku_pricing(
        &self,
        barcode: &str,
        list_price_cents: i64,
        sale_active: bool,
        sale_price_cents: Option<i64>,
    ) -> LedgerResult<Sku> {
        replay_core::validation::validate_amount("list_price_cents", list_price_cents)
            .map_err(CoreError::from)?;
        replay_core::validation::validate_sale_price(
            list_price_cents,
            sale_active,
            sale_price_cents,
        )
        .map_err(CoreError::from)?;

        self.db
            .catalog()
            .set_pricing(barcode, list_price_cents, sale_active, sale_price_cents)
            .await
            .map_err(|e| match e {
                DbError::NotFound { .. } => {
                    LedgerError::Core(CoreError::SkuNotFound(barcode.to_string()))
                }
                other => other.into(),
            })?;

        self.sku(barcode).await
    }

    // -------------------------------------------------------------------------
    // Create
    // -------------------------------------------------------------------------

    /// Creates a supplier purchase in `pending`. No stock moves until the
    /// document is completed.
    #[instrument(skip(self, payload), fields(supplier = %payload.supplier_name))]
    pub async fn create_acquisition(&self, payload: NewAcquisition) -> LedgerResult<Acquisition> {
        validate_new_acquisition(&payload).map_err(CoreError::from)?;

        let metrics = purchase_metrics(&payload.lines, Money::from_cents(payload.total_cost_cents));

        let id = Uuid::new_v4();
        let now = Utc::now();

        let lines: Vec<AcquisitionLine> = payload
            .lines
            .into_iter()
            .enumerate()
            .map(|(position, line)| AcquisitionLine {
                id: Uuid::new_v4().to_string(),
                acquisition_id: id.to_string(),
                position: position as i64,
                barcode: line.barcode.trim().to_string(),
                title: line.title.trim().to_string(),
                quantity: line.quantity,
                unit_cost_cents: line.unit_cost_cents,
                unit_selling_price_cents: line.unit_selling_price_cents,
                is_new_sku: line.is_new_sku,
                new_sku_list_price_cents: line.new_sku_list_price_cents,
            })
            .collect();

        let acquisition = Acquisition {
            id: id.to_string(),
            reference: reference_code(PREFIX_ACQUISITION, &id, now),
            supplier_name: payload.supplier_name.trim().to_string(),
            supplier_contact: payload.supplier_contact,
            status: AcquisitionStatus::Pending,
            total_cost_cents: payload.total_cost_cents,
            expected_revenue_cents: metrics.expected_revenue.cents(),
            expected_profit_cents: metrics.expected_profit.cents(),
            margin_bps: metrics.margin_bps,
            notes: payload.notes,
            created_at: now,
            updated_at: now,
            completed_at: None,
            lines,
        };

        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;
        self.db
            .acquisitions()
            .insert_in_tx(&mut tx, &acquisition)
            .await?;
        tx.commit().await.map_err(DbError::from)?;

        info!(reference = %acquisition.reference, "Acquisition created");
        Ok(acquisition)
    }

    /// Creates a customer order in `pending`, snapshotting prices and cost
    /// bases from the live catalog. Stock is not checked or moved until
    /// confirmation.
    #[instrument(skip(self, payload), fields(customer = %payload.customer_name))]
    pub async fn create_sale(&self, payload: NewSaleOrder) -> LedgerResult<SaleOrder> {
        validate_new_sale(&payload).map_err(CoreError::from)?;

        let id = Uuid::new_v4();
        let now = Utc::now();
        let catalog = self.db.catalog();

        let mut lines = Vec::with_capacity(payload.lines.len());
        for (position, line) in payload.lines.into_iter().enumerate() {
            let barcode = line.barcode.trim().to_string();
            let sku = catalog
                .get_by_barcode(&barcode)
                .await?
                .filter(|s| s.is_active)
                .ok_or_else(|| CoreError::SkuNotFound(barcode.clone()))?;

            // Snapshot: the effective price (sale price when active) and
            // the current cost basis are frozen onto the line.
            let unit_price_cents = line
                .unit_price_cents
                .unwrap_or_else(|| sku.effective_price().cents());

            lines.push(SaleLine {
                id: Uuid::new_v4().to_string(),
                sale_id: id.to_string(),
                position: position as i64,
                barcode,
                title: sku.title.clone(),
                unit_price_cents,
                unit_cost_cents: sku.cost_basis_cents,
                quantity: line.quantity,
                variant: line.variant.unwrap_or_default(),
            });
        }

        let totals = sale_totals(
            &lines,
            payload.discount,
            Money::from_cents(payload.delivery_fee_cents),
        );

        let sale = SaleOrder {
            id: id.to_string(),
            reference: reference_code(PREFIX_SALE, &id, now),
            customer_name: payload.customer_name.trim().to_string(),
            customer_contact: payload.customer_contact,
            status: SaleStatus::Pending,
            subtotal_cents: totals.subtotal.cents(),
            discount: payload.discount,
            discount_amount_cents: totals.discount_amount.cents(),
            delivery_fee_cents: payload.delivery_fee_cents,
            total_cents: totals.total_amount.cents(),
            total_cost_cents: totals.total_cost.cents(),
            total_profit_cents: totals.total_profit.cents(),
            margin_bps: totals.margin_bps,
            notes: payload.notes,
            created_at: now,
            updated_at: now,
            confirmed_at: None,
            delivered_at: None,
            lines,
        };

        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;
        self.db.sales().insert_in_tx(&mut tx, &sale).await?;
        tx.commit().await.map_err(DbError::from)?;

        info!(reference = %sale.reference, total = %totals.total_amount, "Sale created");
        Ok(sale)
    }

    /// Creates a trade in `pending` and balances it: trade type, fee, and
    /// the cash difference the customer owes are derived from the two value
    /// totals.
    #[instrument(skip(self, payload), fields(customer = %payload.customer_name))]
    pub async fn create_trade(&self, payload: NewTrade) -> LedgerResult<Trade> {
        validate_new_trade(&payload).map_err(CoreError::from)?;

        let id = Uuid::new_v4();
        let now = Utc::now();
        let catalog = self.db.catalog();

        let given: Vec<TradeLine> = payload
            .given
            .into_iter()
            .enumerate()
            .map(|(position, line)| TradeLine {
                id: Uuid::new_v4().to_string(),
                trade_id: id.to_string(),
                position: position as i64,
                barcode: line.barcode.trim().to_string(),
                title: line.title.trim().to_string(),
                quantity: line.quantity,
                unit_value_cents: line.unit_value_cents,
                variant: line.variant.unwrap_or_default(),
                is_new_sku: line.is_new_sku,
                new_sku_list_price_cents: line.new_sku_list_price_cents,
            })
            .collect();

        let mut received = Vec::with_capacity(payload.received.len());
        for (position, line) in payload.received.into_iter().enumerate() {
            let barcode = line.barcode.trim().to_string();
            let sku = catalog
                .get_by_barcode(&barcode)
                .await?
                .filter(|s| s.is_active)
                .ok_or_else(|| CoreError::SkuNotFound(barcode.clone()))?;

            // Same snapshot rule as a sale line
            let unit_value_cents = line
                .unit_value_cents
                .unwrap_or_else(|| sku.effective_price().cents());

            received.push(TradeLine {
                id: Uuid::new_v4().to_string(),
                trade_id: id.to_string(),
                position: position as i64,
                barcode,
                title: sku.title.clone(),
                quantity: line.quantity,
                unit_value_cents,
                variant: line.variant.unwrap_or_default(),
                is_new_sku: false,
                new_sku_list_price_cents: None,
            });
        }

        let value_given = line_value_total(&given);
        let value_received = line_value_total(&received);
        let settlement = trade_settlement(value_given, value_received);

        let trade = Trade {
            id: id.to_string(),
            reference: reference_code(PREFIX_TRADE, &id, now),
            customer_name: payload.customer_name.trim().to_string(),
            customer_contact: payload.customer_contact,
            status: TradeStatus::Pending,
            value_given_cents: value_given.cents(),
            value_received_cents: value_received.cents(),
            cash_difference_cents: settlement.cash_difference.cents(),
            trade_fee_cents: settlement.trade_fee.cents(),
            trade_type: settlement.trade_type,
            notes: payload.notes,
            created_at: now,
            updated_at: now,
            confirmed_at: None,
            completed_at: None,
            given,
            received,
        };

        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;
        self.db.trades().insert_in_tx(&mut tx, &trade).await?;
        tx.commit().await.map_err(DbError::from)?;

        info!(
            reference = %trade.reference,
            trade_type = ?trade.trade_type,
            cash_difference = %settlement.cash_difference,
            "Trade created"
        );
        Ok(trade)
    }

    // -------------------------------------------------------------------------
    // Read
    // -------------------------------------------------------------------------

    /// Gets an acquisition by UUID.
    pub async fn acquisition(&self, id: &str) -> LedgerResult<Acquisition> {
        self.db
            .acquisitions()
            .get(id)
            .await?
            .ok_or_else(|| CoreError::TransactionNotFound(id.to_string()).into())
    }

    /// Gets a sale by UUID.
    pub async fn sale(&self, id: &str) -> LedgerResult<SaleOrder> {
        self.db
            .sales()
            .get(id)
            .await?
            .ok_or_else(|| CoreError::TransactionNotFound(id.to_string()).into())
    }

    /// Gets a trade by UUID.
    pub async fn trade(&self, id: &str) -> LedgerResult<Trade> {
        self.db
            .trades()
            .get(id)
            .await?
            .ok_or_else(|| CoreError::TransactionNotFound(id.to_string()).into())
    }

    // -------------------------------------------------------------------------
    // Transition
    // -------------------------------------------------------------------------

    /// Moves an acquisition to `requested`.
    ///
    /// Completing takes the stock in and blends cost bases; stepping a
    /// completed document back (or cancelling it) undoes the stock effects.
    #[instrument(skip(self), fields(id = %id, requested = ?requested))]
    pub async fn transition_acquisition(
        &self,
        id: &str,
        requested: AcquisitionStatus,
        note: Option<&str>,
    ) -> LedgerResult<Acquisition> {
        let acquisition = self.acquisition(id).await?;
        let transition = classify(acquisition.status, requested)?;

        if transition == Transition::NoOp {
            return Ok(acquisition);
        }

        let effects = acquisition_effects(&acquisition);
        self.run_transition(
            &effects,
            transition,
            &acquisition.reference,
            CasTarget::Acquisition {
                id,
                from: acquisition.status,
                to: requested,
            },
            note,
        )
        .await?;

        info!(reference = %acquisition.reference, ?transition, "Acquisition transitioned");
        self.acquisition(id).await
    }

    /// Moves a sale to `requested`.
    ///
    /// Confirmation commits the stock (all lines pre-validated, all-or-
    /// nothing); later cancellation before shipping restores it.
    #[instrument(skip(self), fields(id = %id, requested = ?requested))]
    pub async fn transition_sale(
        &self,
        id: &str,
        requested: SaleStatus,
        note: Option<&str>,
    ) -> LedgerResult<SaleOrder> {
        let sale = self.sale(id).await?;
        let transition = classify(sale.status, requested)?;

        if transition == Transition::NoOp {
            return Ok(sale);
        }

        let effects = sale_effects(&sale);
        self.run_transition(
            &effects,
            transition,
            &sale.reference,
            CasTarget::Sale {
                id,
                from: sale.status,
                to: requested,
            },
            note,
        )
        .await?;

        info!(reference = %sale.reference, ?transition, "Sale transitioned");
        self.sale(id).await
    }

    /// Moves a trade to `requested`.
    ///
    /// Completion applies both directions atomically: given stock in (new
    /// SKUs created as needed), received stock out (pre-validated).
    #[instrument(skip(self), fields(id = %id, requested = ?requested))]
    pub async fn transition_trade(
        &self,
        id: &str,
        requested: TradeStatus,
        note: Option<&str>,
    ) -> LedgerResult<Trade> {
        let trade = self.trade(id).await?;
        let transition = classify(trade.status, requested)?;

        if transition == Transition::NoOp {
            return Ok(trade);
        }

        let effects = trade_effects(&trade);
        self.run_transition(
            &effects,
            transition,
            &trade.reference,
            CasTarget::Trade {
                id,
                from: trade.status,
                to: requested,
            },
            note,
        )
        .await?;

        info!(reference = %trade.reference, ?transition, "Trade transitioned");
        self.trade(id).await
    }

    /// The shared transition body: one transaction wrapping the catalog
    /// effects and the status compare-and-set.
    async fn run_transition(
        &self,
        effects: &[StockEffect],
        transition: Transition,
        reference: &str,
        target: CasTarget<'_>,
        note: Option<&str>,
    ) -> LedgerResult<()> {
        let catalog = self.db.catalog();
        let now = Utc::now();

        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;

        match transition {
            Transition::Fulfilling => apply_effects(&catalog, &mut tx, effects).await?,
            Transition::Reversing => revert_effects(&catalog, &mut tx, effects).await?,
            Transition::Neutral => {}
            Transition::NoOp => unreachable!("NoOp returns before the transaction opens"),
        }

        // Last write: the CAS guards against a concurrent transition that
        // slipped in between our read and this transaction.
        let won = match target {
            CasTarget::Acquisition { id, from, to } => {
                self.db
                    .acquisitions()
                    .set_status_cas(&mut tx, id, from, to, note, now)
                    .await?
            }
            CasTarget::Sale { id, from, to } => {
                self.db
                    .sales()
                    .set_status_cas(&mut tx, id, from, to, note, now)
                    .await?
            }
            CasTarget::Trade { id, from, to } => {
                self.db
                    .trades()
                    .set_status_cas(&mut tx, id, from, to, note, now)
                    .await?
            }
        };

        if !won {
            // Dropping the transaction rolls everything back
            return Err(LedgerError::Conflict {
                reference: reference.to_string(),
            });
        }

        tx.commit().await.map_err(DbError::from)?;
        Ok(())
    }
}

/// Which document the transition's status compare-and-set targets.
enum CasTarget<'a> {
    Acquisition {
        id: &'a str,
        from: AcquisitionStatus,
        to: AcquisitionStatus,
    },
    Sale {
        id: &'a str,
        from: SaleStatus,
        to: SaleStatus,
    },
    Trade {
        id: &'a str,
        from: TradeStatus,
        to: TradeStatus,
    },
}

fn line_value_total(lines: &[TradeLine]) -> Money {
    lines
        .iter()
        .map(|l| Money::from_cents(l.unit_value_cents).multiply_quantity(l.quantity))
        .fold(Money::zero(), |acc, v| acc + v)
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use replay_core::{
        Discount, NewAcquisitionLine, NewSaleLine, NewTradeGivenLine, NewTradeReceivedLine,
        Variant, TRADE_FEE,
    };
    use replay_db::DbConfig;

    async fn ledger() -> Ledger {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        Ledger::new(db)
    }

    /// Seeds a catalog entry directly, with stock already on hand.
    async fn seed(ledger: &Ledger, barcode: &str, title: &str, stock: i64, cost: i64, list: i64) {
        let now = Utc::now();
        let sku = Sku {
            barcode: barcode.to_string(),
            title: title.to_string(),
            stock_with_case: stock,
            stock_cartridge_only: 0,
            cost_basis_cents: cost,
            list_price_cents: list,
            sale_active: false,
            sale_price_cents: None,
            units_sold: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
            version: 0,
        };
        ledger.database().catalog().insert(&sku).await.unwrap();
    }

    fn acq_payload(barcode: &str, qty: i64, unit_cost: i64, total_cost: i64) -> NewAcquisition {
        NewAcquisition {
            supplier_name: "Retro Wholesale".to_string(),
            supplier_contact: None,
            total_cost_cents: total_cost,
            notes: None,
            lines: vec![NewAcquisitionLine {
                barcode: barcode.to_string(),
                title: "SNES Chrono Trigger".to_string(),
                quantity: qty,
                unit_cost_cents: unit_cost,
                unit_selling_price_cents: 2500,
                is_new_sku: false,
                new_sku_list_price_cents: None,
            }],
        }
    }

    fn sale_payload(lines: Vec<NewSaleLine>) -> NewSaleOrder {
        NewSaleOrder {
            customer_name: "Ada".to_string(),
            customer_contact: None,
            discount: None,
            delivery_fee_cents: 0,
            notes: None,
            lines,
        }
    }

    fn sale_line(barcode: &str, qty: i64) -> NewSaleLine {
        NewSaleLine {
            barcode: barcode.to_string(),
            quantity: qty,
            variant: None,
            unit_price_cents: None,
        }
    }

    // -------------------------------------------------------------------------
    // Acquisitions
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_completing_acquisition_blends_cost_basis() {
        let ledger = ledger().await;
        seed(&ledger, "0111111111", "SNES Chrono Trigger", 5, 1000, 2500).await;

        // 5 on hand @ 10.00, buy 5 more @ 12.00
        let acq = ledger
            .create_acquisition(acq_payload("0111111111", 5, 1200, 6000))
            .await
            .unwrap();
        assert_eq!(acq.status, AcquisitionStatus::Pending);
        assert!(acq.reference.starts_with("PO-"));
        // 5 × 2500 expected revenue, 6000 cost
        assert_eq!(acq.expected_revenue_cents, 12500);
        assert_eq!(acq.expected_profit_cents, 6500);

        // Pending: no stock moved yet
        let sku = ledger.sku("0111111111").await.unwrap();
        assert_eq!(sku.stock_with_case, 5);

        let acq = ledger
            .transition_acquisition(&acq.id, AcquisitionStatus::Completed, None)
            .await
            .unwrap();
        assert_eq!(acq.status, AcquisitionStatus::Completed);
        assert!(acq.completed_at.is_some());

        let sku = ledger.sku("0111111111").await.unwrap();
        assert_eq!(sku.stock_with_case, 10);
        assert_eq!(sku.cost_basis_cents, 1100); // (5×1000 + 5×1200) / 10
    }

    #[tokio::test]
    async fn test_reopening_acquisition_removes_stock_keeps_blend() {
        let ledger = ledger().await;
        seed(&ledger, "0111111111", "SNES Chrono Trigger", 5, 1000, 2500).await;

        let acq = ledger
            .create_acquisition(acq_payload("0111111111", 5, 1200, 6000))
            .await
            .unwrap();
        ledger
            .transition_acquisition(&acq.id, AcquisitionStatus::Completed, None)
            .await
            .unwrap();
        let acq = ledger
            .transition_acquisition(&acq.id, AcquisitionStatus::Pending, None)
            .await
            .unwrap();

        assert_eq!(acq.status, AcquisitionStatus::Pending);
        assert!(acq.completed_at.is_none());

        let sku = ledger.sku("0111111111").await.unwrap();
        assert_eq!(sku.stock_with_case, 5); // units removed
        assert_eq!(sku.cost_basis_cents, 1100); // blend not unwound
    }

    #[tokio::test]
    async fn test_acquisition_creates_new_sku_on_completion() {
        let ledger = ledger().await;

        let payload = NewAcquisition {
            supplier_name: "Retro Wholesale".to_string(),
            supplier_contact: None,
            total_cost_cents: 3000,
            notes: None,
            lines: vec![NewAcquisitionLine {
                barcode: "0122222222".to_string(),
                title: "N64 Paper Mario".to_string(),
                quantity: 3,
                unit_cost_cents: 1000,
                unit_selling_price_cents: 4500,
                is_new_sku: true,
                new_sku_list_price_cents: Some(4500),
            }],
        };
        let acq = ledger.create_acquisition(payload).await.unwrap();

        // Unknown barcode until completion
        assert!(matches!(
            ledger.sku("0122222222").await.unwrap_err(),
            LedgerError::Core(CoreError::SkuNotFound(_))
        ));

        ledger
            .transition_acquisition(&acq.id, AcquisitionStatus::Completed, None)
            .await
            .unwrap();

        let sku = ledger.sku("0122222222").await.unwrap();
        assert_eq!(sku.title, "N64 Paper Mario");
        assert_eq!(sku.stock_with_case, 3);
        assert_eq!(sku.cost_basis_cents, 1000);
        assert_eq!(sku.list_price_cents, 4500);
    }

    #[tokio::test]
    async fn test_new_sku_flag_on_known_barcode_falls_through() {
        let ledger = ledger().await;
        seed(&ledger, "0111111111", "SNES Chrono Trigger", 2, 1000, 2500).await;

        let payload = NewAcquisition {
            supplier_name: "Retro Wholesale".to_string(),
            supplier_contact: None,
            total_cost_cents: 1000,
            notes: None,
            lines: vec![NewAcquisitionLine {
                barcode: "0111111111".to_string(),
                title: "SNES Chrono Trigger".to_string(),
                quantity: 1,
                unit_cost_cents: 1000,
                unit_selling_price_cents: 2500,
                is_new_sku: true, // stale flag, barcode exists
                new_sku_list_price_cents: Some(9999),
            }],
        };
        let acq = ledger.create_acquisition(payload).await.unwrap();
        ledger
            .transition_acquisition(&acq.id, AcquisitionStatus::Completed, None)
            .await
            .unwrap();

        // Ordinary increase: existing entry untouched except for stock/cost
        let sku = ledger.sku("0111111111").await.unwrap();
        assert_eq!(sku.stock_with_case, 3);
        assert_eq!(sku.list_price_cents, 2500);
    }

    // -------------------------------------------------------------------------
    // Sales
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_sale_snapshots_prices_and_costs() {
        let ledger = ledger().await;
        seed(&ledger, "0111111111", "SNES Chrono Trigger", 5, 4500, 9900).await;

        let sale = ledger
            .create_sale(NewSaleOrder {
                discount: Some(Discount::Percentage(1000)),
                delivery_fee_cents: 500,
                ..sale_payload(vec![sale_line("0111111111", 2)])
            })
            .await
            .unwrap();

        assert!(sale.reference.starts_with("ORD-"));
        assert_eq!(sale.lines[0].unit_price_cents, 9900);
        assert_eq!(sale.lines[0].unit_cost_cents, 4500);
        assert_eq!(sale.subtotal_cents, 19800);
        assert_eq!(sale.discount_amount_cents, 1980);
        assert_eq!(sale.total_cents, 18320); // 19800 - 1980 + 500
        assert_eq!(sale.total_profit_cents, 8820); // 17820 - 9000

        // A later price change must not touch the frozen line
        ledger
            .set_sku_pricing("0111111111", 12000, false, None)
            .await
            .unwrap();
        let sale = ledger.sale(&sale.id).await.unwrap();
        assert_eq!(sale.lines[0].unit_price_cents, 9900);
    }

    #[tokio::test]
    async fn test_sale_line_uses_active_sale_price() {
        let ledger = ledger().await;
        seed(&ledger, "0111111111", "SNES Chrono Trigger", 5, 4500, 9900).await;
        ledger
            .set_sku_pricing("0111111111", 9900, true, Some(7900))
            .await
            .unwrap();

        let sale = ledger
            .create_sale(sale_payload(vec![sale_line("0111111111", 1)]))
            .await
            .unwrap();
        assert_eq!(sale.lines[0].unit_price_cents, 7900);
    }

    #[tokio::test]
    async fn test_confirming_sale_commits_stock() {
        let ledger = ledger().await;
        seed(&ledger, "0111111111", "SNES Chrono Trigger", 5, 4500, 9900).await;

        let sale = ledger
            .create_sale(sale_payload(vec![sale_line("0111111111", 2)]))
            .await
            .unwrap();

        let sale = ledger
            .transition_sale(&sale.id, SaleStatus::Confirmed, None)
            .await
            .unwrap();
        assert_eq!(sale.status, SaleStatus::Confirmed);
        assert!(sale.confirmed_at.is_some());

        let sku = ledger.sku("0111111111").await.unwrap();
        assert_eq!(sku.stock_with_case, 3);
        assert_eq!(sku.units_sold, 2);

        // Forward movement inside the fulfilled region is stock-neutral
        ledger
            .transition_sale(&sale.id, SaleStatus::Preparing, None)
            .await
            .unwrap();
        let sku = ledger.sku("0111111111").await.unwrap();
        assert_eq!(sku.stock_with_case, 3);
    }

    #[tokio::test]
    async fn test_insufficient_stock_is_all_or_nothing() {
        let ledger = ledger().await;
        seed(&ledger, "0111111111", "SNES Chrono Trigger", 5, 4500, 9900).await;
        seed(&ledger, "0133333333", "GBA Golden Sun", 1, 2000, 5900).await;

        let sale = ledger
            .create_sale(sale_payload(vec![
                sale_line("0111111111", 2), // plenty
                sale_line("0133333333", 3), // only 1 on hand
            ]))
            .await
            .unwrap();

        let err = ledger
            .transition_sale(&sale.id, SaleStatus::Confirmed, None)
            .await
            .unwrap_err();
        match err {
            LedgerError::Core(CoreError::InsufficientStock {
                barcode,
                available,
                requested,
                ..
            }) => {
                assert_eq!(barcode, "0133333333");
                assert_eq!(available, 1);
                assert_eq!(requested, 3);
            }
            other => panic!("unexpected error: {other}"),
        }

        // Neither line moved; status unchanged
        assert_eq!(ledger.sku("0111111111").await.unwrap().stock_with_case, 5);
        assert_eq!(ledger.sku("0133333333").await.unwrap().stock_with_case, 1);
        assert_eq!(
            ledger.sale(&sale.id).await.unwrap().status,
            SaleStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_cancelling_confirmed_sale_restores_stock() {
        let ledger = ledger().await;
        seed(&ledger, "0111111111", "SNES Chrono Trigger", 5, 4500, 9900).await;

        let sale = ledger
            .create_sale(sale_payload(vec![sale_line("0111111111", 2)]))
            .await
            .unwrap();
        ledger
            .transition_sale(&sale.id, SaleStatus::Confirmed, None)
            .await
            .unwrap();
        ledger
            .transition_sale(&sale.id, SaleStatus::Cancelled, Some("customer no-show"))
            .await
            .unwrap();

        let sku = ledger.sku("0111111111").await.unwrap();
        assert_eq!(sku.stock_with_case, 5);
        assert_eq!(sku.units_sold, 0); // sold counter rolled back too

        let sale = ledger.sale(&sale.id).await.unwrap();
        assert_eq!(sale.status, SaleStatus::Cancelled);
        assert_eq!(sale.notes.as_deref(), Some("customer no-show"));
    }

    #[tokio::test]
    async fn test_shipped_sale_cannot_be_cancelled() {
        let ledger = ledger().await;
        seed(&ledger, "0111111111", "SNES Chrono Trigger", 5, 4500, 9900).await;

        let sale = ledger
            .create_sale(sale_payload(vec![sale_line("0111111111", 1)]))
            .await
            .unwrap();
        ledger
            .transition_sale(&sale.id, SaleStatus::Confirmed, None)
            .await
            .unwrap();
        ledger
            .transition_sale(&sale.id, SaleStatus::Shipped, None)
            .await
            .unwrap();

        let err = ledger
            .transition_sale(&sale.id, SaleStatus::Cancelled, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::InvalidTransition { .. })
        ));

        // Stock stays committed
        assert_eq!(ledger.sku("0111111111").await.unwrap().stock_with_case, 4);
    }

    #[tokio::test]
    async fn test_cancelling_pending_sale_is_stock_neutral() {
        let ledger = ledger().await;
        seed(&ledger, "0111111111", "SNES Chrono Trigger", 5, 4500, 9900).await;

        let sale = ledger
            .create_sale(sale_payload(vec![sale_line("0111111111", 2)]))
            .await
            .unwrap();
        let sale = ledger
            .transition_sale(&sale.id, SaleStatus::Cancelled, None)
            .await
            .unwrap();

        assert_eq!(sale.status, SaleStatus::Cancelled);
        assert_eq!(ledger.sku("0111111111").await.unwrap().stock_with_case, 5);
    }

    #[tokio::test]
    async fn test_transition_to_current_status_is_idempotent() {
        let ledger = ledger().await;
        seed(&ledger, "0111111111", "SNES Chrono Trigger", 5, 4500, 9900).await;

        let sale = ledger
            .create_sale(sale_payload(vec![sale_line("0111111111", 2)]))
            .await
            .unwrap();
        ledger
            .transition_sale(&sale.id, SaleStatus::Confirmed, None)
            .await
            .unwrap();

        // Submitting confirmed again must not take stock twice
        let sale = ledger
            .transition_sale(&sale.id, SaleStatus::Confirmed, None)
            .await
            .unwrap();
        assert_eq!(sale.status, SaleStatus::Confirmed);
        assert_eq!(ledger.sku("0111111111").await.unwrap().stock_with_case, 3);
    }

    // -------------------------------------------------------------------------
    // Trades
    // -------------------------------------------------------------------------

    fn trade_payload(
        given: Vec<NewTradeGivenLine>,
        received: Vec<NewTradeReceivedLine>,
    ) -> NewTrade {
        NewTrade {
            customer_name: "Grace".to_string(),
            customer_contact: None,
            notes: None,
            given,
            received,
        }
    }

    fn given_line(barcode: &str, title: &str, qty: i64, value: i64, new_sku: bool) -> NewTradeGivenLine {
        NewTradeGivenLine {
            barcode: barcode.to_string(),
            title: title.to_string(),
            quantity: qty,
            unit_value_cents: value,
            variant: None,
            is_new_sku: new_sku,
            new_sku_list_price_cents: new_sku.then_some(value * 2),
        }
    }

    #[tokio::test]
    async fn test_trade_up_settlement_and_completion() {
        let ledger = ledger().await;
        seed(&ledger, "0144444444", "GC Wind Waker", 2, 5000, 15_000).await;

        // Customer gives a copy valued 12.00k cents, takes one valued 15.00k
        let trade = ledger
            .create_trade(trade_payload(
                vec![given_line("0155555555", "PS2 Okami", 1, 120_000, true)],
                vec![NewTradeReceivedLine {
                    barcode: "0144444444".to_string(),
                    quantity: 1,
                    variant: None,
                    unit_value_cents: Some(150_000),
                }],
            ))
            .await
            .unwrap();

        assert!(trade.reference.starts_with("TRD-"));
        assert_eq!(trade.trade_type, replay_core::TradeType::Up);
        assert_eq!(trade.trade_fee_cents, TRADE_FEE.cents());
        assert_eq!(trade.cash_difference_cents, 30_000 + TRADE_FEE.cents());

        ledger
            .transition_trade(&trade.id, TradeStatus::Confirmed, None)
            .await
            .unwrap();
        // Confirmation is a paper step: no stock yet
        assert_eq!(ledger.sku("0144444444").await.unwrap().stock_with_case, 2);

        let trade = ledger
            .transition_trade(&trade.id, TradeStatus::Completed, None)
            .await
            .unwrap();
        assert!(trade.completed_at.is_some());

        // Given copy came in as a brand-new SKU at the credit value
        let incoming = ledger.sku("0155555555").await.unwrap();
        assert_eq!(incoming.title, "PS2 Okami");
        assert_eq!(incoming.stock_with_case, 1);
        assert_eq!(incoming.cost_basis_cents, 120_000);

        // Received copy went out, not counted as a sale
        let outgoing = ledger.sku("0144444444").await.unwrap();
        assert_eq!(outgoing.stock_with_case, 1);
        assert_eq!(outgoing.units_sold, 0);
    }

    #[tokio::test]
    async fn test_trade_down_has_no_fee() {
        let ledger = ledger().await;
        seed(&ledger, "0144444444", "GC Wind Waker", 2, 5000, 15_000).await;

        let trade = ledger
            .create_trade(trade_payload(
                vec![given_line("0155555555", "PS2 Okami", 1, 150_000, true)],
                vec![NewTradeReceivedLine {
                    barcode: "0144444444".to_string(),
                    quantity: 1,
                    variant: None,
                    unit_value_cents: Some(120_000),
                }],
            ))
            .await
            .unwrap();

        assert_eq!(trade.trade_type, replay_core::TradeType::Down);
        assert_eq!(trade.trade_fee_cents, 0);
        assert_eq!(trade.cash_difference_cents, 0);
    }

    #[tokio::test]
    async fn test_cancelling_completed_trade_reverses_both_sides() {
        let ledger = ledger().await;
        seed(&ledger, "0144444444", "GC Wind Waker", 2, 5000, 15_000).await;

        let trade = ledger
            .create_trade(trade_payload(
                vec![given_line("0155555555", "PS2 Okami", 1, 120_000, true)],
                vec![NewTradeReceivedLine {
                    barcode: "0144444444".to_string(),
                    quantity: 1,
                    variant: None,
                    unit_value_cents: Some(150_000),
                }],
            ))
            .await
            .unwrap();
        ledger
            .transition_trade(&trade.id, TradeStatus::Completed, None)
            .await
            .unwrap();
        let trade = ledger
            .transition_trade(&trade.id, TradeStatus::Cancelled, None)
            .await
            .unwrap();
        assert_eq!(trade.status, TradeStatus::Cancelled);

        // Given copy taken back out, received copy restored
        assert_eq!(ledger.sku("0155555555").await.unwrap().stock_with_case, 0);
        assert_eq!(ledger.sku("0144444444").await.unwrap().stock_with_case, 2);

        // Cancelled is terminal
        let err = ledger
            .transition_trade(&trade.id, TradeStatus::Completed, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_trade_reversal_clamps_when_units_resold() {
        let ledger = ledger().await;

        // Trade in a copy, then sell it on before the trade is cancelled
        let trade = ledger
            .create_trade(trade_payload(
                vec![given_line("0155555555", "PS2 Okami", 1, 120_000, true)],
                vec![],
            ))
            .await
            .unwrap();
        ledger
            .transition_trade(&trade.id, TradeStatus::Completed, None)
            .await
            .unwrap();

        let sale = ledger
            .create_sale(sale_payload(vec![sale_line("0155555555", 1)]))
            .await
            .unwrap();
        ledger
            .transition_sale(&sale.id, SaleStatus::Confirmed, None)
            .await
            .unwrap();
        assert_eq!(ledger.sku("0155555555").await.unwrap().stock_with_case, 0);

        // Reversal cannot go below zero; it clamps and succeeds
        ledger
            .transition_trade(&trade.id, TradeStatus::Cancelled, None)
            .await
            .unwrap();
        assert_eq!(ledger.sku("0155555555").await.unwrap().stock_with_case, 0);
    }

    // -------------------------------------------------------------------------
    // Variants
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_variants_are_independent_counters() {
        let ledger = ledger().await;
        let now = Utc::now();
        ledger
            .database()
            .catalog()
            .insert(&Sku {
                barcode: "0111111111".to_string(),
                title: "SNES Chrono Trigger".to_string(),
                stock_with_case: 1,
                stock_cartridge_only: 3,
                cost_basis_cents: 4500,
                list_price_cents: 9900,
                sale_active: false,
                sale_price_cents: None,
                units_sold: 0,
                is_active: true,
                created_at: now,
                updated_at: now,
                version: 0,
            })
            .await
            .unwrap();

        // Two boxed copies requested, only one on hand: the loose copies
        // cannot satisfy a with-case line
        let sale = ledger
            .create_sale(sale_payload(vec![NewSaleLine {
                barcode: "0111111111".to_string(),
                quantity: 2,
                variant: Some(Variant::WithCase),
                unit_price_cents: None,
            }]))
            .await
            .unwrap();
        let err = ledger
            .transition_sale(&sale.id, SaleStatus::Confirmed, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::InsufficientStock {
                variant: Variant::WithCase,
                available: 1,
                ..
            })
        ));

        // The loose variant fulfills fine
        let sale = ledger
            .create_sale(sale_payload(vec![NewSaleLine {
                barcode: "0111111111".to_string(),
                quantity: 2,
                variant: Some(Variant::CartridgeOnly),
                unit_price_cents: None,
            }]))
            .await
            .unwrap();
        ledger
            .transition_sale(&sale.id, SaleStatus::Confirmed, None)
            .await
            .unwrap();

        let sku = ledger.sku("0111111111").await.unwrap();
        assert_eq!(sku.stock_with_case, 1);
        assert_eq!(sku.stock_cartridge_only, 1);
    }

    // -------------------------------------------------------------------------
    // Catalog surface
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_create_sku_rejects_duplicates_and_bad_sale_price() {
        let ledger = ledger().await;

        let details = NewSkuDetails {
            barcode: "0111111111".to_string(),
            title: "SNES Chrono Trigger".to_string(),
            list_price_cents: 9900,
            sale_active: false,
            sale_price_cents: None,
        };
        ledger.create_sku(details.clone()).await.unwrap();

        let err = ledger.create_sku(details).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::DuplicateBarcode(_))
        ));

        // Sale price at/above list is rejected
        let err = ledger
            .set_sku_pricing("0111111111", 9900, true, Some(9900))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Core(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_unknown_documents_and_skus() {
        let ledger = ledger().await;

        assert!(matches!(
            ledger.sku("9999999999").await.unwrap_err(),
            LedgerError::Core(CoreError::SkuNotFound(_))
        ));
        assert!(matches!(
            ledger
                .transition_sale("no-such-id", SaleStatus::Confirmed, None)
                .await
                .unwrap_err(),
            LedgerError::Core(CoreError::TransactionNotFound(_))
        ));
    }
}
