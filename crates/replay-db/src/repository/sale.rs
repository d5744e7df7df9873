//! # Sale Repository
//!
//! Persistence for customer orders. Same shape as the acquisition side:
//! document + lines written together, documents assembled on read, status
//! moved with a compare-and-set.
//!
//! The discount sum type is flattened to two columns (`discount_kind`,
//! `discount_value`) and rebuilt on read.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use replay_core::{Discount, SaleLine, SaleOrder, SaleStatus};

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

fn discount_columns(discount: Option<Discount>) -> (Option<&'static str>, Option<i64>) {
    match discount {
        Some(Discount::Percentage(bps)) => (Some("percentage"), Some(bps as i64)),
        Some(Discount::Fixed(cents)) => (Some("fixed"), Some(cents)),
        None => (None, None),
    }
}

fn row_to_sale(row: &SqliteRow) -> SaleOrder {
    let discount = match (
        row.get::<Option<String>, _>("discount_kind"),
        row.get::<Option<i64>, _>("discount_value"),
    ) {
        (Some(kind), Some(value)) if kind == "percentage" => {
            Some(Discount::Percentage(value as u32))
        }
        (Some(kind), Some(value)) if kind == "fixed" => Some(Discount::Fixed(value)),
        _ => None,
    };

    SaleOrder {
        id: row.get("id"),
        reference: row.get("reference"),
        customer_name: row.get("customer_name"),
        customer_contact: row.get("customer_contact"),
        status: row.get("status"),
        subtotal_cents: row.get("subtotal_cents"),
        discount,
        discount_amount_cents: row.get("discount_amount_cents"),
        delivery_fee_cents: row.get("delivery_fee_cents"),
        total_cents: row.get("total_cents"),
        total_cost_cents: row.get("total_cost_cents"),
        total_profit_cents: row.get("total_profit_cents"),
        margin_bps: row.get("margin_bps"),
        notes: row.get("notes"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        confirmed_at: row.get("confirmed_at"),
        delivered_at: row.get("delivered_at"),
        lines: Vec::new(),
    }
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Inserts a document and its lines inside an open transaction.
    pub async fn insert_in_tx(&self, conn: &mut SqliteConnection, sale: &SaleOrder) -> DbResult<()> {
        debug!(
            id = %sale.id,
            reference = %sale.reference,
            lines = sale.lines.len(),
            "Inserting sale"
        );

        let (discount_kind, discount_value) = discount_columns(sale.discount);

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, reference, customer_name, customer_contact, status,
                subtotal_cents, discount_kind, discount_value, discount_amount_cents,
                delivery_fee_cents, total_cents, total_cost_cents, total_profit_cents,
                margin_bps, notes, created_at, updated_at, confirmed_at, delivered_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.reference)
        .bind(&sale.customer_name)
        .bind(&sale.customer_contact)
        .bind(sale.status)
        .bind(sale.subtotal_cents)
        .bind(discount_kind)
        .bind(discount_value)
        .bind(sale.discount_amount_cents)
        .bind(sale.delivery_fee_cents)
        .bind(sale.total_cents)
        .bind(sale.total_cost_cents)
        .bind(sale.total_profit_cents)
        .bind(sale.margin_bps)
        .bind(&sale.notes)
        .bind(sale.created_at)
        .bind(sale.updated_at)
        .bind(sale.confirmed_at)
        .bind(sale.delivered_at)
        .execute(&mut *conn)
        .await?;

        for line in &sale.lines {
            sqlx::query(
                r#"
                INSERT INTO sale_lines (
                    id, sale_id, position, barcode, title,
                    unit_price_cents, unit_cost_cents, quantity, variant
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(&line.id)
            .bind(&line.sale_id)
            .bind(line.position)
            .bind(&line.barcode)
            .bind(&line.title)
            .bind(line.unit_price_cents)
            .bind(line.unit_cost_cents)
            .bind(line.quantity)
            .bind(line.variant)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    /// Gets a document with its lines, by UUID.
    pub async fn get(&self, id: &str) -> DbResult<Option<SaleOrder>> {
        let row = sqlx::query("SELECT * FROM sales WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut sale = row_to_sale(&row);
        sale.lines = self.lines_for(id).await?;
        Ok(Some(sale))
    }

    /// Gets a document by its business reference (ORD-...).
    pub async fn get_by_reference(&self, reference: &str) -> DbResult<Option<SaleOrder>> {
        let row = sqlx::query("SELECT * FROM sales WHERE reference = ?1")
            .bind(reference)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut sale = row_to_sale(&row);
        let id = sale.id.clone();
        sale.lines = self.lines_for(&id).await?;
        Ok(Some(sale))
    }

    /// Lists recent documents, newest first, without lines.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<SaleOrder>> {
        let rows = sqlx::query("SELECT * FROM sales ORDER BY created_at DESC LIMIT ?1")
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(row_to_sale).collect())
    }

    async fn lines_for(&self, sale_id: &str) -> DbResult<Vec<SaleLine>> {
        let lines = sqlx::query_as::<_, SaleLine>(
            "SELECT * FROM sale_lines WHERE sale_id = ?1 ORDER BY position",
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Compare-and-set status update, the last write of a transition.
    ///
    /// Stamps `confirmed_at` when stock is committed and `delivered_at` at
    /// the terminal delivery; reopening to `pending` clears `confirmed_at`.
    pub async fn set_status_cas(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        expected: SaleStatus,
        next: SaleStatus,
        note: Option<&str>,
        now: DateTime<Utc>,
    ) -> DbResult<bool> {
        let stamp = match next {
            SaleStatus::Confirmed => ", confirmed_at = ?3",
            SaleStatus::Delivered => ", delivered_at = ?3",
            SaleStatus::Pending => ", confirmed_at = NULL",
            _ => "",
        };
        let sql = format!(
            "UPDATE sales SET status = ?1, updated_at = ?3, \
             notes = COALESCE(?4, notes){stamp} WHERE id = ?2 AND status = ?5"
        );

        let result = sqlx::query(&sql)
            .bind(next)
            .bind(id)
            .bind(now)
            .bind(note)
            .bind(expected)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}
