//! # Trade Repository
//!
//! Persistence for barter transactions. Both line directions share one
//! table; a `direction` column ('given' | 'received') records which side a
//! line belongs to, and reads split them back into the document's two
//! arrays.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use replay_core::{Trade, TradeLine, TradeStatus};

const DIRECTION_GIVEN: &str = "given";
const DIRECTION_RECEIVED: &str = "received";

/// Repository for trade database operations.
#[derive(Debug, Clone)]
pub struct TradeRepository {
    pool: SqlitePool,
}

fn row_to_trade(row: &SqliteRow) -> Trade {
    Trade {
        id: row.get("id"),
        reference: row.get("reference"),
        customer_name: row.get("customer_name"),
        customer_contact: row.get("customer_contact"),
        status: row.get("status"),
        value_given_cents: row.get("value_given_cents"),
        value_received_cents: row.get("value_received_cents"),
        cash_difference_cents: row.get("cash_difference_cents"),
        trade_fee_cents: row.get("trade_fee_cents"),
        trade_type: row.get("trade_type"),
        notes: row.get("notes"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        confirmed_at: row.get("confirmed_at"),
        completed_at: row.get("completed_at"),
        given: Vec::new(),
        received: Vec::new(),
    }
}

impl TradeRepository {
    /// Creates a new TradeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TradeRepository { pool }
    }

    /// Inserts a document and both line arrays inside an open transaction.
    pub async fn insert_in_tx(&self, conn: &mut SqliteConnection, trade: &Trade) -> DbResult<()> {
        debug!(
            id = %trade.id,
            reference = %trade.reference,
            given = trade.given.len(),
            received = trade.received.len(),
            "Inserting trade"
        );

        sqlx::query(
            r#"
            INSERT INTO trades (
                id, reference, customer_name, customer_contact, status,
                value_given_cents, value_received_cents, cash_difference_cents,
                trade_fee_cents, trade_type, notes,
                created_at, updated_at, confirmed_at, completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
        )
        .bind(&trade.id)
        .bind(&trade.reference)
        .bind(&trade.customer_name)
        .bind(&trade.customer_contact)
        .bind(trade.status)
        .bind(trade.value_given_cents)
        .bind(trade.value_received_cents)
        .bind(trade.cash_difference_cents)
        .bind(trade.trade_fee_cents)
        .bind(trade.trade_type)
        .bind(&trade.notes)
        .bind(trade.created_at)
        .bind(trade.updated_at)
        .bind(trade.confirmed_at)
        .bind(trade.completed_at)
        .execute(&mut *conn)
        .await?;

        for (direction, lines) in [
            (DIRECTION_GIVEN, &trade.given),
            (DIRECTION_RECEIVED, &trade.received),
        ] {
            for line in lines {
                sqlx::query(
                    r#"
                    INSERT INTO trade_lines (
                        id, trade_id, position, direction, barcode, title,
                        quantity, unit_value_cents, variant,
                        is_new_sku, new_sku_list_price_cents
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                    "#,
                )
                .bind(&line.id)
                .bind(&line.trade_id)
                .bind(line.position)
                .bind(direction)
                .bind(&line.barcode)
                .bind(&line.title)
                .bind(line.quantity)
                .bind(line.unit_value_cents)
                .bind(line.variant)
                .bind(line.is_new_sku)
                .bind(line.new_sku_list_price_cents)
                .execute(&mut *conn)
                .await?;
            }
        }

        Ok(())
    }

    /// Gets a document with both line arrays, by UUID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Trade>> {
        let row = sqlx::query("SELECT * FROM trades WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut trade = row_to_trade(&row);
        trade.given = self.lines_for(id, DIRECTION_GIVEN).await?;
        trade.received = self.lines_for(id, DIRECTION_RECEIVED).await?;
        Ok(Some(trade))
    }

    /// Gets a document by its business reference (TRD-...).
    pub async fn get_by_reference(&self, reference: &str) -> DbResult<Option<Trade>> {
        let row = sqlx::query("SELECT * FROM trades WHERE reference = ?1")
            .bind(reference)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut trade = row_to_trade(&row);
        let id = trade.id.clone();
        trade.given = self.lines_for(&id, DIRECTION_GIVEN).await?;
        trade.received = self.lines_for(&id, DIRECTION_RECEIVED).await?;
        Ok(Some(trade))
    }

    /// Lists recent documents, newest first, without lines.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Trade>> {
        let rows = sqlx::query("SELECT * FROM trades ORDER BY created_at DESC LIMIT ?1")
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(row_to_trade).collect())
    }

    async fn lines_for(&self, trade_id: &str, direction: &str) -> DbResult<Vec<TradeLine>> {
        let lines = sqlx::query_as::<_, TradeLine>(
            "SELECT * FROM trade_lines WHERE trade_id = ?1 AND direction = ?2 ORDER BY position",
        )
        .bind(trade_id)
        .bind(direction)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Compare-and-set status update, the last write of a transition.
    ///
    /// Stamps `confirmed_at` entering `confirmed` and `completed_at`
    /// entering `completed`; reopening to `pending` clears `confirmed_at`.
    pub async fn set_status_cas(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        expected: TradeStatus,
        next: TradeStatus,
        note: Option<&str>,
        now: DateTime<Utc>,
    ) -> DbResult<bool> {
        let stamp = match next {
            TradeStatus::Confirmed => ", confirmed_at = ?3",
            TradeStatus::Completed => ", completed_at = ?3",
            TradeStatus::Pending => ", confirmed_at = NULL",
            TradeStatus::Cancelled => "",
        };
        let sql = format!(
            "UPDATE trades SET status = ?1, updated_at = ?3, \
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
