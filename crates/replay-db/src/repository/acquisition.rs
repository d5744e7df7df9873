//! # Acquisition Repository
//!
//! Persistence for supplier purchases. Documents and their lines are always
//! written together inside one transaction; reads assemble the document from
//! its header row plus an ordered line query.
//!
//! Status changes go through a compare-and-set (`WHERE id = ? AND status = ?`)
//! so two admins acting on the same document cannot both win.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use replay_core::{Acquisition, AcquisitionLine, AcquisitionStatus};

/// Repository for acquisition database operations.
#[derive(Debug, Clone)]
pub struct AcquisitionRepository {
    pool: SqlitePool,
}

fn row_to_acquisition(row: &SqliteRow) -> Acquisition {
    Acquisition {
        id: row.get("id"),
        reference: row.get("reference"),
        supplier_name: row.get("supplier_name"),
        supplier_contact: row.get("supplier_contact"),
        status: row.get("status"),
        total_cost_cents: row.get("total_cost_cents"),
        expected_revenue_cents: row.get("expected_revenue_cents"),
        expected_profit_cents: row.get("expected_profit_cents"),
        margin_bps: row.get("margin_bps"),
        notes: row.get("notes"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        completed_at: row.get("completed_at"),
        lines: Vec::new(),
    }
}

impl AcquisitionRepository {
    /// Creates a new AcquisitionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AcquisitionRepository { pool }
    }

    /// Inserts a document and its lines inside an open transaction.
    pub async fn insert_in_tx(
        &self,
        conn: &mut SqliteConnection,
        acquisition: &Acquisition,
    ) -> DbResult<()> {
        debug!(
            id = %acquisition.id,
            reference = %acquisition.reference,
            lines = acquisition.lines.len(),
            "Inserting acquisition"
        );

        sqlx::query(
            r#"
            INSERT INTO acquisitions (
                id, reference, supplier_name, supplier_contact, status,
                total_cost_cents, expected_revenue_cents, expected_profit_cents,
                margin_bps, notes, created_at, updated_at, completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&acquisition.id)
        .bind(&acquisition.reference)
        .bind(&acquisition.supplier_name)
        .bind(&acquisition.supplier_contact)
        .bind(acquisition.status)
        .bind(acquisition.total_cost_cents)
        .bind(acquisition.expected_revenue_cents)
        .bind(acquisition.expected_profit_cents)
        .bind(acquisition.margin_bps)
        .bind(&acquisition.notes)
        .bind(acquisition.created_at)
        .bind(acquisition.updated_at)
        .bind(acquisition.completed_at)
        .execute(&mut *conn)
        .await?;

        for line in &acquisition.lines {
            sqlx::query(
                r#"
                INSERT INTO acquisition_lines (
                    id, acquisition_id, position, barcode, title, quantity,
                    unit_cost_cents, unit_selling_price_cents,
                    is_new_sku, new_sku_list_price_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
            )
            .bind(&line.id)
            .bind(&line.acquisition_id)
            .bind(line.position)
            .bind(&line.barcode)
            .bind(&line.title)
            .bind(line.quantity)
            .bind(line.unit_cost_cents)
            .bind(line.unit_selling_price_cents)
            .bind(line.is_new_sku)
            .bind(line.new_sku_list_price_cents)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    /// Gets a document with its lines, by UUID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Acquisition>> {
        let row = sqlx::query("SELECT * FROM acquisitions WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut acquisition = row_to_acquisition(&row);
        acquisition.lines = self.lines_for(id).await?;
        Ok(Some(acquisition))
    }

    /// Gets a document by its business reference (PO-...).
    pub async fn get_by_reference(&self, reference: &str) -> DbResult<Option<Acquisition>> {
        let row = sqlx::query("SELECT * FROM acquisitions WHERE reference = ?1")
            .bind(reference)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut acquisition = row_to_acquisition(&row);
        let id = acquisition.id.clone();
        acquisition.lines = self.lines_for(&id).await?;
        Ok(Some(acquisition))
    }

    /// Lists recent documents, newest first, without lines.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Acquisition>> {
        let rows = sqlx::query("SELECT * FROM acquisitions ORDER BY created_at DESC LIMIT ?1")
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(row_to_acquisition).collect())
    }

    async fn lines_for(&self, acquisition_id: &str) -> DbResult<Vec<AcquisitionLine>> {
        let lines = sqlx::query_as::<_, AcquisitionLine>(
            "SELECT * FROM acquisition_lines WHERE acquisition_id = ?1 ORDER BY position",
        )
        .bind(acquisition_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Compare-and-set status update, the last write of a transition.
    ///
    /// Stamps `completed_at` when entering `completed` and clears it when
    /// reopening to `pending`. An optional note replaces the stored one.
    ///
    /// ## Returns
    /// * `Ok(true)` - document was in `expected` and moved to `next`
    /// * `Ok(false)` - someone else won the race; roll back
    pub async fn set_status_cas(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        expected: AcquisitionStatus,
        next: AcquisitionStatus,
        note: Option<&str>,
        now: DateTime<Utc>,
    ) -> DbResult<bool> {
        let stamp = match next {
            AcquisitionStatus::Completed => ", completed_at = ?3",
            AcquisitionStatus::Pending => ", completed_at = NULL",
            AcquisitionStatus::Cancelled => "",
        };
        let sql = format!(
            "UPDATE acquisitions SET status = ?1, updated_at = ?3, \
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
