//! # Catalog Repository
//!
//! Database operations for SKUs, including the atomic stock primitives the
//! ledger engine is built on.
//!
//! ## Stock Update Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ❌ WRONG: read-then-compute-then-write (loses updates under races)     │
//! │     let sku = get(barcode);                                             │
//! │     update(stock = sku.stock - 3);      ← two admins, one write lost    │
//! │                                                                         │
//! │  ✅ CORRECT: delta updates executed inside the database                 │
//! │     UPDATE skus SET stock = stock + ?                 (increase)        │
//! │     UPDATE skus SET stock = stock - ?                                   │
//! │       WHERE barcode = ? AND stock >= ?                (checked take)    │
//! │     UPDATE skus SET stock = MAX(0, stock - ?)         (clamped take)    │
//! │                                                                         │
//! │  The checked take is the pre-validated path: zero rows affected means   │
//! │  insufficient stock and the surrounding transaction rolls back.         │
//! │  The clamped take is the reversal path: the floor-at-zero policy, with  │
//! │  the shortfall reported so the caller can log a warning.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both variant counters funnel through the same statements; the column is
//! picked via `Variant::stock_column()`.

use chrono::Utc;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use replay_core::{Money, Sku, Variant};

/// Every `skus` column, in struct-field order.
const SKU_COLUMNS: &str = "barcode, title, stock_with_case, stock_cartridge_only, \
     cost_basis_cents, list_price_cents, sale_active, sale_price_cents, \
     units_sold, is_active, created_at, updated_at, version";

/// Repository for catalog database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.catalog();
/// let sku = repo.get_by_barcode("0045496830434").await?;
/// ```
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Gets a SKU by its barcode.
    ///
    /// ## Returns
    /// * `Ok(Some(Sku))` - SKU found
    /// * `Ok(None)` - no such barcode
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Sku>> {
        let sql = format!("SELECT {SKU_COLUMNS} FROM skus WHERE barcode = ?1");
        let sku = sqlx::query_as::<_, Sku>(&sql)
            .bind(barcode)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sku)
    }

    /// Gets a SKU by barcode inside an open transaction.
    ///
    /// All reads feeding a write happen through here so they observe the
    /// transaction's own view, never a stale pool snapshot.
    pub async fn get_in_tx(
        &self,
        conn: &mut SqliteConnection,
        barcode: &str,
    ) -> DbResult<Option<Sku>> {
        let sql = format!("SELECT {SKU_COLUMNS} FROM skus WHERE barcode = ?1");
        let sku = sqlx::query_as::<_, Sku>(&sql)
            .bind(barcode)
            .fetch_optional(conn)
            .await?;

        Ok(sku)
    }

    /// Lists active SKUs sorted by title.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Sku>> {
        let sql = format!(
            "SELECT {SKU_COLUMNS} FROM skus WHERE is_active = 1 ORDER BY title LIMIT ?1"
        );
        let skus = sqlx::query_as::<_, Sku>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(skus)
    }

    /// Counts active SKUs (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM skus WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------

    /// Inserts a new SKU inside an open transaction.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - barcode already exists
    pub async fn insert_in_tx(&self, conn: &mut SqliteConnection, sku: &Sku) -> DbResult<()> {
        debug!(barcode = %sku.barcode, title = %sku.title, "Inserting SKU");

        sqlx::query(
            r#"
            INSERT INTO skus (
                barcode, title, stock_with_case, stock_cartridge_only,
                cost_basis_cents, list_price_cents, sale_active, sale_price_cents,
                units_sold, is_active, created_at, updated_at, version
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?6, ?7, ?8,
                ?9, ?10, ?11, ?12, ?13
            )
            "#,
        )
        .bind(&sku.barcode)
        .bind(&sku.title)
        .bind(sku.stock_with_case)
        .bind(sku.stock_cartridge_only)
        .bind(sku.cost_basis_cents)
        .bind(sku.list_price_cents)
        .bind(sku.sale_active)
        .bind(sku.sale_price_cents)
        .bind(sku.units_sold)
        .bind(sku.is_active)
        .bind(sku.created_at)
        .bind(sku.updated_at)
        .bind(sku.version)
        .execute(conn)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("barcode", &sku.barcode),
            other => other,
        })?;

        Ok(())
    }

    /// Inserts a new SKU on the pool (catalog seeding, manual entry).
    pub async fn insert(&self, sku: &Sku) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        self.insert_in_tx(&mut conn, sku).await
    }

    /// Updates pricing fields (list price, sale flag/price).
    ///
    /// The sale-price business rule is validated by the caller; this method
    /// just persists.
    pub async fn set_pricing(
        &self,
        barcode: &str,
        list_price_cents: i64,
        sale_active: bool,
        sale_price_cents: Option<i64>,
    ) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE skus SET
                list_price_cents = ?2,
                sale_active = ?3,
                sale_price_cents = ?4,
                updated_at = ?5,
                version = version + 1
            WHERE barcode = ?1
            "#,
        )
        .bind(barcode)
        .bind(list_price_cents)
        .bind(sale_active)
        .bind(sale_price_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("SKU", barcode));
        }

        Ok(())
    }

    /// Soft-deletes a SKU by setting is_active = false.
    ///
    /// Historical transactions keep referencing the barcode, so rows are
    /// never hard-deleted.
    pub async fn soft_delete(&self, barcode: &str) -> DbResult<()> {
        debug!(barcode = %barcode, "Soft-deleting SKU");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE skus SET
                is_active = 0,
                updated_at = ?2,
                version = version + 1
            WHERE barcode = ?1
            "#,
        )
        .bind(barcode)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("SKU", barcode));
        }

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Atomic stock primitives
    // -------------------------------------------------------------------------

    /// Increases a variant counter and writes the blended cost basis in one
    /// statement.
    ///
    /// The increment is delta-style (`stock = stock + ?`); the cost basis
    /// is the value the caller blended from the same transaction's view.
    pub async fn add_stock(
        &self,
        conn: &mut SqliteConnection,
        barcode: &str,
        variant: Variant,
        quantity: i64,
        cost_basis: Money,
    ) -> DbResult<()> {
        debug!(barcode = %barcode, variant = %variant, quantity = %quantity, "Adding stock");

        let col = variant.stock_column();
        let sql = format!(
            "UPDATE skus SET {col} = {col} + ?2, cost_basis_cents = ?3, \
             updated_at = ?4, version = version + 1 WHERE barcode = ?1"
        );

        let result = sqlx::query(&sql)
            .bind(barcode)
            .bind(quantity)
            .bind(cost_basis.cents())
            .bind(Utc::now())
            .execute(conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("SKU", barcode));
        }

        Ok(())
    }

    /// Conditionally decrements a variant counter: the pre-validated path.
    ///
    /// ## Returns
    /// * `Ok(true)` - decrement applied
    /// * `Ok(false)` - stock was below `quantity`; nothing changed. The
    ///   caller fails the whole transition with `InsufficientStock`.
    pub async fn take_stock_checked(
        &self,
        conn: &mut SqliteConnection,
        barcode: &str,
        variant: Variant,
        quantity: i64,
        count_sold: bool,
    ) -> DbResult<bool> {
        let col = variant.stock_column();
        let sold = if count_sold {
            ", units_sold = units_sold + ?2"
        } else {
            ""
        };
        let sql = format!(
            "UPDATE skus SET {col} = {col} - ?2{sold}, updated_at = ?3, \
             version = version + 1 WHERE barcode = ?1 AND {col} >= ?2"
        );

        let result = sqlx::query(&sql)
            .bind(barcode)
            .bind(quantity)
            .bind(Utc::now())
            .execute(conn)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Decrements a variant counter with the floor-at-zero policy: the
    /// reversal path.
    ///
    /// ## Returns
    /// The shortfall that was absorbed by the clamp (0 when the full
    /// quantity could be removed). The caller logs a warning when non-zero;
    /// the clamp is a policy choice, not an error path.
    pub async fn take_stock_clamped(
        &self,
        conn: &mut SqliteConnection,
        barcode: &str,
        variant: Variant,
        quantity: i64,
    ) -> DbResult<i64> {
        let col = variant.stock_column();

        // Observe the pre-update value inside the same transaction so the
        // shortfall report is exact.
        let sql = format!("SELECT {col} AS stock FROM skus WHERE barcode = ?1");
        let row = sqlx::query(&sql)
            .bind(barcode)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| DbError::not_found("SKU", barcode))?;
        let available: i64 = row.get("stock");
        let shortfall = (quantity - available).max(0);

        let sql = format!(
            "UPDATE skus SET {col} = MAX(0, {col} - ?2), updated_at = ?3, \
             version = version + 1 WHERE barcode = ?1"
        );
        sqlx::query(&sql)
            .bind(barcode)
            .bind(quantity)
            .bind(Utc::now())
            .execute(conn)
            .await?;

        Ok(shortfall)
    }

    /// Increases a variant counter without touching the cost basis: the
    /// reversal of a previous decrement. Uncapped.
    ///
    /// When `uncount_sold` is set, the cumulative sold counter is rolled
    /// back too (clamped at zero).
    pub async fn release_stock(
        &self,
        conn: &mut SqliteConnection,
        barcode: &str,
        variant: Variant,
        quantity: i64,
        uncount_sold: bool,
    ) -> DbResult<()> {
        let col = variant.stock_column();
        let sold = if uncount_sold {
            ", units_sold = MAX(0, units_sold - ?2)"
        } else {
            ""
        };
        let sql = format!(
            "UPDATE skus SET {col} = {col} + ?2{sold}, updated_at = ?3, \
             version = version + 1 WHERE barcode = ?1"
        );

        let result = sqlx::query(&sql)
            .bind(barcode)
            .bind(quantity)
            .bind(Utc::now())
            .execute(conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("SKU", barcode));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
