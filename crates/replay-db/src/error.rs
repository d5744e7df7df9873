//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  LedgerError (replay-ledger) ← What service callers see                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - `fetch_one` returns no rows
    /// - ID doesn't exist
    /// - Soft-deleted record
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting a duplicate barcode
    /// - Duplicate reference code
    /// - Any UNIQUE index violation
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - A line referencing a non-existent document id
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// The database was busy or locked by a concurrent writer.
    ///
    /// ## When This Occurs
    /// - Two transactions upgrade read snapshots on the same rows
    /// - A long-running writer holds the SQLite write lock
    ///
    /// Nothing was applied; the operation is safe to retry.
    #[error("Database busy: {0}")]
    Busy(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Categorizes a SQLite engine error by its message.
///
/// SQLite reports constraint and locking failures as text:
/// ```text
/// UNIQUE: "UNIQUE constraint failed: <table>.<column>"
/// FK:     "FOREIGN KEY constraint failed"
/// BUSY:   "database is locked" / "database table is locked"
/// ```
fn categorize_sqlite_message(msg: &str) -> DbError {
    if msg.contains("UNIQUE constraint failed") {
        let field = msg
            .split("UNIQUE constraint failed: ")
            .nth(1)
            .unwrap_or("unknown")
            .to_string();
        DbError::UniqueViolation {
            field,
            value: "unknown".to_string(),
        }
    } else if msg.contains("FOREIGN KEY constraint failed") {
        DbError::ForeignKeyViolation {
            message: msg.to_string(),
        }
    } else if msg.contains("database is locked") || msg.contains("database table is locked") {
        DbError::Busy(msg.to_string())
    } else {
        DbError::QueryFailed(msg.to_string())
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message (constraint / busy)
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => categorize_sqlite_message(db_err.message()),

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_carries_column() {
        let err = categorize_sqlite_message("UNIQUE constraint failed: skus.barcode");
        assert!(matches!(err, DbError::UniqueViolation { field, .. } if field == "skus.barcode"));
    }

    #[test]
    fn test_locked_database_is_busy() {
        assert!(matches!(
            categorize_sqlite_message("database is locked"),
            DbError::Busy(_)
        ));
        assert!(matches!(
            categorize_sqlite_message("database table is locked: skus"),
            DbError::Busy(_)
        ));
    }

    #[test]
    fn test_other_messages_stay_query_failed() {
        assert!(matches!(
            categorize_sqlite_message("no such table: nonsense"),
            DbError::QueryFailed(_)
        ));
    }
}
