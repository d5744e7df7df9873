//! # Ledger Error Types
//!
//! The error surface callers of the service see. Business-rule violations
//! and database failures keep their own types; the only variant minted here
//! is `Conflict`, raised when a compare-and-set status write loses a race.

use thiserror::Error;

use replay_core::CoreError;
use replay_db::DbError;

/// Errors returned by the ledger service.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Business rule violation (invalid transition, insufficient stock,
    /// validation failure, unknown SKU).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Database operation failure.
    #[error(transparent)]
    Db(#[from] DbError),

    /// Two transitions raced on the same document; the losing one lands
    /// here with nothing applied. Safe to re-read and retry.
    #[error("Transaction {reference} was modified concurrently; retry")]
    Conflict { reference: String },
}

impl LedgerError {
    /// Whether the operation is safe to retry as-is.
    ///
    /// Covers both race outcomes: a lost status compare-and-set
    /// (`Conflict`) and a SQLite write-lock collision (`DbError::Busy`).
    /// Nothing was applied in either case.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LedgerError::Conflict { .. } | LedgerError::Db(DbError::Busy(_))
        )
    }
}

/// Convenience type alias for Results with LedgerError.
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use replay_core::CoreError;

    #[test]
    fn test_retryable_classification() {
        let conflict = LedgerError::Conflict {
            reference: "ORD-20260830-ABC123".to_string(),
        };
        assert!(conflict.is_retryable());

        let busy = LedgerError::Db(DbError::Busy("database is locked".to_string()));
        assert!(busy.is_retryable());

        let missing = LedgerError::Db(DbError::not_found("SKU", "0123456789"));
        assert!(!missing.is_retryable());

        let core = LedgerError::Core(CoreError::SkuNotFound("0123456789".to_string()));
        assert!(!core.is_retryable());
    }
}
