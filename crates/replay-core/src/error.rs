//! # Error Types
//!
//! Domain-specific error types for replay-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  replay-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                        │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  replay-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  replay-ledger errors (separate crate)                                  │
//! │  └── LedgerError      - What callers of the service see                 │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → LedgerError → caller               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (barcode, variant, counts)
//! 3. Errors are enum variants, never String
//! 4. Each variant carries enough structure to render a precise message

use thiserror::Error;

use crate::types::Variant;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. A failed operation
/// leaves the catalog and the transaction exactly as they were; the caller
/// may correct the request and retry.
#[derive(Debug, Error)]
pub enum CoreError {
    /// SKU cannot be found in the catalog.
    ///
    /// ## When This Occurs
    /// - Barcode doesn't exist in the catalog
    /// - SKU was soft-deleted
    /// - A sale/trade line references stock that was never acquired
    #[error("SKU not found: {0}")]
    SkuNotFound(String),

    /// Creating a SKU whose barcode already exists.
    #[error("Duplicate barcode: '{0}' already exists")]
    DuplicateBarcode(String),

    /// Insufficient stock for a pre-validated decrement.
    ///
    /// ## When This Occurs
    /// - A sale line or trade `games_received` line requests more than the
    ///   available variant stock at fulfillment time
    ///
    /// ## All-Or-Nothing
    /// ```text
    /// transition(sale, confirmed)
    ///      │
    ///      ▼
    /// pre-validate EVERY line          ← one short line fails here
    ///      │
    ///      ▼
    /// InsufficientStock { barcode, variant, available: 2, requested: 3 }
    ///      │
    ///      ▼
    /// NO line was mutated; status unchanged
    /// ```
    #[error(
        "Insufficient stock for {barcode} ({variant}): available {available}, requested {requested}"
    )]
    InsufficientStock {
        barcode: String,
        variant: Variant,
        available: i64,
        requested: i64,
    },

    /// Transaction document not found.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    /// Status change not permitted from the current state.
    ///
    /// ## When This Occurs
    /// - Requested status is not in the allowed-next set (e.g. a shipped
    ///   sale cannot be cancelled)
    /// - Transaction already reached a terminal status
    #[error("Invalid transition: {current} → {requested} (allowed: {allowed:?})")]
    InvalidTransition {
        current: &'static str,
        requested: &'static str,
        allowed: Vec<&'static str>,
    },

    /// Line quantity exceeds the sanity ceiling.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when a request payload doesn't meet requirements.
/// They are rejected before any catalog mutation runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., non-numeric barcode).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Sale price must undercut the list price while a sale is active.
    #[error("sale price {sale_price} must be below list price {list_price}")]
    SalePriceNotBelowList { sale_price: i64, list_price: i64 },

    /// Line-item array is empty or exceeds the ceiling.
    #[error("{field} must contain between 1 and {max} line items")]
    BadLineCount { field: String, max: usize },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            barcode: "0123456789".to_string(),
            variant: Variant::CartridgeOnly,
            available: 2,
            requested: 3,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for 0123456789 (cartridge_only): available 2, requested 3"
        );
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = CoreError::InvalidTransition {
            current: "shipped",
            requested: "cancelled",
            allowed: vec!["delivered"],
        };
        assert_eq!(
            err.to_string(),
            "Invalid transition: shipped → cancelled (allowed: [\"delivered\"])"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "barcode".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
