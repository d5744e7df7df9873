//! # replay-ledger: Lifecycle Controller for the Replay Ledger
//!
//! The orchestration layer: creates transaction documents and moves them
//! through their status lifecycles, keeping the catalog and the documents
//! consistent under one SQLite transaction per transition.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Caller (HTTP handler, CLI, test)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                 replay-ledger (THIS CRATE)                      │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │    │
//! │  │   │  service  │  │  effects  │  │  engine   │  │ reference │   │    │
//! │  │   │  Ledger   │─►│  lowering │─►│ apply /   │  │ PO-/ORD-/ │   │    │
//! │  │   │           │  │ per kind  │  │ revert    │  │   TRD-    │   │    │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │ classify, metrics, validation        │ repositories             │
//! │       ▼                                      ▼                          │
//! │  replay-core (pure logic)               replay-db (SQLite)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//! - **All-or-nothing**: a transition either applies every line effect and
//!   the status write, or nothing at all.
//! - **Idempotent**: requesting the current status is a no-op success.
//! - **Race-safe**: the status write is a compare-and-set; the loser gets
//!   [`LedgerError::Conflict`] with no catalog changes. A SQLite write-lock
//!   collision surfaces the same way: [`LedgerError::is_retryable`] is the
//!   one signal callers poll before retrying.
//!
//! ## Example Usage
//! ```rust,ignore
//! use replay_db::{Database, DbConfig};
//! use replay_ledger::Ledger;
//! use replay_core::SaleStatus;
//!
//! let db = Database::new(DbConfig::new("./replay.db")).await?;
//! let ledger = Ledger::new(db);
//!
//! let sale = ledger.create_sale(payload).await?;
//! let sale = ledger.transition_sale(&sale.id, SaleStatus::Confirmed, None).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod effects;
mod engine;
pub mod error;
pub mod reference;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use effects::{CostingScope, NewSkuSeed, StockEffect};
pub use error::{LedgerError, LedgerResult};
pub use service::Ledger;
