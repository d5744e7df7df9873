//! # replay-core: Pure Business Logic for the Replay Ledger
//!
//! This crate is the **heart** of the Replay inventory ledger. It contains
//! all business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Replay Ledger Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                 HTTP Handlers (out of scope)                    │    │
//! │  │    read transaction ──► submit {status} ──► updated doc/error   │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │              replay-ledger (Lifecycle Controller)               │    │
//! │  │    create / transition / get_sku, one engine for all kinds      │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │               ★ replay-core (THIS CRATE) ★                      │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐    │    │
//! │  │   │   types   │  │   money   │  │ lifecycle │  │  costing  │    │    │
//! │  │   │ Sku, docs │  │   Money   │  │ tables +  │  │  moving   │    │    │
//! │  │   │   lines   │  │   (bps)   │  │ classify  │  │  average  │    │    │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘    │    │
//! │  │   ┌───────────┐  ┌───────────┐                                  │    │
//! │  │   │  metrics  │  │ validation│                                  │    │
//! │  │   └───────────┘  └───────────┘                                  │    │
//! │  │                                                                 │    │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │                    replay-db (Database Layer)                   │    │
//! │  │          SQLite queries, migrations, atomic stock primitives    │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Sku, Acquisition, SaleOrder, Trade, lines)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`lifecycle`] - Status transition tables and the shared classifier
//! - [`costing`] - Moving-average cost-basis blend
//! - [`metrics`] - Financial metrics (purchase, trade settlement, sale totals)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **One State Machine**: All three transaction kinds share a single
//!    transition classifier; the catalog invariants hold regardless of which
//!    kind triggered a mutation
//!
//! ## Example Usage
//!
//! ```rust
//! use replay_core::costing::next_cost_basis;
//! use replay_core::lifecycle::{classify, Transition};
//! use replay_core::money::Money;
//! use replay_core::types::SaleStatus;
//!
//! // Blend 5 incoming units @ $12.00 into 5 on hand @ $10.00
//! let next = next_cost_basis(5, Money::from_cents(1000), 5, Money::from_cents(1200));
//! assert_eq!(next.cents(), 1100);
//!
//! // Confirming a pending sale commits its stock
//! let t = classify(SaleStatus::Pending, SaleStatus::Confirmed).unwrap();
//! assert_eq!(t, Transition::Fulfilling);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod costing;
pub mod error;
pub mod lifecycle;
pub mod metrics;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use replay_core::Money` instead of
// `use replay_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use lifecycle::{classify, StatusMachine, Transition};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Flat trade fee charged on trade-up and even trades, in cents.
///
/// ## Business Reason
/// Covers handling/refurbishing on trades where the store does not come out
/// ahead on value. Trade-downs carry no fee.
pub const TRADE_FEE: Money = Money::from_cents(20_000);

/// Maximum line items on a single transaction document.
///
/// ## Business Reason
/// Prevents runaway documents and keeps a single transition's catalog work
/// bounded.
pub const MAX_LINE_ITEMS: usize = 100;

/// Maximum quantity on a single line item.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Maximum monetary amount accepted on any field, in cents ($1 billion).
///
/// ## Business Reason
/// No game is worth this much. The ceiling also keeps every line total and
/// per-document sum (`MAX_AMOUNT_CENTS × MAX_LINE_QUANTITY × MAX_LINE_ITEMS`)
/// comfortably inside `i64`, so the metric multiplications cannot overflow.
pub const MAX_AMOUNT_CENTS: i64 = 100_000_000_000;

/// Maximum percentage discount, in basis points (100%).
pub const MAX_DISCOUNT_BPS: u32 = 10_000;
