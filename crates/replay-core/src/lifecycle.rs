//! # Transaction Lifecycles
//!
//! Status transition tables for all three transaction kinds, plus the single
//! classifier every kind shares.
//!
//! ## One Machine, Three Vocabularies
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Acquisition:  pending ⇄ completed → cancelled                          │
//! │                pending → cancelled                                      │
//! │                                                                         │
//! │  Sale:         pending → confirmed → preparing → shipped → delivered    │
//! │                   │          │           │          (terminal)          │
//! │                   └──────────┴───────────┘                              │
//! │                          ▼                                              │
//! │                      cancelled (terminal; NOT reachable from shipped)   │
//! │                                                                         │
//! │  Trade:        pending → confirmed → completed → cancelled              │
//! │                   │          │                      (terminal)          │
//! │                   └──────────┴──► cancelled                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Fulfilled Region
//! Each status is either inside or outside the fulfilled region. A
//! transition is **Fulfilling** when it crosses into the region (line items
//! take physical effect on the catalog), **Reversing** when it crosses out
//! (compensating mutations), and **Neutral** when it stays on one side.
//!
//! The sale fulfillment boundary is `confirmed`: stock is committed the
//! moment an order is confirmed, and `preparing`/`shipped`/`delivered` are
//! forward movements inside the region.

use crate::error::{CoreError, CoreResult};
use crate::types::{AcquisitionStatus, SaleStatus, TradeStatus};

// =============================================================================
// StatusMachine Trait
// =============================================================================

/// The shape every transaction status vocabulary shares.
///
/// Implemented by `AcquisitionStatus`, `SaleStatus`, and `TradeStatus`;
/// the lifecycle controller is written once against this trait instead of
/// three copy-pasted state machines.
pub trait StatusMachine: Copy + Eq + Sized + 'static {
    /// Statuses reachable from `self`. Empty for terminal statuses.
    fn allowed_next(self) -> &'static [Self];

    /// Whether this status sits inside the fulfilled region.
    fn is_fulfilled(self) -> bool;

    /// Stable lowercase label (also the database TEXT representation).
    fn label(self) -> &'static str;

    /// A status with no successors is terminal.
    fn is_terminal(self) -> bool {
        self.allowed_next().is_empty()
    }
}

// =============================================================================
// Transition Classification
// =============================================================================

/// What a validated transition means for the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Requested status equals the current one. Idempotent success; the
    /// catalog must not be touched.
    NoOp,
    /// Neither boundary crossed (e.g. pending → cancelled, or forward
    /// movement inside the fulfilled region).
    Neutral,
    /// Crossing into the fulfilled region: apply line-item effects.
    Fulfilling,
    /// Crossing out of the fulfilled region: apply compensating effects.
    Reversing,
}

/// Validates `current → requested` against the transition table and
/// classifies it.
///
/// ## Algorithm
/// 1. `requested == current` → `NoOp` (idempotent)
/// 2. `requested` not in the allowed-next set → `InvalidTransition`
/// 3. Otherwise classify by which side of the fulfilled boundary each
///    status sits on.
pub fn classify<S: StatusMachine>(current: S, requested: S) -> CoreResult<Transition> {
    if requested == current {
        return Ok(Transition::NoOp);
    }

    if !current.allowed_next().contains(&requested) {
        return Err(CoreError::InvalidTransition {
            current: current.label(),
            requested: requested.label(),
            allowed: current.allowed_next().iter().map(|s| s.label()).collect(),
        });
    }

    Ok(match (current.is_fulfilled(), requested.is_fulfilled()) {
        (false, true) => Transition::Fulfilling,
        (true, false) => Transition::Reversing,
        _ => Transition::Neutral,
    })
}

// =============================================================================
// Acquisition Table
// =============================================================================

impl StatusMachine for AcquisitionStatus {
    fn allowed_next(self) -> &'static [Self] {
        use AcquisitionStatus::*;
        match self {
            // Completing takes stock in; cancelling a pending document is
            // a plain no-effect close.
            Pending => &[Completed, Cancelled],
            // The reversible edge: completed can step back to pending or
            // be cancelled outright. Both undo the stock effects.
            Completed => &[Pending, Cancelled],
            Cancelled => &[],
        }
    }

    fn is_fulfilled(self) -> bool {
        matches!(self, AcquisitionStatus::Completed)
    }

    fn label(self) -> &'static str {
        match self {
            AcquisitionStatus::Pending => "pending",
            AcquisitionStatus::Completed => "completed",
            AcquisitionStatus::Cancelled => "cancelled",
        }
    }
}

// =============================================================================
// Sale Table
// =============================================================================

impl StatusMachine for SaleStatus {
    fn allowed_next(self) -> &'static [Self] {
        use SaleStatus::*;
        match self {
            Pending => &[Confirmed, Preparing, Shipped, Delivered, Cancelled],
            Confirmed => &[Preparing, Shipped, Delivered, Cancelled],
            Preparing => &[Shipped, Delivered, Cancelled],
            // A shipped parcel is out the door: no cancellation path.
            Shipped => &[Delivered],
            Delivered => &[],
            Cancelled => &[],
        }
    }

    fn is_fulfilled(self) -> bool {
        use SaleStatus::*;
        matches!(self, Confirmed | Preparing | Shipped | Delivered)
    }

    fn label(self) -> &'static str {
        match self {
            SaleStatus::Pending => "pending",
            SaleStatus::Confirmed => "confirmed",
            SaleStatus::Preparing => "preparing",
            SaleStatus::Shipped => "shipped",
            SaleStatus::Delivered => "delivered",
            SaleStatus::Cancelled => "cancelled",
        }
    }
}

// =============================================================================
// Trade Table
// =============================================================================

impl StatusMachine for TradeStatus {
    fn allowed_next(self) -> &'static [Self] {
        use TradeStatus::*;
        match self {
            Pending => &[Confirmed, Completed, Cancelled],
            Confirmed => &[Completed, Cancelled],
            // The allowed-once reversal edge.
            Completed => &[Cancelled],
            Cancelled => &[],
        }
    }

    fn is_fulfilled(self) -> bool {
        matches!(self, TradeStatus::Completed)
    }

    fn label(self) -> &'static str {
        match self {
            TradeStatus::Pending => "pending",
            TradeStatus::Confirmed => "confirmed",
            TradeStatus::Completed => "completed",
            TradeStatus::Cancelled => "cancelled",
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
