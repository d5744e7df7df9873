//! Business reference codes.
//!
//! Every document carries a human-readable reference next to its UUID:
//! `{PREFIX}-{YYYYMMDD}-{6 hex}` (e.g. `ORD-20260830-4F21A9`). The prefix
//! names the kind, the date is the creation day, and the suffix comes from
//! the document's own UUID so the pair can never disagree.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Reference prefix for supplier purchases.
pub const PREFIX_ACQUISITION: &str = "PO";
/// Reference prefix for customer orders.
pub const PREFIX_SALE: &str = "ORD";
/// Reference prefix for trades.
pub const PREFIX_TRADE: &str = "TRD";

/// Builds a reference code from a document's UUID and creation time.
pub fn reference_code(prefix: &str, id: &Uuid, created_at: DateTime<Utc>) -> String {
    let suffix: String = id
        .simple()
        .to_string()
        .chars()
        .take(6)
        .collect::<String>()
        .to_uppercase();
    format!("{}-{}-{}", prefix, created_at.format("%Y%m%d"), suffix)
}
