//! # Fulfillment Engine
//!
//! Applies a list of stock effects, or its inverse, against the catalog.
//! The caller opens the transaction and performs the status
//! compare-and-set after this engine returns; any error here rolls the
//! whole transition back, so the catalog and the document always move
//! together.
//!
//! ## All-Or-Nothing
//! ```text
//! BEGIN
//!   effect 1  ✓
//!   effect 2  ✓
//!   effect 3  ✗  InsufficientStock ──► ROLLBACK (effects 1-2 undone)
//! ```
//!
//! ## Reversal Asymmetry
//! Reversing an `Increase` removes the units with the floor-at-zero policy
//! (the copies may already have been resold) and leaves the cost basis at
//! its blended value. The blend is not invertible without per-unit history,
//! so a reversed acquisition's cost contribution persists as an accepted
//! approximation.

use sqlx::SqliteConnection;
use tracing::{debug, warn};

use replay_core::costing::next_cost_basis;
use replay_core::{CoreError, Money, Sku};
use replay_db::CatalogRepository;

use crate::effects::{CostingScope, StockEffect};
use crate::error::LedgerResult;

/// Applies effects in order: the fulfilling direction.
pub(crate) async fn apply_effects(
    catalog: &CatalogRepository,
    conn: &mut SqliteConnection,
    effects: &[StockEffect],
) -> LedgerResult<()> {
    for effect in effects {
        match effect {
            StockEffect::Increase {
                barcode,
                variant,
                quantity,
                unit_cost,
                costing,
                new_sku,
            } => {
                let existing = catalog.get_in_tx(conn, barcode).await?;

                let sku = match (existing, new_sku) {
                    (Some(sku), _) => sku, // new-SKU flag on a known barcode falls through
                    (None, Some(seed)) => {
                        let sku = seed_sku(barcode, &seed.title, seed.list_price_cents);
                        catalog.insert_in_tx(conn, &sku).await?;
                        debug!(barcode = %barcode, "Created SKU during fulfillment");
                        sku
                    }
                    (None, None) => return Err(CoreError::SkuNotFound(barcode.clone()).into()),
                };

                let weigh_stock = match costing {
                    CostingScope::Sku => sku.total_available(),
                    CostingScope::Variant => sku.stock(*variant),
                };
                let blended =
                    next_cost_basis(weigh_stock, sku.cost_basis(), *quantity, *unit_cost);
                catalog
                    .add_stock(conn, barcode, *variant, *quantity, blended)
                    .await?;
            }

            StockEffect::Decrease {
                barcode,
                variant,
                quantity,
                counts_toward_sold,
            } => {
                let taken = catalog
                    .take_stock_checked(conn, barcode, *variant, *quantity, *counts_toward_sold)
                    .await?;

                if !taken {
                    // Zero rows affected: either the barcode is unknown or
                    // the counter was short. Distinguish for the error.
                    let err = match catalog.get_in_tx(conn, barcode).await? {
                        Some(sku) => CoreError::InsufficientStock {
                            barcode: barcode.clone(),
                            variant: *variant,
                            available: sku.stock(*variant),
                            requested: *quantity,
                        },
                        None => CoreError::SkuNotFound(barcode.clone()),
                    };
                    return Err(err.into());
                }
            }
        }
    }

    Ok(())
}

/// Applies the inverse of each effect, last effect first: the reversing
/// direction.
pub(crate) async fn revert_effects(
    catalog: &CatalogRepository,
    conn: &mut SqliteConnection,
    effects: &[StockEffect],
) -> LedgerResult<()> {
    for effect in effects.iter().rev() {
        match effect {
            StockEffect::Increase {
                barcode,
                variant,
                quantity,
                ..
            } => {
                let shortfall = catalog
                    .take_stock_clamped(conn, barcode, *variant, *quantity)
                    .await?;

                if shortfall > 0 {
                    warn!(
                        barcode = %barcode,
                        variant = %variant,
                        quantity = %quantity,
                        shortfall = %shortfall,
                        "Reversal clamped at zero; units were already sold on"
                    );
                }
            }

            StockEffect::Decrease {
                barcode,
                variant,
                quantity,
                counts_toward_sold,
            } => {
                catalog
                    .release_stock(conn, barcode, *variant, *quantity, *counts_toward_sold)
                    .await?;
            }
        }
    }

    Ok(())
}

/// A catalog entry created on the fly by a new-SKU line. Stock and cost
/// start at zero; the increase that triggered the creation fills them in.
fn seed_sku(barcode: &str, title: &str, list_price_cents: i64) -> Sku {
    let now = chrono::Utc::now();
    Sku {
        barcode: barcode.to_string(),
        title: title.to_string(),
        stock_with_case: 0,
        stock_cartridge_only: 0,
        cost_basis_cents: Money::zero().cents(),
        list_price_cents,
        sale_active: false,
        sale_price_cents: None,
        units_sold: 0,
        is_active: true,
        created_at: now,
        updated_at: now,
        version: 0,
    }
}
