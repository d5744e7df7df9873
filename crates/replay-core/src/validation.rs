//! # Validation Module
//!
//! Input validation for request payloads.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (HTTP handler, out of scope)                           │
//! │  ├── Shape/type validation (deserialization)                            │
//! │  └── Immediate user feedback                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - business rule validation                        │
//! │  ├── Runs before ANY catalog mutation                                   │
//! │  └── Structured errors, safe to surface verbatim                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── CHECK (stock >= 0) backstops                                       │
//! │  └── UNIQUE / foreign key constraints                                   │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{
    Discount, NewAcquisition, NewSaleOrder, NewSkuDetails, NewTrade,
};
use crate::{MAX_AMOUNT_CENTS, MAX_DISCOUNT_BPS, MAX_LINE_ITEMS, MAX_LINE_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a barcode: 10-13 ascii digits.
///
/// ## Example
/// ```rust
/// use replay_core::validation::validate_barcode;
///
/// assert!(validate_barcode("0123456789").is_ok());
/// assert!(validate_barcode("123").is_err());
/// assert!(validate_barcode("ABC4567890").is_err());
/// ```
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    let barcode = barcode.trim();

    if barcode.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }

    if !(10..=13).contains(&barcode.len()) {
        return Err(ValidationError::OutOfRange {
            field: "barcode length".to_string(),
            min: 10,
            max: 13,
        });
    }

    if !barcode.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must contain only digits".to_string(),
        });
    }

    Ok(())
}

/// Validates a title: non-empty, at most 200 characters.
pub fn validate_title(title: &str) -> ValidationResult<()> {
    let title = title.trim();

    if title.is_empty() {
        return Err(ValidationError::Required {
            field: "title".to_string(),
        });
    }

    if title.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "title".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a non-empty contact/supplier/customer name.
pub fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    if value.len() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }
    Ok(())
}

/// Validates a line quantity: positive, below the sanity ceiling.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    if quantity > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }
    Ok(())
}

/// Validates a monetary amount: non-negative, below the sanity ceiling.
pub fn validate_amount(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    if cents > MAX_AMOUNT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT_CENTS,
        });
    }
    Ok(())
}

/// Validates a discount: a percentage may not exceed 100%, a fixed amount
/// is an ordinary monetary amount.
pub fn validate_discount(discount: &Discount) -> ValidationResult<()> {
    match *discount {
        Discount::Percentage(bps) if bps > MAX_DISCOUNT_BPS => {
            Err(ValidationError::OutOfRange {
                field: "discount_bps".to_string(),
                min: 0,
                max: MAX_DISCOUNT_BPS as i64,
            })
        }
        Discount::Percentage(_) => Ok(()),
        Discount::Fixed(cents) => validate_amount("discount_cents", cents),
    }
}

/// Validates the sale-price rule: when a sale is active, the sale price is
/// required and must undercut the list price.
pub fn validate_sale_price(
    list_price_cents: i64,
    sale_active: bool,
    sale_price_cents: Option<i64>,
) -> ValidationResult<()> {
    if !sale_active {
        return Ok(());
    }

    match sale_price_cents {
        None => Err(ValidationError::Required {
            field: "sale_price_cents".to_string(),
        }),
        Some(sale) if sale >= list_price_cents => Err(ValidationError::SalePriceNotBelowList {
            sale_price: sale,
            list_price: list_price_cents,
        }),
        Some(sale) => validate_amount("sale_price_cents", sale),
    }
}

/// Validates a line-item count: non-empty, bounded.
pub fn validate_line_count(field: &str, count: usize) -> ValidationResult<()> {
    if count == 0 || count > MAX_LINE_ITEMS {
        return Err(ValidationError::BadLineCount {
            field: field.to_string(),
            max: MAX_LINE_ITEMS,
        });
    }
    Ok(())
}

// =============================================================================
// Payload Validators
// =============================================================================

/// Validates a whole acquisition payload before anything is persisted.
pub fn validate_new_acquisition(payload: &NewAcquisition) -> ValidationResult<()> {
    validate_name("supplier_name", &payload.supplier_name)?;
    validate_amount("total_cost_cents", payload.total_cost_cents)?;
    validate_line_count("lines", payload.lines.len())?;

    for line in &payload.lines {
        validate_barcode(&line.barcode)?;
        validate_title(&line.title)?;
        validate_quantity(line.quantity)?;
        validate_amount("unit_cost_cents", line.unit_cost_cents)?;
        validate_amount("unit_selling_price_cents", line.unit_selling_price_cents)?;
        if let Some(list) = line.new_sku_list_price_cents {
            validate_amount("new_sku_list_price_cents", list)?;
        }
    }

    Ok(())
}

/// Validates a whole sale payload before anything is persisted.
pub fn validate_new_sale(payload: &NewSaleOrder) -> ValidationResult<()> {
    validate_name("customer_name", &payload.customer_name)?;
    validate_amount("delivery_fee_cents", payload.delivery_fee_cents)?;
    if let Some(discount) = &payload.discount {
        validate_discount(discount)?;
    }
    validate_line_count("lines", payload.lines.len())?;

    for line in &payload.lines {
        validate_barcode(&line.barcode)?;
        validate_quantity(line.quantity)?;
        if let Some(price) = line.unit_price_cents {
            validate_amount("unit_price_cents", price)?;
        }
    }

    Ok(())
}

/// Validates a whole trade payload before anything is persisted.
///
/// A trade must move stock in at least one direction, so the line-count
/// ceiling applies to each non-empty array and at least one array must be
/// non-empty.
pub fn validate_new_trade(payload: &NewTrade) -> ValidationResult<()> {
    validate_name("customer_name", &payload.customer_name)?;

    if payload.given.is_empty() && payload.received.is_empty() {
        return Err(ValidationError::BadLineCount {
            field: "given/received".to_string(),
            max: MAX_LINE_ITEMS,
        });
    }
    if !payload.given.is_empty() {
        validate_line_count("given", payload.given.len())?;
    }
    if !payload.received.is_empty() {
        validate_line_count("received", payload.received.len())?;
    }

    for line in &payload.given {
        validate_barcode(&line.barcode)?;
        validate_title(&line.title)?;
        validate_quantity(line.quantity)?;
        validate_amount("unit_value_cents", line.unit_value_cents)?;
        if let Some(list) = line.new_sku_list_price_cents {
            validate_amount("new_sku_list_price_cents", list)?;
        }
    }

    for line in &payload.received {
        validate_barcode(&line.barcode)?;
        validate_quantity(line.quantity)?;
        if let Some(value) = line.unit_value_cents {
            validate_amount("unit_value_cents", value)?;
        }
    }

    Ok(())
}

/// Validates details for a standalone catalog entry.
pub fn validate_new_sku(details: &NewSkuDetails) -> ValidationResult<()> {
    validate_barcode(&details.barcode)?;
    validate_title(&details.title)?;
    validate_amount("list_price_cents", details.list_price_cents)?;
    validate_sale_price(
        details.list_price_cents,
        details.sale_active,
        details.sale_price_cents,
    )
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewSaleLine, NewTradeGivenLine};

    #[test]
    fn test_barcode_rules() {
        assert!(validate_barcode("0123456789").is_ok()); // 10 digits
        assert!(validate_barcode("0123456789012").is_ok()); // 13 digits
        assert!(validate_barcode(" 0123456789 ").is_ok()); // trimmed
        assert!(validate_barcode("").is_err());
        assert!(validate_barcode("123456789").is_err()); // 9 digits
        assert!(validate_barcode("01234567890123").is_err()); // 14 digits
        assert!(validate_barcode("01234A6789").is_err());
    }

    #[test]
    fn test_quantity_rules() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_LINE_QUANTITY).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_LINE_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_amount_ceiling() {
        assert!(validate_amount("unit_cost_cents", 0).is_ok());
        assert!(validate_amount("unit_cost_cents", MAX_AMOUNT_CENTS).is_ok());
        assert!(validate_amount("unit_cost_cents", -1).is_err());
        assert!(validate_amount("unit_cost_cents", MAX_AMOUNT_CENTS + 1).is_err());
    }

    #[test]
    fn test_discount_rules() {
        assert!(validate_discount(&Discount::Percentage(0)).is_ok());
        assert!(validate_discount(&Discount::Percentage(MAX_DISCOUNT_BPS)).is_ok());
        assert!(validate_discount(&Discount::Percentage(MAX_DISCOUNT_BPS + 1)).is_err());
        assert!(validate_discount(&Discount::Fixed(500)).is_ok());
        assert!(validate_discount(&Discount::Fixed(-500)).is_err());
    }

    #[test]
    fn test_sale_payload_rejects_over_100_percent_discount() {
        let payload = NewSaleOrder {
            customer_name: "Ada".to_string(),
            customer_contact: None,
            discount: Some(Discount::Percentage(15000)),
            delivery_fee_cents: 0,
            notes: None,
            lines: vec![NewSaleLine {
                barcode: "0123456789".to_string(),
                quantity: 1,
                variant: None,
                unit_price_cents: None,
            }],
        };
        assert!(validate_new_sale(&payload).is_err());
    }

    #[test]
    fn test_sale_price_rule() {
        // Inactive sale: anything goes
        assert!(validate_sale_price(9900, false, None).is_ok());

        // Active sale requires a price below list
        assert!(validate_sale_price(9900, true, None).is_err());
        assert!(validate_sale_price(9900, true, Some(9900)).is_err());
        assert!(validate_sale_price(9900, true, Some(12000)).is_err());
        assert!(validate_sale_price(9900, true, Some(7900)).is_ok());
    }

    #[test]
    fn test_sale_payload_rejected_before_mutation() {
        let payload = NewSaleOrder {
            customer_name: "".to_string(),
            customer_contact: None,
            discount: None,
            delivery_fee_cents: 0,
            notes: None,
            lines: vec![NewSaleLine {
                barcode: "0123456789".to_string(),
                quantity: 1,
                variant: None,
                unit_price_cents: None,
            }],
        };
        assert!(validate_new_sale(&payload).is_err());
    }

    #[test]
    fn test_trade_payload_needs_lines() {
        let payload = NewTrade {
            customer_name: "Ada".to_string(),
            customer_contact: None,
            notes: None,
            given: vec![],
            received: vec![],
        };
        assert!(validate_new_trade(&payload).is_err());

        let payload = NewTrade {
            customer_name: "Ada".to_string(),
            customer_contact: None,
            notes: None,
            given: vec![NewTradeGivenLine {
                barcode: "0123456789".to_string(),
                title: "Super Metroid".to_string(),
                quantity: 1,
                unit_value_cents: 4000,
                variant: None,
                is_new_sku: false,
                new_sku_list_price_cents: None,
            }],
            received: vec![],
        };
        assert!(validate_new_trade(&payload).is_ok());
    }
}
