//! Money calculation utilities using rust_decimal for precision
//!
//! All monetary arithmetic runs on `Decimal` internally and converts to
//! `f64` only at the storage/serialization boundary.
//!
//! The checkout derivation, reused by detail updates:
//!
//! ```text
//! line_subtotal  = (unit_price + Σ modifier.unit_price * modifier.quantity) * quantity
//! subtotal       = Σ line_subtotal
//! service_charge = subtotal * service_charge_rate
//! total          = subtotal + service_charge + tip - loyalty_discount
//! ```
//!
//! Tax is carried on the breakdown but currently always zero.

use rust_decimal::prelude::*;
use shared::order::{Charges, ModifierSelection, OrderItem};

use crate::orders::TransitionError;

/// Rounding for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed unit price
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per line
const MAX_QUANTITY: i32 = 9999;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Convert a monetary amount to minor currency units (cents)
#[inline]
pub fn to_minor_units(value: f64) -> i64 {
    (to_decimal(value) * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or_default()
}

/// Compare two monetary values for equality (within 0.01 tolerance)
pub fn money_eq(a: f64, b: f64) -> bool {
    (to_decimal(a) - to_decimal(b)).abs() < MONEY_TOLERANCE
}

#[inline]
fn require_finite(value: f64, field_name: &str) -> Result<(), TransitionError> {
    if !value.is_finite() {
        return Err(TransitionError::Validation(format!(
            "{} must be a finite number, got {}",
            field_name, value
        )));
    }
    Ok(())
}

fn require_money(value: f64, field_name: &str) -> Result<(), TransitionError> {
    require_finite(value, field_name)?;
    if value < 0.0 {
        return Err(TransitionError::Validation(format!(
            "{} must be non-negative, got {}",
            field_name, value
        )));
    }
    if value > MAX_PRICE {
        return Err(TransitionError::Validation(format!(
            "{} exceeds maximum allowed ({}), got {}",
            field_name, MAX_PRICE, value
        )));
    }
    Ok(())
}

/// Validate one order line before it enters the aggregate
pub fn validate_line(
    name: &str,
    quantity: i32,
    unit_price: f64,
    modifiers: &[ModifierSelection],
) -> Result<(), TransitionError> {
    if name.trim().is_empty() {
        return Err(TransitionError::Validation(
            "item name must not be empty".to_string(),
        ));
    }
    if quantity <= 0 {
        return Err(TransitionError::Validation(format!(
            "quantity must be positive, got {}",
            quantity
        )));
    }
    if quantity > MAX_QUANTITY {
        return Err(TransitionError::Validation(format!(
            "quantity exceeds maximum allowed ({}), got {}",
            MAX_QUANTITY, quantity
        )));
    }
    require_money(unit_price, "unit_price")?;
    for modifier in modifiers {
        if modifier.quantity <= 0 {
            return Err(TransitionError::Validation(format!(
                "modifier quantity must be positive, got {}",
                modifier.quantity
            )));
        }
        require_money(modifier.unit_price, "modifier unit_price")?;
    }
    Ok(())
}

/// Validate the charge inputs of a checkout or detail update
pub fn validate_charge_inputs(
    service_charge_rate: f64,
    tip: f64,
    loyalty_discount: f64,
) -> Result<(), TransitionError> {
    require_finite(service_charge_rate, "service_charge_rate")?;
    if !(0.0..=1.0).contains(&service_charge_rate) {
        return Err(TransitionError::Validation(format!(
            "service_charge_rate must be between 0 and 1, got {}",
            service_charge_rate
        )));
    }
    require_money(tip, "tip")?;
    require_money(loyalty_discount, "loyalty_discount")?;
    Ok(())
}

/// Line subtotal: (unit price + modifier prices) * quantity
pub fn line_subtotal(quantity: i32, unit_price: f64, modifiers: &[ModifierSelection]) -> Decimal {
    let modifier_total: Decimal = modifiers
        .iter()
        .map(|m| to_decimal(m.unit_price) * Decimal::from(m.quantity))
        .sum();
    let per_unit = to_decimal(unit_price) + modifier_total;
    (per_unit * Decimal::from(quantity))
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Derive the full monetary breakdown from the item list.
///
/// Rejects a loyalty discount that would push the total negative.
pub fn derive_charges(
    items: &[OrderItem],
    service_charge_rate: f64,
    tip: f64,
    loyalty_discount: f64,
) -> Result<Charges, TransitionError> {
    let subtotal: Decimal = items
        .iter()
        .map(|i| line_subtotal(i.quantity, i.unit_price, &i.modifiers))
        .sum();
    let service_charge = (subtotal * to_decimal(service_charge_rate))
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    let tip_dec = to_decimal(tip);
    let discount_dec = to_decimal(loyalty_discount);
    let total = subtotal + service_charge + tip_dec - discount_dec;

    if total < Decimal::ZERO {
        return Err(TransitionError::Validation(format!(
            "loyalty discount {} exceeds order value",
            loyalty_discount
        )));
    }

    Ok(Charges {
        subtotal: to_f64(subtotal),
        tax: 0.0,
        tip: to_f64(tip_dec),
        service_charge: to_f64(service_charge),
        loyalty_discount: to_f64(discount_dec),
        total: to_f64(total),
    })
}

/// Check the breakdown invariant: total = subtotal + service + tip - discount
pub fn charges_consistent(charges: &Charges) -> bool {
    let derived = to_decimal(charges.subtotal) + to_decimal(charges.service_charge)
        + to_decimal(charges.tip)
        - to_decimal(charges.loyalty_discount);
    (derived - to_decimal(charges.total)).abs() < MONEY_TOLERANCE
}
