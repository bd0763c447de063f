//! Rounding helpers for settlement comparisons.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All monetary values are `rust_decimal::Decimal`.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Rounds a monetary value to whole currency units, half away from zero.
///
/// This is the settlement comparison rule: "paid equals price" is always
/// decided on whole units so sub-unit drift from rate multiplication never
/// flips a fully-paid deal into the partial-payment branch.
#[must_use]
pub fn round_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a monetary value to 2 decimal places, half away from zero.
///
/// Used for derived figures such as the product share of a return split.
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns true if two amounts are equal after whole-unit rounding.
#[must_use]
pub fn rounds_equal(a: Decimal, b: Decimal) -> bool {
    round_whole(a) == round_whole(b)
}
