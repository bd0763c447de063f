//! Price breakdowns, rate snapshots, correction deltas, and debt.
//!
//! This module implements the price/rate resolver:
//! - Price breakdowns with optional currency-denominated twin fields
//! - Rate snapshot application (resolved once per receipt-construction pass)
//! - Correction deltas against a preceding card
//! - Signed remaining-balance (debt) computation
//! - Daily point-to-cash conversion rates

pub mod error;
pub mod rates;
pub mod resolver;
pub mod types;

#[cfg(test)]
mod resolver_props;

pub use error::PricingError;
pub use rates::{AverageRateBook, PointRateBook};
pub use resolver::{amount_debt, cash_equivalent, correction_delta, resolve, result_delta};
pub use types::{CurrencyPrice, PriceBreakdown, RateSnapshot, ResolvedPrice};
