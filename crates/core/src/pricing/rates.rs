//! Conversion rate books.
//!
//! Daily point-to-cash rates per loyalty program, and the per-deal exchange
//! rate snapshots currency-denominated cards are resolved with.

use std::collections::HashMap;

use chrono::NaiveDate;
use farebox_shared::types::points::LoyaltyProgram;
use farebox_shared::types::DealId;
use rust_decimal::Decimal;

use super::error::PricingError;
use super::types::RateSnapshot;

/// Per-deal exchange rate snapshots.
///
/// A snapshot is recorded when the deal enters financial processing and
/// reused, unchanged, for every receipt-construction pass on that deal.
#[derive(Debug, Clone, Default)]
pub struct AverageRateBook {
    rates: HashMap<DealId, RateSnapshot>,
}

impl AverageRateBook {
    /// Creates an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records (or replaces) the snapshot for a deal.
    pub fn record(&mut self, deal_id: DealId, snapshot: RateSnapshot) {
        self.rates.insert(deal_id, snapshot);
    }

    /// The snapshot for a deal, if recorded.
    #[must_use]
    pub fn get(&self, deal_id: DealId) -> Option<&RateSnapshot> {
        self.rates.get(&deal_id)
    }
}

/// Per-program daily conversion rates.
///
/// A rate is recorded (upserted) every time a point payment is taken, so the
/// book always reflects the rate each payment actually settled at.
#[derive(Debug, Clone, Default)]
pub struct PointRateBook {
    rates: HashMap<(LoyaltyProgram, NaiveDate), Decimal>,
}

impl PointRateBook {
    /// Creates an empty rate book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the rate a program settled at on a given date.
    ///
    /// Re-recording the same day overwrites the previous value.
    pub fn record(&mut self, program: LoyaltyProgram, date: NaiveDate, rate: Decimal) {
        self.rates.insert((program, date), rate);
    }

    /// Returns the rate for a program on a date, if recorded.
    #[must_use]
    pub fn rate_on(&self, program: LoyaltyProgram, date: NaiveDate) -> Option<Decimal> {
        self.rates.get(&(program, date)).copied()
    }

    /// Returns the rate or a missing-rate error.
    pub fn rate_on_or_err(
        &self,
        program: LoyaltyProgram,
        date: NaiveDate,
    ) -> Result<Decimal, PricingError> {
        self.rate_on(program, date)
            .ok_or_else(|| PricingError::MissingPointRate {
                program: program.code().to_string(),
                date,
            })
    }
}
