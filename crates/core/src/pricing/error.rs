//! Pricing error types.

use farebox_shared::types::DealId;
use thiserror::Error;

/// Errors that can occur during price resolution.
#[derive(Debug, Error)]
pub enum PricingError {
    /// A currency-denominated card was resolved without a rate snapshot.
    #[error("Deal {0} is priced in a foreign currency but has no rate snapshot")]
    MissingRate(DealId),

    /// No point conversion rate recorded for the program on the given date.
    #[error("No point rate recorded for program {program} on {date}")]
    MissingPointRate {
        /// Loyalty program short code.
        program: String,
        /// The date the rate was requested for.
        date: chrono::NaiveDate,
    },
}

impl PricingError {
    /// Returns the error code for structured responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MissingRate(_) => "MISSING_RATE_SNAPSHOT",
            Self::MissingPointRate { .. } => "MISSING_POINT_RATE",
        }
    }
}
