//! Financial card error types.

use farebox_shared::types::DealId;
use thiserror::Error;

/// Errors that can occur working with financial cards.
#[derive(Debug, Error)]
pub enum CardError {
    /// No active financial card on the deal.
    #[error("No financial card found for deal {0}")]
    NotFound(DealId),

    /// A correction delta was requested but no superseded card exists.
    #[error("No preceding card to diff against for deal {0}")]
    NoPrecedingCard(DealId),

    /// A card referenced by an issued receipt can no longer be replaced
    /// outside the correction flow.
    #[error("Financial card for deal {0} is frozen by an issued receipt")]
    Frozen(DealId),
}

impl CardError {
    /// Returns the error code for structured responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "FIN_CARD_NOT_FOUND",
            Self::NoPrecedingCard(_) => "NO_PRECEDING_CARD",
            Self::Frozen(_) => "FIN_CARD_FROZEN",
        }
    }
}
