//! Credit error types.

use farebox_shared::types::{CreditId, DealId};
use thiserror::Error;

/// Errors that can occur during credit operations.
#[derive(Debug, Error)]
pub enum CreditError {
    /// No active credit on the deal.
    #[error("No active credit found for deal {0}")]
    NotFound(DealId),

    /// The referenced credit does not exist.
    #[error("Credit not found: {0}")]
    UnknownCredit(CreditId),

    /// A second credit cannot be opened while one is active.
    #[error("Deal {0} already has an active credit")]
    AlreadyActive(DealId),

    /// Fully paid credits are frozen against further payments.
    #[error("Credit {0} is fully paid and frozen")]
    Frozen(CreditId),
}

impl CreditError {
    /// Returns the error code for structured responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "CREDIT_NOT_FOUND",
            Self::UnknownCredit(_) => "CREDIT_NOT_FOUND",
            Self::AlreadyActive(_) => "CREDIT_ALREADY_ACTIVE",
            Self::Frozen(_) => "CREDIT_FROZEN",
        }
    }
}
