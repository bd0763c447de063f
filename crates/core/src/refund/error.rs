//! Refund error types.

use farebox_shared::types::{DealId, RefundCardId};
use thiserror::Error;

use super::types::RefundStatus;

/// Errors that can occur during refund operations.
#[derive(Debug, Error)]
pub enum RefundError {
    /// The requested status change is not on the workflow graph.
    #[error("Invalid refund transition from {from:?} to {to:?}")]
    InvalidTransition {
        /// Current status.
        from: RefundStatus,
        /// Requested status.
        to: RefundStatus,
    },

    /// The refund card does not exist.
    #[error("Refund card not found: {0}")]
    NotFound(RefundCardId),

    /// No active refund card on the deal.
    #[error("No active refund card for deal {0}")]
    NoActiveRefund(DealId),

    /// A deal can only carry one active refund card.
    #[error("Deal {0} already has an active refund card")]
    AlreadyOpen(DealId),

    /// Completing a refund requires a return channel.
    #[error("Refund card {0} has no return direction set")]
    MissingDirection(RefundCardId),

    /// A point refund cannot return a zero amount.
    #[error("Refund card {0} has a zero return amount")]
    ZeroReturnCash(RefundCardId),
}

impl RefundError {
    /// Returns the error code for structured responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_REFUND_TRANSITION",
            Self::NotFound(_) => "REFUND_CARD_NOT_FOUND",
            Self::NoActiveRefund(_) => "NO_ACTIVE_REFUND",
            Self::AlreadyOpen(_) => "REFUND_ALREADY_OPEN",
            Self::MissingDirection(_) => "REFUND_MISSING_DIRECTION",
            Self::ZeroReturnCash(_) => "REFUND_ZERO_RETURN",
        }
    }
}
