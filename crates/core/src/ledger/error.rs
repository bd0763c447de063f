//! Payment ledger error types.

use farebox_shared::types::{DealId, PaymentId};
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Transaction amount cannot be zero.
    #[error("Transaction amount cannot be zero")]
    ZeroAmount,

    /// Transaction amount cannot be negative.
    #[error("Transaction amount cannot be negative")]
    NegativeAmount,

    /// A point-funded row must carry a point amount and program.
    #[error("Point-funded transaction is missing its point amount or program")]
    IncompletePointRow,

    /// Transaction not found.
    #[error("Payment transaction not found: {0}")]
    TransactionNotFound(PaymentId),

    /// A point operation was requested on a deal without point payments.
    #[error("Deal {0} has no successful point payments")]
    NoPointPayments(DealId),
}

impl LedgerError {
    /// Returns the error code for structured responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::IncompletePointRow => "INCOMPLETE_POINT_ROW",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::NoPointPayments(_) => "NO_POINT_PAYMENTS",
        }
    }
}
