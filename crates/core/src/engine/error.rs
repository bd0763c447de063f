//! Engine error type.

use farebox_shared::AppError;
use thiserror::Error;

use crate::accounting::AccountingError;
use crate::card::CardError;
use crate::credit::CreditError;
use crate::external::ExternalError;
use crate::ledger::LedgerError;
use crate::pricing::PricingError;
use crate::receipt::ReceiptError;
use crate::refund::RefundError;
use crate::strategy::StrategyError;

/// Any error an engine operation can surface.
///
/// Module errors bubble here unchanged; the orchestration boundary turns
/// them into structured responses via [`AppError`].
#[derive(Debug, Error)]
pub enum EngineError {
    /// Financial card error.
    #[error(transparent)]
    Card(#[from] CardError),

    /// Price resolution error.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Payment ledger error.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Credit tracking error.
    #[error(transparent)]
    Credit(#[from] CreditError),

    /// Strategy construction error.
    #[error(transparent)]
    Strategy(#[from] StrategyError),

    /// Receipt manager error.
    #[error(transparent)]
    Receipt(#[from] ReceiptError),

    /// Refund workflow error.
    #[error(transparent)]
    Refund(#[from] RefundError),

    /// Accounting posting error.
    #[error(transparent)]
    Accounting(#[from] AccountingError),

    /// External collaborator error.
    #[error(transparent)]
    External(#[from] ExternalError),

    /// Input validation error.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl EngineError {
    /// Returns the error code for structured responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Card(e) => e.error_code(),
            Self::Pricing(e) => e.error_code(),
            Self::Ledger(e) => e.error_code(),
            Self::Credit(e) => e.error_code(),
            Self::Strategy(e) => e.error_code(),
            Self::Receipt(e) => e.error_code(),
            Self::Refund(e) => e.error_code(),
            Self::Accounting(e) => e.error_code(),
            Self::External(_) => "EXTERNAL_SERVICE_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

impl From<EngineError> for AppError {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match &error {
            EngineError::Validation(_) | EngineError::Strategy(_) => Self::Validation(message),
            EngineError::External(_) => Self::ExternalService(message),
            EngineError::Card(CardError::NotFound(_))
            | EngineError::Credit(CreditError::NotFound(_) | CreditError::UnknownCredit(_))
            | EngineError::Receipt(ReceiptError::NotFound(_))
            | EngineError::Refund(RefundError::NotFound(_) | RefundError::NoActiveRefund(_)) => {
                Self::NotFound(message)
            }
            _ => Self::BusinessRule(message),
        }
    }
}
