//! Receipt error types.

use farebox_shared::types::ReceiptId;
use thiserror::Error;

/// Errors that can occur during receipt operations.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// The receipt row does not exist.
    #[error("Receipt not found: {0}")]
    NotFound(ReceiptId),

    /// A receipt cannot be created without a deal.
    #[error("A receipt requires a deal; none was given")]
    MissingDeal,

    /// The provider's create response carried no receipt identifier.
    #[error("The fiscal provider returned no receipt identifier")]
    CreateRejected,

    /// A pull was requested before the receipt was ever submitted.
    #[error("Receipt {0} has not been submitted to the fiscal provider")]
    NotSubmitted(ReceiptId),

    /// The fiscal provider call failed.
    #[error("Fiscal provider error: {0}")]
    Provider(String),

    /// The request payload could not be serialized.
    #[error("Failed to serialize fiscal request: {0}")]
    Payload(#[from] serde_json::Error),
}

impl ReceiptError {
    /// Returns the error code for structured responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "RECEIPT_NOT_FOUND",
            Self::MissingDeal => "RECEIPT_MISSING_DEAL",
            Self::CreateRejected => "OFD_CREATE_REJECTED",
            Self::NotSubmitted(_) => "RECEIPT_NOT_SUBMITTED",
            Self::Provider(_) => "OFD_PROVIDER_ERROR",
            Self::Payload(_) => "PAYLOAD_SERIALIZATION",
        }
    }
}
