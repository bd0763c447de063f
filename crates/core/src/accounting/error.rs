//! Accounting error types.

use thiserror::Error;

use super::types::EntryKind;

/// Errors that can occur while posting accounting entries.
#[derive(Debug, Error)]
pub enum AccountingError {
    /// The external posting service rejected the entry.
    #[error("Posting {kind} failed: {message}")]
    PostFailed {
        /// The entry kind that failed.
        kind: EntryKind,
        /// Message from the posting service.
        message: String,
    },
}

impl AccountingError {
    /// Returns the error code for structured responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::PostFailed { .. } => "ACCOUNTING_POST_FAILED",
        }
    }
}
