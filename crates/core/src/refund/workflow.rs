//! Pure refund transition validation.
//!
//! Statuses advance monotonically along the audit graph; the only edges
//! that rewind are the explicit delay re-activation and cancel. Side
//! effects live in the engine, not here.

use super::error::RefundError;
use super::types::RefundStatus;

/// Stateless validator for refund card transitions.
pub struct RefundWorkflow;

impl RefundWorkflow {
    /// Validates a status change along the workflow graph.
    ///
    /// # Errors
    ///
    /// Returns [`RefundError::InvalidTransition`] for edges not on the graph.
    pub fn validate_transition(from: RefundStatus, to: RefundStatus) -> Result<(), RefundError> {
        use RefundStatus as S;

        let allowed = match from {
            S::New => matches!(to, S::AwaitingDocumentFromClient | S::Delay),
            S::AwaitingDocumentFromClient => matches!(to, S::ConfirmedClient | S::Delay),
            S::ConfirmedClient => matches!(to, S::ConfirmedAgreement | S::Delay),
            S::ConfirmedAgreement => {
                matches!(to, S::Work | S::ConfirmedTeamleader | S::Delay)
            }
            S::Work => matches!(to, S::CheckTotalAmountVerified | S::Delay),
            S::CheckTotalAmountVerified => matches!(to, S::Completed),
            S::Completed => matches!(to, S::Close),
            S::ConfirmedTeamleader => matches!(to, S::WorkTeamleader),
            S::WorkTeamleader => matches!(to, S::CheckTotalAmountVerified | S::Completed),
            S::Delay => matches!(to, S::Work),
            S::Close | S::Canceled => false,
        };

        if allowed {
            Ok(())
        } else {
            Err(RefundError::InvalidTransition { from, to })
        }
    }

    /// Validates that a card can still be canceled.
    ///
    /// Cancel is a rewind edge available from every non-terminal state.
    ///
    /// # Errors
    ///
    /// Returns [`RefundError::InvalidTransition`] once the card is terminal.
    pub fn validate_cancel(from: RefundStatus) -> Result<(), RefundError> {
        if from.is_terminal() {
            return Err(RefundError::InvalidTransition {
                from,
                to: RefundStatus::Canceled,
            });
        }
        Ok(())
    }
}
