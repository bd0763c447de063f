//! Refund card domain types.

use chrono::{DateTime, Utc};
use farebox_shared::types::{CardId, DealId, RefundCardId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Workflow status of a refund card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefundStatus {
    /// Just opened.
    New,
    /// Waiting for the client's signed statement.
    AwaitingDocumentFromClient,
    /// Client confirmed the refund.
    ConfirmedClient,
    /// Agreement confirmed; ready for an auditor.
    ConfirmedAgreement,
    /// An auditor took the card to work.
    Work,
    /// Audited totals verified.
    CheckTotalAmountVerified,
    /// Refund executed.
    Completed,
    /// Closed; terminal.
    Close,
    /// Handed to the team lead (point refunds).
    ConfirmedTeamleader,
    /// Team lead took the card to work.
    WorkTeamleader,
    /// Deferred to a later date.
    Delay,
    /// Canceled; terminal.
    Canceled,
}

impl RefundStatus {
    /// True for states no transition leaves.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Close | Self::Canceled)
    }
}

/// How the money goes back to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DirectionType {
    /// Electronic reversal to the card.
    Card,
    /// Bank invoice.
    Invoice,
}

/// Funding source of the refund.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefundPaymentType {
    /// Loyalty points go back to the client's bonus account.
    Point,
}

/// A refund request moving through audit.
#[derive(Debug, Clone)]
pub struct RefundCard {
    /// The refund card ID.
    pub id: RefundCardId,
    /// The deal under refund (`DealId::DETACHED` once canceled).
    pub deal_id: DealId,
    /// Workflow status.
    pub status: RefundStatus,
    /// Funding source; `None` for cash refunds.
    pub payment_type: Option<RefundPaymentType>,
    /// Return channel.
    pub direction_type: Option<DirectionType>,
    /// Cash amount to return.
    pub return_cash: Decimal,
    /// Deposit amount to credit back to the client.
    pub return_deposit: Decimal,
    /// Supplier share withheld from the return.
    pub supplier_return: Decimal,
    /// Agency-fee share withheld from the return.
    pub rs_tls_fee: Decimal,
    /// Currency twin of `supplier_return` for currency-denominated deals.
    pub supplier_return_currency: Option<Decimal>,
    /// Currency twin of `rs_tls_fee`.
    pub rs_tls_fee_currency: Option<Decimal>,
    /// "Totals verified" audit flag.
    pub is_correct_amount_all: bool,
    /// "Re-audit requested" flag.
    pub is_retry_check_total_amount: bool,
    /// When a delayed card re-activates.
    pub delay_date: Option<DateTime<Utc>>,
    /// Original deal of a canceled card.
    pub canceled_refund_deal_id: Option<DealId>,
    /// Deal stage to restore on cancel.
    pub deal_stage_before_return: String,
    /// True when the refund belongs to a correction card.
    pub is_correction_card: bool,
    /// Financial card under refund.
    pub fin_card_id: Option<CardId>,
    /// Auditor currently working the card.
    pub auditor: Option<UserId>,
}

/// Input for opening a refund card.
#[derive(Debug, Clone)]
pub struct NewRefundCard {
    /// The deal under refund.
    pub deal_id: DealId,
    /// Deal stage to restore on cancel.
    pub deal_stage_before_return: String,
    /// True when the refund belongs to a correction card.
    pub is_correction_card: bool,
    /// Financial card under refund.
    pub fin_card_id: Option<CardId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(RefundStatus::Close.is_terminal());
        assert!(RefundStatus::Canceled.is_terminal());
        assert!(!RefundStatus::Completed.is_terminal());
        assert!(!RefundStatus::New.is_terminal());
    }
}
