//! Credit domain types.

use chrono::{DateTime, Utc};
use farebox_shared::types::{CreditId, DealId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of a credit financial operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationKind {
    /// Partial installment payment.
    Payment,
    /// The payment that settled the credit in full.
    FullPaid,
    /// Partial refund of installments.
    Refund,
    /// The refund that returned the credit in full.
    RefundFullPaid,
}

/// An ordered financial operation on a credit.
#[derive(Debug, Clone)]
pub struct FinancialOperation {
    /// The credit this operation belongs to.
    pub credit_id: CreditId,
    /// Operation kind.
    pub kind: OperationKind,
    /// Signed amount: positive for payments, negative for refunds.
    pub amount: Decimal,
    /// When the operation happened.
    pub date: DateTime<Utc>,
}

/// An installment plan attached to a deal.
#[derive(Debug, Clone)]
pub struct Credit {
    /// The credit ID.
    pub id: CreditId,
    /// The deal this credit belongs to.
    pub deal_id: DealId,
    /// Total to be paid over the plan.
    pub amount_total: Decimal,
    /// Paid so far.
    pub amount_paid: Decimal,
    /// Remaining balance. Invariant: `amount_total - amount_paid`.
    pub amount_remaining: Decimal,
    /// Amount of the most recent operation (negative for refunds).
    pub amount_last_payment: Decimal,
}

impl Credit {
    /// True once the remaining balance is zero or below.
    #[must_use]
    pub fn is_fully_paid(&self) -> bool {
        self.amount_remaining <= Decimal::ZERO
    }

    /// Last payment magnitude for receipt display.
    ///
    /// A refund reduces the ledger but the receipt always shows a positive
    /// amount; the receipt kind carries the sign semantics.
    #[must_use]
    pub fn normalized_last_payment(&self) -> Decimal {
        self.amount_last_payment.abs()
    }
}
