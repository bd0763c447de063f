//! In-memory credit book.

use chrono::{DateTime, Utc};
use farebox_shared::types::{CreditId, DealId};
use rust_decimal::Decimal;

use super::error::CreditError;
use super::types::{Credit, FinancialOperation, OperationKind};

/// Deal-scoped credit storage with ordered financial operations.
#[derive(Debug, Clone, Default)]
pub struct CreditBook {
    credits: Vec<Credit>,
    operations: Vec<FinancialOperation>,
    next_id: i64,
}

impl CreditBook {
    /// Creates an empty credit book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a credit for a deal.
    ///
    /// # Errors
    ///
    /// Returns `CreditError::AlreadyActive` if the deal already has one.
    pub fn open(&mut self, deal_id: DealId, amount_total: Decimal) -> Result<CreditId, CreditError> {
        if self.info_by_deal(deal_id).is_some() {
            return Err(CreditError::AlreadyActive(deal_id));
        }

        self.next_id += 1;
        let id = CreditId::new(self.next_id);
        self.credits.push(Credit {
            id,
            deal_id,
            amount_total,
            amount_paid: Decimal::ZERO,
            amount_remaining: amount_total,
            amount_last_payment: Decimal::ZERO,
        });
        Ok(id)
    }

    /// Current credit for a deal, if any.
    #[must_use]
    pub fn info_by_deal(&self, deal_id: DealId) -> Option<&Credit> {
        self.credits.iter().rev().find(|c| c.deal_id == deal_id)
    }

    /// Looks up a credit by ID.
    #[must_use]
    pub fn by_id(&self, id: CreditId) -> Option<&Credit> {
        self.credits.iter().find(|c| c.id == id)
    }

    /// True while no financial operations have been recorded yet.
    ///
    /// The first checkpoint carries the credit-transfer wording on its
    /// receipt; every later checkpoint is an installment receipt.
    #[must_use]
    pub fn is_first_checkpoint(&self, credit_id: CreditId) -> bool {
        !self.operations.iter().any(|op| op.credit_id == credit_id)
    }

    /// Most recent financial operation on a credit.
    #[must_use]
    pub fn last_financial_operation(&self, credit_id: CreditId) -> Option<&FinancialOperation> {
        self.operations.iter().rev().find(|op| op.credit_id == credit_id)
    }

    /// True if a full-payment operation exists anywhere in the history.
    #[must_use]
    pub fn is_full_payment(&self, credit_id: CreditId) -> bool {
        self.operations
            .iter()
            .any(|op| op.credit_id == credit_id && op.kind == OperationKind::FullPaid)
    }

    /// Records an installment payment.
    ///
    /// # Errors
    ///
    /// Returns `CreditError` if the credit is unknown or already fully paid.
    pub fn record_payment(
        &mut self,
        credit_id: CreditId,
        amount: Decimal,
        date: DateTime<Utc>,
    ) -> Result<(), CreditError> {
        let credit = self
            .credits
            .iter_mut()
            .find(|c| c.id == credit_id)
            .ok_or(CreditError::UnknownCredit(credit_id))?;
        if credit.amount_remaining <= Decimal::ZERO {
            return Err(CreditError::Frozen(credit_id));
        }

        credit.amount_paid += amount;
        credit.amount_remaining = credit.amount_total - credit.amount_paid;
        credit.amount_last_payment = amount;

        let kind = if credit.amount_remaining <= Decimal::ZERO {
            OperationKind::FullPaid
        } else {
            OperationKind::Payment
        };
        self.operations.push(FinancialOperation {
            credit_id,
            kind,
            amount,
            date,
        });
        Ok(())
    }

    /// Records a refund of installments.
    ///
    /// # Errors
    ///
    /// Returns `CreditError::UnknownCredit` if the credit is unknown.
    pub fn record_refund(
        &mut self,
        credit_id: CreditId,
        amount: Decimal,
        date: DateTime<Utc>,
    ) -> Result<(), CreditError> {
        let credit = self
            .credits
            .iter_mut()
            .find(|c| c.id == credit_id)
            .ok_or(CreditError::UnknownCredit(credit_id))?;

        credit.amount_paid -= amount;
        credit.amount_remaining = credit.amount_total - credit.amount_paid;
        credit.amount_last_payment = -amount;

        let kind = if credit.amount_paid <= Decimal::ZERO {
            OperationKind::RefundFullPaid
        } else {
            OperationKind::Refund
        };
        self.operations.push(FinancialOperation {
            credit_id,
            kind,
            amount: -amount,
            date,
        });
        Ok(())
    }

    /// Stages the verified refund amount from an audited refund card.
    ///
    /// Check-total verification confirms what will be returned before the
    /// refund executes; the last-payment field previews it so receipts built
    /// between verification and completion show the audited figure.
    ///
    /// # Errors
    ///
    /// Returns `CreditError::UnknownCredit` if the credit is unknown.
    pub fn reconcile_verified_refund(
        &mut self,
        credit_id: CreditId,
        verified_refund: Decimal,
    ) -> Result<(), CreditError> {
        let credit = self
            .credits
            .iter_mut()
            .find(|c| c.id == credit_id)
            .ok_or(CreditError::UnknownCredit(credit_id))?;
        credit.amount_last_payment = -verified_refund;
        Ok(())
    }
}
