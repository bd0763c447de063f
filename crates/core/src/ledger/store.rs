//! In-memory append-only payment ledger.

use farebox_shared::types::{DealId, PaymentId};
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{NewTransaction, PaymentStatus, PaymentTransaction, PaymentType};

/// Append-only payment transaction storage.
///
/// Rows are immutable once appended; every query reads the latest committed
/// state in insertion order.
#[derive(Debug, Clone, Default)]
pub struct PaymentLedger {
    rows: Vec<PaymentTransaction>,
    next_id: i64,
}

impl PaymentLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a transaction and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` for zero/negative amounts or point rows missing
    /// their point amount or program.
    pub fn append(&mut self, input: NewTransaction) -> Result<PaymentId, LedgerError> {
        if input.amount == Decimal::ZERO {
            return Err(LedgerError::ZeroAmount);
        }
        if input.amount < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount);
        }
        if input.payment_by_point && (input.point_amount.is_none() || input.program.is_none()) {
            return Err(LedgerError::IncompletePointRow);
        }

        self.next_id += 1;
        let id = PaymentId::new(self.next_id);
        self.rows.push(PaymentTransaction {
            id,
            deal_id: input.deal_id,
            payment_type: input.payment_type,
            status: input.status,
            amount: input.amount,
            point_amount: input.point_amount,
            payment_by_point: input.payment_by_point,
            program: input.program,
            is_correction: input.is_correction,
            date: input.date,
        });
        Ok(id)
    }

    /// Looks up a transaction by ID.
    #[must_use]
    pub fn by_id(&self, id: PaymentId) -> Option<&PaymentTransaction> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// Sum of successful incoming amounts for a deal.
    #[must_use]
    pub fn sum_incoming(&self, deal_id: DealId) -> Decimal {
        self.incoming_success(deal_id).map(|r| r.amount).sum()
    }

    /// Recognized paid total: successful incoming minus successful refunds.
    #[must_use]
    pub fn recognized_paid(&self, deal_id: DealId) -> Decimal {
        self.rows
            .iter()
            .filter(|r| r.deal_id == deal_id && r.status == PaymentStatus::Success)
            .map(|r| match r.payment_type {
                PaymentType::Incoming => r.amount,
                PaymentType::Refund => -r.amount,
            })
            .sum()
    }

    /// Most recent successful point-funded transaction, by descending ID.
    ///
    /// Higher ID wins on ties; insertion order is the only ordering signal.
    #[must_use]
    pub fn last_point_payment(&self, deal_id: DealId) -> Option<&PaymentTransaction> {
        self.rows
            .iter()
            .rev()
            .find(|r| {
                r.deal_id == deal_id && r.status == PaymentStatus::Success && r.payment_by_point
            })
    }

    /// True if the deal has at least one successful point-funded payment.
    #[must_use]
    pub fn has_point_payment(&self, deal_id: DealId) -> bool {
        self.last_point_payment(deal_id).is_some()
    }

    /// Successful incoming point-funded rows for a deal, insertion order.
    pub fn point_payments(&self, deal_id: DealId) -> impl Iterator<Item = &PaymentTransaction> {
        self.rows.iter().filter(move |r| {
            r.deal_id == deal_id
                && r.status == PaymentStatus::Success
                && r.payment_type == PaymentType::Incoming
                && r.payment_by_point
        })
    }

    /// Successful incoming rows for a deal, insertion order.
    pub fn incoming_success(&self, deal_id: DealId) -> impl Iterator<Item = &PaymentTransaction> {
        self.rows.iter().filter(move |r| {
            r.deal_id == deal_id
                && r.status == PaymentStatus::Success
                && r.payment_type == PaymentType::Incoming
        })
    }

    /// True if the deal has successful correction-pass payments.
    #[must_use]
    pub fn has_correction_payment(&self, deal_id: DealId) -> bool {
        self.rows.iter().any(|r| {
            r.deal_id == deal_id && r.status == PaymentStatus::Success && r.is_correction
        })
    }
}
