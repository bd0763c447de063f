//! Payment ledger domain types.

use chrono::{DateTime, Utc};
use farebox_shared::types::points::LoyaltyProgram;
use farebox_shared::types::{DealId, PaymentId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a payment transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentType {
    /// Money received from the client.
    Incoming,
    /// Money returned to the client.
    Refund,
}

/// Settlement status of a payment transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// The transaction settled.
    Success,
    /// The transaction is awaiting settlement.
    Pending,
    /// The transaction failed.
    Error,
}

/// An immutable ledger row.
///
/// Rows are never updated or deleted after they are appended; corrections
/// append new rows.
#[derive(Debug, Clone)]
pub struct PaymentTransaction {
    /// The transaction ID. Insertion order is the only ordering signal.
    pub id: PaymentId,
    /// The deal the payment belongs to.
    pub deal_id: DealId,
    /// Incoming payment or refund.
    pub payment_type: PaymentType,
    /// Settlement status.
    pub status: PaymentStatus,
    /// Cash amount (the cash equivalent for point-funded rows).
    pub amount: Decimal,
    /// Point amount, for point-funded rows.
    pub point_amount: Option<Decimal>,
    /// True when the payment was funded from a loyalty balance.
    pub payment_by_point: bool,
    /// Loyalty program, set when point-funded.
    pub program: Option<LoyaltyProgram>,
    /// True when the row was created by a correction-card pass.
    pub is_correction: bool,
    /// When the transaction was executed.
    pub date: DateTime<Utc>,
}

/// Input for appending a ledger row.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// The deal the payment belongs to.
    pub deal_id: DealId,
    /// Incoming payment or refund.
    pub payment_type: PaymentType,
    /// Settlement status.
    pub status: PaymentStatus,
    /// Cash amount.
    pub amount: Decimal,
    /// Point amount, for point-funded rows.
    pub point_amount: Option<Decimal>,
    /// True when funded from a loyalty balance.
    pub payment_by_point: bool,
    /// Loyalty program, set when point-funded.
    pub program: Option<LoyaltyProgram>,
    /// True when created by a correction-card pass.
    pub is_correction: bool,
    /// When the transaction was executed.
    pub date: DateTime<Utc>,
}

impl NewTransaction {
    /// A plain successful incoming cash payment.
    #[must_use]
    pub fn incoming_cash(deal_id: DealId, amount: Decimal, date: DateTime<Utc>) -> Self {
        Self {
            deal_id,
            payment_type: PaymentType::Incoming,
            status: PaymentStatus::Success,
            amount,
            point_amount: None,
            payment_by_point: false,
            program: None,
            is_correction: false,
            date,
        }
    }
}
