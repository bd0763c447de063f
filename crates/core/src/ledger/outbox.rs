//! Outbox for external bonus-service calls.
//!
//! A point-funded ledger row and its bonus-service call must form one unit:
//! either both become durable or neither does. The ledger append therefore
//! stages an intent in the same unit of work, and a separate worker pass
//! performs the external call and marks the intent fulfilled. Re-running the
//! worker after a crash is safe — the per-intent GUID makes the external
//! call idempotent.

use farebox_shared::types::points::LoyaltyProgram;
use farebox_shared::types::{DealId, PaymentId};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Direction of a staged bonus operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BonusDirection {
    /// Points leave the client's account (incoming payment).
    Debit,
    /// Points return to the client's account (refund).
    Credit,
}

/// A staged bonus-service call.
#[derive(Debug, Clone)]
pub struct BonusIntent {
    /// Idempotency GUID sent with the external call.
    pub guid: Uuid,
    /// The deal whose payment staged this intent.
    pub deal_id: DealId,
    /// The ledger row this intent belongs to.
    pub payment_id: PaymentId,
    /// External client identifier.
    pub client_external_id: String,
    /// Bonus account number (already normalized).
    pub account_number: String,
    /// Loyalty program.
    pub program: LoyaltyProgram,
    /// Point amount to debit or credit.
    pub point_amount: Decimal,
    /// Operation direction.
    pub direction: BonusDirection,
    /// Loyalty-side transaction ID of the original debit, for refunds.
    pub original_transaction_id: Option<i64>,
    /// True once the worker has completed the external call.
    pub fulfilled: bool,
}

/// Staged bonus operations awaiting the worker pass.
#[derive(Debug, Clone, Default)]
pub struct BonusOutbox {
    intents: Vec<BonusIntent>,
}

impl BonusOutbox {
    /// Creates an empty outbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages an intent.
    pub fn stage(&mut self, intent: BonusIntent) {
        self.intents.push(intent);
    }

    /// Unfulfilled intents in staging order.
    #[must_use]
    pub fn pending(&self) -> Vec<BonusIntent> {
        self.intents.iter().filter(|i| !i.fulfilled).cloned().collect()
    }

    /// Number of unfulfilled intents.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.intents.iter().filter(|i| !i.fulfilled).count()
    }

    /// Marks an intent fulfilled. Unknown GUIDs are ignored.
    pub fn mark_fulfilled(&mut self, guid: Uuid) {
        if let Some(intent) = self.intents.iter_mut().find(|i| i.guid == guid) {
            intent.fulfilled = true;
        }
    }
}
