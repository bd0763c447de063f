//! The engine's deal-scoped stores.

use crate::accounting::AccountingJournal;
use crate::card::CardFile;
use crate::credit::CreditBook;
use crate::ledger::{BonusOutbox, PaymentLedger};
use crate::pricing::{AverageRateBook, PointRateBook};
use crate::receipt::ReceiptStore;
use crate::refund::RefundCardStore;
use crate::scheduler::JobQueue;

/// Everything the engine persists, cloneable for unit-of-work snapshots.
#[derive(Debug, Clone, Default)]
pub struct Stores {
    /// Financial cards.
    pub cards: CardFile,
    /// Payment transactions.
    pub ledger: PaymentLedger,
    /// Staged bonus-service calls.
    pub outbox: BonusOutbox,
    /// Installment credits.
    pub credits: CreditBook,
    /// Fiscal receipts.
    pub receipts: ReceiptStore,
    /// Refund cards.
    pub refunds: RefundCardStore,
    /// Accounting idempotency journal.
    pub journal: AccountingJournal,
    /// Deferred jobs.
    pub jobs: JobQueue,
    /// Daily point conversion rates.
    pub point_rates: PointRateBook,
    /// Per-deal exchange-rate snapshots.
    pub average_rates: AverageRateBook,
}

impl Stores {
    /// Creates empty stores.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
