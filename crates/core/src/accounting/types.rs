//! Accounting entry types.

use chrono::{DateTime, Utc};
use farebox_shared::types::DealId;
use serde::{Deserialize, Serialize};

/// Kind of an accounting ledger posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryKind {
    /// Supplier service act on realization.
    ServiceActSupplier,
    /// Buyer service act on realization.
    ServiceActBuyer,
    /// Refund realization posting.
    RefundRealization,
    /// Refund income posting.
    RefundIncome,
    /// Point payment posting.
    PointPayment,
    /// Point refund posting.
    PointRefund,
}

impl EntryKind {
    /// Stable string form used in posting payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ServiceActSupplier => "SERVICE_ACT_SUPPLIER",
            Self::ServiceActBuyer => "SERVICE_ACT_BUYER",
            Self::RefundRealization => "REFUND_REALIZATION",
            Self::RefundIncome => "REFUND_INCOME",
            Self::PointPayment => "POINT_PAYMENT",
            Self::PointRefund => "POINT_REFUND",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An idempotency marker for a posted entry.
#[derive(Debug, Clone)]
pub struct AccountingEntry {
    /// The deal the entry belongs to.
    pub deal_id: DealId,
    /// Posting kind.
    pub kind: EntryKind,
    /// When the entry was posted.
    pub posted_at: DateTime<Utc>,
}
