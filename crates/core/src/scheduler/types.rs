//! Scheduler domain types.

use chrono::{DateTime, Utc};
use farebox_shared::types::DealId;
use serde::{Deserialize, Serialize};

/// Kind of a deferred job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobKind {
    /// Print the full-payment receipt once the service starts.
    FullPaymentReceipt,
    /// Re-check whether the deal reached full payment.
    FullPaidCheck,
    /// Re-activate a delayed refund card.
    DelayedRefund,
}

/// A scheduled one-shot job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledJob {
    /// The deal the job acts on.
    pub deal_id: DealId,
    /// What the job does.
    pub kind: JobKind,
    /// When the job fires.
    pub run_at: DateTime<Utc>,
}
