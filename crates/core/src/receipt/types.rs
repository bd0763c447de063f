//! Receipt domain types.

use chrono::{DateTime, Utc};
use farebox_shared::types::{DealId, PaymentId, ReceiptId};
use serde::{Deserialize, Serialize};

use crate::strategy::{ReceiptTag, ReceiptType, StrategyKind};

/// Lifecycle status of a fiscal receipt row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReceiptStatus {
    /// Persisted, not yet accepted by the provider.
    New,
    /// Accepted by the provider, external ID assigned.
    Sended,
    /// Rendered document resolved; terminal success.
    Created,
    /// Abandoned after the external scheduler exhausted its retries.
    Error,
}

/// One fiscal document attempt.
#[derive(Debug, Clone)]
pub struct Receipt {
    /// The receipt row ID.
    pub id: ReceiptId,
    /// The deal the receipt belongs to.
    pub deal_id: DealId,
    /// The payment the receipt is tied to (`PaymentId::NONE` when none).
    pub payment_id: PaymentId,
    /// Lifecycle status.
    pub status: ReceiptStatus,
    /// Fiscal operation direction.
    pub receipt_type: ReceiptType,
    /// Receipt content variant.
    pub tag: ReceiptTag,
    /// Settlement wording the receipt was issued under.
    pub payment_kind: StrategyKind,
    /// Serialized fiscal request. A stable snapshot of everything used to
    /// build the submission, so it can be resubmitted after a restart.
    pub request_payload: String,
    /// External receipt ID at the fiscal provider.
    pub fiscal_receipt_id: Option<String>,
    /// Fiscal document number.
    pub fiscal_receipt_number: Option<String>,
    /// Public URL of the rendered document.
    pub url: Option<String>,
    /// Rendered HTML document.
    pub html: Option<String>,
    /// True when a real payment reversal backs the receipt.
    pub is_real_return: bool,
    /// Failed submission/poll rounds so far.
    pub attempt: u32,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
}
