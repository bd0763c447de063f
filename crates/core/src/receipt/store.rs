//! In-memory receipt storage.

use farebox_shared::types::{DealId, ReceiptId};

use super::error::ReceiptError;
use super::types::Receipt;

/// Receipt row storage.
///
/// Rows are never reused across payment events; every create inserts a new
/// row. De-duplication belongs to the accounting-entry checks, not here.
#[derive(Debug, Clone, Default)]
pub struct ReceiptStore {
    rows: Vec<Receipt>,
    next_id: i64,
}

impl ReceiptStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next receipt ID.
    pub(crate) fn next_id(&mut self) -> ReceiptId {
        self.next_id += 1;
        ReceiptId::new(self.next_id)
    }

    /// Inserts a row.
    pub(crate) fn insert(&mut self, receipt: Receipt) {
        self.rows.push(receipt);
    }

    /// Looks up a row.
    pub fn get(&self, id: ReceiptId) -> Result<&Receipt, ReceiptError> {
        self.rows
            .iter()
            .find(|r| r.id == id)
            .ok_or(ReceiptError::NotFound(id))
    }

    /// Looks up a row mutably.
    pub fn get_mut(&mut self, id: ReceiptId) -> Result<&mut Receipt, ReceiptError> {
        self.rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(ReceiptError::NotFound(id))
    }

    /// Most recent receipt for a deal, by descending ID.
    #[must_use]
    pub fn last_for_deal(&self, deal_id: DealId) -> Option<&Receipt> {
        self.rows.iter().rev().find(|r| r.deal_id == deal_id)
    }

    /// Receipts for a deal, insertion order.
    pub fn for_deal(&self, deal_id: DealId) -> impl Iterator<Item = &Receipt> {
        self.rows.iter().filter(move |r| r.deal_id == deal_id)
    }

    /// Abandons a receipt after the external scheduler exhausts its retries.
    pub fn mark_error(&mut self, id: ReceiptId) -> Result<(), ReceiptError> {
        self.get_mut(id)?.status = super::types::ReceiptStatus::Error;
        Ok(())
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when no rows exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
