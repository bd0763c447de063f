//! In-memory accounting entry journal.

use chrono::{DateTime, Utc};
use farebox_shared::types::DealId;

use super::types::{AccountingEntry, EntryKind};

/// Idempotency journal: at most one entry per `(deal, kind)`.
#[derive(Debug, Clone, Default)]
pub struct AccountingJournal {
    entries: Vec<AccountingEntry>,
}

impl AccountingJournal {
    /// Creates an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True if an entry of this kind was already posted for the deal.
    #[must_use]
    pub fn exists(&self, deal_id: DealId, kind: EntryKind) -> bool {
        self.entries
            .iter()
            .any(|e| e.deal_id == deal_id && e.kind == kind)
    }

    /// Records a posted entry. Duplicate records are ignored.
    pub fn record(&mut self, deal_id: DealId, kind: EntryKind, posted_at: DateTime<Utc>) {
        if self.exists(deal_id, kind) {
            return;
        }
        self.entries.push(AccountingEntry {
            deal_id,
            kind,
            posted_at,
        });
    }

    /// Entries posted for a deal.
    pub fn for_deal(&self, deal_id: DealId) -> impl Iterator<Item = &AccountingEntry> {
        self.entries.iter().filter(move |e| e.deal_id == deal_id)
    }
}
