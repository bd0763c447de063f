//! Idempotent accounting entries.
//!
//! Every posting is gated by an existence check on `(deal, entry kind)`
//! inside the same unit of work, so re-triggering a payment or refund flow
//! never produces a duplicate entry. The realization/entrance pass
//! additionally gates on the deal's remaining debt.

pub mod error;
pub mod journal;
pub mod service;
pub mod types;

pub use error::AccountingError;
pub use journal::AccountingJournal;
pub use service::{create_realization_entrance, post_once, RealizationOutcome, RealizationSkip};
pub use types::{AccountingEntry, EntryKind};
