//! Append-only payment ledger and the bonus outbox.
//!
//! This module implements the payment ledger:
//! - Immutable payment/refund transaction rows
//! - Paid-total and last-point-payment queries
//! - The outbox that keeps ledger appends and external bonus-service calls
//!   in one recoverable unit of work

pub mod error;
pub mod outbox;
pub mod store;
pub mod types;

pub use error::LedgerError;
pub use outbox::{BonusDirection, BonusIntent, BonusOutbox};
pub use store::PaymentLedger;
pub use types::{NewTransaction, PaymentStatus, PaymentTransaction, PaymentType};
