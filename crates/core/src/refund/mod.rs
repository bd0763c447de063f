//! Refund card state machine.
//!
//! A refund card tracks one refund request from initiation through audit to
//! closure. Transition validation is pure; the side effects each transition
//! triggers (postings, receipts, notifications) are orchestrated by the
//! engine inside a single unit of work.

pub mod error;
pub mod store;
pub mod types;
pub mod workflow;

pub use error::RefundError;
pub use store::RefundCardStore;
pub use types::{DirectionType, NewRefundCard, RefundCard, RefundPaymentType, RefundStatus};
pub use workflow::RefundWorkflow;
