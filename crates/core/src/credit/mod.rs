//! Installment credits and checkpoint classification.
//!
//! At most one credit exists per deal. Its ordered financial operations
//! drive the credit-series receipt kinds: the last operation and the
//! remaining balance decide whether a checkpoint is partial or full, on
//! both the payment and the refund side.

pub mod error;
pub mod tracker;
pub mod types;

pub use error::CreditError;
pub use tracker::CreditBook;
pub use types::{Credit, FinancialOperation, OperationKind};
