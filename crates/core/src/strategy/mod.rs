//! Receipt strategy selection and scheme field mapping.
//!
//! This is the decision core of the engine. Given a financial card, the
//! deal's timing, the paid totals, and the credit state, it decides which
//! fiscal receipt (if any) must be produced now, and maps the card's price
//! breakdown into the receipt options for the card's work scheme.

pub mod error;
pub mod fields;
pub mod selector;
pub mod types;

#[cfg(test)]
mod selector_props;

pub use error::StrategyError;
pub use fields::{build_options, invoice_id, CompanyIdentity, FieldContext};
pub use selector::{
    classify_credit_payment, classify_credit_refund, is_momentary, select_advance,
    strategy_type_by_date,
};
pub use types::{
    CreditState, Decision, ReceiptOptions, ReceiptOptionsBuilder, ReceiptStrategy, ReceiptTag,
    ReceiptType, SelectorInput, StrategyKind,
};
