//! Pure strategy selection.
//!
//! Stateless decision functions mapping deal timing, paid totals, and credit
//! state to a receipt kind or a deferral. Evaluation order matters: credit
//! state wins over timing, timing wins over the partial-payment override.

use chrono::{DateTime, Utc};
use farebox_shared::types::money::rounds_equal;
use rust_decimal::Decimal;

use crate::card::SchemeWork;
use crate::deal::DealCategory;

use super::types::{CreditState, Decision, SelectorInput, StrategyKind};

/// True when the deal settles the moment it is paid.
///
/// Either the product line is momentary or the scheme always settles
/// immediately.
#[must_use]
pub fn is_momentary(category: DealCategory, scheme: SchemeWork) -> bool {
    scheme.is_momentary() || category.is_momentary()
}

/// Timing-based strategy kind: full payment once due, prepayment before.
#[must_use]
pub fn strategy_type_by_date(
    category: DealCategory,
    scheme: SchemeWork,
    service_start: DateTime<Utc>,
    now: DateTime<Utc>,
) -> StrategyKind {
    if is_momentary(category, scheme) || service_start <= now {
        StrategyKind::FullPayment
    } else {
        StrategyKind::Prepayment
    }
}

/// Credit checkpoint classification on the payment side.
#[must_use]
pub fn classify_credit_payment(remaining: Decimal) -> StrategyKind {
    if remaining > Decimal::ZERO {
        StrategyKind::Credit
    } else {
        StrategyKind::CreditFull
    }
}

/// Credit checkpoint classification on the refund side.
///
/// A credit that ever reached full payment, or whose last operation already
/// is a full-refund marker, refunds in full; otherwise partially.
#[must_use]
pub fn classify_credit_refund(credit: &CreditState) -> StrategyKind {
    if credit.has_full_payment || credit.last_operation_full_refund {
        StrategyKind::CreditRefundFull
    } else {
        StrategyKind::CreditRefund
    }
}

/// Decides the receipt strategy for an advance-path payment event.
///
/// Precedence, first match wins:
/// 1. An active, not fully refunded credit selects a credit-series kind.
/// 2. Timing: prepayment deals that are not yet due defer to service start.
/// 3. Paid total differing from the price (whole-unit rounding) forces
///    credit-style wording even without a credit entity.
/// 4. Otherwise the timing kind is issued as-is.
#[must_use]
pub fn select_advance(input: &SelectorInput) -> Decision {
    if let Some(credit) = &input.credit {
        return Decision::Issue(classify_credit_payment(credit.remaining));
    }

    let by_date = strategy_type_by_date(
        input.category,
        input.scheme,
        input.service_start,
        input.now,
    );

    if by_date == StrategyKind::Prepayment {
        return Decision::Defer {
            run_at: input.service_start,
        };
    }

    if !rounds_equal(input.paid_total, input.price_total) {
        if input.paid_total == Decimal::ZERO {
            return Decision::Issue(StrategyKind::CreditTransfer);
        }
        return Decision::Issue(StrategyKind::Credit);
    }

    Decision::Issue(by_date)
}
