//! Property tests for strategy selection.

use chrono::TimeZone;
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::card::SchemeWork;
use crate::deal::DealCategory;
use farebox_shared::types::money::rounds_equal;

use super::selector::select_advance;
use super::types::{Decision, SelectorInput, StrategyKind};

fn momentary_input(paid: Decimal, price: Decimal) -> SelectorInput {
    let now = chrono::Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
    SelectorInput {
        scheme: SchemeWork::BuyerAgent,
        category: DealCategory::Avia,
        service_start: now,
        now,
        paid_total: paid,
        price_total: price,
        credit: None,
    }
}

fn money() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_00, 0u32..=2).prop_map(|(minor, scale)| Decimal::new(minor, scale))
}

proptest! {
    /// Totals equal after whole-unit rounding never select a credit-series
    /// kind through the partial-payment branch.
    #[test]
    fn prop_rounding_tolerance(price in money(), drift in -49i64..=49) {
        let paid = price + Decimal::new(drift, 2);
        prop_assume!(rounds_equal(paid, price));
        prop_assume!(paid >= Decimal::ZERO);

        let decision = select_advance(&momentary_input(paid, price));
        prop_assert_eq!(decision, Decision::Issue(StrategyKind::FullPayment));
    }

    /// Totals that differ after rounding always force credit-style wording,
    /// with the transfer variant reserved for untouched deals.
    #[test]
    fn prop_partial_payment_wording(price in money(), paid in money()) {
        prop_assume!(!rounds_equal(paid, price));

        let decision = select_advance(&momentary_input(paid, price));
        let expected = if paid == Decimal::ZERO {
            StrategyKind::CreditTransfer
        } else {
            StrategyKind::Credit
        };
        prop_assert_eq!(decision, Decision::Issue(expected));
    }
}
