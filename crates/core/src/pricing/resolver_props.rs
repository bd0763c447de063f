//! Property tests for price resolution and correction deltas.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::resolver::correction_delta;
use super::types::PriceBreakdown;

fn money() -> impl Strategy<Value = Decimal> {
    // Whole kopecks up to one hundred million, both signs.
    (-10_000_000_000i64..10_000_000_000i64).prop_map(|minor| Decimal::new(minor, 2))
}

fn breakdown() -> impl Strategy<Value = PriceBreakdown> {
    (money(), money(), money(), money(), money(), money()).prop_map(
        |(supplier, service, supplier_penalty, supplier_replacement, rstls_penalty, result)| {
            PriceBreakdown {
                supplier,
                service,
                supplier_penalty,
                supplier_replacement,
                rstls_penalty,
                result,
                currency: None,
            }
        },
    )
}

proptest! {
    /// Monetary, non-penalty fields diff exactly; penalties pass through.
    #[test]
    fn prop_correction_delta_fields(current in breakdown(), previous in breakdown()) {
        let delta = correction_delta(&current, &previous);

        prop_assert_eq!(delta.supplier, current.supplier - previous.supplier);
        prop_assert_eq!(delta.service, current.service - previous.service);
        prop_assert_eq!(delta.result, current.result - previous.result);

        prop_assert_eq!(delta.supplier_penalty, current.supplier_penalty);
        prop_assert_eq!(delta.supplier_replacement, current.supplier_replacement);
        prop_assert_eq!(delta.rstls_penalty, current.rstls_penalty);
    }

    /// Diffing a card against itself zeroes every diffed field.
    #[test]
    fn prop_correction_delta_self_is_zero(card in breakdown()) {
        let delta = correction_delta(&card, &card);

        prop_assert_eq!(delta.supplier, Decimal::ZERO);
        prop_assert_eq!(delta.service, Decimal::ZERO);
        prop_assert_eq!(delta.result, Decimal::ZERO);
    }
}
