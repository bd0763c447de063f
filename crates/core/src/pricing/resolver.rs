//! Price resolution, correction deltas, and debt.

use farebox_shared::types::DealId;
use rust_decimal::Decimal;

use super::error::PricingError;
use super::types::{CurrencyPrice, PriceBreakdown, RateSnapshot, ResolvedPrice};

/// Resolves a price breakdown to cash figures.
///
/// Cash cards pass through unchanged. Currency cards have every twin field
/// multiplied by the snapshot factor; the snapshot must have been resolved
/// once for the whole pass.
///
/// # Errors
///
/// Returns [`PricingError::MissingRate`] if the card is currency-denominated
/// and no snapshot was provided.
pub fn resolve(
    deal_id: DealId,
    price: &PriceBreakdown,
    rate: Option<&RateSnapshot>,
) -> Result<ResolvedPrice, PricingError> {
    match &price.currency {
        None => Ok(ResolvedPrice {
            supplier: price.supplier,
            service: price.service,
            supplier_penalty: price.supplier_penalty,
            supplier_replacement: price.supplier_replacement,
            rstls_penalty: price.rstls_penalty,
            result: price.result,
            currency_code: None,
        }),
        Some(currency) => {
            let factor = rate.ok_or(PricingError::MissingRate(deal_id))?.factor();
            Ok(ResolvedPrice {
                supplier: currency.supplier * factor,
                service: currency.service * factor,
                supplier_penalty: currency.supplier_penalty * factor,
                supplier_replacement: currency.supplier_replacement * factor,
                rstls_penalty: currency.rstls_penalty * factor,
                result: currency.result * factor,
                currency_code: Some(currency.code.clone()),
            })
        }
    }
}

/// Computes the delta price of a correction card against its predecessor.
///
/// Monetary, non-penalty fields become `current - previous`. The penalty
/// fields (`supplier_penalty`, `supplier_replacement`, `rstls_penalty`) and
/// all non-monetary fields pass through from the current card verbatim.
#[must_use]
pub fn correction_delta(current: &PriceBreakdown, previous: &PriceBreakdown) -> PriceBreakdown {
    let currency = match (&current.currency, &previous.currency) {
        (Some(cur), Some(prev)) => Some(CurrencyPrice {
            code: cur.code.clone(),
            supplier: cur.supplier - prev.supplier,
            service: cur.service - prev.service,
            supplier_penalty: cur.supplier_penalty,
            supplier_replacement: cur.supplier_replacement,
            rstls_penalty: cur.rstls_penalty,
            result: cur.result - prev.result,
        }),
        // A card cannot gain or lose its pricing currency mid-deal; pass the
        // current side through untouched.
        (cur, _) => cur.clone(),
    };

    PriceBreakdown {
        supplier: current.supplier - previous.supplier,
        service: current.service - previous.service,
        supplier_penalty: current.supplier_penalty,
        supplier_replacement: current.supplier_replacement,
        rstls_penalty: current.rstls_penalty,
        result: current.result - previous.result,
        currency,
    }
}

/// Computes the RESULT delta between two cards, currency-aware.
///
/// Used as the receipt total when a correction card is processed before the
/// service starts. The same snapshot factor is applied to both sides.
///
/// # Errors
///
/// Returns [`PricingError::MissingRate`] if the cards are
/// currency-denominated and no snapshot was provided.
pub fn result_delta(
    deal_id: DealId,
    current: &PriceBreakdown,
    previous: &PriceBreakdown,
    rate: Option<&RateSnapshot>,
) -> Result<Decimal, PricingError> {
    match (&current.currency, &previous.currency) {
        (Some(cur), Some(prev)) => {
            let factor = rate.ok_or(PricingError::MissingRate(deal_id))?.factor();
            Ok(cur.result * factor - prev.result * factor)
        }
        _ => Ok(current.result - previous.result),
    }
}

/// Signed remaining balance of a deal.
///
/// Positive means the client still owes money. Realization postings only
/// fire once this reaches zero or below.
#[must_use]
pub fn amount_debt(price_result: Decimal, recognized_paid: Decimal) -> Decimal {
    price_result - recognized_paid
}

/// Cash equivalent of a point amount at the given conversion rate.
#[must_use]
pub fn cash_equivalent(points: Decimal, rate: Decimal) -> Decimal {
    points * rate
}
