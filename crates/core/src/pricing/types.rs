//! Pricing domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Price breakdown of a financial card, in cash units.
///
/// Cards sold in a foreign currency additionally carry the twin fields in
/// [`CurrencyPrice`]; those take precedence during resolution and are scaled
/// by the deal's rate snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// Amount owed to the supplier.
    pub supplier: Decimal,
    /// Agency service component.
    pub service: Decimal,
    /// Penalty withheld by the supplier.
    pub supplier_penalty: Decimal,
    /// Supplier replacement charge.
    pub supplier_replacement: Decimal,
    /// Penalty withheld by the agency.
    pub rstls_penalty: Decimal,
    /// Total the client pays.
    pub result: Decimal,
    /// Currency-denominated twins, present for foreign-currency cards.
    pub currency: Option<CurrencyPrice>,
}

/// Currency-denominated twin fields of a price breakdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyPrice {
    /// ISO 4217 code of the pricing currency.
    pub code: String,
    /// Amount owed to the supplier.
    pub supplier: Decimal,
    /// Agency service component.
    pub service: Decimal,
    /// Penalty withheld by the supplier.
    pub supplier_penalty: Decimal,
    /// Supplier replacement charge.
    pub supplier_replacement: Decimal,
    /// Penalty withheld by the agency.
    pub rstls_penalty: Decimal,
    /// Total the client pays.
    pub result: Decimal,
}

/// Per-deal exchange rate snapshot.
///
/// Resolved once at the start of a receipt-construction pass and reused for
/// every field in that pass. Re-fetching mid-computation would let rate
/// drift corrupt a single receipt's figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSnapshot {
    /// Average exchange rate for the deal.
    pub average_rate: Decimal,
    /// Rate multiplier (units per quote).
    pub rate_count: Decimal,
}

impl RateSnapshot {
    /// The factor currency amounts are multiplied by.
    #[must_use]
    pub fn factor(&self) -> Decimal {
        self.average_rate * self.rate_count
    }
}

/// Cash figures ready for receipt field mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedPrice {
    /// Amount owed to the supplier.
    pub supplier: Decimal,
    /// Agency service component.
    pub service: Decimal,
    /// Penalty withheld by the supplier.
    pub supplier_penalty: Decimal,
    /// Supplier replacement charge.
    pub supplier_replacement: Decimal,
    /// Penalty withheld by the agency.
    pub rstls_penalty: Decimal,
    /// Total the client pays.
    pub result: Decimal,
    /// Pricing currency code, when the card was currency-denominated.
    pub currency_code: Option<String>,
}
