//! Strategy error types.

use thiserror::Error;

use crate::card::SchemeWork;

/// Errors that can occur while building a receipt strategy.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// Agent schemes cannot issue a tax-compliant receipt without the
    /// supplier's legal identity.
    #[error("Scheme {scheme} requires a confirmed supplier INN and company name")]
    MissingCompanyIdentity {
        /// The scheme that required the identity.
        scheme: SchemeWork,
    },

    /// The deal has no confirmed supplier company.
    #[error("The deal does not have a confirmed supplier (company)")]
    NoConfirmedSupplier,
}

impl StrategyError {
    /// Returns the error code for structured responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MissingCompanyIdentity { .. } => "MISSING_COMPANY_IDENTITY",
            Self::NoConfirmedSupplier => "NO_CONFIRMED_SUPPLIER",
        }
    }
}
