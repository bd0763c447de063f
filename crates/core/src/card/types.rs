//! Financial card domain types.

use farebox_shared::types::{CardId, DealId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing::PriceBreakdown;

/// Commercial scheme governing a deal's receipts and accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchemeWork {
    /// Agent for the supplier, short-haul reservations.
    SrSupplierAgent,
    /// Agent for the supplier, long-haul reservations.
    LrSupplierAgent,
    /// Agent acting for the buyer.
    BuyerAgent,
    /// Direct provision of services.
    ProvisionServices,
    /// Service-fee-only scheme.
    RsTlsServiceFee,
}

impl SchemeWork {
    /// Stable string form used in persisted payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SrSupplierAgent => "SR_SUPPLIER_AGENT",
            Self::LrSupplierAgent => "LR_SUPPLIER_AGENT",
            Self::BuyerAgent => "BUYER_AGENT",
            Self::ProvisionServices => "PROVISION_SERVICES",
            Self::RsTlsServiceFee => "RS_TLS_SERVICE_FEE",
        }
    }

    /// Schemes where the agency acts as an agent for the supplier.
    ///
    /// These never receive a supplier service-act posting.
    #[must_use]
    pub const fn is_supplier_agent(self) -> bool {
        matches!(
            self,
            Self::SrSupplierAgent | Self::LrSupplierAgent | Self::RsTlsServiceFee
        )
    }

    /// Schemes whose receipts are always full-payment receipts regardless of
    /// the deal category.
    #[must_use]
    pub const fn is_momentary(self) -> bool {
        matches!(self, Self::LrSupplierAgent | Self::RsTlsServiceFee)
    }

    /// Schemes whose income receipts must carry the supplier's tax identity.
    #[must_use]
    pub const fn requires_company_identity(self) -> bool {
        matches!(self, Self::SrSupplierAgent | Self::BuyerAgent)
    }

    /// Schemes whose refund receipts must carry the supplier's tax identity.
    #[must_use]
    pub const fn refund_requires_company_identity(self) -> bool {
        matches!(
            self,
            Self::SrSupplierAgent | Self::LrSupplierAgent | Self::BuyerAgent
        )
    }
}

impl std::fmt::Display for SchemeWork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A financial card attached to a deal.
#[derive(Debug, Clone)]
pub struct FinancialCard {
    /// The card ID.
    pub id: CardId,
    /// The deal this card belongs to.
    pub deal_id: DealId,
    /// The commercial scheme.
    pub scheme: SchemeWork,
    /// True for correction cards issued after the deal closed financially.
    pub is_correction_after_deal: bool,
    /// The price breakdown. For correction cards the monetary fields are
    /// deltas against the preceding card.
    pub price: PriceBreakdown,
    /// Supplier VAT rate, when the scheme itemizes the supplier.
    pub supplier_vat: Option<Decimal>,
    /// True once a newer card has taken this card's place.
    pub superseded: bool,
}

/// Input for attaching a new financial card to a deal.
#[derive(Debug, Clone)]
pub struct NewFinancialCard {
    /// The deal to attach to.
    pub deal_id: DealId,
    /// The commercial scheme.
    pub scheme: SchemeWork,
    /// True for correction cards.
    pub is_correction_after_deal: bool,
    /// The price breakdown.
    pub price: PriceBreakdown,
    /// Supplier VAT rate.
    pub supplier_vat: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supplier_agent_schemes() {
        assert!(SchemeWork::SrSupplierAgent.is_supplier_agent());
        assert!(SchemeWork::LrSupplierAgent.is_supplier_agent());
        assert!(SchemeWork::RsTlsServiceFee.is_supplier_agent());
        assert!(!SchemeWork::BuyerAgent.is_supplier_agent());
        assert!(!SchemeWork::ProvisionServices.is_supplier_agent());
    }

    #[test]
    fn test_momentary_schemes() {
        assert!(SchemeWork::LrSupplierAgent.is_momentary());
        assert!(SchemeWork::RsTlsServiceFee.is_momentary());
        assert!(!SchemeWork::SrSupplierAgent.is_momentary());
        assert!(!SchemeWork::BuyerAgent.is_momentary());
    }

    #[test]
    fn test_company_identity_requirements() {
        assert!(SchemeWork::SrSupplierAgent.requires_company_identity());
        assert!(SchemeWork::BuyerAgent.requires_company_identity());
        assert!(!SchemeWork::LrSupplierAgent.requires_company_identity());

        assert!(SchemeWork::LrSupplierAgent.refund_requires_company_identity());
        assert!(!SchemeWork::ProvisionServices.refund_requires_company_identity());
    }

    #[test]
    fn test_scheme_as_str() {
        assert_eq!(SchemeWork::SrSupplierAgent.as_str(), "SR_SUPPLIER_AGENT");
        assert_eq!(SchemeWork::RsTlsServiceFee.as_str(), "RS_TLS_SERVICE_FEE");
    }
}
