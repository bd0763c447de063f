//! Deal summaries and product-line categories.
//!
//! Deals live in the host CRM; the engine only sees the narrow summary it
//! needs for receipt timing and refund stage bookkeeping.

use chrono::{DateTime, Utc};
use farebox_shared::types::{ContactId, DealId};
use serde::{Deserialize, Serialize};

/// Product line a deal belongs to.
///
/// The "momentary" categories are settled at purchase time: the service is
/// rendered the moment the deal is paid, so their receipts are always
/// full-payment receipts. Tours and cruises begin in the future.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealCategory {
    /// Air tickets.
    Avia,
    /// Railway tickets.
    Railway,
    /// Visa processing.
    Visa,
    /// Travel insurance.
    Insurance,
    /// Information services.
    Info,
    /// Event tickets.
    Tickets,
    /// Lost item recovery.
    LostItems,
    /// Document translation.
    Translation,
    /// Package tours.
    Tour,
    /// Cruises.
    Cruise,
}

impl DealCategory {
    /// Returns true if deals in this category are settled at purchase time.
    #[must_use]
    pub const fn is_momentary(self) -> bool {
        matches!(
            self,
            Self::Avia
                | Self::Railway
                | Self::Visa
                | Self::Insurance
                | Self::Info
                | Self::Tickets
                | Self::LostItems
                | Self::Translation
        )
    }
}

/// The slice of a CRM deal the engine works with.
#[derive(Debug, Clone)]
pub struct DealSummary {
    /// The deal ID.
    pub id: DealId,
    /// The client attached to the deal.
    pub contact_id: ContactId,
    /// The product line.
    pub category: DealCategory,
    /// The CRM pipeline stage the deal currently sits in.
    pub stage_id: String,
    /// When the purchased service begins.
    pub service_start: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_momentary_categories() {
        assert!(DealCategory::Avia.is_momentary());
        assert!(DealCategory::Railway.is_momentary());
        assert!(DealCategory::Visa.is_momentary());
        assert!(DealCategory::Insurance.is_momentary());
        assert!(DealCategory::Info.is_momentary());
        assert!(DealCategory::Tickets.is_momentary());
        assert!(DealCategory::LostItems.is_momentary());
        assert!(DealCategory::Translation.is_momentary());
    }

    #[test]
    fn test_future_service_categories() {
        assert!(!DealCategory::Tour.is_momentary());
        assert!(!DealCategory::Cruise.is_momentary());
    }
}
