//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `PaymentId` where a
//! `DealId` is expected. The inner type is `i64` because the host CRM hands
//! out integer primary keys for every entity the engine references.

use serde::{Deserialize, Serialize};

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Creates an ID from a raw CRM key.
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Returns the raw CRM key.
            #[must_use]
            pub const fn into_inner(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }
    };
}

typed_id!(DealId, "Unique identifier for a CRM deal.");
typed_id!(ContactId, "Unique identifier for a CRM contact (the client).");
typed_id!(UserId, "Unique identifier for a back-office user.");
typed_id!(CardId, "Unique identifier for a financial card.");
typed_id!(PaymentId, "Unique identifier for a payment transaction.");
typed_id!(ReceiptId, "Unique identifier for a fiscal receipt row.");
typed_id!(CreditId, "Unique identifier for an installment credit.");
typed_id!(RefundCardId, "Unique identifier for a refund card.");
typed_id!(CompanyId, "Unique identifier for a supplier company.");

impl DealId {
    /// The sentinel value a refund card carries once detached from its deal.
    pub const DETACHED: Self = Self(0);

    /// Returns true if this is the detached sentinel.
    #[must_use]
    pub const fn is_detached(self) -> bool {
        self.0 == 0
    }
}

impl PaymentId {
    /// The sentinel value for receipts not tied to a specific payment.
    pub const NONE: Self = Self(0);
}
