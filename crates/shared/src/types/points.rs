//! Loyalty program codes and account normalization.
//!
//! Point-funded payments identify their program with a short code on the
//! ledger row; the external bonus service expects the long code.

use serde::{Deserialize, Serialize};

/// Loyalty program funding a point payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoyaltyProgram {
    /// "Miles & Rewards" program (short code `MR`).
    Mr,
    /// "Imperia" program (short code `IR`).
    Imperia,
}

impl LoyaltyProgram {
    /// Short code stored on ledger rows.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Mr => "MR",
            Self::Imperia => "IR",
        }
    }

    /// Program code the external bonus service expects.
    #[must_use]
    pub const fn external_code(self) -> &'static str {
        match self {
            Self::Mr => "MR",
            Self::Imperia => "Imperia_R",
        }
    }

    /// Parses a short code from a ledger row.
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "MR" => Some(Self::Mr),
            "IR" => Some(Self::Imperia),
            _ => None,
        }
    }
}

impl std::fmt::Display for LoyaltyProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Normalizes a bonus account number to its canonical 16-character form.
///
/// Legacy accounts were issued with 15 characters; the bonus service requires
/// a leading zero on those.
#[must_use]
pub fn normalize_account_number(account: &str) -> String {
    if account.len() == 15 {
        format!("0{account}")
    } else {
        account.to_string()
    }
}
