//! Accounting posting rules.
//!
//! Pure logic with injected posting callbacks, so the same rules run against
//! the real posting service and against test doubles.

use chrono::{DateTime, Utc};
use farebox_shared::types::DealId;
use rust_decimal::Decimal;

use crate::card::SchemeWork;
use crate::external::ExternalError;

use super::error::AccountingError;
use super::journal::AccountingJournal;
use super::types::EntryKind;

/// Why a realization pass posted nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RealizationSkip {
    /// The deal has no successful point payment.
    NoPointPayment,
    /// The client still owes money.
    DebtOutstanding,
    /// The deal has no financial card.
    NoFinancialCard,
}

/// Result of a realization/entrance pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RealizationOutcome {
    /// Nothing was posted.
    Skipped(RealizationSkip),
    /// The pass ran; flags say which acts were newly posted.
    Posted {
        /// Supplier service act was newly posted.
        supplier: bool,
        /// Buyer service act was newly posted.
        buyer: bool,
    },
}

/// Posts an entry exactly once per `(deal, kind)`.
///
/// Returns `Ok(false)` when the journal already holds the entry — correctly
/// preventing a duplicate is not an error. The journal is only updated after
/// the posting callback succeeds, inside the caller's unit of work.
///
/// # Errors
///
/// Returns [`AccountingError::PostFailed`] when the posting callback fails.
pub fn post_once<P>(
    journal: &mut AccountingJournal,
    deal_id: DealId,
    kind: EntryKind,
    posted_at: DateTime<Utc>,
    mut post: P,
) -> Result<bool, AccountingError>
where
    P: FnMut(EntryKind) -> Result<(), ExternalError>,
{
    if journal.exists(deal_id, kind) {
        return Ok(false);
    }

    post(kind).map_err(|e| AccountingError::PostFailed {
        kind,
        message: e.to_string(),
    })?;
    journal.record(deal_id, kind, posted_at);
    Ok(true)
}

/// Realization and entrance postings for point-paid deals.
///
/// Fires only when the deal has a point payment, carries no outstanding
/// debt, and has a financial card. The supplier act is skipped for
/// supplier-agent schemes; the buyer act posts for every scheme. Both are
/// idempotent per deal.
///
/// # Errors
///
/// Returns [`AccountingError::PostFailed`] when the posting callback fails.
pub fn create_realization_entrance<P>(
    journal: &mut AccountingJournal,
    deal_id: DealId,
    has_point_payment: bool,
    amount_debt: Decimal,
    scheme: Option<SchemeWork>,
    posted_at: DateTime<Utc>,
    mut post: P,
) -> Result<RealizationOutcome, AccountingError>
where
    P: FnMut(EntryKind) -> Result<(), ExternalError>,
{
    if !has_point_payment {
        return Ok(RealizationOutcome::Skipped(RealizationSkip::NoPointPayment));
    }
    if amount_debt > Decimal::ZERO {
        return Ok(RealizationOutcome::Skipped(RealizationSkip::DebtOutstanding));
    }
    let Some(scheme) = scheme else {
        return Ok(RealizationOutcome::Skipped(RealizationSkip::NoFinancialCard));
    };

    let supplier = if scheme.is_supplier_agent() {
        false
    } else {
        post_once(journal, deal_id, EntryKind::ServiceActSupplier, posted_at, &mut post)?
    };
    let buyer = post_once(journal, deal_id, EntryKind::ServiceActBuyer, posted_at, &mut post)?;

    Ok(RealizationOutcome::Posted { supplier, buyer })
}
