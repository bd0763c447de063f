//! Narrow collaborator interfaces.
//!
//! Everything the engine needs from the surrounding platform — the CRM deal
//! store, the fiscal provider, the bonus service, notifications, and
//! accounting postings — is consumed through these traits. External calls
//! are synchronous blocking calls with no retry inside the engine; retry is
//! an external scheduler's job.

use chrono::NaiveDate;
use farebox_shared::types::points::LoyaltyProgram;
use farebox_shared::types::{ContactId, DealId, RefundCardId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::accounting::EntryKind;
use crate::deal::DealSummary;
use crate::strategy::CompanyIdentity;

/// Failure reported by an external collaborator.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ExternalError(pub String);

impl ExternalError {
    /// Creates an error from any displayable cause.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Response of the fiscal provider's create call.
#[derive(Debug, Clone)]
pub struct FiscalCreateResponse {
    /// External receipt identifier, when the provider accepted the document.
    pub receipt_id: Option<String>,
}

/// Cashbox identifiers of a registered fiscal document.
#[derive(Debug, Clone)]
pub struct CashboxInfo {
    /// Cash register number (RNM).
    pub register_number: String,
    /// Fiscal storage serial (FN).
    pub storage_serial: String,
    /// Fiscal document number (FDN).
    pub document_number: String,
    /// Fiscal document attribute (FPD).
    pub document_attribute: String,
}

impl CashboxInfo {
    /// True when every identifier needed to derive the public URL is present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.register_number.is_empty()
            && !self.storage_serial.is_empty()
            && !self.document_number.is_empty()
            && !self.document_attribute.is_empty()
    }
}

/// Fiscal document info as returned by the provider.
#[derive(Debug, Clone, Default)]
pub struct FiscalInfo {
    /// Cashbox identifiers, once the document is registered.
    pub cashbox: Option<CashboxInfo>,
}

/// A client's bonus account in one loyalty program.
#[derive(Debug, Clone)]
pub struct BonusAccount {
    /// Account number as issued (possibly the legacy 15-character form).
    pub account_number: String,
    /// Point-to-cash conversion rate for this account.
    pub rate: Decimal,
}

/// A client's loyalty profile.
#[derive(Debug, Clone)]
pub struct BonusProfile {
    /// Identifier of the client in the external bonus system.
    pub client_external_id: String,
    /// Accounts by program.
    pub accounts: Vec<(LoyaltyProgram, BonusAccount)>,
}

impl BonusProfile {
    /// Account for a program, if the client is enrolled.
    #[must_use]
    pub fn account(&self, program: LoyaltyProgram) -> Option<&BonusAccount> {
        self.accounts
            .iter()
            .find(|(p, _)| *p == program)
            .map(|(_, a)| a)
    }
}

/// A debit or credit row in the loyalty account history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitCredit {
    /// Points left the account.
    Debit,
    /// Points entered the account.
    Credit,
}

/// One row of the loyalty account history.
#[derive(Debug, Clone)]
pub struct BonusHistoryEntry {
    /// Loyalty-side transaction ID.
    pub transaction_id: i64,
    /// Calendar date of the operation.
    pub date: NaiveDate,
    /// Operation direction.
    pub entry: DebitCredit,
}

/// A bonus debit or credit request.
#[derive(Debug, Clone)]
pub struct BonusOperation {
    /// Identifier of the client in the external bonus system.
    pub client_external_id: String,
    /// Normalized bonus account number.
    pub account_number: String,
    /// Loyalty program.
    pub program: LoyaltyProgram,
    /// Point amount.
    pub amount: Decimal,
    /// Idempotency GUID.
    pub guid: uuid::Uuid,
    /// Loyalty-side transaction being reversed, for refunds.
    pub transaction_id: Option<i64>,
}

/// Notification templates the engine fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Auditor can take the refund to work.
    RefundReadyForWork,
    /// Team lead can take the point refund to work.
    TeamLeadRefundReadyForWork,
    /// Refund completed.
    RefundCompleted,
    /// Refund canceled.
    RefundCanceled,
    /// Team-lead refund canceled.
    TeamLeadRefundCanceled,
}

/// CRM deal/contact store.
#[cfg_attr(test, mockall::automock)]
pub trait DealDirectory {
    /// Loads the deal summary.
    fn deal(&self, id: DealId) -> Result<DealSummary, ExternalError>;

    /// Moves the deal to a pipeline stage.
    fn update_stage(&mut self, id: DealId, stage_id: &str) -> Result<(), ExternalError>;

    /// Flags the deal's service line-items as participating in calculations.
    fn mark_services_billable(&mut self, id: DealId) -> Result<(), ExternalError>;

    /// Confirmed supplier identity for the deal, if one is approved.
    fn company_identity(&self, id: DealId) -> Result<Option<CompanyIdentity>, ExternalError>;

    /// Receipt line-item name from the deal nomenclature.
    fn product_name(&self, id: DealId) -> Result<Option<String>, ExternalError>;

    /// Display name of the client.
    fn client_name(&self, contact: ContactId) -> Result<String, ExternalError>;

    /// The client's loyalty profile, when enrolled.
    fn bonus_profile(&self, contact: ContactId) -> Result<Option<BonusProfile>, ExternalError>;

    /// Credits the client's deposit account.
    fn add_deposit(
        &mut self,
        contact: ContactId,
        amount: Decimal,
        refund_card: RefundCardId,
    ) -> Result<(), ExternalError>;
}

/// Fiscal (OFD) provider.
#[cfg_attr(test, mockall::automock)]
pub trait FiscalProvider {
    /// Submits a fiscal request document.
    fn create(&mut self, payload: &str) -> Result<FiscalCreateResponse, ExternalError>;

    /// Polls document info by external receipt ID.
    fn info(&self, fiscal_receipt_id: &str) -> Result<FiscalInfo, ExternalError>;

    /// Fetches the rendered HTML document, when available.
    fn render_html(&self, url: &str) -> Result<Option<String>, ExternalError>;
}

/// External bonus/loyalty service.
#[cfg_attr(test, mockall::automock)]
pub trait BonusService {
    /// Debits points from a client account.
    fn debit(&mut self, op: &BonusOperation) -> Result<(), ExternalError>;

    /// Credits points back to a client account.
    fn credit(&mut self, op: &BonusOperation) -> Result<(), ExternalError>;

    /// Full account history for a client.
    fn account_history(
        &self,
        client_external_id: &str,
    ) -> Result<Vec<BonusHistoryEntry>, ExternalError>;
}

/// Fire-and-forget notification sender.
///
/// Send failures are logged by callers and never fail a transition.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier {
    /// Sends a templated notification about a refund card.
    fn send<'a>(
        &mut self,
        kind: NotificationKind,
        refund_card: RefundCardId,
        message: Option<&'a str>,
    ) -> Result<(), ExternalError>;
}

/// Accounting posting service.
#[cfg_attr(test, mockall::automock)]
pub trait AccountingPoster {
    /// Posts one accounting entry.
    fn post(
        &mut self,
        kind: EntryKind,
        deal_id: DealId,
        payload: &serde_json::Value,
    ) -> Result<(), ExternalError>;
}
