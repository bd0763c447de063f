//! Receipt manager: create, preview, push, pull.

use chrono::{DateTime, Utc};
use farebox_shared::config::EngineConfig;
use farebox_shared::types::{DealId, PaymentId, ReceiptId};
use tracing::{debug, warn};

use crate::external::{CashboxInfo, ExternalError, FiscalProvider};
use crate::strategy::ReceiptStrategy;

use super::error::ReceiptError;
use super::store::ReceiptStore;
use super::types::{Receipt, ReceiptStatus};

/// Orchestrates receipt rows against the fiscal provider.
///
/// The manager never retries on its own; it increments `attempt` and leaves
/// re-invocation to the external scheduler.
pub struct ReceiptManager<'a> {
    config: &'a EngineConfig,
}

impl<'a> ReceiptManager<'a> {
    /// Creates a manager bound to the engine configuration.
    #[must_use]
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Builds the fiscal request payload and persists a new receipt row.
    ///
    /// A second create for the same deal always produces a new row.
    ///
    /// # Errors
    ///
    /// Returns `ReceiptError` when the deal is missing or the payload cannot
    /// be serialized; no row is persisted in either case.
    pub fn create(
        &self,
        store: &mut ReceiptStore,
        deal_id: DealId,
        payment_id: PaymentId,
        strategy: &ReceiptStrategy,
        now: DateTime<Utc>,
    ) -> Result<ReceiptId, ReceiptError> {
        if deal_id.is_detached() {
            return Err(ReceiptError::MissingDeal);
        }

        let request_payload = serde_json::to_string(strategy)?;
        let id = store.next_id();
        store.insert(Receipt {
            id,
            deal_id,
            payment_id,
            status: ReceiptStatus::New,
            receipt_type: strategy.receipt_type,
            tag: strategy.tag,
            payment_kind: strategy.kind,
            request_payload,
            fiscal_receipt_id: None,
            fiscal_receipt_number: None,
            url: None,
            html: None,
            is_real_return: strategy.options.is_real_return,
            attempt: 0,
            created_at: now,
        });

        debug!(deal_id = %deal_id, receipt_id = %id, kind = %strategy.kind, "receipt row created");
        Ok(id)
    }

    /// Returns the fiscal request payload without persisting anything.
    ///
    /// Used for UI estimation; the result is never submittable.
    ///
    /// # Errors
    ///
    /// Returns `ReceiptError::Payload` when serialization fails.
    pub fn create_pre_receipt(&self, strategy: &ReceiptStrategy) -> Result<String, ReceiptError> {
        Ok(serde_json::to_string(strategy)?)
    }

    /// Submits a receipt to the fiscal provider and polls its identifiers.
    ///
    /// If the row has no external ID yet, the provider's create call runs
    /// first; the configured settle delay is waited out before polling,
    /// because the provider is eventually consistent. Missing identifiers
    /// after the round-trip put the row back to `New` with `attempt`
    /// incremented for the external scheduler.
    ///
    /// # Errors
    ///
    /// Returns `ReceiptError` when the row is unknown, the provider rejects
    /// the create outright, or a provider call fails.
    pub fn push<F: FiscalProvider>(
        &self,
        store: &mut ReceiptStore,
        provider: &mut F,
        id: ReceiptId,
    ) -> Result<ReceiptStatus, ReceiptError> {
        let (payload, existing_id, attempt) = {
            let receipt = store.get(id)?;
            (
                receipt.request_payload.clone(),
                receipt.fiscal_receipt_id.clone(),
                receipt.attempt,
            )
        };

        let fiscal_id = match existing_id {
            Some(fiscal_id) => fiscal_id,
            None => {
                let response = provider.create(&payload).map_err(provider_err)?;
                let fiscal_id = response.receipt_id.ok_or(ReceiptError::CreateRejected)?;
                std::thread::sleep(self.config.settle_delay());
                fiscal_id
            }
        };

        let info = provider.info(&fiscal_id).map_err(provider_err)?;
        let cashbox = info.cashbox.filter(CashboxInfo::is_complete);
        let url = cashbox.as_ref().map(|cb| self.derive_url(cb));
        let number = cashbox
            .as_ref()
            .map(|cb| cb.document_number.clone())
            .filter(|n| !n.is_empty());

        let receipt = store.get_mut(id)?;
        receipt.fiscal_receipt_id = Some(fiscal_id);
        if url.is_some() {
            receipt.url = url;
        }

        if number.is_none() {
            // Identifiers not settled yet; hand the row back for retry.
            receipt.status = ReceiptStatus::New;
            receipt.attempt = attempt + 1;
            warn!(receipt_id = %id, attempt = receipt.attempt, "fiscal identifiers not ready");
        } else {
            receipt.fiscal_receipt_number = number;
            receipt.status = ReceiptStatus::Sended;
            receipt.attempt = 0;
        }
        Ok(receipt.status)
    }

    /// Resolves the rendered HTML for an already submitted receipt.
    ///
    /// Re-derives the URL from the provider when the row lacks one. HTML in
    /// hand moves the row to `Created` and resets `attempt`; otherwise
    /// `attempt` is incremented and retry cadence stays with the caller.
    ///
    /// # Errors
    ///
    /// Returns `ReceiptError` when the row is unknown, was never submitted,
    /// or a provider call fails.
    pub fn pull<F: FiscalProvider>(
        &self,
        store: &mut ReceiptStore,
        provider: &mut F,
        id: ReceiptId,
    ) -> Result<ReceiptStatus, ReceiptError> {
        let (fiscal_id, known_url) = {
            let receipt = store.get(id)?;
            (receipt.fiscal_receipt_id.clone(), receipt.url.clone())
        };

        let url = match known_url {
            Some(url) => Some(url),
            None => {
                let fiscal_id = fiscal_id.ok_or(ReceiptError::NotSubmitted(id))?;
                let info = provider.info(&fiscal_id).map_err(provider_err)?;
                info.cashbox
                    .filter(CashboxInfo::is_complete)
                    .map(|cb| self.derive_url(&cb))
            }
        };

        let html = match &url {
            Some(url) => provider.render_html(url).map_err(provider_err)?,
            None => None,
        };

        let receipt = store.get_mut(id)?;
        if url.is_some() {
            receipt.url = url;
        }
        match html.filter(|h| !h.is_empty()) {
            Some(html) => {
                receipt.html = Some(html);
                receipt.status = ReceiptStatus::Created;
                receipt.attempt = 0;
            }
            None => {
                receipt.attempt += 1;
            }
        }
        Ok(receipt.status)
    }

    /// Public URL of a registered document.
    fn derive_url(&self, cashbox: &CashboxInfo) -> String {
        format!(
            "{}{}/{}/{}/{}/{}",
            self.config.fiscal.html_url,
            self.config.fiscal.html_prefix,
            cashbox.register_number,
            cashbox.storage_serial,
            cashbox.document_number,
            cashbox.document_attribute,
        )
    }
}

fn provider_err(e: ExternalError) -> ReceiptError {
    ReceiptError::Provider(e.to_string())
}
