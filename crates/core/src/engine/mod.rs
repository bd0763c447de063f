//! Orchestration over stores and collaborators.
//!
//! The engine owns the deal-scoped stores, wires the external collaborators,
//! and runs every mutating operation inside a unit of work: store state is
//! snapshotted before the operation and restored when it fails, so no
//! transition is ever partially applied. Operations against the same deal
//! are serialized by the single mutable borrow of the engine.

pub mod error;
pub mod jobs;
pub mod payment;
pub mod refund;
pub mod state;

#[cfg(test)]
mod tests;

pub use error::EngineError;
pub use jobs::JobRunReport;
pub use payment::{AdvanceOutcome, CorrectionOutcome};
pub use state::Stores;

use farebox_shared::config::EngineConfig;
use farebox_shared::types::RefundCardId;
use tracing::warn;

use crate::external::{
    AccountingPoster, BonusService, DealDirectory, FiscalProvider, Notifier, NotificationKind,
};

/// The reconciliation and receipt-issuance engine.
pub struct Engine<D, F, B, N, P> {
    /// Deal-scoped persistent state.
    pub stores: Stores,
    /// CRM deal/contact store.
    pub deals: D,
    /// Fiscal provider.
    pub fiscal: F,
    /// Bonus/loyalty service.
    pub bonus: B,
    /// Notification sender.
    pub notifier: N,
    /// Accounting posting service.
    pub poster: P,
    /// Engine configuration.
    pub config: EngineConfig,
}

impl<D, F, B, N, P> Engine<D, F, B, N, P>
where
    D: DealDirectory,
    F: FiscalProvider,
    B: BonusService,
    N: Notifier,
    P: AccountingPoster,
{
    /// Creates an engine with empty stores.
    pub fn new(config: EngineConfig, deals: D, fiscal: F, bonus: B, notifier: N, poster: P) -> Self {
        Self {
            stores: Stores::new(),
            deals,
            fiscal,
            bonus,
            notifier,
            poster,
            config,
        }
    }

    /// Runs an operation as a unit of work.
    ///
    /// Store state is restored wholesale when the operation fails; the error
    /// then propagates with its structured code. Calls already made to
    /// external collaborators are not undone, matching the platform
    /// transaction semantics this replaces.
    pub(crate) fn with_rollback<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let snapshot = self.stores.clone();
        match op(self) {
            Ok(value) => Ok(value),
            Err(error) => {
                self.stores = snapshot;
                Err(error)
            }
        }
    }

    /// Fire-and-forget notification; failures are logged, never fatal.
    pub(crate) fn notify(
        &mut self,
        kind: NotificationKind,
        refund_card: RefundCardId,
        message: Option<&str>,
    ) {
        if let Err(error) = self.notifier.send(kind, refund_card, message) {
            warn!(refund_card = %refund_card, ?kind, %error, "notification send failed");
        }
    }
}
