//! Deferred job execution.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::external::{AccountingPoster, BonusService, DealDirectory, FiscalProvider, Notifier};
use crate::scheduler::{JobKind, ScheduledJob};

use super::error::EngineError;
use super::Engine;

/// Outcome of one fired job.
#[derive(Debug)]
pub struct JobRunReport {
    /// The job that fired.
    pub job: ScheduledJob,
    /// What its handler returned.
    pub result: Result<(), EngineError>,
}

impl<D, F, B, N, P> Engine<D, F, B, N, P>
where
    D: DealDirectory,
    F: FiscalProvider,
    B: BonusService,
    N: Notifier,
    P: AccountingPoster,
{
    /// Fires every due job through the typed handler registry.
    ///
    /// Handlers re-validate preconditions against current state rather than
    /// trusting what was true at schedule time; a job firing against a
    /// since-changed deal simply takes the path the current state dictates.
    /// Each job runs in its own unit of work, so one failing job never
    /// poisons the others; failed jobs are reported to the caller, which
    /// owns the retry policy.
    pub fn run_due_jobs(&mut self, now: DateTime<Utc>) -> Vec<JobRunReport> {
        let due = self.stores.jobs.take_due(now);
        due.into_iter()
            .map(|job| {
                let result = match job.kind {
                    JobKind::FullPaymentReceipt => self
                        .process_advance_payment(job.deal_id, now)
                        .map(|_| ()),
                    JobKind::FullPaidCheck => self.check_full_paid(job.deal_id, now).map(|_| ()),
                    JobKind::DelayedRefund => self.reactivate_delayed_refund(job.deal_id),
                };
                if let Err(error) = &result {
                    warn!(deal_id = %job.deal_id, kind = ?job.kind, %error, "deferred job failed");
                }
                JobRunReport { job, result }
            })
            .collect()
    }
}
