//! In-memory job queue.

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use farebox_shared::types::DealId;

use super::types::{JobKind, ScheduledJob};

/// One-shot job queue with per-`(deal, kind)` uniqueness.
#[derive(Debug, Clone, Default)]
pub struct JobQueue {
    jobs: Vec<ScheduledJob>,
}

impl JobQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a job, superseding any existing `(deal, kind)` job.
    ///
    /// Returns the effective run time after the midnight shift.
    pub fn schedule(
        &mut self,
        deal_id: DealId,
        kind: JobKind,
        run_at: DateTime<Utc>,
    ) -> DateTime<Utc> {
        let run_at = shift_midnight(run_at);
        self.cancel(deal_id, kind);
        self.jobs.push(ScheduledJob {
            deal_id,
            kind,
            run_at,
        });
        run_at
    }

    /// Moves an existing job to a new run time (or schedules it fresh).
    pub fn reschedule(
        &mut self,
        deal_id: DealId,
        kind: JobKind,
        new_run_at: DateTime<Utc>,
    ) -> DateTime<Utc> {
        self.schedule(deal_id, kind, new_run_at)
    }

    /// Cancels a job. Canceling a job that does not exist is a no-op.
    pub fn cancel(&mut self, deal_id: DealId, kind: JobKind) {
        self.jobs
            .retain(|j| !(j.deal_id == deal_id && j.kind == kind));
    }

    /// True when a `(deal, kind)` job is queued.
    #[must_use]
    pub fn has(&self, deal_id: DealId, kind: JobKind) -> bool {
        self.jobs
            .iter()
            .any(|j| j.deal_id == deal_id && j.kind == kind)
    }

    /// Run time of a queued job, if present.
    #[must_use]
    pub fn run_at(&self, deal_id: DealId, kind: JobKind) -> Option<DateTime<Utc>> {
        self.jobs
            .iter()
            .find(|j| j.deal_id == deal_id && j.kind == kind)
            .map(|j| j.run_at)
    }

    /// Removes and returns every job due at `now`, in scheduling order.
    pub fn take_due(&mut self, now: DateTime<Utc>) -> Vec<ScheduledJob> {
        let (due, pending): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.jobs).into_iter().partition(|j| j.run_at <= now);
        self.jobs = pending;
        due
    }

    /// Number of queued jobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// True when no jobs are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// Applies the midnight business rule.
///
/// A run time of exactly 00:00:00 is "not yet the real start of the business
/// day" and moves to 10:05:00 on the same date.
#[must_use]
pub fn shift_midnight(run_at: DateTime<Utc>) -> DateTime<Utc> {
    if run_at.time() == NaiveTime::MIN {
        let shifted = run_at
            .date_naive()
            .and_hms_opt(10, 5, 0)
            .expect("10:05:00 is a valid time");
        Utc.from_utc_datetime(&shifted)
    } else {
        run_at
    }
}
