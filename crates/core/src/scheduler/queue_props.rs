//! Property tests for the job queue.

use chrono::{NaiveTime, TimeZone, Utc};
use farebox_shared::types::DealId;
use proptest::prelude::*;

use super::queue::{shift_midnight, JobQueue};
use super::types::JobKind;

proptest! {
    /// Midnight run times always land on 10:05:00 of the same date; any
    /// other time is left untouched.
    #[test]
    fn prop_midnight_shift(secs in 0u32..86_400, day in 1u32..=28) {
        let run_at = Utc
            .with_ymd_and_hms(2026, 2, day, secs / 3600, (secs / 60) % 60, secs % 60)
            .unwrap();
        let shifted = shift_midnight(run_at);

        if run_at.time() == NaiveTime::MIN {
            prop_assert_eq!(shifted.date_naive(), run_at.date_naive());
            prop_assert_eq!(shifted.time(), NaiveTime::from_hms_opt(10, 5, 0).unwrap());
        } else {
            prop_assert_eq!(shifted, run_at);
        }
    }

    /// However many times a `(deal, kind)` job is scheduled, exactly one
    /// instance remains and it carries the last run time.
    #[test]
    fn prop_supersede_keeps_one(times in proptest::collection::vec(1u32..=28, 1..8)) {
        let mut queue = JobQueue::new();
        let deal = DealId::new(7);
        let mut last = None;

        for day in &times {
            let run_at = Utc.with_ymd_and_hms(2026, 3, *day, 12, 0, 0).unwrap();
            last = Some(queue.schedule(deal, JobKind::FullPaidCheck, run_at));
        }

        prop_assert_eq!(queue.len(), 1);
        prop_assert_eq!(queue.run_at(deal, JobKind::FullPaidCheck), last);
    }
}
