//! Deferred one-shot jobs.
//!
//! Structured job records dispatched through an enum-keyed handler match —
//! never serialized call strings. One job per `(deal, kind)`; duplicates
//! supersede, cancels of missing jobs are no-ops, and runs landing exactly
//! on midnight shift to 10:05 the same day.

pub mod queue;
pub mod types;

#[cfg(test)]
mod queue_props;

pub use queue::JobQueue;
pub use types::{JobKind, ScheduledJob};
