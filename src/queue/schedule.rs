//! # Queue contract.
//!
//! Provides [`Schedule`], the seam between streams and whatever runs their
//! deferred work.
//!
//! ## Architecture
//! ```text
//! Species::of / construction failure ──► Schedule::schedule(job)
//!                                              │
//!                                              ▼ (later turn, FIFO)
//!                                         execute(job)
//!                                              ├─ Ok            → done
//!                                              ├─ Err(Escaped)  → tracing::error!
//!                                              └─ panic         → Escaped::Panicked → tracing::error!
//! ```

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::error::Escaped;

/// A unit of deferred work.
///
/// Returning `Err` reports the failure on the queue's error channel.
pub type Job = Box<dyn FnOnce() -> Result<(), Escaped> + Send + 'static>;

/// Deferred-execution queue.
///
/// ### Implementation requirements
/// - Run each job in a later turn, never inside `schedule` itself.
/// - Preserve FIFO order between jobs scheduled on the same queue.
/// - Report failures escaping a job (see [`Escaped`]); do not hand them back.
pub trait Schedule: Send + Sync + 'static {
    /// Enqueues `job` to run after the current synchronous execution completes.
    fn schedule(&self, job: Job);

    /// Returns the queue name used in logs.
    fn name(&self) -> &str {
        "queue"
    }
}

/// Runs one job and reports whatever escapes it.
///
/// Returns the escaped failure so callers can record it as well.
pub(crate) fn execute(queue: &str, job: Job, catch_panics: bool) -> Option<Escaped> {
    let outcome = if catch_panics {
        match catch_unwind(AssertUnwindSafe(job)) {
            Ok(res) => res,
            Err(payload) => Err(Escaped::from_panic(payload.as_ref())),
        }
    } else {
        job()
    };

    match outcome {
        Ok(()) => None,
        Err(escaped) => {
            report(queue, &escaped);
            Some(escaped)
        }
    }
}

/// Reports an escaped failure on the top-level error channel.
pub(crate) fn report(queue: &str, escaped: &Escaped) {
    tracing::error!(
        queue = %queue,
        kind = escaped.as_label(),
        error = %escaped,
        "failure escaped a scheduled job"
    );
}
