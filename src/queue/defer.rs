//! # Holding jobs while a subscription is being built.
//!
//! A producer routine runs while its subscription is still `Initializing`, and
//! derived streams subscribe to their sources from inside that routine. A queue
//! backed by another thread could start a source's walk before the outer
//! subscription is `Ready`; the walk would then be rejected with
//! `NotInitialized`.
//!
//! While [`hold`] is active on a thread, [`schedule`] parks jobs in a per-thread
//! buffer. The outermost `hold` submits them, in order, once its closure returns.
//!
//! ```text
//! hold ─► subscribe(derived) ─► producer ─► subscribe(source) ─► schedule(walk)  (parked)
//!   │                                                        install ─► Ready
//!   │                              install ─► Ready
//!   └─► release (depth 0) ─► queue.schedule(walk)
//! ```

use std::cell::RefCell;
use std::sync::Arc;

use super::schedule::{Job, Schedule};

#[derive(Default)]
struct Held {
    depth: usize,
    jobs: Vec<(Arc<dyn Schedule>, Job)>,
}

thread_local! {
    static HELD: RefCell<Held> = RefCell::new(Held::default());
}

/// Schedules `job` on `queue`, or parks it while a [`hold`] is active.
pub(crate) fn schedule(queue: &Arc<dyn Schedule>, job: Job) {
    let job = HELD.with_borrow_mut(|held| {
        if held.depth == 0 {
            Some(job)
        } else {
            held.jobs.push((Arc::clone(queue), job));
            None
        }
    });
    if let Some(job) = job {
        queue.schedule(job);
    }
}

/// Runs `f`; jobs scheduled meanwhile reach their queues only after the
/// outermost `hold` on this thread returns (or unwinds).
pub(crate) fn hold<R>(f: impl FnOnce() -> R) -> R {
    HELD.with_borrow_mut(|held| held.depth += 1);
    let _release = Release;
    f()
}

struct Release;

impl Drop for Release {
    fn drop(&mut self) {
        let jobs = HELD.with_borrow_mut(|held| {
            held.depth -= 1;
            if held.depth == 0 {
                std::mem::take(&mut held.jobs)
            } else {
                Vec::new()
            }
        });
        for (queue, job) in jobs {
            queue.schedule(job);
        }
    }
}
