//! # ManualQueue: a queue its owner drains.
//!
//! [`ManualQueue`] only stores jobs; they run when the owner calls
//! [`run_until_idle`](ManualQueue::run_until_idle). Each call is one "later turn":
//! useful for embedding streams in an existing event loop and for tests that
//! need to step through deliveries deterministically.
//!
//! Escaped failures are reported like on any other queue and also recorded, so
//! the owner can inspect them with [`take_escaped`](ManualQueue::take_escaped).

use std::borrow::Cow;
use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::Escaped;

use super::schedule::{Job, Schedule, execute};

/// FIFO queue drained explicitly.
pub struct ManualQueue {
    name: Cow<'static, str>,
    catch_panics: bool,
    jobs: Mutex<VecDeque<Job>>,
    escaped: Mutex<Vec<Escaped>>,
}

impl ManualQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new(cfg: &Config) -> Self {
        Self {
            name: cfg.name.clone(),
            catch_panics: cfg.catch_panics,
            jobs: Mutex::new(VecDeque::new()),
            escaped: Mutex::new(Vec::new()),
        }
    }

    /// Runs jobs in FIFO order until the queue is empty, including jobs scheduled
    /// by the jobs themselves. Returns how many jobs ran.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            // the lock is released before the job runs; jobs may schedule more work
            let Some(job) = self.jobs.lock().pop_front() else {
                return ran;
            };
            if let Some(escaped) = execute(&self.name, job, self.catch_panics) {
                self.escaped.lock().push(escaped);
            }
            ran += 1;
        }
    }

    /// Number of jobs waiting to run.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.jobs.lock().len()
    }

    /// Returns and clears the failures that escaped jobs so far.
    pub fn take_escaped(&self) -> Vec<Escaped> {
        std::mem::take(&mut *self.escaped.lock())
    }
}

impl Schedule for ManualQueue {
    fn schedule(&self, job: Job) {
        self.jobs.lock().push_back(job);
    }

    fn name(&self) -> &str {
        &self.name
    }
}
