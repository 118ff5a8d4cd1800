//! # TokioQueue: FIFO worker task backed by Tokio.
//!
//! [`TokioQueue`] hands every job to a single worker task through an unbounded
//! channel, so jobs run one at a time, in scheduling order, on a later turn.
//!
//! ## Diagram
//! ```text
//!    schedule(job)
//!        │
//!        └────────► [unbounded queue] ─► worker ─► execute(job)
//!                                          ▲            └─► escaped? → tracing::error!
//!                        shutdown() ───────┘ (CancellationToken)
//! ```
//!
//! ## Rules
//! - `schedule` never blocks and never runs the job itself.
//! - After `shutdown()` (or once the worker is gone) scheduled jobs are dropped
//!   and reported as [`Escaped::Dropped`].
//! - Panics inside a job are caught when [`Config::catch_panics`] is set.

use std::borrow::Cow;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::Escaped;

use super::schedule::{Job, Schedule, execute, report};

/// Deferred queue served by one Tokio worker task.
#[derive(Debug)]
pub struct TokioQueue {
    name: Cow<'static, str>,
    sender: mpsc::UnboundedSender<Job>,
    token: CancellationToken,
}

impl TokioQueue {
    /// Creates a queue whose worker runs on the current Tokio runtime.
    ///
    /// # Panics
    /// Panics if called outside of a Tokio runtime (as `tokio::spawn` does).
    #[must_use]
    pub fn spawn(cfg: &Config) -> Self {
        let (queue, rx) = Self::prepare(cfg);
        tokio::spawn(run_worker(
            queue.name.to_string(),
            rx,
            queue.token.clone(),
            cfg.catch_panics,
        ));
        queue
    }

    /// Creates a queue whose worker runs on its own thread with a current-thread runtime.
    ///
    /// Usable without an ambient runtime; this is what [`Species::base`](crate::Species::base) uses.
    /// If the thread or its runtime cannot be started, the failure is logged and every
    /// scheduled job is reported as dropped.
    #[must_use]
    pub fn detached(cfg: &Config) -> Self {
        let (queue, rx) = Self::prepare(cfg);
        let name = queue.name.to_string();
        let worker = run_worker(name.clone(), rx, queue.token.clone(), cfg.catch_panics);

        let spawned = std::thread::Builder::new()
            .name(format!("pushgate-{name}"))
            .spawn({
                let name = name.clone();
                move || match tokio::runtime::Builder::new_current_thread().build() {
                    Ok(rt) => rt.block_on(worker),
                    Err(err) => {
                        tracing::error!(queue = %name, error = %err, "failed to build queue runtime");
                    }
                }
            });
        if let Err(err) = spawned {
            tracing::error!(queue = %name, error = %err, "failed to start queue thread");
        }
        queue
    }

    fn prepare(cfg: &Config) -> (Self, mpsc::UnboundedReceiver<Job>) {
        let (sender, rx) = mpsc::unbounded_channel::<Job>();
        let queue = Self {
            name: cfg.name.clone(),
            sender,
            token: CancellationToken::new(),
        };
        (queue, rx)
    }

    /// Stops the worker; jobs still queued (and any scheduled later) are dropped.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// True once [`shutdown`](Self::shutdown) was requested.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Schedule for TokioQueue {
    fn schedule(&self, job: Job) {
        if self.is_shutdown() || self.sender.send(job).is_err() {
            report(&self.name, &Escaped::Dropped(self.name.to_string()));
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Worker loop: run jobs in FIFO order until cancelled or every sender is gone.
async fn run_worker(
    name: String,
    mut rx: mpsc::UnboundedReceiver<Job>,
    token: CancellationToken,
    catch_panics: bool,
) {
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            job = rx.recv() => match job {
                Some(job) => {
                    execute(&name, job, catch_panics);
                }
                None => return,
            }
        }
    }

    rx.close();
    while let Ok(job) = rx.try_recv() {
        drop(job);
        report(&name, &Escaped::Dropped(name.clone()));
    }
}
