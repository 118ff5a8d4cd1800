//! Deferred-execution queues.
//!
//! Streams defer work to a later turn in two places: sources built by
//! [`Species::of`](crate::Species::of) and friends, and the delivery of a producer
//! failure raised while a subscription is still being constructed.
//!
//! ## Contents
//! - [`Schedule`], [`Job`] the queue contract
//! - [`TokioQueue`] FIFO worker task on a Tokio runtime (or a dedicated thread)
//! - [`ManualQueue`] FIFO queue drained explicitly by its owner
//!
//! ## Rules
//! - Jobs run strictly in the order they were scheduled (per queue).
//! - A job never runs inside the `schedule` call that enqueued it.
//! - Jobs scheduled while a subscription is being built are held until the
//!   outermost `subscribe` on that thread has returned its subscription `Ready`.
//! - A failure escaping a job is reported via `tracing::error!`, never returned
//!   to the scheduler and never swallowed silently.

mod defer;
mod manual;
mod schedule;
mod tokio_queue;

pub use manual::ManualQueue;
pub use schedule::{Job, Schedule};
pub use tokio_queue::TokioQueue;

pub(crate) use defer::{hold, schedule as defer_schedule};
