//! Error types used by subscriptions, operators and deferred queues.
//!
//! This module defines two error types:
//!
//! - [`Error`]: everything a delivery or an operator can fail with, generic over
//!   the stream's own failure type `E`.
//! - [`Escaped`]: a type-erased failure that escaped a scheduled job and was
//!   reported by a queue instead of being returned to anyone.
//!
//! Both provide `as_label` for logging.

use std::fmt;

use thiserror::Error;

/// # Errors produced by the delivery protocol and the operators.
///
/// Three kinds travel through this type:
/// - **usage errors** (`NotInitialized`, `AlreadyRunning`) are returned synchronously
///   from the [`Gate`](crate::Gate) call that violated the state machine;
/// - **operator errors** (`EmptySequence`, `Cancelled`) come from the operators;
/// - **data errors** (`Raised`) carry the stream's own failure value, whether it came
///   from a producer or from a consumer callback.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error<E> {
    /// A delivery was attempted while the producer routine was still being set up.
    #[error("subscription is not initialized")]
    NotInitialized,

    /// A delivery was attempted while a `next` callback was still in flight.
    #[error("subscription observer is already running")]
    AlreadyRunning,

    /// `reduce` without a seed completed before any value arrived.
    #[error("cannot reduce an empty sequence")]
    EmptySequence,

    /// A [`ForEach`](crate::ForEach) subscription was cancelled before it settled.
    #[error("subscription was cancelled before it settled")]
    Cancelled,

    /// Failure value raised by a producer or a consumer callback.
    #[error("stream failed: {0:?}")]
    Raised(E),
}

impl<E> Error<E> {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use pushgate::Error;
    ///
    /// let err: Error<&str> = Error::AlreadyRunning;
    /// assert_eq!(err.as_label(), "already_running");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            Error::NotInitialized => "not_initialized",
            Error::AlreadyRunning => "already_running",
            Error::EmptySequence => "empty_sequence",
            Error::Cancelled => "cancelled",
            Error::Raised(_) => "raised",
        }
    }

    /// Indicates whether the error reports a protocol violation by the caller.
    ///
    /// Returns `true` for [`Error::NotInitialized`] and [`Error::AlreadyRunning`].
    pub fn is_usage(&self) -> bool {
        matches!(self, Error::NotInitialized | Error::AlreadyRunning)
    }

    /// Returns the raised failure value, if this is [`Error::Raised`].
    pub fn into_raised(self) -> Option<E> {
        match self {
            Error::Raised(e) => Some(e),
            _ => None,
        }
    }
}

/// # Failures that escaped a scheduled job.
///
/// Nobody is positioned to catch these, so queues report them on the
/// top-level error channel (`tracing::error!`) and [`ManualQueue`](crate::ManualQueue)
/// additionally records them.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Escaped {
    /// The job returned an error.
    #[error("scheduled job failed: {0}")]
    Failed(String),

    /// The job panicked.
    #[error("scheduled job panicked: {0}")]
    Panicked(String),

    /// The job never ran because the queue was shut down.
    #[error("scheduled job dropped: queue {0} is closed")]
    Dropped(String),
}

impl Escaped {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Escaped::Failed(_) => "job_failed",
            Escaped::Panicked(_) => "job_panicked",
            Escaped::Dropped(_) => "job_dropped",
        }
    }

    /// Builds a [`Escaped::Panicked`] from a panic payload.
    pub(crate) fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let msg = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        Escaped::Panicked(msg)
    }
}

impl<E: fmt::Debug> From<Error<E>> for Escaped {
    fn from(err: Error<E>) -> Self {
        Escaped::Failed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(Error::<()>::NotInitialized.as_label(), "not_initialized");
        assert_eq!(Error::<()>::EmptySequence.as_label(), "empty_sequence");
        assert_eq!(Error::<()>::Cancelled.as_label(), "cancelled");
        assert_eq!(Error::Raised(1).as_label(), "raised");
        assert_eq!(Escaped::Dropped("q".into()).as_label(), "job_dropped");
    }

    #[test]
    fn test_usage_classification() {
        assert!(Error::<()>::NotInitialized.is_usage());
        assert!(Error::<()>::AlreadyRunning.is_usage());
        assert!(!Error::<()>::EmptySequence.is_usage());
        assert!(!Error::Raised("boom").is_usage());
    }

    #[test]
    fn test_escaped_keeps_raised_value() {
        let escaped = Escaped::from(Error::Raised("boom"));
        assert_eq!(escaped, Escaped::Failed("stream failed: \"boom\"".into()));
        assert_eq!(Error::Raised("boom").into_raised(), Some("boom"));
    }

    #[test]
    fn test_panic_payload_message() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("kaput");
        assert_eq!(
            Escaped::from_panic(payload.as_ref()),
            Escaped::Panicked("kaput".into())
        );
    }
}
