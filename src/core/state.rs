//! # Subscription lifecycle states.
//!
//! ```text
//!  Initializing ──(producer returned)──► Ready ◄──────────┐
//!                                          │              │ (callback returned,
//!                                          │ next()       │  not closed meanwhile)
//!                                          ▼              │
//!                                       Running ──────────┘
//!
//!  Ready | Running ──(unsubscribe / error / complete)──► Closed   (terminal)
//! ```

use crate::error::Error;

/// Lifecycle state of a [`Subscription`](crate::Subscription).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// The producer routine has not returned yet; deliveries are rejected.
    Initializing,
    /// Idle and able to accept a delivery.
    Ready,
    /// A `next` callback is in flight; nested deliveries are rejected.
    Running,
    /// Terminal; nothing reaches the consumer anymore.
    Closed,
}

impl State {
    /// True for [`State::Closed`].
    #[inline]
    pub fn is_closed(self) -> bool {
        matches!(self, State::Closed)
    }

    /// Returns a short stable label for logs.
    pub fn as_label(self) -> &'static str {
        match self {
            State::Initializing => "initializing",
            State::Ready => "ready",
            State::Running => "running",
            State::Closed => "closed",
        }
    }

    /// Checks that a delivery may start from this state.
    ///
    /// Callers handle `Closed` before validating.
    pub(crate) fn validate<E>(self) -> Result<(), Error<E>> {
        match self {
            State::Initializing => Err(Error::NotInitialized),
            State::Running => Err(Error::AlreadyRunning),
            State::Ready | State::Closed => Ok(()),
        }
    }
}
