//! # Gate: the producer's only way into a subscription.
//!
//! A [`Gate`] is handed to the producer routine once per subscription. It holds a
//! weak back-reference; all state lives on the subscription.
//!
//! ## Delivery rules
//! ```text
//! next(v)      closed → Ok (dropped)
//!              Initializing / Running → usage error
//!              no next callback → Ok
//!              Running → callback(v) → Ready (unless closed meanwhile)
//!
//! error(e)     closed → Err(e) back to the caller
//!              Initializing / Running → usage error
//!              Closed → callback(e) or Err(e) if absent → teardown → result
//!
//! complete()   closed → Ok
//!              Initializing / Running → usage error
//!              Closed → callback() if present → teardown → result
//! ```
//!
//! Terminal signals close the subscription *before* calling the consumer, so a
//! consumer cannot re-enter delivery from its `error`/`complete` callback, and the
//! teardown runs on every exit path of that callback, unwinding included.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Weak;

use crate::error::Error;

use super::observer::Observer;
use super::subscription::Shared;

/// Push handle given to a producer routine.
pub struct Gate<T, E> {
    shared: Weak<Shared<T, E>>,
}

impl<T, E> Gate<T, E> {
    pub(crate) fn new(shared: Weak<Shared<T, E>>) -> Self {
        Self { shared }
    }

    /// True once the subscription is closed (or every handle to it is gone).
    ///
    /// Producers that emit from queued jobs check this between values to stop early.
    pub fn closed(&self) -> bool {
        self.shared
            .upgrade()
            .is_none_or(|shared| shared.state().is_closed())
    }

    /// Delivers one value to the consumer.
    ///
    /// Returns whatever the consumer's `next` callback returned.
    pub fn next(&self, value: T) -> Result<(), Error<E>> {
        let Some(shared) = self.shared.upgrade() else {
            return Ok(());
        };
        let Some(next) = shared.begin_next()? else {
            return Ok(());
        };

        let _running = RestoreReady(&shared);
        next(value)
    }

    /// Fails the stream with `err`.
    ///
    /// Returns the consumer's result, or `Err(err)` when the consumer has no `error`
    /// callback or the subscription is already closed.
    pub fn error(&self, err: Error<E>) -> Result<(), Error<E>> {
        let Some(shared) = self.shared.upgrade() else {
            return Err(err);
        };
        let Some(observer) = shared.close_for_terminal()? else {
            return Err(err);
        };

        let _cleanup = Cleanup(&shared);
        match &observer.error {
            Some(on_error) => on_error(err),
            None => Err(err),
        }
    }

    /// Completes the stream.
    ///
    /// Returns the consumer's result; `Ok(())` when already closed.
    pub fn complete(&self) -> Result<(), Error<E>> {
        let Some(shared) = self.shared.upgrade() else {
            return Ok(());
        };
        let Some(observer) = shared.close_for_terminal()? else {
            return Ok(());
        };

        let _cleanup = Cleanup(&shared);
        match &observer.complete {
            Some(on_complete) => on_complete(),
            None => Ok(()),
        }
    }
}

impl<T, E> Clone for Gate<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Weak::clone(&self.shared),
        }
    }
}

impl<T, E> fmt::Debug for Gate<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gate")
            .field("closed", &self.closed())
            .finish()
    }
}

/// Forwards every signal into this gate; used to pipe one stream into another.
impl<T, E> From<Gate<T, E>> for Observer<T, E>
where
    T: 'static,
    E: 'static,
{
    fn from(gate: Gate<T, E>) -> Self {
        let (n, e, c) = (gate.clone(), gate.clone(), gate);
        Observer::new()
            .on_next(move |v| n.next(v))
            .on_error(move |err| e.error(err))
            .on_complete(move || c.complete())
    }
}

/// `Running → Ready` on every exit path of a `next` callback.
struct RestoreReady<'a, T, E>(&'a Shared<T, E>);

impl<T, E> Drop for RestoreReady<'_, T, E> {
    fn drop(&mut self) {
        self.0.end_next();
    }
}

/// Runs the teardown on every exit path of a terminal callback.
struct Cleanup<'a, T, E>(&'a Shared<T, E>);

impl<T, E> Drop for Cleanup<'_, T, E> {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            self.0.cleanup();
            return;
        }
        // a second panic here would abort; report it instead
        if catch_unwind(AssertUnwindSafe(|| self.0.cleanup())).is_err() {
            tracing::error!("teardown panicked while unwinding from a consumer callback");
        }
    }
}
