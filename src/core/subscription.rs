//! # Subscription: lifecycle owner and sole authority over teardown.
//!
//! A [`Subscription`] links one producer routine to one consumer. State, consumer
//! and teardown live together in a single record behind a mutex; every transition
//! goes through a method here, and the lock is never held while user code
//! (a consumer callback or a teardown) runs.
//!
//! ## Construction
//! ```text
//! Subscription::start(observer, producer, queue)
//!   ├─► shared = { Initializing, observer, teardown: None }
//!   ├─► producer(Gate(weak shared))
//!   │       ├─ Ok(teardown) → install teardown
//!   │       └─ Err(e)       → queue.schedule(gate.error(e))   (later turn)
//!   └─► Ready
//! ```
//!
//! The producer call and `install` run inside `queue::hold`: jobs scheduled
//! meanwhile (by this producer or by nested subscribes) reach their queue only
//! after the outermost subscription on this thread is `Ready`.
//!
//! ## Rules
//! - Teardown runs **exactly once**, when the subscription first becomes `Closed`.
//! - Closing clears the consumer *before* teardown runs, so re-entrant calls made
//!   from inside teardown see `Closed` and do nothing.
//! - Dropping the last [`Subscription`] handle of an open subscription unsubscribes it.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::error::{Error, Escaped};
use crate::queue::{self as jobs, Schedule};

use super::gate::Gate;
use super::observer::{NextFn, Observer};
use super::state::State;
use super::teardown::{Teardown, Unsubscribe};

/// Producer routine: receives a fresh gate per subscription, returns its teardown.
pub(crate) type Producer<T, E> =
    Arc<dyn Fn(Gate<T, E>) -> Result<Teardown, Error<E>> + Send + Sync>;

struct Slot<T, E> {
    state: State,
    observer: Option<Observer<T, E>>,
    teardown: Option<Teardown>,
}

/// State shared between the subscription handles (strong) and its gate (weak).
pub(crate) struct Shared<T, E> {
    slot: Mutex<Slot<T, E>>,
}

impl<T, E> Shared<T, E> {
    fn new(observer: Observer<T, E>) -> Self {
        Self {
            slot: Mutex::new(Slot {
                state: State::Initializing,
                observer: Some(observer),
                teardown: None,
            }),
        }
    }

    pub(crate) fn state(&self) -> State {
        self.slot.lock().state
    }

    /// Stores the producer's teardown and leaves `Initializing`.
    fn install(&self, teardown: Teardown) {
        let mut slot = self.slot.lock();
        if slot.state.is_closed() {
            drop(slot);
            teardown.run();
            return;
        }
        slot.teardown = Some(teardown);
        if slot.state == State::Initializing {
            slot.state = State::Ready;
        }
    }

    /// Enters `Running` for a `next` delivery.
    ///
    /// `Ok(None)` means there is nothing to call: closed, or no `next` callback.
    pub(crate) fn begin_next(&self) -> Result<Option<NextFn<T, E>>, Error<E>> {
        let mut slot = self.slot.lock();
        if slot.state.is_closed() {
            return Ok(None);
        }
        slot.state.validate()?;

        let next = slot.observer.as_ref().and_then(|o| o.next.clone());
        if next.is_some() {
            slot.state = State::Running;
        }
        Ok(next)
    }

    /// Leaves `Running`, unless the callback closed the subscription.
    pub(crate) fn end_next(&self) {
        let mut slot = self.slot.lock();
        if slot.state == State::Running {
            slot.state = State::Ready;
        }
    }

    /// Closes for a terminal signal and hands out the consumer.
    ///
    /// `Ok(None)` means the subscription was already closed. The teardown stays
    /// in its slot; the caller runs it with [`Shared::cleanup`].
    pub(crate) fn close_for_terminal(&self) -> Result<Option<Observer<T, E>>, Error<E>> {
        let mut slot = self.slot.lock();
        if slot.state.is_closed() {
            return Ok(None);
        }
        slot.state.validate()?;

        slot.state = State::Closed;
        Ok(slot.observer.take())
    }

    /// Closes unconditionally. Returns `false` if it was already closed.
    fn close(&self) -> bool {
        let observer = {
            let mut slot = self.slot.lock();
            if slot.state.is_closed() {
                return false;
            }
            slot.state = State::Closed;
            slot.observer.take()
        };
        // consumer captures may touch this subscription when dropped
        drop(observer);
        true
    }

    /// Takes the teardown out of its slot and runs it (at most once overall).
    pub(crate) fn cleanup(&self) {
        let teardown = self.slot.lock().teardown.take();
        if let Some(teardown) = teardown {
            teardown.run();
        }
    }
}

impl<T, E> Drop for Shared<T, E> {
    fn drop(&mut self) {
        let slot = self.slot.get_mut();
        if slot.state.is_closed() {
            return;
        }
        tracing::trace!("last subscription handle dropped; unsubscribing");
        slot.state = State::Closed;
        slot.observer = None;
        if let Some(teardown) = slot.teardown.take() {
            teardown.run();
        }
    }
}

/// Handle to one materialization of a [`Stream`](crate::Stream).
///
/// Clones refer to the same subscription. Dropping the last handle while the
/// subscription is still open unsubscribes it.
#[must_use = "dropping the last Subscription handle unsubscribes it"]
pub struct Subscription<T, E> {
    shared: Arc<Shared<T, E>>,
}

impl<T, E> Subscription<T, E>
where
    T: Send + 'static,
    E: fmt::Debug + Send + 'static,
{
    /// Runs the producer routine and returns the live subscription.
    ///
    /// Never fails: an `Err` from the producer is delivered as an `error` signal
    /// from a job on `queue`.
    pub(crate) fn start(
        observer: Observer<T, E>,
        producer: &Producer<T, E>,
        queue: &Arc<dyn Schedule>,
    ) -> Self {
        let shared = Arc::new(Shared::new(observer));
        let gate = Gate::new(Arc::downgrade(&shared));

        jobs::hold(|| match producer(gate.clone()) {
            Ok(teardown) => shared.install(teardown),
            Err(err) => {
                tracing::debug!(
                    queue = %queue.name(),
                    error = err.as_label(),
                    "producer failed during subscribe; deferring error signal"
                );
                jobs::defer_schedule(
                    queue,
                    Box::new(move || gate.error(err).map_err(Escaped::from)),
                );
                shared.install(Teardown::None);
            }
        });

        Self { shared }
    }
}

impl<T, E> Subscription<T, E> {
    /// Cancels the subscription: closes it and runs its teardown. Idempotent.
    pub fn unsubscribe(&self) {
        if self.shared.close() {
            tracing::trace!("subscription closed by unsubscribe");
            self.shared.cleanup();
        }
    }

    /// True once the subscription is closed.
    pub fn closed(&self) -> bool {
        self.shared.state().is_closed()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.shared.state()
    }

    pub(crate) fn downgrade(&self) -> Weak<Shared<T, E>> {
        Arc::downgrade(&self.shared)
    }

    pub(crate) fn upgrade(weak: &Weak<Shared<T, E>>) -> Option<Self> {
        weak.upgrade().map(|shared| Self { shared })
    }
}

impl<T, E> Clone for Subscription<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T, E> fmt::Debug for Subscription<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("state", &self.state())
            .finish()
    }
}

impl<T, E> Unsubscribe for Subscription<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn unsubscribe(&self) {
        Subscription::unsubscribe(self);
    }
}

impl<T, E> From<Subscription<T, E>> for Teardown
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn from(sub: Subscription<T, E>) -> Self {
        Teardown::handle(sub)
    }
}
