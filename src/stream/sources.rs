//! # Construction helpers.
//!
//! Sources adapt a finite collection into a [`Stream`] of the species they are
//! called on. Each subscription walks its own copy of the items from a job on the
//! species' queue, so `subscribe` returns before any value is delivered.
//!
//! ```text
//! subscribe ─► producer ─► queue.schedule(walk) ─► Ready
//!                                 │
//!          (later turn)           ▼
//!        closed? ─yes─► stop
//!          │no
//!        next(item) ─Err─► escapes to the queue
//!          │
//!        ...every item...
//!          ▼
//!        complete()
//! ```

use std::fmt;
use std::sync::Arc;

use crate::core::{Gate, Teardown};
use crate::error::Error;

use super::species::Species;
use super::stream::{IntoStream, Stream};

impl Species {
    /// Emits `items` in order, then completes.
    ///
    /// # Example
    /// ```rust
    /// use pushgate::{Species, Stream};
    ///
    /// let digits: Stream<u8, ()> = Species::base().of([1, 2, 3]);
    /// assert!(digits.species().is(&Species::base()));
    /// ```
    pub fn of<T, E>(&self, items: impl IntoIterator<Item = T>) -> Stream<T, E>
    where
        T: Clone + Send + Sync + 'static,
        E: fmt::Debug + Send + 'static,
    {
        self.from_slice(items.into_iter().collect::<Vec<_>>())
    }

    /// Walks a shared slice by index on every subscription.
    pub fn from_slice<T, E>(&self, items: impl Into<Arc<[T]>>) -> Stream<T, E>
    where
        T: Clone + Send + Sync + 'static,
        E: fmt::Debug + Send + 'static,
    {
        let items: Arc<[T]> = items.into();
        let species = self.clone();
        self.make(move |gate: Gate<T, E>| {
            let items = Arc::clone(&items);
            species.enqueue(move || emit_all(&gate, items.iter().cloned()));
            Ok(Teardown::None)
        })
    }

    /// Iterates a fresh clone of `iterable` on every subscription.
    pub fn from_iter<I, E>(&self, iterable: I) -> Stream<I::Item, E>
    where
        I: IntoIterator + Clone + Send + Sync + 'static,
        I::Item: Send + 'static,
        E: fmt::Debug + Send + 'static,
    {
        let species = self.clone();
        self.make(move |gate: Gate<I::Item, E>| {
            let iterable = iterable.clone();
            species.enqueue(move || emit_all(&gate, iterable));
            Ok(Teardown::None)
        })
    }

    /// Adapts anything exposing [`IntoStream`] to this species.
    ///
    /// The converted stream is returned unchanged when its species is this one;
    /// otherwise it is wrapped in a stream of this species that forwards every signal.
    pub fn from_stream<T, E, S>(&self, source: &S) -> Stream<T, E>
    where
        T: Send + 'static,
        E: fmt::Debug + Send + 'static,
        S: IntoStream<T, E> + ?Sized,
    {
        let stream = source.into_stream();
        if stream.species().is(self) {
            return stream;
        }
        tracing::trace!(
            from = %stream.species().name(),
            to = %self.name(),
            "wrapping stream into another species"
        );
        self.make(move |gate: Gate<T, E>| Ok(stream.subscribe(gate).into()))
    }
}

impl<T, E> Stream<T, E>
where
    T: Send + 'static,
    E: fmt::Debug + Send + 'static,
{
    /// [`Species::of`] on the base species.
    pub fn of(items: impl IntoIterator<Item = T>) -> Self
    where
        T: Clone + Sync,
    {
        Species::base().of(items)
    }

    /// [`Species::from_slice`] on the base species.
    pub fn from_slice(items: impl Into<Arc<[T]>>) -> Self
    where
        T: Clone + Sync,
    {
        Species::base().from_slice(items)
    }

    /// [`Species::from_iter`] on the base species.
    #[allow(clippy::should_implement_trait)]
    pub fn from_iter<I>(iterable: I) -> Self
    where
        I: IntoIterator<Item = T> + Clone + Send + Sync + 'static,
    {
        Species::base().from_iter(iterable)
    }

    /// [`Species::from_stream`] on the base species.
    pub fn from_stream<S>(source: &S) -> Self
    where
        S: IntoStream<T, E> + ?Sized,
    {
        Species::base().from_stream(source)
    }
}

/// Delivers every item unless the subscription closes first, then completes.
fn emit_all<T, E>(gate: &Gate<T, E>, items: impl IntoIterator<Item = T>) -> Result<(), Error<E>> {
    for item in items {
        if gate.closed() {
            return Ok(());
        }
        gate.next(item)?;
    }
    gate.complete()
}
