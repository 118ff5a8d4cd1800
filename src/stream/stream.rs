//! # Stream: an immutable, repeatable description of a push sequence.
//!
//! A [`Stream`] is just a producer routine plus an optional [`Species`]. It holds
//! no state of its own: every [`subscribe`](Stream::subscribe) runs the routine
//! again and yields an independent [`Subscription`].
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use pushgate::{Config, Gate, ManualQueue, Observer, Species, Stream, Teardown};
//!
//! let queue = Arc::new(ManualQueue::new(&Config::named("demo")));
//! let species = Species::new("demo", queue.clone());
//!
//! let ticks: Stream<u32, ()> = species.make(|_gate: Gate<u32, ()>| {
//!     Ok(Teardown::action(|| println!("ticks stopped")))
//! });
//!
//! let sub = ticks.subscribe(Observer::new().on_next(|v: u32| {
//!     println!("tick {v}");
//!     Ok(())
//! }));
//! sub.unsubscribe();
//! assert!(sub.closed());
//! ```

use std::fmt;
use std::sync::Arc;

use crate::core::{Gate, Observer, Producer, Subscription, Teardown};
use crate::error::Error;

use super::species::Species;

/// Push-based stream of `T` values that may fail with `Error<E>`.
pub struct Stream<T, E> {
    producer: Producer<T, E>,
    species: Option<Species>,
}

impl<T, E> Stream<T, E>
where
    T: Send + 'static,
    E: fmt::Debug + Send + 'static,
{
    /// Creates a stream of the base species from a producer routine.
    ///
    /// See [`Species::make`] for the routine's contract.
    pub fn new<P>(producer: P) -> Self
    where
        P: Fn(Gate<T, E>) -> Result<Teardown, Error<E>> + Send + Sync + 'static,
    {
        Self::with_species(Arc::new(producer), None)
    }

    pub(crate) fn with_species(producer: Producer<T, E>, species: Option<Species>) -> Self {
        Self { producer, species }
    }

    #[cfg(test)]
    pub(crate) fn producer(&self) -> &Producer<T, E> {
        &self.producer
    }

    /// Resolves the species operators build with: this stream's own, or the base one.
    pub fn species(&self) -> Species {
        self.species.clone().unwrap_or_else(Species::base)
    }

    /// Materializes the stream for one consumer.
    ///
    /// Accepts an [`Observer`], an `Arc` of an [`Observe`](crate::Observe) implementor,
    /// or a [`Gate`] of another subscription (forwarding).
    pub fn subscribe(&self, observer: impl Into<Observer<T, E>>) -> Subscription<T, E> {
        let species = self.species();
        tracing::debug!(species = %species.name(), "subscription opened");
        Subscription::start(observer.into(), &self.producer, species.queue())
    }
}

impl<T, E> Clone for Stream<T, E> {
    fn clone(&self) -> Self {
        Self {
            producer: Arc::clone(&self.producer),
            species: self.species.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Stream<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("species", &self.species.as_ref().map(Species::name))
            .finish()
    }
}

/// Stream-conversion capability consumed by [`Species::from_stream`].
pub trait IntoStream<T, E> {
    /// Returns a stream producing this value's sequence.
    fn into_stream(&self) -> Stream<T, E>;
}

impl<T, E> IntoStream<T, E> for Stream<T, E> {
    fn into_stream(&self) -> Stream<T, E> {
        self.clone()
    }
}
