//! # Species: the factory operators build with.
//!
//! Every [`Stream`] may carry a [`Species`]. Operators (`map`, `filter`, ...) and
//! sources (`of`, `from_iter`, ...) build their result through the species of the
//! stream they start from, so a custom species propagates through whole operator
//! chains. A stream without one resolves to [`Species::base`].
//!
//! A species also owns the deferred queue used by the streams it makes.
//!
//! ## Identity
//! Two species are the same iff they are clones of one another ([`Species::is`]);
//! this is the check [`Species::from_stream`] uses to decide whether a converted
//! stream can be returned as is.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use pushgate::{Config, ManualQueue, Species, Stream};
//!
//! let queue = Arc::new(ManualQueue::new(&Config::named("ui")));
//! let ui = Species::builder(Config::named("ui"))
//!     .with_queue(queue.clone())
//!     .build();
//!
//! let doubled: Stream<i32, ()> = ui.of([1, 2, 3]).map(|x| Ok(x * 2));
//! assert!(doubled.species().is(&ui));
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::config::Config;
use crate::core::{Gate, Teardown};
use crate::error::{Error, Escaped};
use crate::queue::{self, Schedule, TokioQueue};

use super::stream::Stream;

struct Inner {
    name: Cow<'static, str>,
    queue: Arc<dyn Schedule>,
}

/// Factory for streams, carrying their deferred queue.
#[derive(Clone)]
pub struct Species {
    inner: Arc<Inner>,
}

impl Species {
    /// Creates a species with the given name and queue.
    pub fn new(name: impl Into<Cow<'static, str>>, queue: Arc<dyn Schedule>) -> Self {
        Self {
            inner: Arc::new(Inner {
                name: name.into(),
                queue,
            }),
        }
    }

    /// Starts building a species from a [`Config`].
    pub fn builder(cfg: Config) -> SpeciesBuilder {
        SpeciesBuilder::new(cfg)
    }

    /// The species of streams that were not given one.
    ///
    /// Process-wide; its queue is a [`TokioQueue::detached`] worker, so it works
    /// with or without an ambient Tokio runtime.
    pub fn base() -> Self {
        static BASE: OnceLock<Species> = OnceLock::new();
        BASE.get_or_init(|| Species::builder(Config::named("Stream")).build())
            .clone()
    }

    /// Species name used in logs.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The deferred queue of this species.
    pub fn queue(&self) -> &Arc<dyn Schedule> {
        &self.inner.queue
    }

    /// True if both values are the same species.
    pub fn is(&self, other: &Species) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Builds a stream of this species from a producer routine.
    ///
    /// The routine runs once per `subscribe`, receives a fresh [`Gate`], and returns the
    /// teardown to run when that subscription closes. Returning `Err` fails the
    /// subscription on a later turn instead of failing `subscribe`.
    pub fn make<T, E, P>(&self, producer: P) -> Stream<T, E>
    where
        T: Send + 'static,
        E: fmt::Debug + Send + 'static,
        P: Fn(Gate<T, E>) -> Result<Teardown, Error<E>> + Send + Sync + 'static,
    {
        Stream::with_species(Arc::new(producer), Some(self.clone()))
    }

    /// Schedules `job` on this species' queue; an `Err` escaping it is reported.
    pub(crate) fn enqueue<E, F>(&self, job: F)
    where
        E: fmt::Debug,
        F: FnOnce() -> Result<(), Error<E>> + Send + 'static,
    {
        queue::defer_schedule(
            &self.inner.queue,
            Box::new(move || job().map_err(Escaped::from)),
        );
    }
}

impl fmt::Debug for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Species")
            .field("name", &self.name())
            .field("queue", &self.inner.queue.name())
            .finish()
    }
}

/// Builder for a [`Species`].
pub struct SpeciesBuilder {
    cfg: Config,
    queue: Option<Arc<dyn Schedule>>,
}

impl SpeciesBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self { cfg, queue: None }
    }

    /// Uses `queue` for deferred work instead of a dedicated worker.
    pub fn with_queue(mut self, queue: Arc<dyn Schedule>) -> Self {
        self.queue = Some(queue);
        self
    }

    /// Builds the species.
    ///
    /// Without an explicit queue, a [`TokioQueue::detached`] worker named after the
    /// configuration is started.
    pub fn build(self) -> Species {
        let queue = match self.queue {
            Some(queue) => queue,
            None => Arc::new(TokioQueue::detached(&self.cfg)),
        };
        Species::new(self.cfg.name, queue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::ManualQueue;

    #[test]
    fn test_identity_follows_clones() {
        let queue: Arc<dyn Schedule> = Arc::new(ManualQueue::new(&Config::named("a")));
        let a = Species::new("a", Arc::clone(&queue));
        let also_a = a.clone();
        let b = Species::new("a", queue);

        assert!(a.is(&also_a));
        assert!(!a.is(&b));
    }

    #[test]
    fn test_base_is_a_singleton() {
        assert!(Species::base().is(&Species::base()));
        assert_eq!(Species::base().name(), "Stream");
    }

    #[test]
    fn test_builder_uses_given_queue() {
        let queue: Arc<dyn Schedule> = Arc::new(ManualQueue::new(&Config::named("manual")));
        let species = Species::builder(Config::named("custom"))
            .with_queue(Arc::clone(&queue))
            .build();

        assert_eq!(species.name(), "custom");
        assert!(Arc::ptr_eq(species.queue(), &queue));
    }
}
