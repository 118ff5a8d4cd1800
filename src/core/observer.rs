//! # Consumers.
//!
//! A consumer is a capability record of up to three callbacks. Each one is
//! optional and an absent callback has a fixed meaning:
//!
//! | signal     | absent callback                                   |
//! |------------|---------------------------------------------------|
//! | `next`     | value is dropped                                  |
//! | `error`    | the error is handed back to whoever signalled it  |
//! | `complete` | completion is ignored                             |
//!
//! Two ways to build one:
//! - [`Observer`] builder with closures (`on_next`, `on_error`, `on_complete`);
//! - an `Arc` of any type implementing [`Observe`], whose default methods mirror
//!   the table above.

use std::fmt;
use std::sync::Arc;

use crate::error::Error;

pub(crate) type NextFn<T, E> = Arc<dyn Fn(T) -> Result<(), Error<E>> + Send + Sync>;
pub(crate) type ErrorFn<E> = Arc<dyn Fn(Error<E>) -> Result<(), Error<E>> + Send + Sync>;
pub(crate) type CompleteFn<E> = Arc<dyn Fn() -> Result<(), Error<E>> + Send + Sync>;

/// Consumer callbacks attached to one subscription.
///
/// # Example
/// ```
/// use pushgate::{Error, Observer};
///
/// let observer: Observer<u32, String> = Observer::new()
///     .on_next(|v| {
///         println!("got {v}");
///         Ok(())
///     })
///     .on_error(|e: Error<String>| {
///         eprintln!("failed: {e}");
///         Ok(())
///     });
/// assert!(observer.has_next() && observer.has_error() && !observer.has_complete());
/// ```
pub struct Observer<T, E> {
    pub(crate) next: Option<NextFn<T, E>>,
    pub(crate) error: Option<ErrorFn<E>>,
    pub(crate) complete: Option<CompleteFn<E>>,
}

impl<T, E> Observer<T, E> {
    /// Creates an observer with no callbacks.
    pub fn new() -> Self {
        Self {
            next: None,
            error: None,
            complete: None,
        }
    }

    /// Sets the `next` callback. An `Err` is returned to the producer.
    pub fn on_next<F>(mut self, f: F) -> Self
    where
        F: Fn(T) -> Result<(), Error<E>> + Send + Sync + 'static,
    {
        self.next = Some(Arc::new(f));
        self
    }

    /// Sets the `error` callback. An `Err` is returned to the producer after teardown.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(Error<E>) -> Result<(), Error<E>> + Send + Sync + 'static,
    {
        self.error = Some(Arc::new(f));
        self
    }

    /// Sets the `complete` callback. An `Err` is returned to the producer after teardown.
    pub fn on_complete<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Result<(), Error<E>> + Send + Sync + 'static,
    {
        self.complete = Some(Arc::new(f));
        self
    }

    /// True if a `next` callback is present.
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// True if an `error` callback is present.
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// True if a `complete` callback is present.
    pub fn has_complete(&self) -> bool {
        self.complete.is_some()
    }
}

impl<T, E> Default for Observer<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Clone for Observer<T, E> {
    fn clone(&self) -> Self {
        Self {
            next: self.next.clone(),
            error: self.error.clone(),
            complete: self.complete.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Observer<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("next", &self.has_next())
            .field("error", &self.has_error())
            .field("complete", &self.has_complete())
            .finish()
    }
}

/// Object-style consumer.
///
/// Every method has a default matching an absent callback, so implementors
/// override only the signals they care about.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU64, Ordering};
/// use pushgate::{Error, Observe, Observer};
///
/// #[derive(Default)]
/// struct Sum(AtomicU64);
///
/// impl Observe<u64, ()> for Sum {
///     fn next(&self, value: u64) -> Result<(), Error<()>> {
///         self.0.fetch_add(value, Ordering::Relaxed);
///         Ok(())
///     }
/// }
///
/// let observer: Observer<u64, ()> = Arc::new(Sum::default()).into();
/// assert!(observer.has_next());
/// ```
pub trait Observe<T, E>: Send + Sync + 'static {
    /// Receives one value. Default: drop it.
    fn next(&self, value: T) -> Result<(), Error<E>> {
        let _ = value;
        Ok(())
    }

    /// Receives the terminal error. Default: hand it back to the producer.
    fn error(&self, err: Error<E>) -> Result<(), Error<E>> {
        Err(err)
    }

    /// Receives completion. Default: ignore it.
    fn complete(&self) -> Result<(), Error<E>> {
        Ok(())
    }
}

impl<T, E, O> From<Arc<O>> for Observer<T, E>
where
    T: 'static,
    E: 'static,
    O: Observe<T, E>,
{
    fn from(obj: Arc<O>) -> Self {
        let (n, e, c) = (Arc::clone(&obj), Arc::clone(&obj), obj);
        Observer::new()
            .on_next(move |v| n.next(v))
            .on_error(move |err| e.error(err))
            .on_complete(move || c.complete())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<i32>>,
    }

    impl Observe<i32, &'static str> for Recorder {
        fn next(&self, value: i32) -> Result<(), Error<&'static str>> {
            self.seen.lock().push(value);
            Ok(())
        }
    }

    #[test]
    fn test_builder_sets_only_given_callbacks() {
        let obs: Observer<i32, ()> = Observer::new().on_complete(|| Ok(()));
        assert!(!obs.has_next());
        assert!(!obs.has_error());
        assert!(obs.has_complete());
    }

    #[test]
    fn test_observe_defaults_mirror_absent_callbacks() {
        let rec = Arc::new(Recorder::default());
        let obs: Observer<i32, &'static str> = Arc::clone(&rec).into();

        (obs.next.as_ref().unwrap())(7).unwrap();
        assert_eq!(*rec.seen.lock(), vec![7]);
        assert_eq!(
            (obs.error.as_ref().unwrap())(Error::Raised("boom")),
            Err(Error::Raised("boom"))
        );
        assert_eq!((obs.complete.as_ref().unwrap())(), Ok(()));
    }
}
