//! # Teardown actions.
//!
//! A producer routine returns a [`Teardown`] describing how to release whatever
//! it set up. The owning subscription runs it exactly once, when it first closes.

use std::fmt;

/// Anything that can be cancelled by calling `unsubscribe`.
///
/// Implemented by [`Subscription`](crate::Subscription), so a producer that
/// subscribes to another stream can hand that subscription back as its teardown.
pub trait Unsubscribe: Send + Sync + 'static {
    /// Cancels the underlying work. Must be idempotent.
    fn unsubscribe(&self);
}

/// Cleanup returned by a producer routine.
#[derive(Default)]
pub enum Teardown {
    /// Nothing to release.
    #[default]
    None,
    /// A closure called with no arguments.
    Action(Box<dyn FnOnce() + Send + 'static>),
    /// A handle whose [`Unsubscribe::unsubscribe`] is invoked.
    Handle(Box<dyn Unsubscribe>),
}

impl Teardown {
    /// Wraps a closure.
    pub fn action<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Teardown::Action(Box::new(f))
    }

    /// Wraps an [`Unsubscribe`] handle.
    pub fn handle<U: Unsubscribe>(handle: U) -> Self {
        Teardown::Handle(Box::new(handle))
    }

    pub(crate) fn run(self) {
        match self {
            Teardown::None => {}
            Teardown::Action(f) => f(),
            Teardown::Handle(h) => h.unsubscribe(),
        }
    }
}

impl From<()> for Teardown {
    fn from((): ()) -> Self {
        Teardown::None
    }
}

impl fmt::Debug for Teardown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Teardown::None => f.write_str("Teardown::None"),
            Teardown::Action(_) => f.write_str("Teardown::Action(..)"),
            Teardown::Handle(_) => f.write_str("Teardown::Handle(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter(Arc<AtomicUsize>);

    impl Unsubscribe for Counter {
        fn unsubscribe(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_run_dispatches_by_kind() {
        let calls = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&calls);
        Teardown::action(move || {
            c.fetch_add(1, Ordering::SeqCst);
        })
        .run();
        Teardown::handle(Counter(Arc::clone(&calls))).run();
        Teardown::from(()).run();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
