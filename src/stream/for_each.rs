//! # ForEach: drive a stream to its end from async code.
//!
//! [`Stream::for_each`] subscribes immediately and returns a [`ForEach`] future
//! that settles once:
//!
//! | outcome                         | future resolves to                     |
//! |---------------------------------|----------------------------------------|
//! | source completes                | `Ok(())`                               |
//! | source fails with `e`           | `Err(e)`                               |
//! | `f` fails with `e`              | `Err(Error::Raised(e))`, unsubscribed  |
//! | subscription cancelled first    | `Err(Error::Cancelled)`                |
//!
//! The future owns the subscription; dropping it unsubscribes.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use futures::channel::oneshot;
use parking_lot::Mutex;

use crate::core::{Observer, Shared, Subscription};
use crate::error::Error;

use super::stream::Stream;

type Outcome<E> = Result<(), Error<E>>;

/// Settles the future at most once.
struct Settle<E> {
    tx: Mutex<Option<oneshot::Sender<Outcome<E>>>>,
}

impl<E> Settle<E> {
    fn send(&self, outcome: Outcome<E>) {
        if let Some(tx) = self.tx.lock().take() {
            // receiver gone means the future was dropped; nothing left to notify
            let _ = tx.send(outcome);
        }
    }
}

/// Lets the consumer reach its own subscription.
///
/// Values can arrive before `subscribe` returns the handle; a failure seen then
/// is recorded and acted on once the handle is attached.
struct Link<T, E> {
    handle: Option<Weak<Shared<T, E>>>,
    failed: bool,
}

/// Future returned by [`Stream::for_each`].
#[must_use = "dropping a ForEach unsubscribes from the stream"]
pub struct ForEach<T, E> {
    rx: oneshot::Receiver<Outcome<E>>,
    subscription: Subscription<T, E>,
}

impl<T, E> ForEach<T, E> {
    /// The subscription this future drives.
    pub fn subscription(&self) -> &Subscription<T, E> {
        &self.subscription
    }
}

impl<T, E> Future for ForEach<T, E> {
    type Output = Outcome<E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(Error::Cancelled)),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T, E> fmt::Debug for ForEach<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForEach")
            .field("subscription", &self.subscription)
            .finish()
    }
}

impl<T, E> Stream<T, E>
where
    T: Send + 'static,
    E: fmt::Debug + Send + 'static,
{
    /// Calls `f` for every value and resolves when the stream terminates.
    ///
    /// A failing `f` rejects the future and unsubscribes at once.
    ///
    /// # Example
    /// ```rust
    /// use pushgate::Stream;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let res = Stream::<i32, &str>::of([1, 2, 3])
    ///     .for_each(|x| if x == 2 { Err("boom") } else { Ok(()) })
    ///     .await;
    /// assert_eq!(res, Err(pushgate::Error::Raised("boom")));
    /// # }
    /// ```
    pub fn for_each<F>(&self, f: F) -> ForEach<T, E>
    where
        F: Fn(T) -> Result<(), E> + Send + Sync + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let settle = Arc::new(Settle {
            tx: Mutex::new(Some(tx)),
        });
        let link: Arc<Mutex<Link<T, E>>> = Arc::new(Mutex::new(Link {
            handle: None,
            failed: false,
        }));

        let (on_value, on_error, on_complete) =
            (Arc::clone(&settle), Arc::clone(&settle), settle);
        let own = Arc::clone(&link);
        let observer = Observer::<T, E>::new()
            .on_next(move |value: T| {
                if own.lock().failed {
                    return Ok(());
                }
                if let Err(err) = f(value) {
                    on_value.send(Err(Error::Raised(err)));
                    let handle = {
                        let mut link = own.lock();
                        link.failed = true;
                        link.handle.clone()
                    };
                    if let Some(sub) = handle.as_ref().and_then(Subscription::upgrade) {
                        sub.unsubscribe();
                    }
                }
                Ok(())
            })
            .on_error(move |err| {
                on_error.send(Err(err));
                Ok(())
            })
            .on_complete(move || {
                on_complete.send(Ok(()));
                Ok(())
            });

        let subscription = self.subscribe(observer);
        let failed_early = {
            let mut link = link.lock();
            link.handle = Some(subscription.downgrade());
            link.failed
        };
        // `f` failed before the handle was attached
        if failed_early {
            subscription.unsubscribe();
        }

        ForEach { rx, subscription }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::FutureExt;

    use crate::core::{Gate, Teardown};
    use crate::stream::testing::{eager, manual};

    #[test]
    fn test_resolves_after_completion() {
        let (queue, species) = manual("resolve");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        let mut fut = species.of([1, 2, 3]).for_each(move |x: i32| -> Result<(), ()> {
            s.lock().push(x);
            Ok(())
        });

        assert!((&mut fut).now_or_never().is_none());
        queue.run_until_idle();

        assert_eq!(fut.now_or_never(), Some(Ok(())));
        assert_eq!(*seen.lock(), vec![1, 2, 3]);
    }

    #[test]
    fn test_failing_callback_rejects_and_unsubscribes() {
        let (queue, species) = manual("boom");
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let mut fut = species.of([1, 2, 3]).for_each(move |x: i32| {
            c.fetch_add(1, Ordering::SeqCst);
            if x == 2 { Err("boom") } else { Ok(()) }
        });

        queue.run_until_idle();

        assert!(fut.subscription().closed());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!((&mut fut).now_or_never(), Some(Err(Error::Raised("boom"))));
        assert!(queue.take_escaped().is_empty());
    }

    #[test]
    fn test_source_error_rejects() {
        let (queue, species) = manual("source-error");
        let failing: Stream<i32, &'static str> =
            species.make(|_gate: Gate<i32, &'static str>| Err(Error::Raised("down")));

        let fut = failing.for_each(|_| Ok(()));
        queue.run_until_idle();

        assert_eq!(fut.now_or_never(), Some(Err(Error::Raised("down"))));
    }

    #[test]
    fn test_external_unsubscribe_cancels() {
        let (queue, species) = manual("cancel");
        let stream: Stream<i32, &'static str> = species.of([1]);
        let fut = stream.for_each(|_| Ok(()));

        fut.subscription().unsubscribe();
        queue.run_until_idle();

        assert_eq!(fut.now_or_never(), Some(Err(Error::Cancelled)));
    }

    #[test]
    fn test_dropping_future_unsubscribes() {
        let (_queue, species) = manual("drop");
        let teardowns = Arc::new(AtomicUsize::new(0));
        let count = Arc::clone(&teardowns);
        let stream: Stream<i32, &'static str> = species.make(move |_gate: Gate<i32, &'static str>| {
            let count = Arc::clone(&count);
            Ok(Teardown::action(move || {
                count.fetch_add(1, Ordering::SeqCst);
            }))
        });

        drop(stream.for_each(|_| Ok(())));
        assert_eq!(teardowns.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_awaits_on_base_species() {
        let total = Arc::new(AtomicUsize::new(0));
        let t = Arc::clone(&total);

        let res = Stream::<usize, &'static str>::of([1, 2, 3, 4])
            .map(|x| Ok(x * 2))
            .filter(|x| Ok(*x > 4))
            .for_each(move |x| {
                t.fetch_add(x, Ordering::SeqCst);
                Ok(())
            })
            .await;

        assert_eq!(res, Ok(()));
        assert_eq!(total.load(Ordering::SeqCst), 14);
    }

    #[test]
    fn test_failure_before_handle_is_attached_still_unsubscribes() {
        let (queue, species) = eager("eager-fail");
        let teardowns = Arc::new(AtomicUsize::new(0));
        let count = Arc::clone(&teardowns);
        let walker = species.clone();
        let stream: Stream<i32, &'static str> =
            species.make(move |gate: Gate<i32, &'static str>| {
                let count = Arc::clone(&count);
                let job = gate.clone();
                walker.enqueue(move || -> Result<(), Error<&'static str>> {
                    for x in [1, 2, 3] {
                        job.next(x)?;
                    }
                    Ok(())
                });
                Ok(Teardown::action(move || {
                    count.fetch_add(1, Ordering::SeqCst);
                }))
            });

        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let fut = stream.for_each(move |x| {
            c.fetch_add(1, Ordering::SeqCst);
            if x == 2 { Err("boom") } else { Ok(()) }
        });

        assert!(fut.subscription().closed());
        assert_eq!(teardowns.load(Ordering::SeqCst), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(fut.now_or_never(), Some(Err(Error::Raised("boom"))));
        assert!(queue.take_escaped().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_base_species_chain_never_stalls() {
        for _ in 0..200 {
            let total = Arc::new(AtomicUsize::new(0));
            let t = Arc::clone(&total);
            let fut = Stream::<usize, &'static str>::of([1, 2, 3, 4])
                .map(|x| Ok(x * 2))
                .filter(|x| Ok(*x > 4))
                .for_each(move |x| {
                    t.fetch_add(x, Ordering::SeqCst);
                    Ok(())
                });

            let res = tokio::time::timeout(std::time::Duration::from_secs(5), fut).await;
            assert_eq!(res.ok(), Some(Ok(())));
            assert_eq!(total.load(Ordering::SeqCst), 14);
        }
    }
}
