//! # Operators.
//!
//! Every operator returns a new [`Stream`] built through the species of its
//! source. The derived producer subscribes to the source once per subscription and
//! returns that inner subscription as its teardown, so closing the derived
//! subscription always unsubscribes from the source.
//!
//! ```text
//! source.map(f).subscribe(consumer)
//!   └─► derived producer(gate)
//!         ├─► source.subscribe(inner observer)   ─► teardown of the derived sub
//!         │      next(v)  ─► f(v) ─Ok(u)─► gate.next(u)
//!         │                     └─Err(e)─► gate.error(Raised(e))
//!         │      error(e) ─► gate.error(e)
//!         │      complete ─► gate.complete()
//!         └─► Ready
//! ```
//!
//! ## Rules
//! - A failing user function is redirected to the derived error channel, never
//!   returned synchronously to the source.
//! - Accumulators (`reduce`, `fold`) keep their state per subscription.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::{Gate, Observer};
use crate::error::Error;

use super::stream::Stream;

/// Where an accumulator starts.
enum Seed<A, T> {
    /// Built fresh for every subscription.
    Value(Arc<dyn Fn() -> A + Send + Sync>),
    /// The first value becomes the accumulator.
    FirstValue(fn(T) -> A),
}

impl<T, E> Stream<T, E>
where
    T: Send + 'static,
    E: fmt::Debug + Send + 'static,
{
    /// Transforms every value with `f`.
    ///
    /// # Example
    /// ```rust
    /// use pushgate::Stream;
    ///
    /// let lengths: Stream<usize, String> = Stream::of(["a", "bb"]).map(|s| Ok(s.len()));
    /// ```
    pub fn map<U, F>(&self, f: F) -> Stream<U, E>
    where
        U: Send + 'static,
        F: Fn(T) -> Result<U, E> + Send + Sync + 'static,
    {
        let source = self.clone();
        let f = Arc::new(f);
        self.species().make(move |gate: Gate<U, E>| {
            let f = Arc::clone(&f);
            let (n, e, c) = (gate.clone(), gate.clone(), gate);
            let inner = source.subscribe(
                Observer::<T, E>::new()
                    .on_next(move |value: T| match f(value) {
                        Ok(mapped) => n.next(mapped),
                        Err(err) => n.error(Error::Raised(err)),
                    })
                    .on_error(move |err| e.error(err))
                    .on_complete(move || c.complete()),
            );
            Ok(inner.into())
        })
    }

    /// Keeps the values for which `f` returns `Ok(true)`.
    pub fn filter<F>(&self, f: F) -> Stream<T, E>
    where
        F: Fn(&T) -> Result<bool, E> + Send + Sync + 'static,
    {
        let source = self.clone();
        let f = Arc::new(f);
        self.species().make(move |gate: Gate<T, E>| {
            let f = Arc::clone(&f);
            let (n, e, c) = (gate.clone(), gate.clone(), gate);
            let inner = source.subscribe(
                Observer::<T, E>::new()
                    .on_next(move |value: T| match f(&value) {
                        Ok(true) => n.next(value),
                        Ok(false) => Ok(()),
                        Err(err) => n.error(Error::Raised(err)),
                    })
                    .on_error(move |err| e.error(err))
                    .on_complete(move || c.complete()),
            );
            Ok(inner.into())
        })
    }

    /// Folds all values into one using the first value as the seed.
    ///
    /// Emits the result and completes when the source completes. A source that
    /// completes without values fails with [`Error::EmptySequence`].
    pub fn reduce<F>(&self, f: F) -> Stream<T, E>
    where
        F: Fn(T, T) -> Result<T, E> + Send + Sync + 'static,
    {
        self.accumulate(Seed::FirstValue(|value| value), f)
    }

    /// Folds all values into one starting from `seed`.
    ///
    /// Every subscription starts from its own clone of `seed`, so an empty source
    /// emits `seed` itself.
    pub fn fold<A, F>(&self, seed: A, f: F) -> Stream<A, E>
    where
        A: Clone + Send + Sync + 'static,
        F: Fn(A, T) -> Result<A, E> + Send + Sync + 'static,
    {
        self.accumulate(Seed::Value(Arc::new(move || seed.clone())), f)
    }

    fn accumulate<A, F>(&self, seed: Seed<A, T>, f: F) -> Stream<A, E>
    where
        A: Send + 'static,
        F: Fn(A, T) -> Result<A, E> + Send + Sync + 'static,
    {
        let source = self.clone();
        let f = Arc::new(f);
        let seed = Arc::new(seed);
        self.species().make(move |gate: Gate<A, E>| {
            let (start, first) = match seed.as_ref() {
                Seed::Value(make) => (Some(make()), None),
                Seed::FirstValue(lift) => (None, Some(*lift)),
            };
            let acc = Arc::new(Mutex::new(start));

            let f = Arc::clone(&f);
            let (acc_n, acc_c) = (Arc::clone(&acc), acc);
            let (n, e, c) = (gate.clone(), gate.clone(), gate);
            let inner = source.subscribe(
                Observer::<T, E>::new()
                    .on_next(move |value: T| {
                        let current = acc_n.lock().take();
                        let folded = match (current, first) {
                            (Some(acc), _) => f(acc, value),
                            (None, Some(lift)) => Ok(lift(value)),
                            // seeded fold after a failed step: the accumulator is gone and
                            // that failure already closed the subscription
                            (None, None) => return Ok(()),
                        };
                        match folded {
                            Ok(next) => {
                                *acc_n.lock() = Some(next);
                                Ok(())
                            }
                            Err(err) => n.error(Error::Raised(err)),
                        }
                    })
                    .on_error(move |err| e.error(err))
                    .on_complete(move || {
                        let result = acc_c.lock().take();
                        match result {
                            Some(value) => {
                                c.next(value)?;
                                c.complete()
                            }
                            None => c.error(Error::EmptySequence),
                        }
                    }),
            );
            Ok(inner.into())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::core::{Subscription, Teardown};
    use crate::stream::testing::manual;

    type Log = Arc<Mutex<Vec<String>>>;

    fn collect<T>(stream: &Stream<T, &'static str>) -> (Subscription<T, &'static str>, Log)
    where
        T: fmt::Debug + Send + 'static,
    {
        let log: Log = Arc::default();
        let (n, e, c) = (Arc::clone(&log), Arc::clone(&log), Arc::clone(&log));
        let sub = stream.subscribe(
            Observer::new()
                .on_next(move |v: T| {
                    n.lock().push(format!("{v:?}"));
                    Ok(())
                })
                .on_error(move |err: Error<&'static str>| {
                    e.lock().push(format!("error {err}"));
                    Ok(())
                })
                .on_complete(move || {
                    c.lock().push("complete".into());
                    Ok(())
                }),
        );
        (sub, log)
    }

    #[test]
    fn test_map_then_filter() {
        let (queue, species) = manual("chain");
        let stream = species
            .of([1, 2, 3, 4])
            .map(|x| Ok(x * 2))
            .filter(|x| Ok(*x > 4));

        let (sub, log) = collect(&stream);
        queue.run_until_idle();

        assert_eq!(*log.lock(), vec!["6", "8", "complete"]);
        assert!(sub.closed());
    }

    #[test]
    fn test_map_failure_goes_to_error_channel() {
        let (queue, species) = manual("map-fail");
        let stream = species
            .of([1, 2, 3])
            .map(|x| if x == 2 { Err("two") } else { Ok(x) });

        let (sub, log) = collect(&stream);
        queue.run_until_idle();

        assert_eq!(*log.lock(), vec!["1", "error stream failed: \"two\""]);
        assert!(sub.closed());
        assert!(queue.take_escaped().is_empty());
    }

    #[test]
    fn test_filter_failure_goes_to_error_channel() {
        let (queue, species) = manual("filter-fail");
        let stream = species
            .of([1, 2])
            .filter(|x| if *x == 1 { Err("bad predicate") } else { Ok(true) });

        let (_sub, log) = collect(&stream);
        queue.run_until_idle();

        assert_eq!(*log.lock(), vec!["error stream failed: \"bad predicate\""]);
    }

    #[test]
    fn test_reduce_sums_values() {
        let (queue, species) = manual("reduce");
        let (_sub, log) = collect(&species.of([1, 2, 3]).reduce(|a, b| Ok(a + b)));
        queue.run_until_idle();

        assert_eq!(*log.lock(), vec!["6", "complete"]);
    }

    #[test]
    fn test_reduce_of_empty_sequence_fails() {
        let (queue, species) = manual("reduce-empty");
        let empty: Stream<i32, &'static str> = species.of([]);
        let (sub, log) = collect(&empty.reduce(|a, b| Ok(a + b)));
        queue.run_until_idle();

        assert_eq!(*log.lock(), vec!["error cannot reduce an empty sequence"]);
        assert!(sub.closed());
    }

    #[test]
    fn test_fold_starts_from_seed() {
        let (queue, species) = manual("fold");
        let (_sub, log) = collect(&species.of([1, 2, 3]).fold(10, |a, b| Ok(a + b)));
        queue.run_until_idle();

        assert_eq!(*log.lock(), vec!["16", "complete"]);
    }

    #[test]
    fn test_fold_of_empty_sequence_emits_seed() {
        let (queue, species) = manual("fold-empty");
        let empty: Stream<i32, &'static str> = species.of([]);
        let (_sub, log) = collect(&empty.fold(String::from("seed"), |a, b| Ok(format!("{a}{b}"))));
        queue.run_until_idle();

        assert_eq!(*log.lock(), vec!["\"seed\"", "complete"]);
    }

    #[test]
    fn test_accumulator_state_is_per_subscription() {
        let (queue, species) = manual("per-sub");
        let totals = species.of([1, 2, 3]).fold(0, |a, b| Ok(a + b));

        let (_first, a) = collect(&totals);
        let (_second, b) = collect(&totals);
        queue.run_until_idle();

        assert_eq!(*a.lock(), vec!["6", "complete"]);
        assert_eq!(*b.lock(), vec!["6", "complete"]);
    }

    #[test]
    fn test_reduce_failure_goes_to_error_channel() {
        let (queue, species) = manual("reduce-fail");
        let stream = species
            .of([1, 2, 3])
            .reduce(|a, b| if b == 3 { Err("overflow") } else { Ok(a + b) });

        let (_sub, log) = collect(&stream);
        queue.run_until_idle();

        assert_eq!(*log.lock(), vec!["error stream failed: \"overflow\""]);
    }

    #[test]
    fn test_fold_failure_stops_accumulating() {
        let (queue, species) = manual("fold-fail");
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let stream = species.of([1, 2, 3, 4]).fold(0, move |a, b| {
            c.fetch_add(1, Ordering::SeqCst);
            if b == 2 { Err("overflow") } else { Ok(a + b) }
        });

        let (sub, log) = collect(&stream);
        queue.run_until_idle();

        assert_eq!(*log.lock(), vec!["error stream failed: \"overflow\""]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(sub.closed());
    }

    #[test]
    fn test_source_error_is_forwarded() {
        let (queue, species) = manual("forward");
        let failing: Stream<i32, &'static str> =
            species.make(|_gate: Gate<i32, &'static str>| Err(Error::Raised("source down")));

        let (sub, log) = collect(&failing.map(|x| Ok(x + 1)));
        queue.run_until_idle();

        assert_eq!(*log.lock(), vec!["error stream failed: \"source down\""]);
        assert!(sub.closed());
    }

    #[test]
    fn test_operators_keep_the_source_species() {
        let (_queue, species) = manual("custom");
        let stream: Stream<i32, &'static str> = species.of([1]);

        assert!(stream.map(|x| Ok(x)).species().is(&species));
        assert!(stream.filter(|_| Ok(true)).species().is(&species));
        assert!(stream.reduce(|a, _| Ok(a)).species().is(&species));
        assert!(stream.fold(0u8, |a, _| Ok(a)).map(|a| Ok(a)).species().is(&species));
    }

    #[test]
    fn test_unsubscribe_reaches_the_source() {
        let (_queue, species) = manual("teardown");
        let teardowns = Arc::new(AtomicUsize::new(0));
        let count = Arc::clone(&teardowns);
        let source: Stream<i32, &'static str> = species.make(move |_gate: Gate<i32, &'static str>| {
            let count = Arc::clone(&count);
            Ok(Teardown::action(move || {
                count.fetch_add(1, Ordering::SeqCst);
            }))
        });

        let (sub, _log) = collect(&source.map(|x| Ok(x * 2)).filter(|_| Ok(true)));
        sub.unsubscribe();
        sub.unsubscribe();

        assert_eq!(teardowns.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_source_completion_closes_the_chain() {
        let (_queue, species) = manual("complete");
        let teardowns = Arc::new(AtomicUsize::new(0));
        let captured: Arc<Mutex<Option<Gate<i32, &'static str>>>> = Arc::default();

        let (count, slot) = (Arc::clone(&teardowns), Arc::clone(&captured));
        let source: Stream<i32, &'static str> = species.make(move |gate: Gate<i32, &'static str>| {
            *slot.lock() = Some(gate);
            let count = Arc::clone(&count);
            Ok(Teardown::action(move || {
                count.fetch_add(1, Ordering::SeqCst);
            }))
        });

        let (sub, log) = collect(&source.map(|x| Ok(x + 1)));
        let gate = captured.lock().take().unwrap();
        gate.next(1).unwrap();
        gate.complete().unwrap();

        assert_eq!(*log.lock(), vec!["2", "complete"]);
        assert!(sub.closed());
        assert_eq!(teardowns.load(Ordering::SeqCst), 1);
    }
}
