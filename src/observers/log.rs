//! # LogObserver: signal printer
//!
//! A minimal consumer that logs every signal it receives through `tracing`.
//! Use it for tests, demos, or to peek into a pipeline.
//!
//! ## Example output
//! ```text
//! INFO pushgate::observers::log: next observer="numbers" value=6
//! INFO pushgate::observers::log: next observer="numbers" value=8
//! INFO pushgate::observers::log: complete observer="numbers"
//! WARN pushgate::observers::log: error observer="numbers" kind="raised" error=stream failed: "boom"
//! ```

use std::borrow::Cow;
use std::fmt;

use crate::core::Observe;
use crate::error::Error;

/// Consumer that logs every signal and handles errors by logging them.
#[derive(Debug, Clone)]
pub struct LogObserver {
    name: Cow<'static, str>,
}

impl LogObserver {
    /// Construct a new [`LogObserver`] labelled `name` in every record.
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self { name: name.into() }
    }

    /// Label used in every record.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Default for LogObserver {
    fn default() -> Self {
        Self::new("LogObserver")
    }
}

impl<T, E> Observe<T, E> for LogObserver
where
    T: fmt::Debug,
    E: fmt::Debug,
{
    fn next(&self, value: T) -> Result<(), Error<E>> {
        tracing::info!(observer = %self.name, value = ?value, "next");
        Ok(())
    }

    fn error(&self, err: Error<E>) -> Result<(), Error<E>> {
        tracing::warn!(observer = %self.name, kind = err.as_label(), error = %err, "error");
        Ok(())
    }

    fn complete(&self) -> Result<(), Error<E>> {
        tracing::info!(observer = %self.name, "complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::core::Observer;
    use crate::stream::testing::manual;

    #[test]
    fn test_handles_every_signal() {
        let log = LogObserver::new("test");
        assert_eq!(Observe::<i32, &str>::next(&log, 1), Ok(()));
        assert_eq!(Observe::<i32, &str>::error(&log, Error::Raised("x")), Ok(()));
        assert_eq!(Observe::<i32, &str>::complete(&log), Ok(()));
    }

    #[test]
    fn test_swallows_stream_errors() {
        let (queue, species) = manual("log");
        let failing = species
            .of([1, 2])
            .map(|x: i32| if x == 2 { Err("boom") } else { Ok(x) });

        let observer: Observer<i32, &'static str> = Arc::new(LogObserver::default()).into();
        let sub = failing.subscribe(observer);
        queue.run_until_idle();

        assert!(sub.closed());
        assert!(queue.take_escaped().is_empty());
    }
}
