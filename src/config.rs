//! # Queue and species configuration.
//!
//! Provides [`Config`], the settings shared by deferred queues and by
//! [`Species::builder`](crate::Species::builder).
//!
//! Config is used in two ways:
//! 1. **Queue creation**: `TokioQueue::spawn(&config)`, `ManualQueue::new(&config)`
//! 2. **Species creation**: `Species::builder(config).build()`

use std::borrow::Cow;

/// Settings for a species and the queue that defers its work.
///
/// ## Field semantics
/// - `name`: label attached to tracing output and to the species identity
/// - `catch_panics`: isolate panics inside scheduled jobs (report and keep going)
#[derive(Clone, Debug)]
pub struct Config {
    /// Human-readable label for logs.
    ///
    /// Prefer short names (e.g., "ui", "ingest"); it shows up as the `queue`
    /// and `species` fields of every tracing event.
    pub name: Cow<'static, str>,

    /// Whether a queue worker catches panics raised by a job.
    ///
    /// - `true` → the panic is reported as [`Escaped::Panicked`](crate::Escaped) and
    ///   the worker moves on to the next job
    /// - `false` → the panic unwinds through the worker (tearing down a Tokio worker
    ///   task, or the caller of `ManualQueue::run_until_idle`)
    pub catch_panics: bool,
}

impl Config {
    /// Creates a configuration with the given name and default settings.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `name = "stream"`
    /// - `catch_panics = true`
    fn default() -> Self {
        Self {
            name: Cow::Borrowed("stream"),
            catch_panics: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_keeps_defaults() {
        let cfg = Config::named("ingest");
        assert_eq!(cfg.name, "ingest");
        assert!(cfg.catch_panics);
    }
}
