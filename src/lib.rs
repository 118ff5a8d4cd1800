//! # pushgate
//!
//! **Pushgate** is a push-based event-stream primitive for Rust.
//!
//! A producer emits values over time to a single consumer through a guarded
//! [`Gate`]; every [`Subscription`] has cooperative cancellation and runs its
//! teardown exactly once. Operators build new streams from existing ones while
//! keeping that contract.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   Species (factory + deferred queue)
//!      │ make / of / from_iter / from_slice / from_stream
//!      ▼
//!   ┌──────────────┐   map / filter / reduce / fold    ┌──────────────┐
//!   │    Stream    │ ────────────────────────────────► │    Stream    │
//!   │  (producer)  │     (built through the species)   │  (derived)   │
//!   └──────┬───────┘                                   └──────┬───────┘
//!          │ subscribe(observer)                              │ for_each(f)
//!          ▼                                                  ▼
//!   ┌─────────────────────────────────────┐            ┌──────────────┐
//!   │ Subscription                        │            │   ForEach    │
//!   │  - State (Initializing..Closed)     │            │   (future)   │
//!   │  - Observer (consumer callbacks)    │            └──────────────┘
//!   │  - Teardown (runs exactly once)     │
//!   └──────┬──────────────────────────────┘
//!          │ weak
//!          ▼
//!   ┌──────────────┐   next / error / complete   ┌──────────────┐
//!   │     Gate     │ ──────────────────────────► │   Observer   │
//!   │ (producer's) │   state-checked, in order   │ (consumer's) │
//!   └──────────────┘                             └──────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! subscribe ──► Initializing ──► producer(gate) ──► Ready
//!                                                   │  ▲
//!                                       gate.next() │  │ callback returns
//!                                                   ▼  │
//!                                                  Running
//!
//! Ready ── error / complete / unsubscribe ──► Closed ──► teardown (once)
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                          |
//! |-------------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Protocol**      | Lifecycle state machine, guarded delivery, teardown.         | [`Subscription`], [`Gate`], [`Teardown`]    |
//! | **Consumers**     | Closure or object-style callbacks.                           | [`Observer`], [`Observe`]                   |
//! | **Operators**     | Derived streams built through the source's species.          | [`Stream`], [`Species`]                     |
//! | **Queues**        | Deferred FIFO execution with failure reporting.              | [`Schedule`], [`TokioQueue`], [`ManualQueue`] |
//! | **Errors**        | Typed protocol, operator and escaped-job errors.             | [`Error`], [`Escaped`]                      |
//! | **Configuration** | Names and panic isolation for queues and species.            | [`Config`]                                  |
//!
//! ## Optional features
//! - `logging`: exports a built-in [`LogObserver`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use pushgate::{Observer, Stream};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), pushgate::Error<String>> {
//!     let numbers: Stream<i32, String> = Stream::of([1, 2, 3, 4]);
//!
//!     // Log every signal (optional)
//!     #[cfg(feature = "logging")]
//!     let _logged = numbers.subscribe(Arc::new(pushgate::LogObserver::new("numbers")));
//!     #[cfg(not(feature = "logging"))]
//!     let _logged = numbers.subscribe(Observer::new());
//!
//!     // Derived streams are cold: each await walks the source again
//!     let total = numbers
//!         .map(|x| Ok(x * 2))
//!         .filter(|x| Ok(*x > 4))
//!         .fold(0, |acc, x| Ok(acc + x));
//!
//!     total
//!         .for_each(|sum| {
//!             println!("sum = {sum}");
//!             Ok(())
//!         })
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod queue;
mod stream;

// ---- Public re-exports ----

pub use config::Config;
pub use core::{Gate, Observe, Observer, State, Subscription, Teardown, Unsubscribe};
pub use error::{Error, Escaped};
pub use queue::{Job, ManualQueue, Schedule, TokioQueue};
pub use stream::{ForEach, IntoStream, Species, SpeciesBuilder, Stream};

// Optional: expose a simple built-in logging observer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
mod observers;
#[cfg(feature = "logging")]
pub use observers::LogObserver;
