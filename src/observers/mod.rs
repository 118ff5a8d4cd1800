//! Ready-made consumers.

mod log;

pub use log::LogObserver;
