//! Delivery protocol core: subscriptions, gates, consumers and teardown.
//!
//! ```text
//! Stream::subscribe(observer)
//!        │
//!        ▼
//!  Subscription ──(strong)──► Shared { state, observer, teardown }
//!                                 ▲
//!  producer(Gate) ──(weak)────────┘
//!        │ next / error / complete
//!        ▼
//!  Gate validates state ──► Observer callbacks ──► teardown on terminal signal
//! ```
//!
//! Internal modules:
//! - [`state`]: lifecycle states and the delivery guard;
//! - [`subscription`]: the lifecycle owner and its teardown slot;
//! - [`gate`]: the push protocol;
//! - [`observer`]: consumer callbacks;
//! - [`teardown`]: cleanup actions.

mod gate;
mod observer;
mod state;
mod subscription;
mod teardown;

pub use gate::Gate;
pub use observer::{Observe, Observer};
pub use state::State;
pub use subscription::Subscription;
pub use teardown::{Teardown, Unsubscribe};

pub(crate) use subscription::{Producer, Shared};
