//! Pipeline demo.
//!
//! Builds `of → map → filter`, watches it with a [`LogObserver`], then drives it
//! with `for_each` and a `fold`. A second run shows a failing callback rejecting
//! the future and tearing the subscription down.
//!
//! Run with:
//! ```text
//! RUST_LOG=debug cargo run --example pipeline
//! ```

use std::sync::Arc;

use pushgate::{Config, Error, LogObserver, Species, Stream, TokioQueue};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error<String>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = Config::named("demo");
    let queue = Arc::new(TokioQueue::spawn(&cfg));
    let species = Species::builder(cfg).with_queue(queue.clone()).build();

    let evens: Stream<i32, String> = species
        .of(1..=10)
        .map(|x| Ok(x * 3))
        .filter(|x| Ok(x % 2 == 0));

    let _watch = evens.subscribe(Arc::new(LogObserver::new("evens")));

    evens
        .for_each(|x| {
            println!("value {x}");
            Ok(())
        })
        .await?;

    evens
        .fold(0, |acc, x| Ok(acc + x))
        .for_each(|sum| {
            println!("sum {sum}");
            Ok(())
        })
        .await?;

    let rejected = evens
        .for_each(|x| {
            if x > 10 {
                return Err(format!("{x} is too large"));
            }
            Ok(())
        })
        .await;
    println!("rejected: {rejected:?}");

    queue.shutdown();
    Ok(())
}
