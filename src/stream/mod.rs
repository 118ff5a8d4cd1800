//! Streams, the species that builds them, sources and operators.

mod for_each;
mod operators;
mod sources;
mod species;
#[allow(clippy::module_inception)]
mod stream;

pub use for_each::ForEach;
pub use species::{Species, SpeciesBuilder};
pub use stream::{IntoStream, Stream};
