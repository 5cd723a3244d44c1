//! Growth model implementations.
//!
//! Models are implemented as small, pure functions so that fitting code can
//! stay generic over the closed set of `ModelKind`s.

pub mod model;

pub use model::*;
