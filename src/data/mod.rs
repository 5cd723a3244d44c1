//! Data preparation: series validation, the retrieval boundary, and
//! synthetic sample generation.

pub mod sample;
pub mod source;
pub mod validate;

pub use sample::{SampleConfig, generate_history};
pub use source::{HistorySource, StaticHistorySource};
pub use validate::validate;
