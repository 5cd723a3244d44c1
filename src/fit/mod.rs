//! Curve fitting orchestration.
//!
//! Responsibilities:
//!
//! - fit each growth model kind to a validated series
//! - run the three fits in parallel
//! - select the best model by AIC

pub mod fitter;
pub mod selection;

pub use fitter::*;
pub use selection::*;
