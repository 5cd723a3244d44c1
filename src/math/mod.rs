//! Mathematical utilities: growth basis functions, least squares and
//! Levenberg-Marquardt.

pub mod basis;
pub mod lm;
pub mod ols;

pub use basis::*;
pub use lm::*;
pub use ols::*;
