//! `citation-forecast` library crate.
//!
//! Fits competing growth models (linear, exponential, asymptotic) to a
//! researcher's cumulative citation history, picks one by AIC, and
//! extrapolates it forward. The crate is a pure transformation:
//!
//! - no data retrieval (histories are handed in, see `data::HistorySource`)
//! - no rendering (results are serializable values)
//! - no persisted state
//!
//! ```no_run
//! use citation_forecast::app::analyze;
//! use citation_forecast::domain::{EntityHistory, Observation, YearRange};
//!
//! let history = EntityHistory::new(
//!     "smith",
//!     (2000..=2010).map(|y| Observation::new(y, (5 * y - 9990) as u64)).collect(),
//! );
//! let batch = analyze(&[history], YearRange::new(1990, 2025).unwrap(), 10);
//! let dataset = batch.comparison();
//! assert_eq!(dataset.rows.len(), 11 + 10);
//! ```

pub mod app;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod forecast;
pub mod math;
pub mod models;
pub mod report;
