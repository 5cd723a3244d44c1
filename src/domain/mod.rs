//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input observations and the validated `TimeSeries`
//! - model kinds and fit outputs (`FittedModel`, `FitQuality`)
//! - per-entity and cross-entity results (`ForecastResult`, `ComparisonDataset`)
//! - run configuration (`AnalysisConfig`, `SolverOptions`)

pub mod types;

pub use types::*;
