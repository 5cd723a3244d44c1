//! Error types for the citation forecasting pipeline.
//!
//! Every error is scoped to a single entity: a batch collects one
//! `Result<ForecastResult, AnalysisError>` per entity and nothing here is
//! globally fatal.

use thiserror::Error;

use crate::domain::ModelKind;

/// Minimum number of observations a series needs after validation.
pub const MIN_POINTS: usize = 3;

/// Problems with the input series itself.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("insufficient data: need at least {needed} observations, got {got}")]
    InsufficientPoints { needed: usize, got: usize },

    #[error("forecast horizon {horizon} past year {last_year} leaves the supported year range")]
    HorizonOutOfRange { last_year: i32, horizon: usize },
}

/// A single model could not be fitted.
///
/// A fit error only removes that model from the candidate set.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    #[error("{} fit did not converge: {reason}", .kind.display_name())]
    NoConvergence { kind: ModelKind, reason: String },

    #[error("{} fit is degenerate (singular design)", .kind.display_name())]
    Degenerate { kind: ModelKind },
}

impl FitError {
    pub fn kind(&self) -> ModelKind {
        match self {
            FitError::NoConvergence { kind, .. } | FitError::Degenerate { kind } => *kind,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectionError {
    #[error("no viable model: every fitter failed")]
    NoViableModel,
}

/// Failure reported by the external history source.
///
/// The core never constructs these on its own behalf; they are passed
/// through unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("could not retrieve history for '{entity_id}': {message}")]
pub struct RetrievalError {
    pub entity_id: String,
    pub message: String,
}

impl RetrievalError {
    pub fn new(entity_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            message: message.into(),
        }
    }
}

/// Invalid run configuration.
///
/// Raised before any entity is analyzed, so it is not part of
/// `AnalysisError`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid year range: low {low} > high {high}")]
    InvalidYearRange { low: i32, high: i32 },

    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: String, value: String },

    #[error("invalid setting: {0}")]
    InvalidSetting(String),
}

/// Per-entity pipeline failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

}

impl AnalysisError {
    /// Stable numeric code for callers that surface errors as status codes.
    pub fn code(&self) -> u8 {
        match self {
            AnalysisError::Data(_) => 3,
            AnalysisError::Selection(_) => 4,
            AnalysisError::Retrieval(_) => 5,
        }
    }
}

pub type Result<T, E = AnalysisError> = std::result::Result<T, E>;
