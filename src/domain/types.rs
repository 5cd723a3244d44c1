//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - handed to a presentation layer as JSON
//! - compared across runs in tests

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default number of forecast years.
pub const DEFAULT_HORIZON: usize = 10;

/// Earliest year accepted by the default year range.
pub const DEFAULT_YEAR_LOW: i32 = 1900;

/// A single `(year, cumulative citations)` point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub year: i32,
    pub citation_count: u64,
}

impl Observation {
    pub fn new(year: i32, citation_count: u64) -> Self {
        Self {
            year,
            citation_count,
        }
    }
}

/// A validated citation history.
///
/// Invariants (established by `data::validate`):
/// - at least `MIN_POINTS` observations
/// - years strictly increasing
///
/// Citation counts are *not* required to be monotone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSeries {
    points: Vec<Observation>,
}

impl TimeSeries {
    /// Wrap observations that are already sorted, deduplicated and long enough.
    pub(crate) fn from_validated(points: Vec<Observation>) -> Self {
        debug_assert!(points.windows(2).all(|w| w[0].year < w[1].year));
        Self { points }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn min_year(&self) -> i32 {
        self.points.first().map(|p| p.year).unwrap_or_default()
    }

    pub fn max_year(&self) -> i32 {
        self.points.last().map(|p| p.year).unwrap_or_default()
    }

    /// Largest citation count in the series (not necessarily the last one).
    pub fn max_count(&self) -> f64 {
        self.points
            .iter()
            .map(|p| p.citation_count as f64)
            .fold(0.0, f64::max)
    }

    /// Years as offsets from the first year (`t = year - minYear`).
    pub fn offsets(&self) -> Vec<f64> {
        let origin = self.min_year();
        self.points
            .iter()
            .map(|p| f64::from(p.year - origin))
            .collect()
    }

    pub fn counts(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.citation_count as f64).collect()
    }
}

/// Inclusive `[low, high]` year filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub low: i32,
    pub high: i32,
}

impl YearRange {
    pub fn new(low: i32, high: i32) -> Result<Self, ConfigError> {
        if low > high {
            return Err(ConfigError::InvalidYearRange { low, high });
        }
        Ok(Self { low, high })
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.low..=self.high).contains(&year)
    }
}

/// Concrete growth model kind.
///
/// Declaration order is the tie-break priority used by model selection
/// (`Linear < Exponential < Asymptotic`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Linear,
    Exponential,
    Asymptotic,
}

impl ModelKind {
    /// All kinds in priority order.
    pub const ALL: [ModelKind; 3] = [ModelKind::Linear, ModelKind::Exponential, ModelKind::Asymptotic];

    /// Human-readable label for display.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Linear => "Linear",
            ModelKind::Exponential => "Exponential",
            ModelKind::Asymptotic => "Asymptotic",
        }
    }

    /// Names of the fitted coefficients, in storage order.
    pub fn param_names(self) -> [&'static str; 2] {
        match self {
            ModelKind::Linear => ["intercept", "slope"],
            ModelKind::Exponential | ModelKind::Asymptotic => ["a", "b"],
        }
    }

    /// Number of fitted coefficients (excludes the residual variance).
    pub fn param_count(self) -> usize {
        self.param_names().len()
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    pub rss: f64,
    pub rmse: f64,
    pub aic: f64,
    pub n: usize,
}

/// A fitted model: kind, coefficients and quality.
///
/// Coefficients are stored in `kind.param_names()` order. Linear coefficients
/// are expressed against the raw year; the nonlinear forms are expressed
/// against `year - origin_year`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    pub kind: ModelKind,
    pub params: Vec<f64>,
    pub origin_year: i32,
    pub quality: FitQuality,
}

impl FittedModel {
    /// Predicted cumulative citations for `year`.
    pub fn predict(&self, year: i32) -> f64 {
        crate::models::predict_year(self.kind, year, self.origin_year, &self.params)
    }

    /// Named coefficients, e.g. `[("a", 812.0), ("b", 0.21)]`.
    pub fn parameters(&self) -> Vec<(&'static str, f64)> {
        self.kind
            .param_names()
            .into_iter()
            .zip(self.params.iter().copied())
            .collect()
    }

    pub fn aic(&self) -> f64 {
        self.quality.aic
    }
}

/// Whether a row is observed history or model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Actual,
    Predicted,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesRow {
    pub year: i32,
    pub citation_count: f64,
    pub source: Source,
}

/// Per-candidate selection summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub kind: ModelKind,
    pub rss: f64,
    pub aic: f64,
    pub delta_aic: f64,
    pub akaike_weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedModel {
    pub kind: ModelKind,
    pub reason: String,
}

/// What happened to every model during selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FitDiagnostics {
    pub candidates: Vec<CandidateSummary>,
    pub skipped: Vec<SkippedModel>,
}

/// Forecast output for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub entity_id: String,
    pub best_model: ModelKind,
    pub model: FittedModel,
    pub actual: Vec<SeriesRow>,
    pub predicted: Vec<SeriesRow>,
    pub diagnostics: FitDiagnostics,
}

impl ForecastResult {
    /// Display label combining entity and chosen model.
    pub fn label(&self) -> String {
        format!("{} ({})", self.entity_id, self.best_model.display_name())
    }
}

/// One labeled row of the cross-entity comparison dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub entity_id: String,
    pub year: i32,
    pub citation_count: f64,
    pub source: Source,
    pub best_model_label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonDataset {
    pub rows: Vec<ComparisonRow>,
}

/// Raw history for one entity, as handed over by the retrieval collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityHistory {
    pub entity_id: String,
    pub observations: Vec<Observation>,
}

impl EntityHistory {
    pub fn new(entity_id: impl Into<String>, observations: Vec<Observation>) -> Self {
        Self {
            entity_id: entity_id.into(),
            observations,
        }
    }
}

/// Externally computed bibliometric summary for one entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityMetrics {
    pub total_papers: f64,
    pub total_citations: f64,
    pub h_index: f64,
    pub research_diversity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricName {
    TotalPapers,
    TotalCitations,
    HIndex,
    ResearchDiversity,
}

impl MetricName {
    pub const ALL: [MetricName; 4] = [
        MetricName::TotalPapers,
        MetricName::TotalCitations,
        MetricName::HIndex,
        MetricName::ResearchDiversity,
    ];

    pub fn value(self, metrics: &EntityMetrics) -> f64 {
        match self {
            MetricName::TotalPapers => metrics.total_papers,
            MetricName::TotalCitations => metrics.total_citations,
            MetricName::HIndex => metrics.h_index,
            MetricName::ResearchDiversity => metrics.research_diversity,
        }
    }
}

/// Nonlinear solver budget and tolerances.
///
/// Fits are reproducible only while `max_iterations` is the binding limit:
/// a fit that runs into `time_budget` depends on machine load.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOptions {
    /// Maximum Levenberg-Marquardt iterations before giving up.
    pub max_iterations: usize,
    /// Wall-clock budget per nonlinear fit.
    pub time_budget: Duration,
    /// Convergence threshold for the relative-offset criterion.
    pub tolerance: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            time_budget: Duration::from_millis(250),
            tolerance: 1e-6,
        }
    }
}

/// A full run's configuration as understood by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub year_range: YearRange,
    pub horizon: usize,
    pub solver: SolverOptions,
}
