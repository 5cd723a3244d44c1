//! Shared "analysis pipeline" logic.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! validate -> fit (x3, parallel) -> select -> forecast -> aggregate
//!
//! Each entity runs on its own rayon task with no shared mutable state, and
//! every failure stays scoped to the entity that produced it.

use rayon::prelude::*;

use crate::data::{HistorySource, validate};
use crate::domain::{AnalysisConfig, ComparisonDataset, EntityHistory, ForecastResult, SolverOptions, YearRange};
use crate::error::AnalysisError;
use crate::fit::fit_and_select;
use crate::forecast::{actual_rows, forecast, predicted_rows};

/// Result (or error) for one entity of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityOutcome {
    pub entity_id: String,
    pub result: Result<ForecastResult, AnalysisError>,
}

/// All per-entity outcomes of one `analyze` call, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    pub outcomes: Vec<EntityOutcome>,
}

impl BatchResult {
    pub fn successes(&self) -> impl Iterator<Item = &ForecastResult> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &AnalysisError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.entity_id.as_str(), e)))
    }

    pub fn get(&self, entity_id: &str) -> Option<&EntityOutcome> {
        self.outcomes.iter().find(|o| o.entity_id == entity_id)
    }

    /// Comparison dataset over every successful entity.
    pub fn comparison(&self) -> ComparisonDataset {
        let results: Vec<ForecastResult> = self.successes().cloned().collect();
        crate::report::aggregate(&results)
    }

    /// `(entity_id, label)` for display, e.g. `("smith", "smith (Linear)")`.
    pub fn best_model_labels(&self) -> Vec<(String, String)> {
        self.successes().map(|r| (r.entity_id.clone(), r.label())).collect()
    }
}

/// Run the full pipeline for one entity.
pub fn analyze_entity(history: &EntityHistory, config: &AnalysisConfig) -> Result<ForecastResult, AnalysisError> {
    let series = validate(&history.observations, config.year_range)?;
    let selection = fit_and_select(&series, &config.solver)?;
    let predicted = forecast(&series, &selection.best, config.horizon)?;

    tracing::debug!(
        entity = %history.entity_id,
        best = %selection.best.kind,
        n = series.len(),
        horizon = config.horizon,
        "entity analyzed"
    );

    Ok(ForecastResult {
        entity_id: history.entity_id.clone(),
        best_model: selection.best.kind,
        diagnostics: selection.diagnostics(),
        model: selection.best,
        actual: actual_rows(&series),
        predicted: predicted_rows(&predicted),
    })
}

/// Analyze a batch with the default solver budget.
pub fn analyze(entities: &[EntityHistory], year_range: YearRange, horizon: usize) -> BatchResult {
    let config = AnalysisConfig {
        year_range,
        horizon,
        solver: SolverOptions::default(),
    };
    analyze_with_config(entities, &config)
}

/// Analyze a batch; one rayon task per entity, results in input order.
pub fn analyze_with_config(entities: &[EntityHistory], config: &AnalysisConfig) -> BatchResult {
    let span = tracing::debug_span!("analyze", entities = entities.len());

    // Entered per task: rayon workers do not inherit the caller's span.
    let outcomes = entities
        .par_iter()
        .map(|history| {
            span.in_scope(|| EntityOutcome {
                entity_id: history.entity_id.clone(),
                result: analyze_entity(history, config),
            })
        })
        .collect();

    BatchResult { outcomes }
}

/// Fetch each entity from `source`, then analyze the batch.
///
/// Retrieval failures are reported for that entity only, unchanged.
pub fn analyze_from_source<S>(source: &S, entity_ids: &[String], config: &AnalysisConfig) -> BatchResult
where
    S: HistorySource + ?Sized,
{
    let fetched: Vec<Result<EntityHistory, AnalysisError>> = entity_ids
        .iter()
        .map(|id| {
            source
                .fetch_history(id)
                .map(|observations| EntityHistory::new(id.clone(), observations))
                .map_err(AnalysisError::from)
        })
        .collect();

    let span = tracing::debug_span!("analyze", entities = entity_ids.len());

    let outcomes = fetched
        .into_par_iter()
        .zip(entity_ids.par_iter())
        .map(|(history, id)| {
            span.in_scope(|| EntityOutcome {
                entity_id: id.clone(),
                result: history.and_then(|h| analyze_entity(&h, config)),
            })
        })
        .collect();

    BatchResult { outcomes }
}
