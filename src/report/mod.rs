//! Reporting utilities: cross-entity comparison and percentile ranks.

use std::collections::BTreeMap;

use crate::domain::{ComparisonDataset, ComparisonRow, EntityMetrics, ForecastResult, MetricName};

pub mod format;

pub use format::*;

/// Merge per-entity results into one labeled dataset.
///
/// Entities keep their input order; within an entity, actual rows come first
/// (ascending year), then predicted rows (ascending year).
pub fn aggregate(results: &[ForecastResult]) -> ComparisonDataset {
    let capacity = results.iter().map(|r| r.actual.len() + r.predicted.len()).sum();
    let mut rows = Vec::with_capacity(capacity);

    for result in results {
        let label = result.label();
        for part in [&result.actual, &result.predicted] {
            let mut sorted = part.clone();
            sorted.sort_by_key(|row| row.year);
            rows.extend(sorted.into_iter().map(|row| ComparisonRow {
                entity_id: result.entity_id.clone(),
                year: row.year,
                citation_count: row.citation_count,
                source: row.source,
                best_model_label: label.clone(),
            }));
        }
    }

    ComparisonDataset { rows }
}

/// Percentile of each entity within the group for one metric.
///
/// `percentile(x) = 100 · |{e : m(e) ≤ m(x)}| / N`, so ties share the
/// higher rank and the maximum is always 100.
pub fn percentile_rank(metrics: &BTreeMap<String, EntityMetrics>, metric: MetricName) -> BTreeMap<String, f64> {
    let values: Vec<f64> = metrics.values().map(|m| metric.value(m)).collect();
    let total = values.len() as f64;

    metrics
        .iter()
        .map(|(entity, m)| {
            let own = metric.value(m);
            let at_or_below = values.iter().filter(|&&v| v <= own).count() as f64;
            (entity.clone(), at_or_below / total * 100.0)
        })
        .collect()
}

/// Percentile ranks for all four metric columns, computed independently.
pub fn percentile_table(
    metrics: &BTreeMap<String, EntityMetrics>,
) -> BTreeMap<MetricName, BTreeMap<String, f64>> {
    MetricName::ALL
        .into_iter()
        .map(|metric| (metric, percentile_rank(metrics, metric)))
        .collect()
}
