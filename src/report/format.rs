//! Plain-text summaries of fit diagnostics.
//!
//! Formatting lives here so the fitting code stays free of presentation
//! concerns. Functions return `String`s; printing is up to the caller.

use crate::app::pipeline::{BatchResult, EntityOutcome};
use crate::domain::ForecastResult;

/// Format one entity's model diagnostics and chosen model.
pub fn format_entity_summary(result: &ForecastResult) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== {} ===\n", result.entity_id));
    if let (Some(first), Some(last)) = (result.actual.first(), result.actual.last()) {
        out.push_str(&format!(
            "History: n={} | years=[{}, {}] | citations=[{:.0}, {:.0}]\n",
            result.actual.len(),
            first.year,
            last.year,
            first.citation_count,
            last.citation_count
        ));
    }

    out.push_str("\nModel diagnostics:\n");
    for c in &result.diagnostics.candidates {
        let chosen = if c.kind == result.best_model { "*" } else { " " };
        out.push_str(&format!(
            "{chosen} {:<12} RSS={:.3} AIC={:.3} dAIC={:.3} w={:.3}\n",
            c.kind.display_name(),
            c.rss,
            c.aic,
            c.delta_aic,
            c.akaike_weight
        ));
    }
    for s in &result.diagnostics.skipped {
        out.push_str(&format!("  (skipped {}) {}\n", s.kind.display_name(), s.reason));
    }

    out.push_str("\nChosen model:\n");
    out.push_str(&format!("- {}\n", result.best_model.display_name()));
    let quality = &result.model.quality;
    out.push_str(&format!(
        "- n={} RSS={:.3} RMSE={:.3} AIC={:.3}\n",
        quality.n, quality.rss, quality.rmse, quality.aic
    ));
    for (name, value) in result.model.parameters() {
        out.push_str(&format!("- {name}: {value:.6}\n"));
    }

    if let (Some(first), Some(last)) = (result.predicted.first(), result.predicted.last()) {
        out.push_str(&format!(
            "\nForecast: {} -> {:.1} ... {} -> {:.1}\n",
            first.year, first.citation_count, last.year, last.citation_count
        ));
    }

    out
}

/// Format every entity of a batch, failures included.
pub fn format_batch_summary(batch: &BatchResult) -> String {
    let mut out = String::new();
    for EntityOutcome { entity_id, result } in &batch.outcomes {
        match result {
            Ok(forecast) => out.push_str(&format_entity_summary(forecast)),
            Err(err) => out.push_str(&format!("=== {entity_id} ===\nerror: {err}\n")),
        }
        out.push('\n');
    }
    out
}
