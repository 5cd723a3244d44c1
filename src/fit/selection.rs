//! Model selection (Linear vs Exponential vs Asymptotic) using AIC.
//!
//! The tool fits every model kind and computes:
//! - RSS / RMSE
//! - AIC = n * (ln(2π) + ln(RSS/n) + 1) + 2k, with k = parameters + 1 (variance)
//!
//! Selection rules:
//! 1. Models whose fitter failed are excluded (recorded as skipped)
//! 2. Choose the model with minimum AIC
//! 3. Exact AIC ties go to the simpler kind (`Linear < Exponential < Asymptotic`)

use std::cmp::Ordering;
use std::f64::consts::PI;

use rayon::prelude::*;

use crate::domain::{CandidateSummary, FitDiagnostics, FittedModel, ModelKind, SkippedModel, SolverOptions, TimeSeries};
use crate::error::{FitError, SelectionError};
use crate::fit::fitter::fit_model;

/// Floor on the ML variance estimate so exact fits keep a finite AIC.
const MIN_VARIANCE: f64 = 1e-12;

/// Output of fitting + selection.
#[derive(Debug, Clone)]
pub struct FitSelection {
    pub best: FittedModel,
    /// Every successful fit, in priority order.
    pub fits: Vec<FittedModel>,
    /// Models whose fitter failed and why.
    pub skipped: Vec<(ModelKind, FitError)>,
}

impl FitSelection {
    /// Akaike weights `exp(-Δ/2) / Σ exp(-Δ/2)` for each successful fit.
    pub fn akaike_weights(&self) -> Vec<(ModelKind, f64)> {
        let best_aic = self.best.aic();
        let raw: Vec<f64> = self
            .fits
            .iter()
            .map(|f| (-(f.aic() - best_aic) / 2.0).exp())
            .collect();
        let total: f64 = raw.iter().sum();
        self.fits
            .iter()
            .zip(raw)
            .map(|(f, w)| (f.kind, w / total))
            .collect()
    }

    pub fn diagnostics(&self) -> FitDiagnostics {
        let best_aic = self.best.aic();
        let candidates = self
            .fits
            .iter()
            .zip(self.akaike_weights())
            .map(|(f, (_, weight))| CandidateSummary {
                kind: f.kind,
                rss: f.quality.rss,
                aic: f.aic(),
                delta_aic: f.aic() - best_aic,
                akaike_weight: weight,
            })
            .collect();
        let skipped = self
            .skipped
            .iter()
            .map(|(kind, err)| SkippedModel {
                kind: *kind,
                reason: err.to_string(),
            })
            .collect();
        FitDiagnostics { candidates, skipped }
    }
}

/// Gaussian AIC with the maximum-likelihood variance `RSS / n`.
///
/// `param_count` excludes the variance; one is added here.
pub fn aic(n: usize, rss: f64, param_count: usize) -> f64 {
    let n_f = n as f64;
    let variance = (rss / n_f).max(MIN_VARIANCE);
    let k = (param_count + 1) as f64;
    n_f * ((2.0 * PI).ln() + variance.ln() + 1.0) + 2.0 * k
}

/// Pick the minimum-AIC fit; ties go to the higher-priority kind.
pub fn select(fits: &[FittedModel]) -> Result<FittedModel, SelectionError> {
    fits.iter()
        .min_by(|a, b| {
            a.aic()
                .partial_cmp(&b.aic())
                .unwrap_or(Ordering::Equal)
                .then(a.kind.cmp(&b.kind))
        })
        .cloned()
        .ok_or(SelectionError::NoViableModel)
}

/// Fit all three kinds in parallel and select the best one.
///
/// Acts as a barrier: selection only starts once every fit attempt has
/// finished, successfully or not.
pub fn fit_and_select(series: &TimeSeries, opts: &SolverOptions) -> Result<FitSelection, SelectionError> {
    let span = tracing::Span::current();
    let attempts: Vec<(ModelKind, Result<FittedModel, FitError>)> = ModelKind::ALL
        .par_iter()
        .map(|&kind| span.in_scope(|| (kind, fit_model(kind, series, opts))))
        .collect();

    let mut fits = Vec::new();
    let mut skipped = Vec::new();
    for (kind, attempt) in attempts {
        match attempt {
            Ok(fit) if fit.aic().is_finite() => fits.push(fit),
            Ok(_) => skipped.push((
                kind,
                FitError::NoConvergence {
                    kind,
                    reason: "non-finite AIC".to_string(),
                },
            )),
            Err(err) => skipped.push((kind, err)),
        }
    }

    let best = select(&fits)?;
    tracing::debug!(best = %best.kind, aic = best.aic(), skipped = skipped.len(), "model selected");

    Ok(FitSelection { best, fits, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FitQuality;

    fn fake_fit(kind: ModelKind, aic: f64) -> FittedModel {
        FittedModel {
            kind,
            params: vec![0.0, 0.0],
            origin_year: 2000,
            quality: FitQuality {
                rss: 1.0,
                rmse: 1.0,
                aic,
                n: 10,
            },
        }
    }

    #[test]
    fn aic_penalizes_larger_rss() {
        assert!(aic(10, 100.0, 2) > aic(10, 10.0, 2));
        // Same RSS, same k: identical score regardless of kind.
        assert_eq!(aic(10, 5.0, 2), aic(10, 5.0, 2));
    }

    #[test]
    fn aic_stays_finite_for_exact_fits() {
        assert!(aic(11, 0.0, 2).is_finite());
        assert_eq!(aic(11, 0.0, 2), aic(11, 1e-30, 2));
    }

    #[test]
    fn select_prefers_minimum_aic() {
        let fits = vec![
            fake_fit(ModelKind::Linear, 12.0),
            fake_fit(ModelKind::Exponential, 9.5),
            fake_fit(ModelKind::Asymptotic, 11.0),
        ];
        assert_eq!(select(&fits).unwrap().kind, ModelKind::Exponential);
    }

    #[test]
    fn ties_go_to_priority_order() {
        let fits = vec![
            fake_fit(ModelKind::Asymptotic, 7.0),
            fake_fit(ModelKind::Exponential, 7.0),
            fake_fit(ModelKind::Linear, 7.0),
        ];
        assert_eq!(select(&fits).unwrap().kind, ModelKind::Linear);

        let fits = vec![fake_fit(ModelKind::Asymptotic, 7.0), fake_fit(ModelKind::Exponential, 7.0)];
        assert_eq!(select(&fits).unwrap().kind, ModelKind::Exponential);
    }

    #[test]
    fn empty_fit_set_has_no_viable_model() {
        assert_eq!(select(&[]).unwrap_err(), SelectionError::NoViableModel);
    }

    #[test]
    fn akaike_weights_sum_to_one() {
        let fits = vec![fake_fit(ModelKind::Linear, 10.0), fake_fit(ModelKind::Exponential, 12.0)];
        let selection = FitSelection {
            best: fits[0].clone(),
            fits,
            skipped: vec![],
        };
        let weights = selection.akaike_weights();
        let total: f64 = weights.iter().map(|(_, w)| w).sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert!(weights[0].1 > weights[1].1);

        let diag = selection.diagnostics();
        assert_eq!(diag.candidates[1].delta_aic, 2.0);
    }
}
