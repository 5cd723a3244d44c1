//! Low-level fitting routines for a single model kind.
//!
//! Given a validated series with offsets `t_i = year_i - minYear` and counts
//! `y_i`:
//!
//! - `Linear` is solved in closed form by ordinary least squares on `[1, t]`
//! - `Exponential` / `Asymptotic` are solved by Levenberg-Marquardt from fixed
//!   starting points: `a = 1, b = 0.1` and `a = max(y), b = 0.1`
//!
//! Every successful fit is scored with the same AIC convention
//! (`fit::selection::aic`) so the candidates are comparable.

use nalgebra::{DMatrix, DVector};

use crate::domain::{FitQuality, FittedModel, ModelKind, SolverOptions, TimeSeries};
use crate::error::FitError;
use crate::fit::selection::aic;
use crate::math::{levenberg_marquardt, residual_sum_of_squares, solve_least_squares};
use crate::models::eval_with_gradient;

/// Starting growth/saturation rate for both nonlinear forms.
const INITIAL_RATE: f64 = 0.1;

/// Fit one model kind to a validated series.
pub fn fit_model(kind: ModelKind, series: &TimeSeries, opts: &SolverOptions) -> Result<FittedModel, FitError> {
    let t = series.offsets();
    let y = series.counts();
    let origin_year = series.min_year();

    let (params, rss) = match kind {
        ModelKind::Linear => fit_linear(&t, &y, origin_year)?,
        ModelKind::Exponential => fit_nonlinear(kind, &t, &y, [1.0, INITIAL_RATE], opts)?,
        ModelKind::Asymptotic => fit_nonlinear(kind, &t, &y, [series.max_count(), INITIAL_RATE], opts)?,
    };

    let n = series.len();
    let quality = FitQuality {
        rss,
        rmse: (rss / n as f64).sqrt(),
        aic: aic(n, rss, kind.param_count()),
        n,
    };
    tracing::debug!(model = %kind, ?params, rss, aic = quality.aic, "model fitted");

    Ok(FittedModel {
        kind,
        params,
        origin_year,
        quality,
    })
}

/// OLS on offsets, then re-express the intercept against the raw year.
fn fit_linear(t: &[f64], y: &[f64], origin_year: i32) -> Result<(Vec<f64>, f64), FitError> {
    let n = t.len();
    let mut design = DMatrix::zeros(n, 2);
    for (i, &ti) in t.iter().enumerate() {
        design[(i, 0)] = 1.0;
        design[(i, 1)] = ti;
    }
    let target = DVector::from_column_slice(y);

    let beta = solve_least_squares(&design, &target).ok_or(FitError::Degenerate { kind: ModelKind::Linear })?;
    let (intercept_t, slope) = (beta[0], beta[1]);

    let fitted: Vec<f64> = t.iter().map(|&ti| intercept_t + slope * ti).collect();
    let rss = residual_sum_of_squares(y, &fitted);

    let intercept = intercept_t - slope * f64::from(origin_year);
    Ok((vec![intercept, slope], rss))
}

fn fit_nonlinear(
    kind: ModelKind,
    t: &[f64],
    y: &[f64],
    init: [f64; 2],
    opts: &SolverOptions,
) -> Result<(Vec<f64>, f64), FitError> {
    let curve = |ti: f64, params: &[f64], grad: &mut [f64]| eval_with_gradient(kind, ti, params, grad);

    let solution = levenberg_marquardt(curve, t, y, &init, opts).map_err(|failure| {
        tracing::debug!(model = %kind, %failure, "nonlinear fit failed");
        FitError::NoConvergence {
            kind,
            reason: failure.to_string(),
        }
    })?;

    if solution.params.iter().any(|p| !p.is_finite()) {
        return Err(FitError::NoConvergence {
            kind,
            reason: "non-finite parameters".to_string(),
        });
    }

    Ok((solution.params, solution.rss))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::validate::validate;
    use crate::domain::{Observation, YearRange};

    fn series(points: &[(i32, u64)]) -> TimeSeries {
        let obs: Vec<Observation> = points.iter().map(|&(y, c)| Observation::new(y, c)).collect();
        validate(&obs, YearRange::new(1900, 2100).unwrap()).unwrap()
    }

    #[test]
    fn linear_recovers_exact_line() {
        let pts: Vec<(i32, u64)> = (2000..=2010).map(|y| (y, (5 * y - 9990) as u64)).collect();
        let fit = fit_model(ModelKind::Linear, &series(&pts), &SolverOptions::default()).unwrap();

        assert!((fit.params[1] - 5.0).abs() < 1e-9);
        assert!((fit.params[0] + 9990.0).abs() < 1e-6);
        assert!(fit.quality.rss < 1e-12);
        assert!((fit.predict(2011) - 65.0).abs() < 1e-6);
    }

    #[test]
    fn exponential_recovers_growth_rate() {
        let pts: Vec<(i32, u64)> = (0..12)
            .map(|i| (2005 + i, (20.0 * (0.3 * f64::from(i)).exp()).round() as u64))
            .collect();
        let fit = fit_model(ModelKind::Exponential, &series(&pts), &SolverOptions::default()).unwrap();

        assert!((fit.params[1] - 0.3).abs() < 0.01, "b={}", fit.params[1]);
        assert_eq!(fit.origin_year, 2005);
    }

    #[test]
    fn asymptotic_recovers_ceiling() {
        let pts: Vec<(i32, u64)> = (0..15)
            .map(|i| (1990 + i, (1000.0 * (1.0 - (-0.4 * f64::from(i)).exp())).round() as u64))
            .collect();
        let fit = fit_model(ModelKind::Asymptotic, &series(&pts), &SolverOptions::default()).unwrap();

        assert!((fit.params[0] - 1000.0).abs() < 5.0, "a={}", fit.params[0]);
        assert!((fit.params[1] - 0.4).abs() < 0.01, "b={}", fit.params[1]);
    }

    #[test]
    fn fitting_is_deterministic() {
        let pts = [(2010, 3), (2011, 9), (2012, 14), (2013, 30), (2014, 41), (2015, 70)];
        let s = series(&pts);
        for kind in ModelKind::ALL {
            let a = fit_model(kind, &s, &SolverOptions::default());
            let b = fit_model(kind, &s, &SolverOptions::default());
            assert_eq!(a, b, "{kind} fit changed between runs");
        }
    }

    #[test]
    fn tiny_budget_reports_no_convergence() {
        let pts: Vec<(i32, u64)> = (0..10).map(|i| (2000 + i, 100 * (i as u64 + 1).pow(2))).collect();
        let opts = SolverOptions {
            max_iterations: 1,
            ..SolverOptions::default()
        };

        let err = fit_model(ModelKind::Exponential, &series(&pts), &opts).unwrap_err();
        assert!(matches!(err, FitError::NoConvergence { kind: ModelKind::Exponential, .. }));
    }
}
