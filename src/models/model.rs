//! Model evaluation for the Linear / Exponential / Asymptotic growth curves.
//!
//! The fitter relies on two primitive operations:
//! - evaluate `f(t; θ)` together with its gradient `∂f/∂θ` (for the solver)
//! - predict a citation count for a calendar year (for forecasts)
//!
//! `t` is always `year - origin_year`.

use crate::domain::ModelKind;
use crate::math::{growth, saturation, saturation_db};

/// Evaluate the curve at offset `t` and write `∂f/∂θ` into `grad`.
///
/// For `Linear`, `params` are `[intercept_at_origin, slope]` in offset space.
///
/// # Panics
/// Panics if `params` or `grad` are shorter than `model.param_count()`.
pub fn eval_with_gradient(model: ModelKind, t: f64, params: &[f64], grad: &mut [f64]) -> f64 {
    match model {
        ModelKind::Linear => {
            grad[0] = 1.0;
            grad[1] = t;
            params[0] + params[1] * t
        }
        ModelKind::Exponential => {
            let (a, b) = (params[0], params[1]);
            let e = growth(t, b);
            grad[0] = e;
            grad[1] = a * t * e;
            a * e
        }
        ModelKind::Asymptotic => {
            let (a, b) = (params[0], params[1]);
            grad[0] = saturation(t, b);
            grad[1] = a * saturation_db(t, b);
            a * grad[0]
        }
    }
}

/// Predict the citation count at `year`.
///
/// Linear coefficients are stored against the raw year; the nonlinear forms
/// are evaluated at `year - origin_year`.
pub fn predict_year(model: ModelKind, year: i32, origin_year: i32, params: &[f64]) -> f64 {
    match model {
        ModelKind::Linear => params[0] + params[1] * f64::from(year),
        ModelKind::Exponential => {
            let t = f64::from(year - origin_year);
            params[0] * growth(t, params[1])
        }
        ModelKind::Asymptotic => {
            let t = f64::from(year - origin_year);
            params[0] * saturation(t, params[1])
        }
    }
}
