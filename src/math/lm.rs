//! Levenberg-Marquardt nonlinear least squares.
//!
//! Minimizes `Σ (y_i - f(t_i; θ))^2` for small parameter vectors.
//!
//! Each iteration:
//! - evaluates residuals `r` and the Jacobian `J = ∂f/∂θ`
//! - tests convergence with the relative-offset criterion (Bates & Watts):
//!   the share of the residual vector that still lies in the tangent plane
//! - solves the damped step `[J; √λ·D] δ ≈ [r; 0]` with the SVD solver, where
//!   `D` holds the Jacobian column norms (Marquardt scaling)
//!
//! Damping grows ×10 on a rejected step and shrinks ÷10 on an accepted one.
//! The solver gives up when its iteration or wall-clock budget runs out, or
//! when damping explodes (a singular or ill-conditioned problem).

use std::time::Instant;

use nalgebra::{DMatrix, DVector};

use crate::domain::SolverOptions;
use crate::math::solve_least_squares;

const LAMBDA_INIT: f64 = 1e-3;
const LAMBDA_MIN: f64 = 1e-12;
const LAMBDA_MAX: f64 = 1e12;

/// Floor for Marquardt column scaling (keeps flat directions damped).
const SCALE_FLOOR: f64 = 1e-8;

/// RSS below `ZERO_RSS_REL · Σy²` counts as an exact fit.
const ZERO_RSS_REL: f64 = 1e-20;

/// Converged solution.
#[derive(Debug, Clone, PartialEq)]
pub struct LmSolution {
    pub params: Vec<f64>,
    pub rss: f64,
    pub iterations: usize,
}

/// Why the solver stopped without converging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LmFailure {
    IterationBudget(usize),
    TimeBudget(usize),
    Singular,
    NonFinite,
}

impl std::fmt::Display for LmFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LmFailure::IterationBudget(n) => write!(f, "iteration budget exhausted after {n} iterations"),
            LmFailure::TimeBudget(n) => write!(f, "time budget exhausted after {n} iterations"),
            LmFailure::Singular => f.write_str("singular or ill-conditioned step"),
            LmFailure::NonFinite => f.write_str("non-finite model values at the starting point"),
        }
    }
}

struct Evaluation {
    residuals: DVector<f64>,
    jacobian: DMatrix<f64>,
    rss: f64,
}

fn evaluate<F>(f: &F, t: &[f64], y: &[f64], params: &[f64]) -> Option<Evaluation>
where
    F: Fn(f64, &[f64], &mut [f64]) -> f64,
{
    let n = t.len();
    let p = params.len();
    let mut residuals = DVector::zeros(n);
    let mut jacobian = DMatrix::zeros(n, p);
    let mut grad = vec![0.0; p];

    for i in 0..n {
        let value = f(t[i], params, &mut grad);
        if !value.is_finite() || grad.iter().any(|g| !g.is_finite()) {
            return None;
        }
        residuals[i] = y[i] - value;
        for (j, g) in grad.iter().enumerate() {
            jacobian[(i, j)] = *g;
        }
    }

    let rss = residuals.norm_squared();
    rss.is_finite().then_some(Evaluation {
        residuals,
        jacobian,
        rss,
    })
}

/// Relative offset of the residual vector from the tangent plane.
///
/// Returns `None` when the Jacobian is rank-deficient.
fn relative_offset(eval: &Evaluation) -> Option<f64> {
    let (n, p) = eval.jacobian.shape();
    let gn = solve_least_squares(&eval.jacobian, &eval.residuals)?;
    let projected = (&eval.jacobian * gn).norm_squared();
    let orthogonal = (eval.rss - projected).max(0.0);
    let dof = (n - p).max(1) as f64;
    Some((projected / p as f64).sqrt() / (orthogonal / dof).sqrt())
}

/// Minimize the residual sum of squares of `f` starting from `init`.
///
/// `f(t, θ, grad)` returns the model value and writes `∂f/∂θ` into `grad`.
/// Requires `t.len() == y.len()` and `t.len() > init.len()`.
pub fn levenberg_marquardt<F>(
    f: F,
    t: &[f64],
    y: &[f64],
    init: &[f64],
    opts: &SolverOptions,
) -> Result<LmSolution, LmFailure>
where
    F: Fn(f64, &[f64], &mut [f64]) -> f64,
{
    let started = Instant::now();
    let p = init.len();
    let zero_rss = ZERO_RSS_REL * y.iter().map(|v| v * v).sum::<f64>().max(1.0);

    let mut params = init.to_vec();
    let mut current = evaluate(&f, t, y, &params).ok_or(LmFailure::NonFinite)?;
    let mut lambda = LAMBDA_INIT;

    for iteration in 0..opts.max_iterations {
        if current.rss <= zero_rss {
            return Ok(LmSolution {
                params,
                rss: current.rss,
                iterations: iteration,
            });
        }
        if let Some(offset) = relative_offset(&current) {
            tracing::trace!(iteration, rss = current.rss, offset, lambda, "lm iteration");
            if offset < opts.tolerance {
                return Ok(LmSolution {
                    params,
                    rss: current.rss,
                    iterations: iteration,
                });
            }
        }
        if started.elapsed() >= opts.time_budget {
            return Err(LmFailure::TimeBudget(iteration));
        }

        let scales: Vec<f64> = (0..p)
            .map(|j| current.jacobian.column(j).norm().max(SCALE_FLOOR))
            .collect();

        // Inner loop: raise damping until a step reduces the RSS.
        loop {
            let n = t.len();
            let mut a = DMatrix::zeros(n + p, p);
            a.rows_mut(0, n).copy_from(&current.jacobian);
            for (j, s) in scales.iter().enumerate() {
                a[(n + j, j)] = lambda.sqrt() * s;
            }
            let mut b = DVector::zeros(n + p);
            b.rows_mut(0, n).copy_from(&current.residuals);

            let trial = solve_least_squares(&a, &b).and_then(|step| {
                let candidate: Vec<f64> = params.iter().zip(step.iter()).map(|(x, d)| x + d).collect();
                let eval = evaluate(&f, t, y, &candidate)?;
                (eval.rss < current.rss).then_some((candidate, eval))
            });

            match trial {
                Some((candidate, eval)) => {
                    params = candidate;
                    current = eval;
                    lambda = (lambda / 10.0).max(LAMBDA_MIN);
                    break;
                }
                None => {
                    lambda *= 10.0;
                    if lambda > LAMBDA_MAX {
                        return Err(LmFailure::Singular);
                    }
                }
            }
        }
    }

    Err(LmFailure::IterationBudget(opts.max_iterations))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn exp_curve(t: f64, p: &[f64], grad: &mut [f64]) -> f64 {
        let e = (p[1] * t).exp();
        grad[0] = e;
        grad[1] = p[0] * t * e;
        p[0] * e
    }

    #[test]
    fn recovers_exact_exponential() {
        let t: Vec<f64> = (0..10_i32).map(f64::from).collect();
        let y: Vec<f64> = t.iter().map(|&x| 3.0 * (0.25 * x).exp()).collect();

        let sol = levenberg_marquardt(exp_curve, &t, &y, &[1.0, 0.1], &SolverOptions::default()).unwrap();
        assert!((sol.params[0] - 3.0).abs() < 1e-6, "a={}", sol.params[0]);
        assert!((sol.params[1] - 0.25).abs() < 1e-8, "b={}", sol.params[1]);
        assert!(sol.rss < 1e-10);
    }

    #[test]
    fn converges_on_noisy_data() {
        let t: Vec<f64> = (0..12_i32).map(f64::from).collect();
        let noise = [0.3, -0.2, 0.1, -0.4, 0.2, 0.0, -0.1, 0.3, -0.3, 0.1, 0.2, -0.2];
        let y: Vec<f64> = t
            .iter()
            .zip(noise)
            .map(|(&x, e)| 5.0 * (0.2 * x).exp() + e)
            .collect();

        let sol = levenberg_marquardt(exp_curve, &t, &y, &[1.0, 0.1], &SolverOptions::default()).unwrap();
        assert!((sol.params[1] - 0.2).abs() < 0.01);
        assert!(sol.rss > 0.0);
    }

    #[test]
    fn exhausts_iteration_budget() {
        let t: Vec<f64> = (0..10_i32).map(f64::from).collect();
        let y: Vec<f64> = t.iter().map(|&x| 500.0 * (0.3 * x).exp() + x.sin()).collect();
        let opts = SolverOptions {
            max_iterations: 1,
            ..SolverOptions::default()
        };

        let err = levenberg_marquardt(exp_curve, &t, &y, &[1.0, 0.1], &opts).unwrap_err();
        assert_eq!(err, LmFailure::IterationBudget(1));
    }

    #[test]
    fn rejects_non_finite_start() {
        let t = [0.0, 1.0, 2.0];
        let y = [1.0, 2.0, 3.0];
        let err = levenberg_marquardt(exp_curve, &t, &y, &[1.0, 1e6], &SolverOptions::default()).unwrap_err();
        assert_eq!(err, LmFailure::NonFinite);
    }

    #[test]
    fn is_deterministic() {
        let t: Vec<f64> = (0..8_i32).map(f64::from).collect();
        let y = [3.0, 7.0, 8.0, 15.0, 22.0, 30.0, 47.0, 60.0];
        let a = levenberg_marquardt(exp_curve, &t, &y, &[1.0, 0.1], &SolverOptions::default()).unwrap();
        let b = levenberg_marquardt(exp_curve, &t, &y, &[1.0, 0.1], &SolverOptions::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn zero_time_budget_stops_before_the_first_step() {
        let t: Vec<f64> = (0..10_i32).map(f64::from).collect();
        let y: Vec<f64> = t.iter().map(|&x| 100.0 * (x + 1.0).powi(2)).collect();
        let opts = SolverOptions {
            time_budget: Duration::ZERO,
            ..SolverOptions::default()
        };

        let err = levenberg_marquardt(exp_curve, &t, &y, &[1.0, 0.1], &opts).unwrap_err();
        assert_eq!(err, LmFailure::TimeBudget(0));
    }

    #[test]
    fn flat_model_drives_damping_past_the_limit() {
        // Zero gradient everywhere: every damped step is zero and never lowers the RSS.
        let flat = |_t: f64, _p: &[f64], grad: &mut [f64]| {
            grad.fill(0.0);
            0.0
        };
        let t = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 2.0, 3.0, 4.0];

        let err = levenberg_marquardt(flat, &t, &y, &[1.0, 0.1], &SolverOptions::default()).unwrap_err();
        assert_eq!(err, LmFailure::Singular);
    }
}
