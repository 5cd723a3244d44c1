//! Least squares solver.
//!
//! Every fit in this crate reduces to small least squares problems:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! - the linear model solves this once
//! - each Levenberg-Marquardt step solves an augmented version of it
//!
//! We use SVD so tall (n > p) and rank-deficient systems are handled without
//! panicking. (Nalgebra's `QR::solve` is intended for square systems.)

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // A near-zero singular value means at least one direction is unidentified.
    let max_sv = svd.singular_values.max();
    let min_sv = svd.singular_values.min();
    if !(max_sv.is_finite() && max_sv > 0.0) || min_sv <= max_sv * 1e-13 {
        return None;
    }

    let beta = svd.solve(y, max_sv * 1e-13).ok()?;
    if beta.iter().all(|v| v.is_finite()) {
        Some(beta)
    } else {
        None
    }
}

/// Residual sum of squares `Σ (y_i - ŷ_i)^2`.
pub fn residual_sum_of_squares(y: &[f64], y_hat: &[f64]) -> f64 {
    y.iter()
        .zip(y_hat)
        .map(|(obs, fit)| {
            let r = obs - fit;
            r * r
        })
        .sum()
}
