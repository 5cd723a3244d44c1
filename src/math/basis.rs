//! Stable basis functions for the growth curves.
//!
//! - `growth(t, b) = exp(b·t)`
//! - `saturation(t, b) = 1 - exp(-b·t)`
//!
//! Numerical notes:
//! - For small `x = b·t`, `1 - exp(-x)` suffers from catastrophic cancellation.
//!   We use the `expm1` form to keep precision near the origin.
//! - Both functions return `NaN`/`inf` on overflow; callers treat non-finite
//!   predictions as a rejected step rather than a hard error.

/// `exp(b·t)`.
pub fn growth(t: f64, b: f64) -> f64 {
    (b * t).exp()
}

/// `1 - exp(-b·t)` computed as `-expm1(-b·t)`.
pub fn saturation(t: f64, b: f64) -> f64 {
    -(-b * t).exp_m1()
}

/// `d/db [1 - exp(-b·t)] = t·exp(-b·t)`.
pub fn saturation_db(t: f64, b: f64) -> f64 {
    t * (-b * t).exp()
}
