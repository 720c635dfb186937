//! Numerical stability utilities.
//!
//! Provides safe per-point log terms for the outlier-robust likelihoods,
//! which are prone to cancellation or removable singularities in naïve
//! form, plus the small tolerances shared by the covariance code.
//!
//! # Provided items
//! - [`EIGEN_EPS`]: eigenvalues at or below this fraction of the largest
//!   one (in magnitude) are treated as zero when pseudo-inverting an
//!   observed information matrix.
//! - [`SMALL_RESIDUAL_SQ`]: below this squared residual the conservative
//!   term switches to its series expansion.
//! - [`conservative_log_term(r2)`]: `ln((1 − exp(−r²/2)) / r²)`, finite at
//!   `r = 0` where it equals `ln(1/2)`.
//! - [`cauchy_log_term(r2)`]: `−ln(1 + r²/2)` via `ln_1p`.
//!
//! # Rationale
//! The conservative outlier likelihood has a 0/0 at vanishing residuals.
//! Optimizers routinely try exact fits (e.g. when a model interpolates a
//! point), so the limit must be evaluated explicitly rather than left to
//! floating point.

/// Relative eigenvalue floor for pseudoinverses of observed information
/// matrices: `|λ| ≤ EIGEN_EPS · max|λ|` counts as zero.
pub const EIGEN_EPS: f64 = 1e-12;

/// Squared standardized residual below which the conservative term is
/// evaluated through its Taylor series.
///
/// With `u = r²/2 < 5e-5` the truncated series `1 − u/2 + u²/6` is exact to
/// well below `f64` resolution.
pub const SMALL_RESIDUAL_SQ: f64 = 1e-4;

/// Stable evaluation of `ln((1 − exp(−r²/2)) / r²)`.
///
/// # Parameters
/// - `r2`: squared standardized residual `R² = ((f − y)/σ₀)²`, `≥ 0`.
///
/// # Behavior
/// - For `r2 < SMALL_RESIDUAL_SQ` uses
///   `ln(1/2) + ln_1p(−u/2 + u²/6)` with `u = r2/2`, which is exactly
///   `ln(1/2)` at `r2 = 0`.
/// - Otherwise computes `ln(−expm1(−u)) − ln(r2)`, avoiding the
///   cancellation in `1 − exp(−u)` for moderate `u`.
///
/// # Returns
/// - The per-point log-likelihood contribution. Tends to `−ln(r2)` for
///   large residuals and to `−∞` only when `r2` is infinite.
pub fn conservative_log_term(r2: f64) -> f64 {
    let u = 0.5 * r2;
    if r2 < SMALL_RESIDUAL_SQ {
        (-0.5 * u + u * u / 6.0).ln_1p() - std::f64::consts::LN_2
    } else {
        (-(-u).exp_m1()).ln() - r2.ln()
    }
}

/// Stable evaluation of `−ln(1 + r²/2)`.
pub fn cauchy_log_term(r2: f64) -> f64 {
    -(0.5 * r2).ln_1p()
}
