//! numerical_stability — numerically robust likelihood terms and tolerances.
//!
//! Purpose
//! -------
//! Collect the numerically stable scalar helpers used by the likelihood
//! library and the shared tolerances used by covariance estimation. This
//! module centralizes small numerical cutoffs so the fitting and inference
//! layers can assume well-conditioned `f64` arithmetic.
//!
//! Key behaviors
//! -------------
//! - Evaluate the conservative outlier term `ln((1 − e^{−R²/2}) / R²)`
//!   without the 0/0 at `R = 0` (`conservative_log_term`).
//! - Evaluate the Cauchy outlier term `−ln(1 + R²/2)` through `ln_1p`
//!   (`cauchy_log_term`).
//! - Expose `EIGEN_EPS`, the eigenvalue floor for pseudoinverses of
//!   observed information matrices.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are squared standardized residuals, hence `≥ 0`; negative
//!   inputs are a caller bug and are not checked.
//! - Non-finite inputs propagate to non-finite outputs; the optimizer
//!   adapter reports those as `NonFiniteCost`.
//!
//! Conventions
//! -----------
//! - Pure functions, no allocation, no logging; suitable for inner loops
//!   over data points.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`transformations`] compare against naïve formulas on
//!   safe grids, check the `R = 0` limit, and check continuity at the
//!   series cutoff.

pub mod transformations;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::transformations::{
    EIGEN_EPS, SMALL_RESIDUAL_SQ, cauchy_log_term, conservative_log_term,
};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use bayesfit::optimization::numerical_stability::prelude::*;
//
// to import the main numerical-stability surface in a single line.

pub mod prelude {
    pub use super::transformations::{EIGEN_EPS, cauchy_log_term, conservative_log_term};
}
