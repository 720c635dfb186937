//! fitting — maximum-likelihood curve fitting.
//!
//! Purpose
//! -------
//! Turn a model function, an initial guess and noisy data into best-fit
//! parameters with a covariance estimate. Each fitting mode builds a
//! [`Likelihood`] and maximizes it with the two-stage optimizer in
//! `optimization::loglik_optimizer`.
//!
//! Key behaviors
//! -------------
//! - [`least_squares`]: ordinary least squares, or with `noise_scaling`
//!   the marginalized-noise variant whose covariance is scaled by the
//!   reduced chi-square.
//! - [`outlier_fit`]: conservative or Cauchy outlier-robust likelihoods.
//! - [`fit_likelihood`]: the shared path, usable with a hand-built
//!   [`Likelihood`].
//! - [`get_result`]: `(p, √diag(cov))` from a [`FitResult`] or a `(p, cov)`
//!   pair.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are validated by [`FitData::new`] and `LogLikelihood::check`
//!   before any optimizer runs.
//! - Results are immutable and keep their likelihood, so `L(p)` remains
//!   callable after the fit.
//!
//! Conventions
//! -----------
//! - The error scale in [`FitData`] is `yerr` for least squares and
//!   `sigma0` for outlier fits.
//! - Fallible operations return `OptResult<T>`; [`get_result`] is
//!   infallible.
//!
//! Downstream usage
//! ----------------
//! - `posterior::PosteriorProfile` consumes a [`FitResult`].
//! - Downstream crates can `use bayesfit::fitting::prelude::*;`.

pub mod data;
pub mod least_squares;
pub mod likelihood;
pub mod outlier;
pub mod result;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::data::{ErrorScale, FitData};
pub use self::least_squares::least_squares;
pub use self::likelihood::{
    Likelihood, ModelFunction, ModelSnapshot, OutlierMethod, standardized_residuals,
};
pub use self::outlier::outlier_fit;
pub use self::result::{FitOutput, FitResult, fit_likelihood, get_result};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::data::{ErrorScale, FitData};
    pub use super::least_squares::least_squares;
    pub use super::likelihood::{Likelihood, ModelFunction, OutlierMethod};
    pub use super::outlier::outlier_fit;
    pub use super::result::{FitOutput, FitResult, get_result};
}
