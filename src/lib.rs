//! bayesfit — maximum-likelihood curve fitting with Bayesian error models.
//!
//! Purpose
//! -------
//! Serve as the crate root for fitting parametric models `f(x, p)` to noisy
//! data. Fits maximize a log-likelihood with a derivative-free Nelder–Mead
//! stage followed by a BFGS refinement, and report the best-fit parameters
//! together with a covariance estimate and the likelihood itself.
//!
//! Key behaviors
//! -------------
//! - Ordinary least squares, and least squares with the global noise scale
//!   marginalized under Jeffreys' prior (`fitting::least_squares`).
//! - Outlier-robust fits with conservative or Cauchy error models
//!   (`fitting::outlier_fit`).
//! - Result extraction as `(p, perr)` (`fitting::get_result`), Gaussian
//!   confidence intervals, and posterior profiles for plotting
//!   (`posterior`).
//! - An optional observed-information covariance from a finite-difference
//!   Hessian (`inference`).
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are validated at construction (`fitting::FitData::new`) and
//!   before optimization; invalid input is an `OptError`, never a panic.
//! - Optimization is local: the caller's initial guess must lie in the basin
//!   of the intended maximum.
//!
//! Conventions
//! -----------
//! - Likelihoods are log-likelihoods up to an additive constant.
//! - Vectors and matrices are `ndarray` types (`Theta = Array1<f64>`,
//!   covariance `Array2<f64>`).
//! - All fallible operations return `optimization::errors::OptResult<T>`.
//!
//! Downstream usage
//! ----------------
//! - Most callers only need `fitting::prelude::*` plus
//!   `optimization::loglik_optimizer::MLEOptions`.
//! - Plotting front-ends consume `posterior::PosteriorProfile`.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to the code in every module.
//! - `tests/integration_fitting_pipeline.rs` exercises each fitting mode on
//!   simulated and fixed data sets.

pub mod fitting;
pub mod inference;
pub mod optimization;
pub mod posterior;
