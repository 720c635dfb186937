//! optimization — MLE stack, numerical helpers, and unified error surface.
//!
//! Purpose
//! -------
//! Provide a cohesive optimization layer for model fitting, combining an
//! Argmin-backed two-stage log-likelihood maximizer, numerically stable
//! likelihood terms, and a single error/result surface. Callers implement a
//! log-likelihood, choose tolerances, and obtain fitted parameters, a
//! covariance estimate and diagnostics without touching backend solver
//! details.
//!
//! Key behaviors
//! -------------
//! - Expose a high-level API for **maximizing log-likelihoods** `ℓ(θ)`
//!   (`loglik_optimizer`), including configuration of both stages and of
//!   the covariance source.
//! - Supply shared numerical primitives (`numerical_stability`) for the
//!   outlier-robust per-point terms and for eigenvalue truncation.
//! - Normalize configuration issues, data problems, numerical failures, and
//!   backend solver errors into a single enum (`errors::OptError`) with a
//!   common result alias (`OptResult<T>`).
//!
//! Invariants & assumptions
//! ------------------------
//! - Optimizers assume that inputs are finite once validation has passed;
//!   invalid states are reported as `OptError`, not panics.
//! - Log-likelihood implementations treat domain violations (e.g. a model
//!   returning the wrong number of predictions) as recoverable errors
//!   surfaced through the optimization layer.
//!
//! Conventions
//! -----------
//! - All solvers conceptually maximize a log-likelihood `ℓ(θ)` by minimizing
//!   an internal cost `c(θ) = -ℓ(θ)`; user-facing APIs and outcomes are
//!   expressed in terms of `ℓ`.
//! - Parameters, gradients, and Hessians are represented using `ndarray`-
//!   based aliases (`Theta`, `Grad`, `Hessian`).
//! - Public optimization entrypoints that can fail return `OptResult<T>`;
//!   callers never see raw Argmin errors.
//! - This module avoids I/O; progress output exists only behind the
//!   `obs_slog` feature and the `verbose` option.
//!
//! Downstream usage
//! ----------------
//! - The `fitting` layer builds `Likelihood` values and calls
//!   `maximize_likelihood` with an initial guess and `MLEOptions` to obtain
//!   an `MLEOutcome`.
//! - Front-ends typically import the curated surface via
//!   `optimization::prelude::*`.
//!
//! Testing notes
//! -------------
//! - Unit tests in the submodules focus on local concerns:
//!   - `loglik_optimizer`: solver wiring, tolerance handling, stage-failure
//!     mapping, and covariance accuracy on Gaussian log-likelihoods.
//!   - `numerical_stability`: agreement with naïve formulas on safe grids,
//!     the removable singularity at zero residual, and tails.
//!   - `errors`: conversions from backend errors into `OptError`.

pub mod errors;
pub mod loglik_optimizer;
pub mod numerical_stability;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use bayesfit::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
