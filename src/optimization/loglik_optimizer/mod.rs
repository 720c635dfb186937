//! loglik_optimizer — two-stage, argmin-powered log-likelihood maximizer.
//!
//! Purpose
//! -------
//! Provide a high-level, Argmin-backed optimization layer for **maximizing
//! log-likelihoods** `ℓ(θ)`. Callers implement a single trait,
//! [`LogLikelihood`] (or wrap a closure in [`FnLikelihood`]), and invoke
//! [`maximize_likelihood`] to run a derivative-free Nelder–Mead stage
//! followed by a BFGS refinement stage, receiving `θ̂`, a covariance
//! estimate and `ℓ(θ̂)`.
//!
//! Key behaviors
//! -------------
//! - Convert log-likelihoods `ℓ(θ)` into Argmin-compatible cost functions
//!   `c(θ) = -ℓ(θ)` via [`adapter::ArgMinAdapter`].
//! - Expose two entry points:
//!   - [`maximize_likelihood`], which wires the Argmin stages from
//!     [`MLEOptions`], and
//!   - [`maximize_likelihood_with`], which runs the same protocol on any
//!     pair of [`LocalMinimizer`] implementations.
//! - Map stage failures onto `OptError::InitialOptimizationFailed` and
//!   `OptError::OptimizationFailed`; a failed initial stage never reaches
//!   the refinement stage.
//! - Report the covariance as the symmetrized BFGS inverse Hessian of the
//!   cost, or optionally as the pseudoinverse of a finite-difference
//!   Hessian ([`CovarianceMethod`]).
//! - Provide finite-difference helpers in [`finite_diff`] for gradients and
//!   Hessians, with post-hoc validation and error capture.
//!
//! Invariants & assumptions
//! ------------------------
//! - The optimizer **always maximizes** a log-likelihood `ℓ(θ)` by
//!   minimizing a cost `c(θ) = -ℓ(θ)`; likelihoods implement `ℓ(θ)` and
//!   `∇ℓ(θ)` (when available), **never** the cost directly.
//! - [`LogLikelihood::value`] and [`LogLikelihood::grad`] treat invalid
//!   inputs as recoverable `OptError` values, not panics.
//! - Vectors and matrices use the canonical aliases [`Theta`], [`Grad`],
//!   [`Hessian`].
//!
//! Conventions
//! -----------
//! - All user-facing diagnostics (including [`OptimOutcome::value`] and
//!   [`MLEOutcome::value`]) are expressed in terms of the log-likelihood `ℓ`.
//! - Errors bubble up as `OptResult<T>`; this module and its children never
//!   intentionally panic or use `unsafe`.
//!
//! Testing notes
//! -------------
//! - Unit tests in submodules cover sign conventions in [`adapter`], solver
//!   construction in [`builders`], stage behavior in [`run`], the protocol
//!   and covariance in [`api`], and configuration invariants in [`traits`].
//! - The integration test under `tests/` drives the optimizer through every
//!   fitting mode.

pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::{maximize_likelihood, maximize_likelihood_with};
pub use self::run::{BfgsStage, NelderMeadStage};
pub use self::traits::{
    CovarianceMethod, FnLikelihood, LineSearcher, LocalMinimizer, LogLikelihood, MLEOptions,
    MLEOutcome, OptimOutcome, SimplexTolerances, Tolerances,
};
pub use self::types::{Cost, FnEvalMap, Grad, Hessian, Theta};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use bayesfit::optimization::loglik_optimizer::prelude::*;
//
// to import the main optimizer surface in a single line.

pub mod prelude {
    pub use super::api::{maximize_likelihood, maximize_likelihood_with};
    pub use super::traits::{
        CovarianceMethod, FnLikelihood, LocalMinimizer, LogLikelihood, MLEOptions, MLEOutcome,
        OptimOutcome, Tolerances,
    };
    pub use super::types::{Cost, Grad, Theta};
}
