//! loglik_optimizer::types — shared numeric aliases and solver wiring.
//!
//! Purpose
//! -------
//! Centralize the core numeric types and solver aliases used by the
//! two-stage log-likelihood optimizer. By defining these in one place, the
//! rest of the optimization code can stay agnostic to `ndarray` and Argmin
//! generics and can more easily evolve if the backend changes.
//!
//! Key behaviors
//! -------------
//! - Define canonical aliases for parameter vectors, gradients, Hessians,
//!   and scalar costs (`Theta`, `Grad`, `Hessian`, `Cost`).
//! - Provide a standard map type for Argmin function-evaluation counters
//!   (`FnEvalMap`).
//! - Expose pre-wired Nelder–Mead and BFGS solver aliases, plus the
//!   `IterState` shape the BFGS stage runs on.
//!
//! Invariants & assumptions
//! ------------------------
//! - All optimizer vectors and matrices are `ndarray` containers over `f64`.
//! - BFGS carries its inverse Hessian estimate in the `H` slot of
//!   `IterState`; that matrix is what the optimizer reports as covariance.
//!
//! Testing notes
//! -------------
//! - This module only defines type aliases and constants; correctness is
//!   exercised by the surrounding optimizer modules.
use argmin::core::IterState;
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    neldermead::NelderMead,
    quasinewton::BFGS,
};
use ndarray::{Array1, Array2};
use std::collections::HashMap;

/// Parameter vector `θ` for log-likelihood optimization.
pub type Theta = Array1<f64>;

/// Gradient vector `∇ℓ(θ)` or `∇c(θ)` for optimization.
pub type Grad = Array1<f64>;

/// Dense `n × n` matrix for second-order information (Hessians, inverse
/// Hessians, covariances).
pub type Hessian = Array2<f64>;

/// Scalar objective value used by the optimizer.
///
/// In this crate, this is the cost `c(θ) = -ℓ(θ)` derived from a
/// log-likelihood `ℓ(θ)`.
pub type Cost = f64;

/// Function-evaluation counters as reported by the solver.
///
/// Maps human-readable counter names (e.g., `"cost_count"`) to counts.
pub type FnEvalMap = HashMap<String, u64>;

/// Relative simplex displacement for non-zero coordinates of the initial guess.
pub const SIMPLEX_NONZERO_DELTA: f64 = 0.05;

/// Absolute simplex displacement for zero coordinates of the initial guess.
pub const SIMPLEX_ZERO_DELTA: f64 = 0.00025;

/// Hager–Zhang line search specialized to this crate’s numeric types.
pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;

/// More–Thuente line search specialized to this crate’s numeric types.
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

/// BFGS solver wired to the Hager–Zhang line search.
pub type BfgsHagerZhang = BFGS<HagerZhangLS, Cost>;

/// BFGS solver wired to the More–Thuente line search.
pub type BfgsMoreThuente = BFGS<MoreThuenteLS, Cost>;

/// Derivative-free simplex solver used by the initial stage.
pub type SimplexSolver = NelderMead<Theta, Cost>;

/// Solver state of the BFGS stage (inverse Hessian lives in the `H` slot).
pub type QuasiNewtonState = IterState<Theta, Grad, (), Hessian, (), Cost>;
