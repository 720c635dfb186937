//! loglik_optimizer::builders — solver construction helpers.
//!
//! Purpose
//! -------
//! Provide small, focused builders for the two solvers of the maximization
//! protocol: the Nelder–Mead simplex used by the initial stage and the BFGS
//! quasi-Newton solver used by the refinement stage. These helpers hide
//! Argmin’s generic wiring and apply crate-level options so that higher-level
//! code can request a configured solver without touching Argmin-specific
//! types.
//!
//! Key behaviors
//! -------------
//! - Build the initial simplex around a starting point ([`initial_simplex`])
//!   and wrap it in a Nelder–Mead solver with the configured spread
//!   tolerance ([`build_nelder_mead`]).
//! - Construct BFGS solvers with either Hager–Zhang or More–Thuente line
//!   search ([`build_bfgs_hager_zhang`], [`build_bfgs_more_thuente`]).
//! - Apply optional gradient and cost-change tolerances via a shared
//!   configuration helper ([`configure_bfgs`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - All solvers operate on the canonical optimizer numeric types
//!   [`Theta`], [`Grad`](crate::optimization::loglik_optimizer::Grad) and
//!   [`Cost`] as defined in [`loglik_optimizer::types`](super::types).
//! - Any invalid tolerance passed into Argmin’s `with_*` setters is surfaced
//!   as an [`OptError`](crate::optimization::errors::OptError) via the
//!   crate’s `From<Error>` implementation.
//!
//! Conventions
//! -----------
//! - The builders do **not** set `max_iters`, the starting point of BFGS, or
//!   its initial inverse Hessian; these are runtime concerns applied by the
//!   runners in [`run`](super::run).
//! - The Nelder–Mead builder *does* take the starting point, because Argmin
//!   seeds the simplex from explicit vertices.
//!
//! Testing notes
//! -------------
//! - Unit tests check the simplex geometry (including zero coordinates) and
//!   that valid tolerances are accepted by both BFGS builders.
//! - Full solves are exercised in [`run`](super::run) and [`api`](super::api).
use argmin::solver::quasinewton::BFGS;

use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        traits::{SimplexTolerances, Tolerances},
        types::{
            BfgsHagerZhang, BfgsMoreThuente, Cost, HagerZhangLS, MoreThuenteLS,
            SIMPLEX_NONZERO_DELTA, SIMPLEX_ZERO_DELTA, SimplexSolver, Theta,
        },
    },
};

/// initial_simplex — starting vertices for the Nelder–Mead stage.
///
/// Returns `n + 1` vertices: `theta0` itself followed by one vertex per
/// coordinate `i`, where coordinate `i` is multiplied by
/// `1 + SIMPLEX_NONZERO_DELTA` or, if it is exactly zero, set to
/// `SIMPLEX_ZERO_DELTA`.
pub fn initial_simplex(theta0: &Theta) -> Vec<Theta> {
    let mut vertices = Vec::with_capacity(theta0.len() + 1);
    vertices.push(theta0.clone());
    for i in 0..theta0.len() {
        let mut vertex = theta0.clone();
        vertex[i] = if vertex[i] != 0.0 {
            (1.0 + SIMPLEX_NONZERO_DELTA) * vertex[i]
        } else {
            SIMPLEX_ZERO_DELTA
        };
        vertices.push(vertex);
    }
    vertices
}

/// build_nelder_mead — construct the initial-stage simplex solver.
///
/// Parameters
/// ----------
/// - `theta0`: `&Theta`
///   Starting point; the simplex is built by [`initial_simplex`].
/// - `tols`: `&SimplexTolerances`
///   Provides the cost standard-deviation tolerance. `max_iter` is applied
///   by the runner.
///
/// Errors
/// ------
/// - `OptError` (via `From<argmin::core::Error>`) if Argmin rejects the
///   tolerance.
pub fn build_nelder_mead(theta0: &Theta, tols: &SimplexTolerances) -> OptResult<SimplexSolver> {
    let solver = SimplexSolver::new(initial_simplex(theta0)).with_sd_tolerance(tols.tol_sd)?;
    Ok(solver)
}

/// build_bfgs_hager_zhang — construct BFGS with Hager–Zhang line search.
///
/// Purpose
/// -------
/// Build a [`BfgsHagerZhang`] solver configured with the crate’s standard
/// numeric types and optional tolerances from [`Tolerances`], leaving
/// initial parameters and iteration limits to the caller.
///
/// Returns
/// -------
/// `OptResult<BfgsHagerZhang>`
///   - `Ok(solver)` containing a BFGS instance with Hager–Zhang line search
///     and any configured tolerances.
///   - `Err(e)` if Argmin rejects any of the tolerance settings.
///
/// Examples
/// --------
/// ```ignore
/// let solver = build_bfgs_hager_zhang(&opts.refinement)?;
/// let outcome = run_bfgs(theta0, &opts.refinement, false, problem, solver)?;
/// ```
pub fn build_bfgs_hager_zhang(tols: &Tolerances) -> OptResult<BfgsHagerZhang> {
    let hager_zhang = HagerZhangLS::new();
    let bfgs = BfgsHagerZhang::new(hager_zhang);
    configure_bfgs(bfgs, tols)
}

/// build_bfgs_more_thuente — construct BFGS with More–Thuente line search.
///
/// Same contract as [`build_bfgs_hager_zhang`], using [`MoreThuenteLS`].
/// This is the default refinement solver.
pub fn build_bfgs_more_thuente(tols: &Tolerances) -> OptResult<BfgsMoreThuente> {
    let more_thuente = MoreThuenteLS::new();
    let bfgs = BfgsMoreThuente::new(more_thuente);
    configure_bfgs(bfgs, tols)
}

/// configure_bfgs — apply optional tolerances to a BFGS solver.
///
/// Purpose
/// -------
/// Generic helper that wires tolerance options into an existing BFGS solver,
/// regardless of the line-search type, so builder functions remain thin.
///
/// Parameters
/// ----------
/// - `solver`: `BFGS<L, Cost>`
///   Pre-constructed BFGS solver using some line-search type `L`.
/// - `tols`: `&Tolerances`
///   Source of the optional `tol_grad` and `tol_cost`.
///
/// Errors
/// ------
/// - `OptError` (via `From<argmin::core::Error>`) when Argmin rejects a
///   tolerance.
///
/// Notes
/// -----
/// - When a tolerance is `None`, the corresponding `with_tolerance_*`
///   method is not called; Argmin’s defaults remain in effect.
pub fn configure_bfgs<L>(mut solver: BFGS<L, Cost>, tols: &Tolerances) -> OptResult<BFGS<L, Cost>> {
    if let Some(g) = tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}
