//! loglik_optimizer::finite_diff — finite-difference gradient and Hessian helpers.
//!
//! Purpose
//! -------
//! Provide finite-difference derivative approximations around a parameter
//! vector, together with validation and symmetry cleanup, so that the rest
//! of the optimizer can request derivatives without depending directly on
//! the `finitediff` API.
//!
//! Key behaviors
//! -------------
//! - Compute forward-difference gradients with error capture and
//!   post-hoc validation via [`run_fd_diff`].
//! - Construct central-difference Hessians of a gradient function with a
//!   forward-difference fallback via [`compute_hessian`].
//! - Construct Hessians of a fallible scalar cost from values alone via
//!   [`scaled_cost_hessian`], which nests `finitediff` in step-rescaled
//!   coordinates.
//! - Enforce symmetry of Hessian and covariance matrices in-place using
//!   [`symmetrize_hess`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Parameter vectors, gradients, and Hessians are all represented as
//!   `ndarray` containers over `f64` (`Theta`, `Grad`, `Hessian`).
//! - Any error raised by the objective during finite differencing is routed
//!   into a shared `closure_err` cell and treated as a hard failure.
//! - Gradients and Hessians returned from this module satisfy
//!   [`validate_grad`] and [`validate_hessian`].
//!
//! Conventions
//! -----------
//! - Effective Hessian steps of [`scaled_cost_hessian`] scale with the
//!   parameter magnitude: `h_i = ε^{1/4} · max(|θ_i|, 1)`.
//! - Domain errors are surfaced as [`OptError`](crate::optimization::errors::OptError)
//!   via `OptResult<T>`; Argmin’s [`Error`] is confined to the thin boundary
//!   where finite-difference closures are invoked.
//!
//! Testing notes
//! -------------
//! - Unit tests cover successful and failing paths for the gradient helper,
//!   the central→forward Hessian fallback, curvature recovery on quadratics
//!   at very different scales, error propagation, and symmetrization.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        Grad, Theta,
        types::Hessian,
        validation::{validate_grad, validate_hessian},
    },
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// run_fd_diff — forward-difference gradient with error capture and validation.
///
/// Purpose
/// -------
/// Compute a forward-difference approximation to the gradient of a scalar
/// objective at `theta`, while capturing any error raised inside the
/// evaluation closure and enforcing basic shape/finiteness invariants on
/// the resulting gradient.
///
/// Parameters
/// ----------
/// - `theta`: `&Theta`
///   Point in parameter space at which the gradient should be
///   approximated. The length of `theta` defines the expected gradient
///   dimension.
/// - `func`: `&G`
///   Objective function mapping `theta` to a scalar value. It is assumed to
///   route any evaluation errors into `closure_err` and return `NaN` in that
///   case.
/// - `closure_err`: `&RefCell<Option<Error>>`
///   Shared cell used to capture an [`argmin::core::Error`] raised inside
///   `func`. This helper clears the cell on entry and inspects it after the
///   FD call.
///
/// Returns
/// -------
/// `OptResult<Grad>`
///   - `Ok(grad)` when no error was captured and the gradient passes
///     [`validate_grad`].
///   - `Err(e)` otherwise.
///
/// Errors
/// ------
/// - `OptError` (via `impl From<Error> for OptError`) for errors captured
///   from inside `func`.
/// - `OptError::GradientDimMismatch` / `OptError::InvalidGradient` from
///   [`validate_grad`].
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    let dim = theta.len();
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, dim)?;
    Ok(fd_grad)
}

/// compute_hessian — finite-difference Hessian with validation and symmetry.
///
/// Purpose
/// -------
/// Approximate the Hessian of a vector-valued gradient function at `theta`
/// with `finitediff`, preferring central differences and falling back to
/// forward differences when the central matrix fails validation. The
/// result is symmetrized before being returned.
///
/// Parameters
/// ----------
/// - `f`: `&F`
///   Gradient function mapping `theta` to a `Grad`; each component is
///   differentiated numerically.
/// - `theta`: `&Theta`
///   Evaluation point; its length `n` fixes the `n × n` output shape.
///
/// Errors
/// ------
/// - `OptError::HessianDimMismatch` / `OptError::InvalidHessian` when the
///   forward-difference fallback also fails validation. The central
///   validation error is discarded.
///
/// Notes
/// -----
/// - `finitediff` uses an absolute step of `√ε` per axis, so `f` should be
///   expressed in coordinates where that step is meaningful (see
///   [`scaled_cost_hessian`]).
pub fn compute_hessian<F: Fn(&Theta) -> Grad>(f: &F, theta: &Theta) -> OptResult<Hessian> {
    let dim = theta.len();
    let mut cent_hess = theta.central_hessian(f);
    match validate_hessian(&cent_hess, dim) {
        Ok(_) => {
            symmetrize_hess(&mut cent_hess);
            Ok(cent_hess)
        }
        Err(_) => {
            let mut forward_hess = theta.forward_hessian(f);
            validate_hessian(&forward_hess, dim)?;
            symmetrize_hess(&mut forward_hess);
            Ok(forward_hess)
        }
    }
}

/// scaled_cost_hessian — Hessian of a fallible scalar cost from values alone.
///
/// Purpose
/// -------
/// Approximate `∇²c(θ)` by nesting `finitediff` central differences: the
/// gradient comes from `central_diff` on the cost, and [`compute_hessian`]
/// differentiates that gradient again.
///
/// Both `finitediff` passes step by `√ε` in absolute terms, which nested
/// twice leaves almost no significant digits. The cost is therefore
/// evaluated in rescaled coordinates `θ = θ̂ + D u` with
/// `Dᵢ = ε^{1/4} · max(|θ̂ᵢ|, 1) / √ε`, so that each pass moves `θᵢ` by
/// `hᵢ = ε^{1/4} · max(|θ̂ᵢ|, 1)`. The `u`-space Hessian at `u = 0` is
/// mapped back with `H[i,j] = H_u[i,j] / (Dᵢ Dⱼ)`.
///
/// Parameters
/// ----------
/// - `cost`: `&F`
///   Fallible objective (typically `−ℓ`). The first error it returns is
///   captured and aborts the computation.
/// - `theta`: `&Theta`
///   Evaluation point.
///
/// Errors
/// ------
/// - The first error returned by `cost`.
/// - `OptError::HessianDimMismatch` / `OptError::InvalidHessian` from
///   [`compute_hessian`] or from validating the rescaled matrix.
pub fn scaled_cost_hessian<F>(cost: &F, theta: &Theta) -> OptResult<Hessian>
where
    F: Fn(&Theta) -> OptResult<f64>,
{
    let dim = theta.len();
    let step_scale = f64::EPSILON.powf(0.25) / f64::EPSILON.sqrt();
    let scale: Theta = theta.mapv(|t| step_scale * t.abs().max(1.0));
    let closure_err: RefCell<Option<OptError>> = RefCell::new(None);

    let scaled_cost = |u: &Theta| -> f64 {
        let point = theta + &(u * &scale);
        match cost(&point) {
            Ok(value) => value,
            Err(err) => {
                if closure_err.borrow().is_none() {
                    closure_err.replace(Some(err));
                }
                f64::NAN
            }
        }
    };
    let scaled_grad = |u: &Theta| -> Grad { u.central_diff(&scaled_cost) };

    let scaled_hess = compute_hessian(&scaled_grad, &Theta::zeros(dim));
    if let Some(err) = closure_err.take() {
        return Err(err);
    }
    let mut hess = scaled_hess?;
    for ((i, j), value) in hess.indexed_iter_mut() {
        *value /= scale[i] * scale[j];
    }
    validate_hessian(&hess, dim)?;
    Ok(hess)
}

// ---- Helper methods ----

/// symmetrize_hess — enforce symmetry of a square matrix in-place.
///
/// Replaces each off-diagonal pair `(i, j)` / `(j, i)` with their average,
/// leaving the diagonal untouched. Used for finite-difference Hessians and
/// for the BFGS inverse Hessian before it is reported as a covariance.
///
/// Panics
/// ------
/// - Never panics for square input; callers validate shape first.
pub fn symmetrize_hess(hess: &mut Hessian) {
    for i in 0..hess.nrows() {
        for j in 0..i {
            let avg = 0.5 * (hess[[i, j]] + hess[[j, i]]);
            hess[[i, j]] = avg;
            hess[[j, i]] = avg;
        }
    }
}
