//! inference::hessian — observed-information covariance utilities.
//!
//! Purpose
//! -------
//! Turn a finite-difference Hessian of the cost `c(θ) = −ℓ(θ)` into a
//! numerically stable covariance estimate. This module handles conversion
//! between `ndarray` and `nalgebra` types and forms eigen-truncated
//! pseudoinverses of symmetric matrices.
//!
//! Key behaviors
//! -------------
//! - Call [`scaled_cost_hessian`] on the negated log-likelihood to obtain
//!   the observed information matrix `J(θ̂) = −∇²ℓ(θ̂)`.
//! - Copy the resulting `ndarray` matrix into a `nalgebra::DMatrix`
//!   (`fill_dmatrix`) for eigen-based linear algebra.
//! - Return the Moore–Penrose pseudoinverse `J⁺` as the covariance
//!   ([`observed_covariance`]).
//! - Invert a covariance back into a precision matrix with
//!   [`precision_matrix`].
//!
//! Invariants & assumptions
//! ------------------------
//! - [`scaled_cost_hessian`] returns a finite, symmetric `n×n` matrix with
//!   `n = θ̂.len()`; this module does **not** re-symmetrize its input.
//! - Eigenvalues with `|λ| ≤ EIGEN_EPS · max|λ|` are treated as zero and
//!   their directions dropped. The cutoff is relative, so a well-determined
//!   problem keeps all its directions whatever the units of `θ`.
//! - Negative eigenvalues are inverted with their sign. A saddle or minimum
//!   of `ℓ` therefore shows up as a negative variance (and a NaN standard
//!   error) instead of being silently dropped.
//!
//! Conventions
//! -----------
//! - The Hessian is on the **summed** log-likelihood scale, so `J⁺` is the
//!   parameter covariance directly.
//! - The covariance uses symmetric eigendecomposition with eigenvalue
//!   truncation; only [`precision_matrix`] forms an explicit inverse.
//! - Errors are reported via [`OptResult<T>`].
//!
//! Testing notes
//! -------------
//! - Unit tests cover the `ndarray → DMatrix` copy, the pseudoinverse of
//!   full-rank, singular, tiny-scale and indefinite matrices, the direct
//!   inverse, and the covariance of Gaussian log-likelihoods with known `Σ`
//!   at ordinary and extreme scales.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{LogLikelihood, Theta, finite_diff::scaled_cost_hessian},
    numerical_stability::transformations::EIGEN_EPS,
};
use nalgebra::DMatrix;
use ndarray::Array2;

/// observed_covariance — covariance from the observed information at `θ̂`.
///
/// Purpose
/// -------
/// Compute `cov = J(θ̂)⁺` where `J(θ̂) = −∇²ℓ(θ̂)` is approximated by nested
/// `finitediff` central differences of the cost.
///
/// Parameters
/// ----------
/// - `f`: `&F`
///   Log-likelihood; must be finite in a neighborhood of `theta_hat`.
/// - `theta_hat`: `&Theta`
///   Evaluation point, usually the refinement-stage optimum.
///
/// Returns
/// -------
/// `OptResult<Array2<f64>>`
///   Symmetric `n×n` covariance estimate.
///
/// Errors
/// ------
/// - Errors from `f.value`.
/// - `OptError::NonFiniteCost` if any evaluation of `ℓ` is non-finite.
/// - `OptError::InvalidHessian` if a Hessian entry is non-finite.
///
/// Examples
/// --------
/// ```rust
/// # use ndarray::array;
/// # use bayesfit::inference::hessian::observed_covariance;
/// # use bayesfit::optimization::loglik_optimizer::{FnLikelihood, Theta};
/// // ℓ(θ) = −½ (4θ₀² + θ₁²): covariance diag(0.25, 1).
/// let ll = FnLikelihood(|t: &Theta| -0.5 * (4.0 * t[0] * t[0] + t[1] * t[1]));
/// let cov = observed_covariance(&ll, &array![0.0, 0.0]).unwrap();
/// assert!((cov[[0, 0]] - 0.25).abs() < 1e-6);
/// assert!((cov[[1, 1]] - 1.0).abs() < 1e-6);
/// ```
pub fn observed_covariance<F: LogLikelihood + ?Sized>(
    f: &F, theta_hat: &Theta,
) -> OptResult<Array2<f64>> {
    let cost = |theta: &Theta| -> OptResult<f64> {
        let value = f.value(theta)?;
        if !value.is_finite() {
            return Err(OptError::NonFiniteCost { value });
        }
        Ok(-value)
    };
    let obs_info = scaled_cost_hessian(&cost, theta_hat)?;
    Ok(pseudo_inverse(&obs_info))
}

/// pseudo_inverse — eigen-truncated pseudoinverse of a symmetric matrix.
///
/// Computes `Q Λ⁺ Qᵀ` from the symmetric eigendecomposition `A = Q Λ Qᵀ`,
/// where `Λ⁺` maps each eigenvalue with `|λ| > EIGEN_EPS · max|λ|` to `1/λ`
/// (sign kept) and zeroes the rest. A zero matrix maps to zero. The input
/// is assumed symmetric; only the symmetric part is meaningful to
/// `symmetric_eigen`.
pub fn pseudo_inverse(matrix: &Array2<f64>) -> Array2<f64> {
    let n = matrix.nrows();
    let mut matrix_nalg = DMatrix::<f64>::zeros(n, matrix.ncols());
    fill_dmatrix(matrix, &mut matrix_nalg);
    let eigen_decomp = matrix_nalg.symmetric_eigen();
    let q = eigen_decomp.eigenvectors;
    let eigenvals = eigen_decomp.eigenvalues;

    let cutoff = EIGEN_EPS * eigenvals.iter().fold(0.0_f64, |acc, l| acc.max(l.abs()));

    let mut inverse = Array2::<f64>::zeros((n, n));
    for (k, &lambda) in eigenvals.iter().enumerate() {
        if lambda.abs() <= cutoff {
            continue;
        }
        for i in 0..n {
            let coeff = q[(i, k)] / lambda;
            for j in 0..n {
                inverse[[i, j]] += coeff * q[(j, k)];
            }
        }
    }
    inverse
}

/// precision_matrix — direct inverse of a covariance matrix.
///
/// Returns `None` when `cov` is not square or is singular, as reported by
/// `nalgebra`'s `try_inverse`.
pub fn precision_matrix(cov: &Array2<f64>) -> Option<Array2<f64>> {
    if !cov.is_square() {
        return None;
    }
    let n = cov.nrows();
    let mut cov_nalg = DMatrix::<f64>::zeros(n, n);
    fill_dmatrix(cov, &mut cov_nalg);
    let inverse = cov_nalg.try_inverse()?;
    Some(Array2::from_shape_fn((n, n), |(i, j)| inverse[(i, j)]))
}

// ---- Helper methods ----

/// fill_dmatrix — copy an `ndarray` matrix into a `nalgebra::DMatrix`.
///
/// Purpose
/// -------
/// Bridge between `ndarray` and `nalgebra` by copying a square matrix into a
/// `DMatrix<f64>` column by column. Symmetry is not modified.
///
/// Panics
/// ------
/// - May panic if the two matrices have inconsistent shapes, due to
///   out-of-bounds indexing. Callers allocate `target` from `source`.
fn fill_dmatrix(source: &Array2<f64>, target: &mut DMatrix<f64>) {
    let n = source.ncols();
    for j in 0..n {
        for i in j..n {
            if j == i {
                target[(i, i)] = source[[i, i]];
            } else {
                target[(i, j)] = source[[i, j]];
                target[(j, i)] = source[[j, i]];
            }
        }
    }
}
