//! High-level entry points for maximizing a `LogLikelihood`.
//!
//! The protocol runs two local minimizations of `−ℓ(θ)` in a fixed order:
//! a derivative-free Nelder–Mead pass from the caller's guess, then a BFGS
//! refinement from the Nelder–Mead optimum. Either stage failing aborts the
//! whole maximization; there is no fallback path.
use crate::{
    inference::hessian::observed_covariance,
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{
            MLEOutcome, Theta,
            finite_diff::symmetrize_hess,
            run::{BfgsStage, NelderMeadStage},
            traits::{CovarianceMethod, LocalMinimizer, LogLikelihood, MLEOptions},
            validation::{validate_hessian, validate_theta0},
        },
    },
};

/// Maximize a log-likelihood `ℓ(θ)` with Nelder–Mead followed by BFGS.
///
/// # Behavior
/// - Builds a [`NelderMeadStage`] from `opts.initial` and a [`BfgsStage`]
///   from `opts.refinement` / `opts.line_searcher`.
/// - Delegates to [`maximize_likelihood_with`] with `opts.covariance`.
///
/// # Errors
/// - [`OptError::InitialOptimizationFailed`] if the simplex stage does not
///   converge or fails in the backend.
/// - [`OptError::OptimizationFailed`] if the BFGS stage does not converge or
///   fails in the backend.
/// - Validation errors for an empty or non-finite `theta0`.
///
/// # Returns
/// An [`MLEOutcome`] with `θ̂`, the symmetric covariance, `ℓ(θ̂)` and both
/// stage diagnostics.
///
/// # Example
/// ```no_run
/// use ndarray::array;
/// use bayesfit::optimization::loglik_optimizer::{
///     FnLikelihood, MLEOptions, maximize_likelihood,
/// };
///
/// // ℓ(θ) = −½ θᵀθ: maximum at the origin, unit covariance.
/// let ll = FnLikelihood(|theta: &ndarray::Array1<f64>| -0.5 * theta.dot(theta));
/// let out = maximize_likelihood(&ll, array![0.4, -0.3], &MLEOptions::default())?;
/// println!("θ̂ = {:?}, cov = {:?}", out.theta_hat, out.cov);
/// # Ok::<(), bayesfit::optimization::errors::OptError>(())
/// ```
pub fn maximize_likelihood<F: LogLikelihood + ?Sized>(
    f: &F, theta0: Theta, opts: &MLEOptions,
) -> OptResult<MLEOutcome> {
    let initial = NelderMeadStage::new(opts.initial, opts.verbose);
    let refinement = BfgsStage::new(opts.refinement, opts.line_searcher, opts.verbose);
    maximize_likelihood_with(f, theta0, &initial, &refinement, opts.covariance)
}

/// Run the two-stage protocol on an arbitrary pair of [`LocalMinimizer`]s.
///
/// # Behavior
/// 1. Validates `theta0` and calls `f.check(&theta0)`.
/// 2. Runs `initial` from `theta0`. A stage error or `converged == false`
///    yields [`OptError::InitialOptimizationFailed`]; `refinement` is never
///    invoked in that case.
/// 3. Runs `refinement` from the initial stage's `θ̂`. A stage error or
///    `converged == false` yields [`OptError::OptimizationFailed`].
/// 4. Builds the covariance:
///    - `QuasiNewton`: the refinement stage's inverse Hessian of the cost
///      (required, else [`OptError::MissingInverseHessian`]). BFGS seeds it
///      with the identity, so when the Nelder–Mead optimum already meets
///      the gradient tolerance the refinement stops after zero iterations
///      and the reported covariance is the identity. Use
///      `FiniteDifference` when that matters.
///    - `FiniteDifference`: pseudoinverse of a central-difference Hessian of
///      the cost at `θ̂`.
///
///    Either way the matrix is symmetrized before it is returned.
///
/// # Errors
/// See the steps above; the stage-failure messages carry the solver status
/// or the underlying error text.
pub fn maximize_likelihood_with<F, A, B>(
    f: &F, theta0: Theta, initial: &A, refinement: &B, covariance: CovarianceMethod,
) -> OptResult<MLEOutcome>
where
    F: LogLikelihood + ?Sized,
    A: LocalMinimizer,
    B: LocalMinimizer,
{
    validate_theta0(&theta0)?;
    f.check(&theta0)?;
    let dim = theta0.len();

    let first = initial
        .minimize(f, theta0)
        .map_err(|e| OptError::InitialOptimizationFailed { message: e.to_string() })?;
    if !first.converged {
        return Err(OptError::InitialOptimizationFailed { message: first.status });
    }

    let second = refinement
        .minimize(f, first.theta_hat.clone())
        .map_err(|e| OptError::OptimizationFailed { message: e.to_string() })?;
    if !second.converged {
        return Err(OptError::OptimizationFailed { message: second.status });
    }

    let mut cov = match covariance {
        CovarianceMethod::QuasiNewton => {
            second.inv_hessian.clone().ok_or(OptError::MissingInverseHessian)?
        }
        CovarianceMethod::FiniteDifference => observed_covariance(f, &second.theta_hat)?,
    };
    validate_hessian(&cov, dim)?;
    symmetrize_hess(&mut cov);

    Ok(MLEOutcome {
        theta_hat: second.theta_hat.clone(),
        cov,
        value: second.value,
        initial: first,
        refinement: second,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::loglik_optimizer::{
        FnEvalMap, OptimOutcome,
        traits::{FnLikelihood, SimplexTolerances},
    };
    use ndarray::{Array2, array};
    use std::cell::Cell;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The stage-failure mapping of the protocol.
    // - That the refinement stage is skipped after an initial failure.
    // - Covariance symmetry and accuracy on a Gaussian log-likelihood.
    // - The identity covariance left by a refinement that stops at once.
    // -------------------------------------------------------------------------

    /// Minimizer stub that returns a canned outcome and counts its calls.
    struct Scripted {
        converged: bool,
        inv_hessian: Option<Array2<f64>>,
        calls: Cell<usize>,
    }

    impl Scripted {
        fn new(converged: bool, inv_hessian: Option<Array2<f64>>) -> Self {
            Self { converged, inv_hessian, calls: Cell::new(0) }
        }
    }

    impl LocalMinimizer for Scripted {
        fn minimize<F: LogLikelihood + ?Sized>(
            &self, f: &F, theta0: Theta,
        ) -> OptResult<OptimOutcome> {
            self.calls.set(self.calls.get() + 1);
            Ok(OptimOutcome {
                value: f.value(&theta0)?,
                theta_hat: theta0,
                converged: self.converged,
                status: if self.converged { "converged".into() } else { "stalled".into() },
                iterations: 0,
                fn_evals: FnEvalMap::new(),
                grad_norm: None,
                inv_hessian: self.inv_hessian.clone(),
            })
        }
    }

    fn flat(_: &Theta) -> f64 {
        0.0
    }

    #[test]
    // Purpose
    // -------
    // A non-converged initial stage fails the protocol before refinement.
    //
    // Given
    // -----
    // - An initial stub reporting `converged = false`.
    // - A refinement stub that would succeed.
    //
    // Expect
    // ------
    // - `InitialOptimizationFailed` carrying the stub status.
    // - The refinement stub is never called.
    fn initial_failure_skips_refinement() {
        // Arrange
        let ll = FnLikelihood(flat);
        let initial = Scripted::new(false, None);
        let refinement = Scripted::new(true, Some(Array2::eye(1)));

        // Act
        let result = maximize_likelihood_with(
            &ll,
            array![1.0],
            &initial,
            &refinement,
            CovarianceMethod::QuasiNewton,
        );

        // Assert
        match result {
            Err(OptError::InitialOptimizationFailed { message }) => assert_eq!(message, "stalled"),
            other => panic!("Expected InitialOptimizationFailed, got {other:?}"),
        }
        assert_eq!(initial.calls.get(), 1);
        assert_eq!(refinement.calls.get(), 0);
    }

    #[test]
    // Purpose
    // -------
    // Refinement non-convergence maps to `OptimizationFailed`, and a
    // converged refinement without inverse Hessian is rejected.
    fn refinement_failures_are_reported() {
        let ll = FnLikelihood(flat);
        let initial = Scripted::new(true, None);

        let stalled = Scripted::new(false, Some(Array2::eye(1)));
        let result = maximize_likelihood_with(
            &ll,
            array![1.0],
            &initial,
            &stalled,
            CovarianceMethod::QuasiNewton,
        );
        assert!(matches!(result, Err(OptError::OptimizationFailed { .. })));

        let no_hessian = Scripted::new(true, None);
        let result = maximize_likelihood_with(
            &ll,
            array![1.0],
            &initial,
            &no_hessian,
            CovarianceMethod::QuasiNewton,
        );
        assert_eq!(result, Err(OptError::MissingInverseHessian));
    }

    #[test]
    // Purpose
    // -------
    // The reported covariance is symmetrized.
    fn quasi_newton_covariance_is_symmetrized() {
        // Arrange
        let ll = FnLikelihood(flat);
        let initial = Scripted::new(true, None);
        let refinement = Scripted::new(true, Some(array![[2.0, 0.4], [0.0, 1.0]]));

        // Act
        let out = maximize_likelihood_with(
            &ll,
            array![1.0, 2.0],
            &initial,
            &refinement,
            CovarianceMethod::QuasiNewton,
        )
        .expect("scripted stages succeed");

        // Assert
        assert_eq!(out.cov[[0, 1]], 0.2);
        assert_eq!(out.cov[[1, 0]], 0.2);
    }

    #[test]
    // Purpose
    // -------
    // A real Nelder–Mead stage capped at one iteration fails the protocol.
    //
    // Given
    // -----
    // - A quadratic log-likelihood started far from its optimum.
    // - `max_iter = 1` for the simplex stage.
    //
    // Expect
    // ------
    // - `InitialOptimizationFailed`.
    fn capped_simplex_stage_fails_protocol() {
        // Arrange
        let ll = FnLikelihood(|t: &Theta| -(t[0] - 3.0).powi(2));
        let opts = MLEOptions {
            initial: SimplexTolerances::new(1e-10, 1).expect("valid simplex tolerances"),
            ..MLEOptions::default()
        };

        // Act
        let result = maximize_likelihood(&ll, array![-100.0], &opts);

        // Assert
        assert!(matches!(result, Err(OptError::InitialOptimizationFailed { .. })));
    }

    #[test]
    // Purpose
    // -------
    // On a Gaussian log-likelihood both covariance methods recover the true
    // covariance `Σ`.
    //
    // Given
    // -----
    // - `ℓ(θ) = −½ (θ − μ)ᵀ Σ⁻¹ (θ − μ)` with `Σ = [[0.5, 0.1], [0.1, 0.2]]`.
    //
    // Expect
    // ------
    // - `θ̂ ≈ μ` within 1e-4 in both cases.
    // - Finite-difference covariance within 1e-4 of `Σ`.
    // - Quasi-Newton covariance symmetric with positive diagonal.
    fn gaussian_covariance_is_recovered() {
        // Arrange
        let mu = array![1.5, -0.5];
        // Σ⁻¹ for Σ = [[0.5, 0.1], [0.1, 0.2]] (det = 0.09).
        let precision = array![[0.2, -0.1], [-0.1, 0.5]] / 0.09;
        let ll = FnLikelihood(move |t: &Theta| {
            let d = t - &mu;
            -0.5 * d.dot(&precision.dot(&d))
        });
        let fd_opts = MLEOptions::default().with_covariance(CovarianceMethod::FiniteDifference);

        // Act
        let fd = maximize_likelihood(&ll, array![1.0, 0.0], &fd_opts).expect("fd fit");
        let qn = maximize_likelihood(&ll, array![1.0, 0.0], &MLEOptions::default())
            .expect("quasi-Newton fit");

        // Assert
        let sigma = array![[0.5, 0.1], [0.1, 0.2]];
        for out in [&fd, &qn] {
            assert!((out.theta_hat[0] - 1.5).abs() < 1e-4, "{:?}", out.theta_hat);
            assert!((out.theta_hat[1] + 0.5).abs() < 1e-4, "{:?}", out.theta_hat);
            assert_eq!(out.cov[[0, 1]], out.cov[[1, 0]]);
            assert!(out.cov[[0, 0]] > 0.0 && out.cov[[1, 1]] > 0.0);
        }
        for ((i, j), &value) in fd.cov.indexed_iter() {
            assert!((value - sigma[[i, j]]).abs() < 1e-4, "cov[{i},{j}] = {value}");
        }
    }

    #[test]
    // Purpose
    // -------
    // A refinement that converges before its first iteration reports the
    // identity seed as its covariance; the finite-difference method still
    // recovers the true variance.
    //
    // Given
    // -----
    // - `ℓ(θ) = −(θ − 1)² / (2·10⁴)`, variance `10⁴`, started at `θ₀ = 1`.
    //
    // Expect
    // ------
    // - Quasi-Newton: zero refinement iterations and `cov = [[1]]`.
    // - Finite difference: `cov ≈ 10⁴` within a relative 1e-6.
    fn refinement_stopped_at_start_keeps_identity_covariance() {
        // Arrange
        let ll = FnLikelihood(|t: &Theta| -(t[0] - 1.0).powi(2) / 2e4);
        let fd_opts = MLEOptions::default().with_covariance(CovarianceMethod::FiniteDifference);

        // Act
        let qn = maximize_likelihood(&ll, array![1.0], &MLEOptions::default())
            .expect("quasi-Newton fit");
        let fd = maximize_likelihood(&ll, array![1.0], &fd_opts).expect("fd fit");

        // Assert
        assert_eq!(qn.refinement.iterations, 0, "status: {}", qn.refinement.status);
        assert_eq!(qn.cov, Array2::eye(1));
        assert!((fd.cov[[0, 0]] / 1e4 - 1.0).abs() < 1e-6, "cov = {}", fd.cov[[0, 0]]);
    }
}
