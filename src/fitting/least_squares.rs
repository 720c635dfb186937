//! Least-squares fitting with optional noise-scale estimation.
//!
//! Ordinary least squares maximizes `L(p) = −½ Σ ((yᵢ − f(xᵢ, p)) / yerrᵢ)²`.
//! With `noise_scaling = true` the uncertainties are treated as known only
//! up to a common factor `σ`, which is integrated out under Jeffreys'
//! prior. The best-fit `p` is unchanged; the covariance is multiplied by
//! the reduced chi-square `−2·L(p*)/N`.
use crate::{
    fitting::{
        data::FitData,
        likelihood::{Likelihood, ModelFunction},
        result::{FitResult, fit_likelihood},
    },
    optimization::{
        errors::OptResult,
        loglik_optimizer::{MLEOptions, Theta},
    },
};

/// Fit `model` to `data` by (noise-scaled) least squares.
///
/// Parameters
/// ----------
/// - `model`: [`ModelFunction`]
///   `f(x, p)`, typically a closure.
/// - `p0`: `Theta`
///   Initial guess; non-empty and finite.
/// - `data`: [`FitData`]
///   Observations with `yerr` as the error scale.
/// - `noise_scaling`: `bool`
///   Rescale the covariance by the reduced chi-square.
/// - `opts`: `&MLEOptions`
///   Optimizer configuration; `MLEOptions::default()` is a sensible start.
///
/// Returns
/// -------
/// `OptResult<FitResult>` holding `(p, cov, L)`.
///
/// Errors
/// ------
/// - `OptError::InitialOptimizationFailed` when Nelder–Mead does not
///   converge from `p0`.
/// - `OptError::OptimizationFailed` when BFGS does not converge.
/// - Validation errors for `p0` or a model of the wrong output length.
///
/// Examples
/// --------
/// ```rust,no_run
/// # use ndarray::{Array1, array};
/// # use bayesfit::fitting::{FitData, get_result, least_squares};
/// # use bayesfit::optimization::loglik_optimizer::{MLEOptions, Theta};
/// let data = FitData::new(
///     array![1.0, 2.0, 3.0, 4.0, 5.0],
///     array![2.1, 3.9, 6.2, 7.8, 10.1],
///     0.2,
/// )?;
/// let line = |x: &Array1<f64>, p: &Theta| x.mapv(|xi| p[0] + p[1] * xi);
/// let fit = least_squares(line, array![0.0, 1.0], data, false, &MLEOptions::default())?;
/// let (p, perr) = get_result(&fit);
/// # Ok::<(), bayesfit::optimization::errors::OptError>(())
/// ```
pub fn least_squares<M: ModelFunction + 'static>(
    model: M, p0: Theta, data: FitData, noise_scaling: bool, opts: &MLEOptions,
) -> OptResult<FitResult> {
    fit_likelihood(Likelihood::least_squares(model, data, noise_scaling), p0, opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitting::result::get_result;
    use crate::optimization::loglik_optimizer::CovarianceMethod;
    use ndarray::{Array1, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Closed-form standard errors of a weighted line fit.
    // - The covariance factor applied by noise scaling.
    // -------------------------------------------------------------------------

    fn line(x: &Array1<f64>, p: &Theta) -> Array1<f64> {
        x.mapv(|xi| p[0] + p[1] * xi)
    }

    fn data() -> FitData {
        FitData::new(array![1.0, 2.0, 3.0, 4.0, 5.0], array![2.1, 3.9, 6.2, 7.8, 10.1], 0.2)
            .expect("valid data")
    }

    fn opts() -> MLEOptions {
        MLEOptions::default().with_covariance(CovarianceMethod::FiniteDifference)
    }

    #[test]
    // Purpose
    // -------
    // OLS errors match `√diag((XᵀX)⁻¹)·yerr`.
    //
    // Given
    // -----
    // - `x = 1..5`, `yerr = 0.2`, so `(XᵀX)⁻¹ = [[1.1, −0.3], [−0.3, 0.1]]`.
    //
    // Expect
    // ------
    // - `perr ≈ (0.20976, 0.063246)`.
    fn ols_errors_match_closed_form() {
        // Act
        let fit = least_squares(line, array![0.0, 1.0], data(), false, &opts()).expect("fit");
        let (p, perr) = get_result(&fit);

        // Assert
        assert!((p[0] - 0.05).abs() < 1e-3);
        assert!((p[1] - 1.99).abs() < 1e-3);
        assert!((perr[0] - 0.20976).abs() < 1e-4);
        assert!((perr[1] - 0.063246).abs() < 1e-4);
    }

    #[test]
    // Purpose
    // -------
    // Noise scaling leaves `p` alone and scales the covariance by
    // `χ²/N = 2.675 / 5 = 0.535`.
    fn noise_scaling_multiplies_covariance_by_reduced_chi_square() {
        // Act
        let plain = least_squares(line, array![0.0, 1.0], data(), false, &opts()).expect("fit");
        let scaled = least_squares(line, array![0.0, 1.0], data(), true, &opts()).expect("fit");

        // Assert
        assert!((scaled.value() + 1.3375).abs() < 1e-4);
        for i in 0..2 {
            assert!((plain.p()[i] - scaled.p()[i]).abs() < 1e-6);
            for j in 0..2 {
                let expected = plain.cov()[[i, j]] * 0.535;
                assert!((scaled.cov()[[i, j]] - expected).abs() < 1e-4 * expected.abs().max(1e-3));
            }
        }
    }
}
