//! Fitted results and uncertainty summaries.
//!
//! Purpose
//! -------
//! Hold the outcome of a fit as the triple `(p, cov, L)`: best-fit
//! parameters, their covariance, and the log-likelihood the fit maximized.
//! Keeping `L` alongside the point estimate lets callers evaluate the
//! likelihood surface after the fit (posterior profiles, model comparison).
//!
//! Key behaviors
//! -------------
//! - [`fit_likelihood`] runs the two-stage optimizer on a [`Likelihood`] and
//!   applies the mode's covariance scale factor.
//! - [`FitResult`] exposes the triple, per-stage diagnostics, standard
//!   errors and Gaussian confidence intervals.
//! - [`get_result`] extracts `(p, √diag(cov))` from any [`FitOutput`], so
//!   both a full [`FitResult`] and a bare `(p, cov)` pair work.
//!
//! Invariants & assumptions
//! ------------------------
//! - `p` is finite with length `k` and `cov` is a symmetric `k × k` matrix;
//!   both are fixed after construction.
//! - Negative variances (possible from a poor quasi-Newton curvature
//!   estimate) are reported as `NaN` standard errors, never a panic.
//!
//! Testing notes
//! -------------
//! - Unit tests build results by hand where the optimizer is not the
//!   subject, and check standard errors, intervals, and `get_result` on
//!   both input forms.
use crate::{
    fitting::likelihood::Likelihood,
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{LogLikelihood, MLEOptions, MLEOutcome, OptimOutcome, Theta, maximize_likelihood},
    },
};
use ndarray::{Array1, Array2};
use statrs::distribution::{ContinuousCDF, Normal};

/// `FitResult` — best-fit parameters, covariance, and likelihood.
///
/// Fields
/// ------
/// - `p`: `Theta`
///   Maximum-likelihood parameters.
/// - `cov`: `Array2<f64>`
///   Covariance of `p`, already scaled for noise-scaled least squares.
/// - `likelihood`: [`Likelihood`]
///   The log-likelihood that was maximized, bound to its model and data.
/// - `value`: `f64`
///   `L(p)`.
/// - `initial`, `refinement`: `OptimOutcome`
///   Diagnostics of the Nelder–Mead and BFGS stages.
#[derive(Debug, Clone)]
pub struct FitResult {
    p: Theta,
    cov: Array2<f64>,
    likelihood: Likelihood,
    value: f64,
    initial: OptimOutcome,
    refinement: OptimOutcome,
}

impl FitResult {
    pub fn p(&self) -> &Theta {
        &self.p
    }

    pub fn cov(&self) -> &Array2<f64> {
        &self.cov
    }

    pub fn likelihood(&self) -> &Likelihood {
        &self.likelihood
    }

    /// Log-likelihood at the optimum, `L(p)`.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn initial(&self) -> &OptimOutcome {
        &self.initial
    }

    pub fn refinement(&self) -> &OptimOutcome {
        &self.refinement
    }

    /// Evaluate the fitted log-likelihood at arbitrary parameters.
    pub fn log_likelihood(&self, p: &Theta) -> OptResult<f64> {
        self.likelihood.value(p)
    }

    /// `√cov[i,i]`, `NaN` where the diagonal is negative.
    pub fn standard_errors(&self) -> Array1<f64> {
        diagonal_std(&self.cov)
    }

    /// Two-sided Gaussian confidence intervals `p ± z·σ`.
    ///
    /// Returns a `k × 2` array of `[lower, upper]` rows, where
    /// `z = Φ⁻¹((1 + level)/2)`.
    ///
    /// # Errors
    /// - [`OptError::InvalidConfidenceLevel`] unless `0 < level < 1`.
    pub fn confidence_intervals(&self, level: f64) -> OptResult<Array2<f64>> {
        if !(level > 0.0 && level < 1.0) {
            return Err(OptError::InvalidConfidenceLevel { level });
        }
        let normal =
            Normal::new(0.0, 1.0).map_err(|e| OptError::BackendError { text: e.to_string() })?;
        let z = normal.inverse_cdf(0.5 * (1.0 + level));
        let se = self.standard_errors();
        let mut intervals = Array2::zeros((self.p.len(), 2));
        for (i, mut row) in intervals.rows_mut().into_iter().enumerate() {
            row[0] = self.p[i] - z * se[i];
            row[1] = self.p[i] + z * se[i];
        }
        Ok(intervals)
    }

    /// Decompose into the `(p, cov, L)` triple.
    pub fn into_parts(self) -> (Theta, Array2<f64>, Likelihood) {
        (self.p, self.cov, self.likelihood)
    }
}

/// Run the two-stage maximizer on `likelihood` starting from `p0`.
///
/// The covariance returned by the optimizer is multiplied by
/// [`Likelihood::covariance_scale`] when the mode defines one.
///
/// # Errors
/// Everything `maximize_likelihood` reports, notably
/// `OptError::InitialOptimizationFailed`, `OptError::OptimizationFailed` and
/// likelihood validation errors from `LogLikelihood::check`.
pub fn fit_likelihood(likelihood: Likelihood, p0: Theta, opts: &MLEOptions) -> OptResult<FitResult> {
    let MLEOutcome { theta_hat, mut cov, value, initial, refinement } =
        maximize_likelihood(&likelihood, p0, opts)?;
    if let Some(factor) = likelihood.covariance_scale(value) {
        cov *= factor;
    }
    Ok(FitResult { p: theta_hat, cov, likelihood, value, initial, refinement })
}

/// Anything carrying a parameter vector and its covariance.
pub trait FitOutput {
    fn params(&self) -> &Theta;
    fn covariance(&self) -> &Array2<f64>;
}

impl FitOutput for FitResult {
    fn params(&self) -> &Theta {
        &self.p
    }

    fn covariance(&self) -> &Array2<f64> {
        &self.cov
    }
}

impl FitOutput for (Theta, Array2<f64>) {
    fn params(&self) -> &Theta {
        &self.0
    }

    fn covariance(&self) -> &Array2<f64> {
        &self.1
    }
}

/// Best-fit parameters and their standard errors.
///
/// Works on a [`FitResult`] or a `(p, cov)` pair. Standard errors are
/// `√cov[i,i]`; a negative diagonal entry yields `NaN`.
///
/// Examples
/// --------
/// ```rust
/// # use ndarray::array;
/// # use bayesfit::fitting::get_result;
/// let (p, perr) = get_result(&(array![1.0, 2.0], array![[4.0, 0.0], [0.0, 0.25]]));
/// assert_eq!(p, array![1.0, 2.0]);
/// assert_eq!(perr, array![2.0, 0.5]);
/// ```
pub fn get_result<O: FitOutput + ?Sized>(output: &O) -> (Theta, Array1<f64>) {
    (output.params().clone(), diagonal_std(output.covariance()))
}

fn diagonal_std(cov: &Array2<f64>) -> Array1<f64> {
    cov.diag().mapv(|v| if v < 0.0 { f64::NAN } else { v.sqrt() })
}
