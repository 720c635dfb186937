//! Outlier-robust fitting.
//!
//! Both likelihoods replace the Gaussian per-point term by one with heavier
//! tails, obtained by marginalizing each point's unknown uncertainty `σᵢ`
//! against a prior anchored at `σ₀`:
//!
//! - [`OutlierMethod::Conservative`]: `σ₀` is a lower bound,
//!   `ln((1 − e^{−R²/2}) / R²)` per point.
//! - [`OutlierMethod::Cauchy`]: `σ` of order `σ₀`, `−ln(1 + R²/2)` per point.
//!
//! Far-off points contribute only logarithmically, so a single gross
//! outlier cannot drag the fit the way it drags least squares.
use crate::{
    fitting::{
        data::FitData,
        likelihood::{Likelihood, ModelFunction, OutlierMethod},
        result::{FitResult, fit_likelihood},
    },
    optimization::{
        errors::OptResult,
        loglik_optimizer::{MLEOptions, Theta},
    },
};

/// Fit `model` to `data` with an outlier-robust likelihood.
///
/// `data.scale` plays the role of `sigma0`. Errors are the same as for
/// [`least_squares`](crate::fitting::least_squares::least_squares).
/// The covariance is the optimizer's estimate, not rescaled.
pub fn outlier_fit<M: ModelFunction + 'static>(
    model: M, p0: Theta, data: FitData, method: OutlierMethod, opts: &MLEOptions,
) -> OptResult<FitResult> {
    fit_likelihood(Likelihood::outlier(model, data, method), p0, opts)
}
