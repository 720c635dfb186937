//! posterior — one-dimensional posterior profiles of a fitted parameter.
//!
//! Purpose
//! -------
//! Compute the data a plotting front-end needs to compare the likelihood
//! surface of a fit with its Gaussian approximation. No drawing happens
//! here; callers get aligned arrays of grid points, likelihood values and
//! Gaussian reference values.
//!
//! Key behaviors
//! -------------
//! - The grid spans `p[i] ± 4·√cov[i,i]` with the other parameters held at
//!   their best-fit values.
//! - [`ProfileScale::LogLikelihood`] reports `L − max L` next to
//!   `−½ (x − p)²·P[i,i]`.
//! - [`ProfileScale::Probability`] reports `exp(L − max L)` normalized to
//!   unit area by the trapezoid rule, next to the normalized Gaussian
//!   `exp(−½ (x − p)²·P[i,i])·√(P[i,i] / 2π)`.
//!
//! Here `P = cov⁻¹` is the precision matrix. A profile is a slice through
//! the surface, so its Gaussian curvature is `P[i,i]`; for a single
//! parameter this is `1 / cov[i,i]`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `cov[i,i]` and `P[i,i]` must be finite and `> 0`.
//! - Grid points where `L` fails to evaluate are reported as errors rather
//!   than silently dropped.
use crate::{
    fitting::result::FitResult,
    inference::hessian::precision_matrix,
    optimization::errors::{OptError, OptResult},
};
use ndarray::{Array1, Array2};
use std::f64::consts::PI;

/// Grid size used when callers have no preference.
pub const DEFAULT_PROFILE_POINTS: usize = 150;

/// Half-width of the profile grid in standard errors.
const PROFILE_HALF_WIDTH_SE: f64 = 4.0;

/// Vertical scale of a [`PosteriorProfile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileScale {
    /// Log-likelihood relative to its maximum on the grid.
    LogLikelihood,
    /// Unit-area probability density.
    #[default]
    Probability,
}

/// Profile of one parameter's posterior along an evenly spaced grid.
#[derive(Debug, Clone, PartialEq)]
pub struct PosteriorProfile {
    pub index: usize,
    pub scale: ProfileScale,
    pub grid: Array1<f64>,
    pub likelihood: Array1<f64>,
    pub gaussian: Array1<f64>,
}

impl PosteriorProfile {
    /// Evaluate the profile of parameter `index` of `fit`.
    ///
    /// # Errors
    /// - [`OptError::ParameterIndexOutOfRange`] if `index >= p.len()`.
    /// - [`OptError::InvalidGridSize`] if `n_points < 2`.
    /// - [`OptError::InvalidVariance`] if `cov[i,i]` or the matching
    ///   precision is not finite and positive, or `cov` is singular.
    /// - Any error raised by the likelihood on the grid.
    pub fn from_fit(
        fit: &FitResult, index: usize, n_points: usize, scale: ProfileScale,
    ) -> OptResult<Self> {
        let p = fit.p();
        if index >= p.len() {
            return Err(OptError::ParameterIndexOutOfRange { index, len: p.len() });
        }
        if n_points < 2 {
            return Err(OptError::InvalidGridSize { n_points });
        }
        let (variance, precision) = profile_curvature(fit.cov(), index)?;

        let center = p[index];
        let half_width = PROFILE_HALF_WIDTH_SE * variance.sqrt();
        let grid = Array1::linspace(center - half_width, center + half_width, n_points);

        let mut trial = p.clone();
        let mut likelihood = Array1::zeros(n_points);
        for (value, &xi) in likelihood.iter_mut().zip(grid.iter()) {
            trial[index] = xi;
            *value = fit.log_likelihood(&trial)?;
        }
        let peak = likelihood.fold(f64::NEG_INFINITY, |acc: f64, &v| acc.max(v));
        likelihood.mapv_inplace(|v| v - peak);

        let gaussian = match scale {
            ProfileScale::LogLikelihood => {
                grid.mapv(|xi| -0.5 * (xi - center).powi(2) * precision)
            }
            ProfileScale::Probability => {
                likelihood.mapv_inplace(f64::exp);
                let area = trapezoid(&grid, &likelihood);
                likelihood /= area;
                let norm = (precision / (2.0 * PI)).sqrt();
                grid.mapv(|xi| norm * (-0.5 * (xi - center).powi(2) * precision).exp())
            }
        };

        Ok(Self { index, scale, grid, likelihood, gaussian })
    }
}

/// Variance `cov[i,i]` and precision `(cov⁻¹)[i,i]` of parameter `index`.
///
/// Both must be finite and positive; a singular `cov` has no precision.
fn profile_curvature(cov: &Array2<f64>, index: usize) -> OptResult<(f64, f64)> {
    let variance = cov[[index, index]];
    if !variance.is_finite() || variance <= 0.0 {
        return Err(OptError::InvalidVariance { index, value: variance });
    }
    let precision =
        precision_matrix(cov).map_or(f64::NAN, |precision| precision[[index, index]]);
    if !precision.is_finite() || precision <= 0.0 {
        return Err(OptError::InvalidVariance { index, value: variance });
    }
    Ok((variance, precision))
}

/// Trapezoid-rule integral of `y` over the sample points `x`.
pub fn trapezoid(x: &Array1<f64>, y: &Array1<f64>) -> f64 {
    x.windows(2)
        .into_iter()
        .zip(y.windows(2))
        .map(|(xs, ys)| 0.5 * (xs[1] - xs[0]) * (ys[0] + ys[1]))
        .sum()
}
