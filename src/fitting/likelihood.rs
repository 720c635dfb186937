//! Likelihood library for curve fitting.
//!
//! Purpose
//! -------
//! Define the model-function interface and the four log-likelihoods the
//! fitting entry points maximize. Every likelihood owns an immutable
//! snapshot of the model and the data, so a fitted result can keep
//! evaluating `L(p)` long after the caller's inputs are gone.
//!
//! Key behaviors
//! -------------
//! - [`ModelFunction`]: `f(x, p) → predictions`, implemented for every
//!   `Fn(&Array1<f64>, &Theta) -> Array1<f64> + Send + Sync` closure.
//! - [`Likelihood`]: tagged variant over
//!   - `LeastSquares`: `L(p) = −½ Σ ((yᵢ − f(xᵢ, p)) / yerrᵢ)²`,
//!   - `NoiseScaledLeastSquares`: same `L(p)`; the covariance is rescaled
//!     after optimization by [`Likelihood::covariance_scale`],
//!   - `ConservativeOutlier`: `L(p) = Σ ln((1 − e^{−Rᵢ²/2}) / Rᵢ²)`,
//!   - `CauchyOutlier`: `L(p) = −Σ ln(1 + Rᵢ²/2)`,
//!
//!   with `Rᵢ = (f(xᵢ, p) − yᵢ) / σ₀ᵢ`.
//! - [`LogLikelihood`] is implemented for [`Likelihood`], which makes every
//!   mode directly usable with `maximize_likelihood`.
//!
//! Invariants & assumptions
//! ------------------------
//! - The snapshot is shared through `Arc` and never mutated; cloning a
//!   `Likelihood` is cheap and the type is `Send + Sync`.
//! - The model must return exactly one prediction per `x` value; anything
//!   else is reported as `OptError::PredictionLengthMismatch`.
//! - Values are log-likelihoods up to an additive constant.
//!
//! Testing notes
//! -------------
//! - Unit tests evaluate each mode on hand-computed residuals, check the
//!   `R = 0` limit of the conservative mode, the noise-scaling factor,
//!   per-point scales, and rejection of malformed predictions or scales.
use crate::{
    fitting::data::FitData,
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{LogLikelihood, Theta, validation::validate_theta0},
        numerical_stability::{cauchy_log_term, conservative_log_term},
    },
};
use ndarray::{Array1, Zip};
use std::{fmt, sync::Arc};

/// Parametric model `f(x, p)`.
///
/// Called many times with arbitrary trial vectors `p`, so implementations
/// should be pure and cheap to evaluate. Returning predictions of the wrong
/// length is reported as an error by the likelihood, not a panic.
pub trait ModelFunction: Send + Sync {
    fn eval(&self, x: &Array1<f64>, p: &Theta) -> Array1<f64>;
}

impl<F> ModelFunction for F
where
    F: Fn(&Array1<f64>, &Theta) -> Array1<f64> + Send + Sync,
{
    fn eval(&self, x: &Array1<f64>, p: &Theta) -> Array1<f64> {
        self(x, p)
    }
}

/// Immutable `(model, data)` pair shared by all likelihood variants.
#[derive(Clone)]
pub struct ModelSnapshot {
    model: Arc<dyn ModelFunction>,
    data: Arc<FitData>,
}

impl ModelSnapshot {
    pub fn new<M: ModelFunction + 'static>(model: M, data: FitData) -> Self {
        Self { model: Arc::new(model), data: Arc::new(data) }
    }

    pub fn data(&self) -> &FitData {
        &self.data
    }

    /// Model predictions at the stored `x` for parameters `p`.
    ///
    /// # Errors
    /// - [`OptError::PredictionLengthMismatch`] if the model returns a
    ///   different number of values than there are data points.
    pub fn predict(&self, p: &Theta) -> OptResult<Array1<f64>> {
        let prediction = self.model.eval(&self.data.x, p);
        if prediction.len() != self.data.len() {
            return Err(OptError::PredictionLengthMismatch {
                expected: self.data.len(),
                found: prediction.len(),
            });
        }
        Ok(prediction)
    }

    /// Squared standardized residuals `((f(xᵢ, p) − yᵢ) / sᵢ)²`.
    pub fn squared_residuals(&self, p: &Theta) -> OptResult<Array1<f64>> {
        let mut r2 = self.predict(p)?;
        let data = &*self.data;
        for (i, (pred, &y)) in r2.iter_mut().zip(data.y.iter()).enumerate() {
            let r = (*pred - y) / data.scale.at(i);
            *pred = r * r;
        }
        Ok(r2)
    }
}

impl fmt::Debug for ModelSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelSnapshot")
            .field("model", &"<model function>")
            .field("data", &self.data)
            .finish()
    }
}

/// Log-likelihood of one of the supported fitting modes.
///
/// Construct through [`Likelihood::least_squares`] or
/// [`Likelihood::outlier`]; evaluate through [`LogLikelihood::value`].
#[derive(Debug, Clone)]
pub enum Likelihood {
    LeastSquares(ModelSnapshot),
    NoiseScaledLeastSquares(ModelSnapshot),
    ConservativeOutlier(ModelSnapshot),
    CauchyOutlier(ModelSnapshot),
}

impl Likelihood {
    /// Ordinary (or noise-scaled) least squares with `data.scale` as `yerr`.
    pub fn least_squares<M: ModelFunction + 'static>(
        model: M, data: FitData, noise_scaling: bool,
    ) -> Self {
        let snapshot = ModelSnapshot::new(model, data);
        if noise_scaling {
            Likelihood::NoiseScaledLeastSquares(snapshot)
        } else {
            Likelihood::LeastSquares(snapshot)
        }
    }

    /// Outlier-robust likelihood with `data.scale` as `sigma0`.
    pub fn outlier<M: ModelFunction + 'static>(
        model: M, data: FitData, method: OutlierMethod,
    ) -> Self {
        let snapshot = ModelSnapshot::new(model, data);
        match method {
            OutlierMethod::Conservative => Likelihood::ConservativeOutlier(snapshot),
            OutlierMethod::Cauchy => Likelihood::CauchyOutlier(snapshot),
        }
    }

    pub fn snapshot(&self) -> &ModelSnapshot {
        match self {
            Likelihood::LeastSquares(s)
            | Likelihood::NoiseScaledLeastSquares(s)
            | Likelihood::ConservativeOutlier(s)
            | Likelihood::CauchyOutlier(s) => s,
        }
    }

    /// The data the likelihood was built from.
    pub fn data(&self) -> &FitData {
        self.snapshot().data()
    }

    /// Factor applied to the optimizer covariance for this mode.
    ///
    /// `Some(−2·L(p*)/N)` for noise-scaled least squares, `None` otherwise.
    /// This is the closed form of integrating out a global noise scale `σ`
    /// (`yerr → σ·yerr`) under Jeffreys' prior `∝ 1/σ`. It equals the reduced
    /// `χ²/N` and is not bounds-checked.
    pub fn covariance_scale(&self, value_at_optimum: f64) -> Option<f64> {
        match self {
            Likelihood::NoiseScaledLeastSquares(s) => {
                Some(-2.0 * value_at_optimum / s.data().len() as f64)
            }
            _ => None,
        }
    }
}

impl LogLikelihood for Likelihood {
    fn value(&self, theta: &Theta) -> OptResult<f64> {
        let r2 = self.snapshot().squared_residuals(theta)?;
        let value: f64 = match self {
            Likelihood::LeastSquares(_) | Likelihood::NoiseScaledLeastSquares(_) => {
                -0.5 * r2.sum()
            }
            Likelihood::ConservativeOutlier(_) => r2.iter().map(|&r| conservative_log_term(r)).sum(),
            Likelihood::CauchyOutlier(_) => r2.iter().map(|&r| cauchy_log_term(r)).sum(),
        };
        Ok(value)
    }

    /// Rejects empty or non-finite guesses, error scales that do not cover
    /// the data, and models whose prediction length does not match the data.
    fn check(&self, theta: &Theta) -> OptResult<()> {
        validate_theta0(theta)?;
        let snapshot = self.snapshot();
        snapshot.data().scale.validate(snapshot.data().len())?;
        snapshot.predict(theta)?;
        Ok(())
    }
}

/// Outlier-robust likelihood family.
///
/// - `Conservative`: `σ₀` is a lower bound on each point's uncertainty
///   (prior `σ₀/σ²` for `σ ≥ σ₀`).
/// - `Cauchy`: uncertainties of order `σ₀`, either smaller or larger
///   (prior `∝ exp(−σ₀²/σ²)/σ²`).
///
/// Parsing:
/// Implements `FromStr` for the case-insensitive names `"conservative"` and
/// `"cauchy"`. Unknown names return `OptError::InvalidOutlierMethod`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutlierMethod {
    #[default]
    Conservative,
    Cauchy,
}

impl std::str::FromStr for OutlierMethod {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "conservative" => Ok(OutlierMethod::Conservative),
            "cauchy" => Ok(OutlierMethod::Cauchy),
            _ => Err(OptError::InvalidOutlierMethod {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'conservative' or 'cauchy'.",
            }),
        }
    }
}

/// Standardized residuals `(f(xᵢ, p) − yᵢ) / sᵢ`, signed.
///
/// Convenience for diagnostics (e.g. spotting the points an outlier fit has
/// down-weighted).
///
/// # Errors
/// - Scale errors from [`ErrorScale::validate`](crate::fitting::data::ErrorScale::validate).
/// - [`OptError::PredictionLengthMismatch`] from the model.
pub fn standardized_residuals(likelihood: &Likelihood, p: &Theta) -> OptResult<Array1<f64>> {
    let snapshot = likelihood.snapshot();
    let data = snapshot.data();
    data.scale.validate(data.len())?;
    let prediction = snapshot.predict(p)?;
    let mut residuals = Array1::zeros(data.len());
    Zip::indexed(&mut residuals).and(&prediction).and(&data.y).for_each(|i, r, &f, &y| {
        *r = (f - y) / data.scale.at(i);
    });
    Ok(residuals)
}
