//! Data containers for curve fitting.
//!
//! Purpose
//! -------
//! Provide small, validated containers for `(x, y)` observations and their
//! error scale. This module centralizes input validation so the likelihood
//! code can assume clean, finite data of consistent length.
//!
//! Key behaviors
//! -------------
//! - [`ErrorScale`] represents either a single scale broadcast to every point
//!   or one scale per point. It plays the role of `yerr` for least squares
//!   and of `sigma0` for the outlier-robust likelihoods.
//! - [`FitData`] enforces non-empty, equal-length, finite data and a valid
//!   scale at construction time.
//!
//! Invariants & assumptions
//! ------------------------
//! - `x.len() == y.len() > 0`.
//! - Every `x`, `y` entry is finite.
//! - Every scale entry is finite and strictly positive; a per-point scale has
//!   exactly `y.len()` entries.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the happy path and each rejection branch of
//!   [`FitData::new`], plus scale broadcasting.
use crate::optimization::errors::{OptError, OptResult};
use ndarray::Array1;

/// Per-point standard deviation of the observations.
///
/// - `Uniform(s)`: the same `s` for every point.
/// - `PerPoint(s)`: `s[i]` for point `i`.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorScale {
    Uniform(f64),
    PerPoint(Array1<f64>),
}

impl ErrorScale {
    /// Scale of point `index`.
    ///
    /// # Panics
    /// If `index` is out of range for a `PerPoint` scale. The likelihoods
    /// re-run [`ErrorScale::validate`] before evaluating, so this only
    /// concerns direct callers.
    #[inline]
    pub fn at(&self, index: usize) -> f64 {
        match self {
            ErrorScale::Uniform(s) => *s,
            ErrorScale::PerPoint(s) => s[index],
        }
    }

    /// Check that every entry is finite and `> 0`, and that a per-point scale
    /// covers exactly `n` points.
    ///
    /// # Errors
    /// - [`OptError::InvalidErrorScale`] for the first offending entry
    ///   (`index = 0` for a uniform scale).
    /// - [`OptError::ScaleLengthMismatch`] for a per-point scale of the wrong
    ///   length.
    pub fn validate(&self, n: usize) -> OptResult<()> {
        match self {
            ErrorScale::Uniform(s) => {
                if !s.is_finite() || *s <= 0.0 {
                    return Err(OptError::InvalidErrorScale { index: 0, value: *s });
                }
            }
            ErrorScale::PerPoint(s) => {
                if s.len() != n {
                    return Err(OptError::ScaleLengthMismatch { expected: n, found: s.len() });
                }
                for (index, &value) in s.iter().enumerate() {
                    if !value.is_finite() || value <= 0.0 {
                        return Err(OptError::InvalidErrorScale { index, value });
                    }
                }
            }
        }
        Ok(())
    }
}

impl Default for ErrorScale {
    fn default() -> Self {
        ErrorScale::Uniform(1.0)
    }
}

impl From<f64> for ErrorScale {
    fn from(value: f64) -> Self {
        ErrorScale::Uniform(value)
    }
}

impl From<Array1<f64>> for ErrorScale {
    fn from(value: Array1<f64>) -> Self {
        ErrorScale::PerPoint(value)
    }
}

impl From<Vec<f64>> for ErrorScale {
    fn from(value: Vec<f64>) -> Self {
        ErrorScale::PerPoint(Array1::from(value))
    }
}

/// `FitData` — validated observations and their error scale.
///
/// Fields
/// ------
/// - `x`: `Array1<f64>`
///   Independent variable, passed unchanged to the model function.
/// - `y`: `Array1<f64>`
///   Observed values, same length as `x`.
/// - `scale`: [`ErrorScale`]
///   `yerr` (least squares) or `sigma0` (outlier fits).
///
/// Invariants
/// ----------
/// - See the module docs; all hold after [`FitData::new`].
/// - The fields are public, so a struct literal can skip that validation.
///   Fits and residual diagnostics re-check the scale length and report
///   [`OptError::ScaleLengthMismatch`] instead of indexing out of range.
#[derive(Debug, Clone, PartialEq)]
pub struct FitData {
    pub x: Array1<f64>,
    pub y: Array1<f64>,
    pub scale: ErrorScale,
}

impl FitData {
    /// Construct validated fit data.
    ///
    /// Parameters
    /// ----------
    /// - `x`, `y`: `Array1<f64>`
    ///   Observations; non-empty, equal length, finite.
    /// - `scale`: `impl Into<ErrorScale>`
    ///   A scalar (`f64`) or per-point scales (`Array1<f64>` / `Vec<f64>`).
    ///
    /// Errors
    /// ------
    /// - `OptError::EmptyData` when `y` is empty.
    /// - `OptError::DataLengthMismatch` when `x.len() != y.len()`.
    /// - `OptError::NonFiniteData` for the first NaN/±∞ in `x` or `y`.
    /// - Scale errors from [`ErrorScale::validate`].
    ///
    /// Examples
    /// --------
    /// ```rust
    /// # use ndarray::array;
    /// # use bayesfit::fitting::data::FitData;
    /// let data = FitData::new(array![1.0, 2.0], array![2.1, 3.9], 0.2).unwrap();
    /// assert_eq!(data.len(), 2);
    /// ```
    pub fn new(x: Array1<f64>, y: Array1<f64>, scale: impl Into<ErrorScale>) -> OptResult<Self> {
        let scale = scale.into();
        if x.len() != y.len() {
            return Err(OptError::DataLengthMismatch { x_len: x.len(), y_len: y.len() });
        }
        if y.is_empty() {
            return Err(OptError::EmptyData);
        }
        for (index, &value) in x.iter().enumerate() {
            if !value.is_finite() {
                return Err(OptError::NonFiniteData { index, value, reason: "x values must be finite." });
            }
        }
        for (index, &value) in y.iter().enumerate() {
            if !value.is_finite() {
                return Err(OptError::NonFiniteData { index, value, reason: "y values must be finite." });
            }
        }
        scale.validate(y.len())?;
        Ok(Self { x, y, scale })
    }

    /// Number of observations `N`.
    pub fn len(&self) -> usize {
        self.y.len()
    }

    /// Always `false` for validated data.
    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Construction of `FitData` with scalar and per-point scales.
    // - Each validation failure of `FitData::new`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Valid inputs construct, and a scalar scale is broadcast.
    fn new_accepts_valid_inputs_and_broadcasts_scalar_scale() {
        // Arrange + Act
        let data = FitData::new(array![0.0, 1.0, 2.0], array![1.0, 2.0, 3.0], 0.5)
            .expect("valid data");

        // Assert
        assert_eq!(data.len(), 3);
        assert!(!data.is_empty());
        assert_eq!(data.scale.at(2), 0.5);
    }

    #[test]
    // Purpose
    // -------
    // Length problems are reported before value problems.
    //
    // Expect
    // ------
    // - Mismatched lengths → `DataLengthMismatch`.
    // - Empty arrays → `EmptyData`.
    fn new_rejects_length_problems() {
        assert_eq!(
            FitData::new(array![0.0, 1.0], array![1.0], 1.0),
            Err(OptError::DataLengthMismatch { x_len: 2, y_len: 1 })
        );
        assert_eq!(FitData::new(Array1::zeros(0), Array1::zeros(0), 1.0), Err(OptError::EmptyData));
    }

    #[test]
    // Purpose
    // -------
    // Non-finite observations are rejected with their index.
    fn new_rejects_non_finite_values() {
        let result = FitData::new(array![0.0, 1.0], array![1.0, f64::NAN], 1.0);

        match result {
            Err(OptError::NonFiniteData { index, .. }) => assert_eq!(index, 1),
            other => panic!("Expected NonFiniteData, got {other:?}"),
        }
    }

    #[test]
    // Purpose
    // -------
    // Scales must be positive, finite, and sized to the data.
    //
    // Given
    // -----
    // - A zero scalar scale.
    // - A per-point scale of the wrong length.
    // - A per-point scale with a negative entry.
    //
    // Expect
    // ------
    // - `InvalidErrorScale`, `ScaleLengthMismatch`, `InvalidErrorScale { index: 1 }`.
    fn new_rejects_invalid_scales() {
        let x = array![0.0, 1.0];
        let y = array![1.0, 2.0];

        assert!(matches!(
            FitData::new(x.clone(), y.clone(), 0.0),
            Err(OptError::InvalidErrorScale { index: 0, .. })
        ));
        assert_eq!(
            FitData::new(x.clone(), y.clone(), vec![1.0, 1.0, 1.0]),
            Err(OptError::ScaleLengthMismatch { expected: 2, found: 3 })
        );
        assert!(matches!(
            FitData::new(x, y, vec![1.0, -1.0]),
            Err(OptError::InvalidErrorScale { index: 1, .. })
        ));
    }
}
