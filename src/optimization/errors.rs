use argmin::core::{ArgminError, Error};

/// Crate-wide result alias for fitting and optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Two-stage protocol ----
    /// The derivative-free stage did not converge or failed in the backend.
    InitialOptimizationFailed {
        message: String,
    },

    /// The quasi-Newton refinement stage did not converge or failed in the backend.
    OptimizationFailed {
        message: String,
    },

    /// The refinement stage finished without an inverse Hessian estimate.
    MissingInverseHessian,

    // ---- Gradient ----
    /// Implies that FD should be used
    GradientNotImplemented,

    /// Gradient dimensions do not match parameter dimensions.
    GradientDimMismatch {
        expected: usize,
        found: usize,
    },

    /// Gradient elements need to be finite
    InvalidGradient {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    // ---- MLEOptions ----
    /// Gradient tolerance needs to be positive and finite.
    InvalidTolGrad {
        tol: f64,
        reason: &'static str,
    },
    /// Cost change tolerance needs to be positive and finite.
    InvalidTolCost {
        tol: f64,
        reason: &'static str,
    },
    /// Simplex spread tolerance needs to be positive and finite.
    InvalidTolSd {
        tol: f64,
        reason: &'static str,
    },
    /// Maximum iterations needs to be positive.
    InvalidMaxIter {
        max_iter: usize,
        reason: &'static str,
    },
    /// At least one tolerance must be provided.
    NoTolerancesProvided,

    /// Invalid line searcher name.
    InvalidLineSearch {
        name: String,
        reason: &'static str,
    },

    // ---- Cost function ----
    /// Cost function returned a non-finite value.
    NonFiniteCost {
        value: f64,
    },

    // ---- Optimizer outcome ----
    /// Estimated parameters must be finite.
    InvalidThetaHat {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    /// Theta hat is missing
    MissingThetaHat,

    /// Initial guess must be non-empty and finite.
    InvalidThetaInput {
        index: usize,
        value: f64,
    },

    /// Initial guess has no parameters.
    EmptyTheta,

    // ---- Fit data ----
    /// Data set has no points.
    EmptyData,

    /// `x` and `y` lengths differ.
    DataLengthMismatch {
        x_len: usize,
        y_len: usize,
    },

    /// A data point is NaN/±inf.
    NonFiniteData {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    /// Per-point error scale length differs from the data length.
    ScaleLengthMismatch {
        expected: usize,
        found: usize,
    },

    /// Error scale entries must be finite and > 0.
    InvalidErrorScale {
        index: usize,
        value: f64,
    },

    /// Model returned a prediction of the wrong length.
    PredictionLengthMismatch {
        expected: usize,
        found: usize,
    },

    /// Unknown outlier method name.
    InvalidOutlierMethod {
        name: String,
        reason: &'static str,
    },

    // ---- Result / posterior ----
    /// Confidence level must lie in (0, 1).
    InvalidConfidenceLevel {
        level: f64,
    },

    /// Parameter index outside the fitted vector.
    ParameterIndexOutOfRange {
        index: usize,
        len: usize,
    },

    /// Profile grid needs at least two points.
    InvalidGridSize {
        n_points: usize,
    },

    /// Variance must be finite and > 0 to build a profile.
    InvalidVariance {
        index: usize,
        value: f64,
    },

    // ---- Argmin ---
    /// Wrapper for argmin::InvalidParameter
    InvalidParameter {
        text: String,
    },
    /// Wrapper for argmin::NotImplemented
    NotImplemented {
        text: String,
    },
    /// Wrapper for argmin::NotInitialized
    NotInitialized {
        text: String,
    },
    /// Wrapper for argmin::ConditionViolated
    ConditionViolated {
        text: String,
    },
    /// Wrapper for argmin::CheckPointNotFound
    CheckPointNotFound {
        text: String,
    },
    /// Wrapper for argmin::PotentialBug
    PotentialBug {
        text: String,
    },
    /// Wrapper for argmin::ImpossibleError
    ImpossibleError {
        text: String,
    },
    /// Wrapper for other argmin::Error types
    BackendError {
        text: String,
    },

    // ---- Finite Diffs ----
    /// Hessian matrix dimensions do not match parameter dimensions.
    HessianDimMismatch {
        expected: usize,
        found: (usize, usize),
    },

    /// Hessian values need to be finite.
    InvalidHessian {
        row: usize,
        col: usize,
        value: f64,
    },

    // ---- Fallback ----
    UnknownError,
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Two-stage protocol ----
            OptError::InitialOptimizationFailed { message } => {
                write!(
                    f,
                    "Initial optimization failed: {message}\nConsider adjusting the initial guess."
                )
            }
            OptError::OptimizationFailed { message } => {
                write!(
                    f,
                    "BFGS optimization failed: {message}\nConsider adjusting the initial guess."
                )
            }
            OptError::MissingInverseHessian => {
                write!(f, "Refinement stage did not report an inverse Hessian")
            }

            // ---- Gradient ----
            OptError::GradientNotImplemented => {
                write!(f, "Gradient optimization not implemented")
            }
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient dimension mismatch: expected {expected}, found {found}")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Invalid gradient at index {index}: {value}: {reason}")
            }

            // ---- MLEOptions ----
            OptError::InvalidTolGrad { tol, reason } => {
                write!(f, "Invalid gradient tolerance {tol}: {reason}")
            }
            OptError::InvalidTolCost { tol, reason } => {
                write!(f, "Invalid cost function change tolerance {tol}: {reason}")
            }
            OptError::InvalidTolSd { tol, reason } => {
                write!(f, "Invalid simplex spread tolerance {tol}: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            OptError::NoTolerancesProvided => {
                write!(f, "No tolerances provided")
            }
            OptError::InvalidLineSearch { name, reason } => {
                write!(f, "Invalid line searcher '{name}': {reason}")
            }

            // ---- Cost function ----
            OptError::NonFiniteCost { value } => {
                write!(f, "Non-finite cost value: {value}")
            }

            // ---- Optimizer outcome ----
            OptError::InvalidThetaHat { index, value, reason } => {
                write!(f, "Invalid estimated parameter at index {index}: {value}: {reason}")
            }
            OptError::MissingThetaHat => {
                write!(f, "Missing estimated parameters (theta hat)")
            }
            OptError::InvalidThetaInput { index, value } => {
                write!(f, "Invalid theta input at index {index}: {value}, must be finite")
            }
            OptError::EmptyTheta => {
                write!(f, "Initial guess must contain at least one parameter")
            }

            // ---- Fit data ----
            OptError::EmptyData => {
                write!(f, "Data set is empty")
            }
            OptError::DataLengthMismatch { x_len, y_len } => {
                write!(f, "Data length mismatch: x has {x_len} points, y has {y_len}")
            }
            OptError::NonFiniteData { index, value, reason } => {
                write!(f, "Non-finite data at index {index}: {value}: {reason}")
            }
            OptError::ScaleLengthMismatch { expected, found } => {
                write!(f, "Error scale length mismatch: expected {expected}, found {found}")
            }
            OptError::InvalidErrorScale { index, value } => {
                write!(f, "Invalid error scale at index {index}: {value}, must be finite and > 0")
            }
            OptError::PredictionLengthMismatch { expected, found } => {
                write!(f, "Model prediction length mismatch: expected {expected}, found {found}")
            }
            OptError::InvalidOutlierMethod { name, reason } => {
                write!(f, "Invalid outlier method '{name}': {reason}")
            }

            // ---- Result / posterior ----
            OptError::InvalidConfidenceLevel { level } => {
                write!(f, "Invalid confidence level {level}, must lie in (0, 1)")
            }
            OptError::ParameterIndexOutOfRange { index, len } => {
                write!(f, "Parameter index {index} out of range for {len} parameters")
            }
            OptError::InvalidGridSize { n_points } => {
                write!(f, "Invalid profile grid size {n_points}, need at least 2 points")
            }
            OptError::InvalidVariance { index, value } => {
                write!(f, "Invalid variance for parameter {index}: {value}, must be finite and > 0")
            }

            // ---- Argmin ----
            OptError::InvalidParameter { text } => {
                write!(f, "Invalid parameter: {text}")
            }
            OptError::NotImplemented { text } => {
                write!(f, "Not implemented: {text}")
            }
            OptError::NotInitialized { text } => {
                write!(f, "Not initialized: {text}")
            }
            OptError::ConditionViolated { text } => {
                write!(f, "Condition violated: {text}")
            }
            OptError::CheckPointNotFound { text } => {
                write!(f, "Checkpoint not found: {text}")
            }
            OptError::PotentialBug { text } => {
                write!(f, "Potential bug: {text}")
            }
            OptError::ImpossibleError { text } => {
                write!(f, "Impossible error: {text}")
            }
            OptError::BackendError { text } => {
                write!(f, "Backend error: {text}")
            }

            // ---- Finite Diffs ----
            OptError::HessianDimMismatch { expected, found } => {
                write!(
                    f,
                    "Hessian dimension mismatch: expected ({expected}, {expected}), found {found:?}"
                )
            }
            OptError::InvalidHessian { row, col, value } => {
                write!(f, "Invalid Hessian at ({row}, {col}): {value}, must be finite")
            }

            // ---- Fallback ----
            OptError::UnknownError => {
                write!(f, "Unknown error")
            }
        }
    }
}

impl From<Error> for OptError {
    fn from(original_err: Error) -> Self {
        // Errors raised by our own adapter travel through argmin boxed; recover them first.
        let original_err = match original_err.downcast::<OptError>() {
            Ok(own) => return own,
            Err(err) => err,
        };
        match original_err.downcast() {
            Ok(opt_err) => match opt_err {
                ArgminError::InvalidParameter { text } => OptError::InvalidParameter { text },
                ArgminError::NotImplemented { text } => OptError::NotImplemented { text },
                ArgminError::NotInitialized { text } => OptError::NotInitialized { text },
                ArgminError::ConditionViolated { text } => OptError::ConditionViolated { text },
                ArgminError::CheckpointNotFound { text } => OptError::CheckPointNotFound { text },
                ArgminError::PotentialBug { text } => OptError::PotentialBug { text },
                ArgminError::ImpossibleError { text } => OptError::ImpossibleError { text },
                _ => OptError::UnknownError,
            },
            Err(err) => OptError::BackendError { text: err.to_string() },
        }
    }
}
