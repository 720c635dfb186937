//! inference — covariance estimates from observed information.
//!
//! Purpose
//! -------
//! Provide post-estimation uncertainty tools that do not depend on the
//! optimizer's internal curvature estimate. The covariance of `θ̂` is
//! obtained from a finite-difference Hessian of the log-likelihood and an
//! eigen-truncated pseudoinverse.
//!
//! Key behaviors
//! -------------
//! - [`observed_covariance`]: `cov = (−∇²ℓ(θ̂))⁺` for any
//!   [`LogLikelihood`](crate::optimization::loglik_optimizer::LogLikelihood).
//! - [`pseudo_inverse`]: symmetric pseudoinverse with a relative,
//!   sign-preserving eigenvalue cutoff.
//! - [`precision_matrix`]: direct covariance inverse used by the posterior
//!   profile code.
//!
//! Conventions
//! -----------
//! - Parameters `θ` are the model parameters as passed to the likelihood;
//!   no reparameterization happens here.
//! - All functions are pure with respect to I/O: no logging, no global
//!   state, and no `unsafe` code paths.
//!
//! Downstream usage
//! ----------------
//! - `maximize_likelihood` calls [`observed_covariance`] when
//!   `CovarianceMethod::FiniteDifference` is selected.
//! - Downstream crates can `use bayesfit::inference::prelude::*;`.

pub mod hessian;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::hessian::{observed_covariance, precision_matrix, pseudo_inverse};

// ---- Optional convenience prelude for downstream crates ------------------

pub mod prelude {
    pub use super::hessian::{observed_covariance, precision_matrix, pseudo_inverse};
}
