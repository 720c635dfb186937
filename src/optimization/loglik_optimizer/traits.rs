//! Public API surface for log-likelihood maximization.
//!
//! - [`LogLikelihood`]: trait every likelihood implements.
//! - [`FnLikelihood`]: wraps a plain closure `θ ↦ ℓ(θ)` as a [`LogLikelihood`].
//! - [`LocalMinimizer`]: abstract local-minimization capability each stage
//!   of the two-stage protocol is built on.
//! - [`MLEOptions`], [`SimplexTolerances`] and [`Tolerances`]: configuration.
//! - [`LineSearcher`] and [`CovarianceMethod`]: choices for the refinement
//!   stage and for how the covariance is obtained.
//! - [`OptimOutcome`] (one stage) and [`MLEOutcome`] (whole protocol).
//!
//! Convention: we *maximize* a log-likelihood `ℓ(θ)` by minimizing the cost
//! `c(θ) = -ℓ(θ)`. If an analytic gradient is provided, it should be the gradient
//! of the log-likelihood (`∇ℓ(θ)`); the adapter flips the sign as needed.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        Cost, FnEvalMap, Grad, Theta,
        types::Hessian,
        validation::{
            validate_theta_hat, validate_value, verify_tol_cost, verify_tol_grad, verify_tol_sd,
        },
    },
};
use argmin::core::{TerminationReason, TerminationStatus};
use argmin_math::ArgminL2Norm;
use std::str::FromStr;

/// Log-likelihood interface.
///
/// You maximize `ℓ(θ)`; internally we minimize the cost `c(θ) = -ℓ(θ)`.
/// Implementations own whatever data they close over, so evaluation only
/// needs the parameter vector.
///
/// Required:
/// - `value(&Theta) -> OptResult<Cost>`: evaluate `ℓ(θ)`.
/// - `check(&Theta) -> OptResult<()>`: validation hook to reject obviously
///   invalid starting points. Called once before optimization.
///
/// Optional:
/// - `grad(&Theta) -> OptResult<Grad>`: analytic gradient `∇ℓ(θ)`.
///   If not implemented, finite differences are used automatically.
pub trait LogLikelihood {
    // Required methods
    fn value(&self, theta: &Theta) -> OptResult<Cost>;
    fn check(&self, theta: &Theta) -> OptResult<()>;

    // Optional methods
    fn grad(&self, _theta: &Theta) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }
}

/// Adapter turning a closure `θ ↦ ℓ(θ)` into a [`LogLikelihood`].
///
/// Useful for ad-hoc objectives that are not one of the fitting modes, e.g.
/// a custom likelihood handed straight to
/// [`maximize_likelihood`](crate::optimization::loglik_optimizer::maximize_likelihood).
#[derive(Debug, Clone, Copy)]
pub struct FnLikelihood<F>(pub F);

impl<F> LogLikelihood for FnLikelihood<F>
where
    F: Fn(&Theta) -> f64,
{
    fn value(&self, theta: &Theta) -> OptResult<Cost> {
        Ok((self.0)(theta))
    }

    fn check(&self, _theta: &Theta) -> OptResult<()> {
        Ok(())
    }
}

/// Local minimization capability used by each stage of the protocol.
///
/// A stage receives the log-likelihood (it minimizes `−ℓ`) and a starting
/// point, and reports whether it converged, where it ended, and, for
/// quasi-Newton methods, its inverse Hessian estimate of the cost.
///
/// Implementations should return `Ok` with `converged == false` when the
/// solver stops without meeting its convergence criterion and reserve `Err`
/// for hard backend failures; the protocol treats both as stage failure.
pub trait LocalMinimizer {
    fn minimize<F: LogLikelihood + ?Sized>(&self, f: &F, theta0: Theta)
    -> OptResult<OptimOutcome>;
}

/// Choice of line search used inside the BFGS refinement stage.
///
/// Parsing:
/// This enum implements `FromStr` and accepts case-insensitive names
/// (`"MoreThuente"`, `"HagerZhang"`). Unknown names return
/// `OptError::InvalidLineSearch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineSearcher {
    #[default]
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// Source of the reported covariance matrix.
///
/// - `QuasiNewton`: the BFGS inverse Hessian accumulated during refinement.
/// - `FiniteDifference`: pseudoinverse of a central finite-difference
///   Hessian of the cost at `θ̂` (observed information).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CovarianceMethod {
    #[default]
    QuasiNewton,
    FiniteDifference,
}

/// Stopping rules for the Nelder–Mead stage.
///
/// - `tol_sd`: converge when the standard deviation of the simplex vertex
///   costs falls below this threshold.
/// - `max_iter`: hard cap; hitting it counts as a failed stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplexTolerances {
    pub tol_sd: f64,
    pub max_iter: usize,
}

impl SimplexTolerances {
    /// Construct validated simplex tolerances.
    ///
    /// # Errors
    /// - [`OptError::InvalidTolSd`] for non-finite or non-positive `tol_sd`.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == 0`.
    pub fn new(tol_sd: f64, max_iter: usize) -> OptResult<Self> {
        verify_tol_sd(tol_sd)?;
        if max_iter == 0 {
            return Err(OptError::InvalidMaxIter {
                max_iter,
                reason: "Maximum iterations must be greater than zero.",
            });
        }
        Ok(Self { tol_sd, max_iter })
    }
}

impl Default for SimplexTolerances {
    fn default() -> Self {
        Self { tol_sd: 1e-8, max_iter: 2000 }
    }
}

/// Numerical tolerances and iteration limits for the refinement stage.
///
/// - `tol_grad`: terminate when the gradient norm falls below this threshold.
/// - `tol_cost`: terminate when the change in cost falls below this threshold.
/// - `max_iter`: hard cap on the number of iterations.
///
/// Any field can be `None` but **at least one** of the three must be provided
/// (see [`Tolerances::new`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Rules
    /// - At least one of `tol_grad`, `tol_cost`, or `max_iter` must be `Some`.
    /// - If provided, tolerances must be **finite and strictly positive**.
    /// - If provided, `max_iter` must be `> 0`.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if all three are `None`.
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for non-finite or non-positive tolerances.
    /// - `OptError::InvalidMaxIter` if `max_iter == 0`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_cost(tol_cost)?;
        verify_tol_grad(tol_grad)?;
        if let Some(max_iter) = max_iter {
            if max_iter == 0 {
                return Err(OptError::InvalidMaxIter {
                    max_iter,
                    reason: "Maximum iterations must be greater than zero.",
                });
            }
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self { tol_grad: Some(1e-5), tol_cost: None, max_iter: Some(1000) }
    }
}

/// Optimizer-level configuration for the two-stage protocol.
///
/// Fields:
/// - `initial: SimplexTolerances`: Nelder–Mead stopping rules.
/// - `refinement: Tolerances`: BFGS stopping rules.
/// - `line_searcher: LineSearcher`: line search used by BFGS.
/// - `covariance: CovarianceMethod`: where the covariance comes from.
/// - `verbose: bool`: if `true`, attaches an observer (behind the `obs_slog`
///   feature) and prints progress.
///
/// Default:
/// - `initial`: `tol_sd = 1e-8`, `max_iter = 2000`
/// - `refinement`: `tol_grad = 1e-5`, `tol_cost = None`, `max_iter = 1000`
/// - `line_searcher`: `MoreThuente`
/// - `covariance`: `QuasiNewton`
/// - `verbose`: `false`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MLEOptions {
    pub initial: SimplexTolerances,
    pub refinement: Tolerances,
    pub line_searcher: LineSearcher,
    pub covariance: CovarianceMethod,
    pub verbose: bool,
}

impl MLEOptions {
    /// Create a new set of optimizer options.
    ///
    /// Numeric validation happens in [`SimplexTolerances::new`] and
    /// [`Tolerances::new`]; this constructor only assembles the pieces.
    pub fn new(
        initial: SimplexTolerances, refinement: Tolerances, line_searcher: LineSearcher,
        covariance: CovarianceMethod, verbose: bool,
    ) -> Self {
        Self { initial, refinement, line_searcher, covariance, verbose }
    }

    /// Same options with a different covariance source.
    pub fn with_covariance(mut self, covariance: CovarianceMethod) -> Self {
        self.covariance = covariance;
        self
    }
}

/// Result of a single optimization stage.
///
/// - `theta_hat`: best parameter vector found.
/// - `value`: best **log-likelihood** value `ℓ(θ)` (not the cost).
/// - `converged`: `true` only if the solver terminated because its
///   convergence criterion was met (or a target cost was reached).
/// - `status`: human-readable termination status string.
/// - `iterations`: number of optimizer iterations performed.
/// - `fn_evals`: function-evaluation counters reported by `argmin`.
/// - `grad_norm`: norm of the last available gradient, if present.
/// - `inv_hessian`: inverse Hessian of the cost, quasi-Newton stages only.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
    pub inv_hessian: Option<Hessian>,
}

impl OptimOutcome {
    /// Build a validated [`OptimOutcome`] from raw solver state.
    ///
    /// Performs:
    /// - `theta_hat` check via `validate_theta_hat` (present and all finite).
    /// - `value` check via `validate_value` (finite).
    /// - Maps `TerminationStatus` into `(converged, status)`.
    /// - Computes `grad_norm` if a gradient was provided.
    ///
    /// # Errors
    /// - Propagates any validation errors for `theta_hat` or `value`.
    pub fn new(
        theta_hat_opt: Option<Theta>, value: f64, termination: &TerminationStatus,
        iterations: u64, fn_evals: FnEvalMap, grad: Option<Grad>, inv_hessian: Option<Hessian>,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(value)?;
        let (converged, status) = match termination {
            TerminationStatus::NotTerminated => (false, "Not terminated".to_string()),
            TerminationStatus::Terminated(
                TerminationReason::SolverConverged | TerminationReason::TargetCostReached,
            ) => (true, format!("{termination:?}")),
            TerminationStatus::Terminated(reason) => (false, format!("{reason:?}")),
        };
        let iterations = iterations as usize;
        let grad_norm = grad.map(|g| g.l2_norm());
        Ok(Self { theta_hat, value, converged, status, iterations, fn_evals, grad_norm, inv_hessian })
    }
}

/// Result of the full two-stage maximization.
///
/// - `theta_hat`: refinement-stage parameters, `θ̂ ≈ argmax ℓ`.
/// - `cov`: symmetric covariance estimate, `≈ −(∇²ℓ(θ̂))⁻¹`.
/// - `value`: `ℓ(θ̂)`.
/// - `initial` / `refinement`: per-stage diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct MLEOutcome {
    pub theta_hat: Theta,
    pub cov: Hessian,
    pub value: f64,
    pub initial: OptimOutcome,
    pub refinement: OptimOutcome,
}
