//! Execution helpers that run an `argmin` solver on a log-likelihood problem
//! and return a crate-friendly [`OptimOutcome`].
//!
//! [`run_nelder_mead`] drives the derivative-free initial stage,
//! [`run_bfgs`] the quasi-Newton refinement stage. [`NelderMeadStage`] and
//! [`BfgsStage`] package each runner with its configuration as a
//! [`LocalMinimizer`].
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        LogLikelihood, OptimOutcome, Theta,
        adapter::ArgMinAdapter,
        builders::{build_bfgs_hager_zhang, build_bfgs_more_thuente, build_nelder_mead},
        traits::{LineSearcher, LocalMinimizer, SimplexTolerances, Tolerances},
        types::{Cost, Hessian, QuasiNewtonState, SimplexSolver},
    },
};
#[cfg(feature = "obs_slog")]
use argmin::core::{CostFunction, Gradient};
use argmin::core::{Executor, Solver, State};
use argmin::solver::quasinewton::BFGS;
#[cfg(feature = "obs_slog")]
use argmin_math::ArgminL2Norm;

/// Run the Nelder–Mead stage for a log-likelihood problem.
///
/// The simplex is seeded by `solver` (see
/// [`build_nelder_mead`](crate::optimization::loglik_optimizer::builders::build_nelder_mead));
/// `tols.max_iter` caps the iterations.
///
/// # Feature flags
/// If the `obs_slog` feature is enabled and `verbose == true`, a terminal
/// slog observer is attached with `ObserverMode::Always` and a one-time
/// pre-iteration line logs ℓ(θ₀).
///
/// # Returns
/// An [`OptimOutcome`] without gradient norm or inverse Hessian.
///
/// # Errors
/// - Propagates any `argmin` runtime error via `From<argmin::core::Error>`.
/// - Propagates validation errors encountered when constructing
///   [`OptimOutcome`].
pub fn run_nelder_mead<F>(
    theta0: &Theta, tols: &SimplexTolerances, verbose: bool, problem: ArgMinAdapter<'_, F>,
    solver: SimplexSolver,
) -> OptResult<OptimOutcome>
where
    F: LogLikelihood + ?Sized,
{
    #[cfg(feature = "obs_slog")]
    if verbose {
        log_initial_state(theta0, &problem, false)?;
    }
    #[cfg(not(feature = "obs_slog"))]
    let _ = (theta0, verbose);

    let max_iter = tols.max_iter as u64;
    let mut optimizer = Executor::new(problem, solver);
    optimizer = optimizer.configure(|state| state.max_iters(max_iter));
    #[cfg(feature = "obs_slog")]
    if verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    OptimOutcome::new(
        result.take_best_param(),
        -result.get_best_cost(),
        &termination,
        iterations,
        function_counts,
        None,
        None,
    )
}

/// Run the BFGS stage for a log-likelihood problem.
///
/// This is the shared runner used by both line-search variants. It wires up:
/// - the likelihood via [`ArgMinAdapter`],
/// - the chosen BFGS solver (Hager–Zhang or More–Thuente line search),
/// - the initial parameter `theta0` and an identity inverse Hessian,
/// - optional observers (behind the `obs_slog` feature),
/// - optional `max_iters`,
///   then executes the solver and converts the result into [`OptimOutcome`].
///
/// # Type Parameters
/// - `F`: log-likelihood type implementing [`LogLikelihood`].
/// - `L`: line search; any `L` for which `BFGS<L, f64>` solves the adapter
///   on [`QuasiNewtonState`].
///
/// # Returns
/// An [`OptimOutcome`] containing the best parameter found, best
/// log-likelihood value ℓ(θ̂), termination status, iteration count,
/// function-evaluation counts, the last gradient norm, and the final
/// inverse Hessian of the cost.
///
/// # Errors
/// - Propagates any `argmin` runtime error (solver errors, line-search
///   failures, etc.) via the crate’s `From<argmin::core::Error>` conversion.
/// - Propagates any validation errors encountered when constructing
///   [`OptimOutcome`].
///
/// # Examples
/// ```ignore
/// let problem = ArgMinAdapter::new(&likelihood);
/// let solver  = build_bfgs_more_thuente(&opts.refinement)?;
/// let out     = run_bfgs(theta0, &opts.refinement, false, problem, solver)?;
/// println!("done in {} iters, status: {}", out.iterations, out.status);
/// ```
pub fn run_bfgs<'a, F, L>(
    theta0: Theta, tols: &Tolerances, verbose: bool, problem: ArgMinAdapter<'a, F>,
    solver: BFGS<L, Cost>,
) -> OptResult<OptimOutcome>
where
    F: LogLikelihood + ?Sized,
    BFGS<L, Cost>: Solver<ArgMinAdapter<'a, F>, QuasiNewtonState>,
{
    #[cfg(feature = "obs_slog")]
    if verbose {
        log_initial_state(&theta0, &problem, true)?;
    }
    #[cfg(not(feature = "obs_slog"))]
    let _ = verbose;

    let inv_hessian0 = Hessian::eye(theta0.len());
    let mut optimizer = Executor::new(problem, solver)
        .configure(|state| state.param(theta0).inv_hessian(inv_hessian0));
    #[cfg(feature = "obs_slog")]
    if verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    if let Some(max_iter) = tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    let grad = result.take_gradient();
    let inv_hessian = result.take_inv_hessian();
    OptimOutcome::new(
        result.take_best_param(),
        -result.get_best_cost(),
        &termination,
        iterations,
        function_counts,
        grad,
        inv_hessian,
    )
}

/// Derivative-free initial stage: Nelder–Mead from the scaled simplex.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NelderMeadStage {
    pub tols: SimplexTolerances,
    pub verbose: bool,
}

impl NelderMeadStage {
    pub fn new(tols: SimplexTolerances, verbose: bool) -> Self {
        Self { tols, verbose }
    }
}

impl LocalMinimizer for NelderMeadStage {
    fn minimize<F: LogLikelihood + ?Sized>(
        &self, f: &F, theta0: Theta,
    ) -> OptResult<OptimOutcome> {
        let solver = build_nelder_mead(&theta0, &self.tols)?;
        run_nelder_mead(&theta0, &self.tols, self.verbose, ArgMinAdapter::new(f), solver)
    }
}

/// Quasi-Newton refinement stage: BFGS from an identity inverse Hessian.
///
/// If `θ₀` already meets `tols.tol_grad` the solver stops before its first
/// iteration and the reported inverse Hessian is that identity seed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BfgsStage {
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    pub verbose: bool,
}

impl BfgsStage {
    pub fn new(tols: Tolerances, line_searcher: LineSearcher, verbose: bool) -> Self {
        Self { tols, line_searcher, verbose }
    }
}

impl LocalMinimizer for BfgsStage {
    fn minimize<F: LogLikelihood + ?Sized>(
        &self, f: &F, theta0: Theta,
    ) -> OptResult<OptimOutcome> {
        let problem = ArgMinAdapter::new(f);
        match self.line_searcher {
            LineSearcher::MoreThuente => {
                let solver = build_bfgs_more_thuente(&self.tols)?;
                run_bfgs(theta0, &self.tols, self.verbose, problem, solver)
            }
            LineSearcher::HagerZhang => {
                let solver = build_bfgs_hager_zhang(&self.tols)?;
                run_bfgs(theta0, &self.tols, self.verbose, problem, solver)
            }
        }
    }
}

// ---- Helper Methods ----

#[cfg(feature = "obs_slog")]
fn log_initial_state<F>(
    theta0: &Theta, problem: &ArgMinAdapter<'_, F>, with_grad: bool,
) -> OptResult<()>
where
    F: LogLikelihood + ?Sized,
{
    let ll0 = -problem.cost(theta0)?;
    let g0n = if with_grad { problem.gradient(theta0).ok().map(|g| g.l2_norm()) } else { None };

    eprintln!(
        "init: ell(theta0) = {:.6}{}",
        ll0,
        g0n.map(|n| format!(", ||grad|| = {:.6}", n)).unwrap_or_default()
    );
    Ok(())
}
