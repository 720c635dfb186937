//! Integration tests for the curve-fitting pipeline.
//!
//! Purpose
//! -------
//! - Validate the end-to-end path: from validated data and a model closure,
//!   through the two-stage optimizer, to `(p, cov, L)`, `get_result`, and
//!   posterior profiles.
//! - Exercise simulated Gaussian data sets as well as the fixed reference
//!   data set whose answers are known in closed form.
//!
//! Coverage
//! --------
//! - `fitting::least_squares` with and without noise scaling.
//! - `fitting::outlier_fit` with both outlier methods.
//! - Per-point `yerr` against closed-form weighted least squares.
//! - `fitting::get_result`, `FitResult` accessors and `into_parts`, and
//!   standardized residuals of a robust fit.
//! - `optimization::loglik_optimizer`:
//!   - Quasi-Newton and finite-difference covariance sources.
//!   - Initial-stage failure reporting.
//! - `posterior::PosteriorProfile` on a fitted result.
//!
//! Exclusions
//! ----------
//! - Fine-grained validation of building blocks (data validation, stable
//!   likelihood terms, finite differences); those are covered by unit tests.
//! - Plot rendering, which lives outside this crate.
use bayesfit::{
    fitting::{
        FitData, FitResult, OutlierMethod, get_result, least_squares, outlier_fit,
        standardized_residuals,
    },
    optimization::{
        errors::OptError,
        loglik_optimizer::{CovarianceMethod, MLEOptions, SimplexTolerances, Theta, Tolerances},
    },
    posterior::{DEFAULT_PROFILE_POINTS, PosteriorProfile, ProfileScale},
};
use ndarray::{Array1, Array2, array};
use rand::{SeedableRng, distributions::Distribution, rngs::StdRng};
use statrs::distribution::Normal;

fn line(x: &Array1<f64>, p: &Theta) -> Array1<f64> {
    x.mapv(|xi| p[0] + p[1] * xi)
}

/// Purpose
/// -------
/// Simulate `y = a + b·x + ε` with `ε ~ N(0, σ²)` on an even grid.
///
/// Parameters
/// ----------
/// - `n`: number of points on `x ∈ [0, 10]`.
/// - `truth`: `(a, b)`.
/// - `sigma`: noise standard deviation.
/// - `seed`: seed for `StdRng`, so every run sees the same data.
fn simulate_line(n: usize, truth: (f64, f64), sigma: f64, seed: u64) -> (Array1<f64>, Array1<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, sigma).expect("valid noise distribution");
    let x = Array1::linspace(0.0, 10.0, n);
    let y = x.mapv(|xi| truth.0 + truth.1 * xi + noise.sample(&mut rng));
    (x, y)
}

/// Closed-form OLS standard errors of `(a, b)` for a uniform `yerr`.
fn closed_form_line_errors(x: &Array1<f64>, yerr: f64) -> (f64, f64) {
    let n = x.len() as f64;
    let mean = x.mean().expect("non-empty x");
    let sxx = x.mapv(|xi| (xi - mean).powi(2)).sum();
    let sum_x2 = x.mapv(|xi| xi * xi).sum();
    let var_b = yerr * yerr / sxx;
    let var_a = yerr * yerr * sum_x2 / (n * sxx);
    (var_a.sqrt(), var_b.sqrt())
}

/// Closed-form weighted-least-squares errors of `(a, b)` for per-point
/// `yerr`, from `(XᵀWX)⁻¹` with `W = diag(1/σᵢ²)`.
fn closed_form_weighted_line_errors(x: &Array1<f64>, yerr: &Array1<f64>) -> (f64, f64) {
    let w = yerr.mapv(|s| 1.0 / (s * s));
    let s = w.sum();
    let sx = (&w * x).sum();
    let sxx = (&w * &x.mapv(|xi| xi * xi)).sum();
    let det = s * sxx - sx * sx;
    ((sxx / det).sqrt(), (s / det).sqrt())
}

fn fd_options() -> MLEOptions {
    MLEOptions::default().with_covariance(CovarianceMethod::FiniteDifference)
}

fn reference_data() -> FitData {
    FitData::new(array![1.0, 2.0, 3.0, 4.0, 5.0], array![2.1, 3.9, 6.2, 7.8, 10.1], 0.2)
        .expect("reference data is valid")
}

fn assert_symmetric(cov: &Array2<f64>) {
    assert_eq!(cov.nrows(), cov.ncols());
    for i in 0..cov.nrows() {
        for j in 0..cov.ncols() {
            assert_eq!(cov[[i, j]], cov[[j, i]], "cov[{i},{j}] != cov[{j},{i}]");
        }
    }
}

#[test]
// Purpose
// -------
// Least squares on simulated Gaussian data recovers the truth within a few
// standard errors, and the finite-difference covariance reproduces the
// closed-form OLS errors.
//
// Given
// -----
// - `n = 200` points of `y = 1 + 0.5x + N(0, 0.3²)`, `yerr = 0.3`.
//
// Expect
// ------
// - `|p − truth| < 4·perr` per coordinate.
// - `perr` within 1 % of `√diag(σ²(XᵀX)⁻¹)`.
fn gaussian_ols_recovers_parameters_and_closed_form_errors() {
    // Arrange
    let sigma = 0.3;
    let (x, y) = simulate_line(200, (1.0, 0.5), sigma, 7);
    let (se_a, se_b) = closed_form_line_errors(&x, sigma);
    let data = FitData::new(x, y, sigma).expect("simulated data is valid");

    // Act
    let fit = least_squares(line, array![0.0, 0.0], data, false, &fd_options())
        .expect("OLS fit should succeed");
    let (p, perr) = get_result(&fit);

    // Assert
    assert!((p[0] - 1.0).abs() < 4.0 * perr[0]);
    assert!((p[1] - 0.5).abs() < 4.0 * perr[1]);
    assert!((perr[0] / se_a - 1.0).abs() < 1e-2);
    assert!((perr[1] / se_b - 1.0).abs() < 1e-2);
}

#[test]
// Purpose
// -------
// Noise scaling recovers the true noise level when the supplied `yerr`
// is wrong by a constant factor.
//
// Given
// -----
// - `n = 400` points with true `σ = 0.5`, fitted with `yerr = 2.0`.
//
// Expect
// ------
// - Without scaling, errors match the closed form for `yerr = 2.0`.
// - With scaling, errors are within 15 % of the closed form for `σ = 0.5`.
// - Both fits agree on `p`.
fn noise_scaling_reports_errors_for_true_noise_level() {
    // Arrange
    let (x, y) = simulate_line(400, (-2.0, 1.5), 0.5, 11);
    let (se_a_true, se_b_true) = closed_form_line_errors(&x, 0.5);
    let (_, se_b_claimed) = closed_form_line_errors(&x, 2.0);
    let data = FitData::new(x, y, 2.0).expect("simulated data is valid");

    // Act
    let plain = least_squares(line, array![0.0, 1.0], data.clone(), false, &fd_options())
        .expect("OLS fit should succeed");
    let scaled = least_squares(line, array![0.0, 1.0], data, true, &fd_options())
        .expect("noise-scaled fit should succeed");
    let (_, perr_plain) = get_result(&plain);
    let (_, perr_scaled) = get_result(&scaled);

    // Assert
    assert!((perr_plain[1] / se_b_claimed - 1.0).abs() < 1e-2);
    assert!((perr_scaled[0] / se_a_true - 1.0).abs() < 0.15);
    assert!((perr_scaled[1] / se_b_true - 1.0).abs() < 0.15);
    assert!((plain.p() - scaled.p()).iter().all(|d| d.abs() < 1e-4));
}

#[test]
// Purpose
// -------
// Pin the reference data set to its closed-form answers.
//
// Given
// -----
// - `x = 1..5`, `y = (2.1, 3.9, 6.2, 7.8, 10.1)`, `yerr = 0.2`.
//
// Expect
// ------
// - `p ≈ (0.05, 1.99)`, `perr ≈ (0.20976, 0.063246)`, `L ≈ −1.3375`.
// - Noise scaling multiplies the variances by `0.535`.
// - The default quasi-Newton covariance gives the same `perr` within 2e-4.
fn reference_scenario_matches_closed_form() {
    // Act
    let fd = least_squares(line, array![1.0, 1.0], reference_data(), false, &fd_options())
        .expect("reference fit should succeed");
    let scaled = least_squares(line, array![1.0, 1.0], reference_data(), true, &fd_options())
        .expect("noise-scaled reference fit should succeed");
    let qn = least_squares(line, array![1.0, 1.0], reference_data(), false, &MLEOptions::default())
        .expect("quasi-Newton reference fit should succeed");

    // Assert
    let (p, perr) = get_result(&fd);
    assert!((p[0] - 0.05).abs() < 1e-3);
    assert!((p[1] - 1.99).abs() < 1e-3);
    assert!((perr[0] - 0.20976).abs() < 1e-4);
    assert!((perr[1] - 0.063246).abs() < 1e-4);
    assert!((fd.value() + 1.3375).abs() < 1e-4);

    let (_, perr_scaled) = get_result(&scaled);
    for i in 0..2 {
        let ratio = (perr_scaled[i] / perr[i]).powi(2);
        assert!((ratio - 0.535).abs() < 1e-3);
    }

    let (p_qn, perr_qn) = get_result(&qn);
    assert!((p_qn[0] - 0.05).abs() < 1e-3);
    assert!((p_qn[1] - 1.99).abs() < 1e-3);
    assert!((perr_qn[0] - 0.20976).abs() < 2e-4, "perr = {perr_qn:?}");
    assert!((perr_qn[1] - 0.063246).abs() < 2e-4, "perr = {perr_qn:?}");
}

#[test]
// Purpose
// -------
// A per-point `yerr` weights each residual by its own uncertainty.
//
// Given
// -----
// - `n = 120` points of `y = 0.5 + 2x + N(0, σᵢ²)` with
//   `σᵢ = 0.1 + 0.05·xᵢ`, fitted with `yerr = σ`.
//
// Expect
// ------
// - `|p − truth| < 4·perr` per coordinate.
// - `perr` within 1 % of the closed-form weighted-least-squares errors.
// - A uniform `yerr` gives a clearly different intercept error.
fn per_point_yerr_matches_weighted_least_squares() {
    // Arrange
    let mut rng = StdRng::seed_from_u64(5);
    let unit = Normal::new(0.0, 1.0).expect("valid noise distribution");
    let x = Array1::linspace(0.0, 10.0, 120);
    let yerr = x.mapv(|xi| 0.1 + 0.05 * xi);
    let y = Array1::from_iter(
        x.iter().zip(yerr.iter()).map(|(&xi, &s)| 0.5 + 2.0 * xi + s * unit.sample(&mut rng)),
    );
    let (se_a, se_b) = closed_form_weighted_line_errors(&x, &yerr);
    let uniform = FitData::new(x.clone(), y.clone(), 0.3).expect("simulated data is valid");
    let data = FitData::new(x, y, yerr).expect("simulated data is valid");

    // Act
    let fit = least_squares(line, array![0.0, 1.0], data, false, &fd_options())
        .expect("weighted fit should succeed");
    let unweighted = least_squares(line, array![0.0, 1.0], uniform, false, &fd_options())
        .expect("uniform fit should succeed");
    let (p, perr) = get_result(&fit);
    let (_, perr_uniform) = get_result(&unweighted);

    // Assert
    assert!((p[0] - 0.5).abs() < 4.0 * perr[0], "p = {p:?}, perr = {perr:?}");
    assert!((p[1] - 2.0).abs() < 4.0 * perr[1], "p = {p:?}, perr = {perr:?}");
    assert!((perr[0] / se_a - 1.0).abs() < 1e-2, "perr = {perr:?}, closed form = ({se_a}, {se_b})");
    assert!((perr[1] / se_b - 1.0).abs() < 1e-2, "perr = {perr:?}, closed form = ({se_a}, {se_b})");
    assert!((perr_uniform[0] / se_a - 1.0).abs() > 0.2, "uniform perr = {perr_uniform:?}");
}

#[test]
// Purpose
// -------
// Every fitting mode returns a symmetric covariance, with either source.
fn covariance_is_symmetric_for_every_mode() {
    let (x, y) = simulate_line(50, (0.5, 2.0), 0.2, 3);
    let data = FitData::new(x, y, 0.2).expect("simulated data is valid");
    let p0 = array![0.0, 1.0];

    for opts in [MLEOptions::default(), fd_options()] {
        let fits: Vec<FitResult> = vec![
            least_squares(line, p0.clone(), data.clone(), false, &opts).expect("OLS fit"),
            least_squares(line, p0.clone(), data.clone(), true, &opts).expect("scaled fit"),
            outlier_fit(line, p0.clone(), data.clone(), OutlierMethod::Conservative, &opts)
                .expect("conservative fit"),
            outlier_fit(line, p0.clone(), data.clone(), OutlierMethod::Cauchy, &opts)
                .expect("cauchy fit"),
        ];
        for fit in &fits {
            assert_symmetric(fit.cov());
        }
    }
}

#[test]
// Purpose
// -------
// Robust fits move less than least squares when a few points are wildly
// off.
//
// Given
// -----
// - `n = 60` simulated points with `σ = 0.2`.
// - Three points shifted by `+25`.
//
// Expect
// ------
// - Both robust slopes are closer to the truth than the OLS slope.
// - `get_result` errors are finite for the robust fits.
// - The Cauchy fit's standardized residuals single out the shifted points.
fn robust_fits_move_less_than_least_squares_under_outliers() {
    // Arrange
    let (x, mut y) = simulate_line(60, (1.0, 2.0), 0.2, 21);
    for idx in [10, 35, 50] {
        y[idx] += 25.0;
    }
    let data = FitData::new(x, y, 0.2).expect("simulated data is valid");
    let p0 = array![0.5, 1.5];
    let opts = MLEOptions::default();

    // Act
    let ols = least_squares(line, p0.clone(), data.clone(), false, &opts).expect("OLS fit");
    let conservative =
        outlier_fit(line, p0.clone(), data.clone(), OutlierMethod::Conservative, &opts)
            .expect("conservative fit");
    let cauchy = outlier_fit(line, p0, data, OutlierMethod::Cauchy, &opts).expect("cauchy fit");

    // Assert
    let slope_error = |fit: &FitResult| (fit.p()[1] - 2.0).abs();
    assert!(slope_error(&conservative) < slope_error(&ols));
    assert!(slope_error(&cauchy) < slope_error(&ols));
    for fit in [&conservative, &cauchy] {
        let (_, perr) = get_result(fit);
        assert!(perr.iter().all(|v| v.is_finite()));
    }

    let (p, cov, likelihood) = cauchy.into_parts();
    assert_symmetric(&cov);
    let residuals = standardized_residuals(&likelihood, &p).expect("residuals");
    let inlier_max = residuals
        .iter()
        .enumerate()
        .filter(|(i, _)| ![10, 35, 50].contains(i))
        .fold(0.0_f64, |acc, (_, r)| acc.max(r.abs()));
    for idx in [10, 35, 50] {
        assert!(residuals[idx] < -50.0, "r[{idx}] = {}", residuals[idx]);
    }
    assert!(inlier_max < 5.0, "largest inlier residual {inlier_max}");
}

#[test]
// Purpose
// -------
// A Nelder–Mead stage that cannot converge aborts the fit with
// `InitialOptimizationFailed`.
//
// Given
// -----
// - The reference data and a simplex stage capped at one iteration.
//
// Expect
// ------
// - `Err(InitialOptimizationFailed { .. })`, whose message advises
//   adjusting the initial guess.
fn capped_initial_stage_reports_initial_failure() {
    // Arrange
    let opts = MLEOptions::new(
        SimplexTolerances::new(1e-12, 1).expect("valid simplex tolerances"),
        Tolerances::default(),
        Default::default(),
        CovarianceMethod::QuasiNewton,
        false,
    );

    // Act
    let result = least_squares(line, array![10.0, -3.0], reference_data(), false, &opts);

    // Assert
    match result {
        Err(err @ OptError::InitialOptimizationFailed { .. }) => {
            assert!(err.to_string().contains("initial guess"));
        }
        other => panic!("Expected InitialOptimizationFailed, got {other:?}"),
    }
}

#[test]
// Purpose
// -------
// Posterior profiles are available on fitted results and agree with the
// Gaussian approximation for a linear model.
fn posterior_profile_of_fitted_line_is_gaussian() {
    // Arrange
    let fit = least_squares(line, array![1.0, 1.0], reference_data(), false, &fd_options())
        .expect("reference fit should succeed");

    // Act
    let profile =
        PosteriorProfile::from_fit(&fit, 1, DEFAULT_PROFILE_POINTS, ProfileScale::Probability)
            .expect("profile should succeed");

    // Assert
    let peak = profile.gaussian.fold(0.0_f64, |acc, &v| acc.max(v));
    let max_gap = profile
        .likelihood
        .iter()
        .zip(profile.gaussian.iter())
        .fold(0.0_f64, |acc, (l, g)| acc.max((l - g).abs()));
    assert!(max_gap < 1e-2 * peak);
}
