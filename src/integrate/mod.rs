//! Numerical integration of scalar functions.
//!
//! # Quadrature
//!
//! - [`integrate`] - adaptive Gauss-Kronrod quadrature over finite,
//!   semi-infinite and infinite ranges
//! - [`quadrature::adaptive_quad`] - the finite-range driver with an explicit rule
//! - [`quadrature::GaussKronrodRule`] - the embedded rule pairs `G7-K15` up to `G30-K61`
//!
//! # Cubature
//!
//! - [`integrate_box`] - integration over an axis-aligned box
//! - [`integrate_box_with`] - the same with a caller-supplied [`CubatureOracle`]
//!
//! Every entry point returns an [`IntegrationResult`] whose `status` says how the
//! run ended; malformed input is reported as [`IntegrationStatus::InvalidInput`]
//! rather than a panic. Use [`IntegrationResult::into_result`] to turn failures
//! into an [`IntegrateError`].
//!
//! # Example
//!
//! ```
//! use quadmin::{integrate, QuadOptions};
//!
//! // ∫_0^∞ 1 / ((x + 1) √x) dx = π
//! let f = |x: f64| 1.0 / ((x + 1.0) * x.sqrt());
//! let result = integrate(f, 0.0, f64::INFINITY, &QuadOptions::default());
//! assert!(result.status.is_ok());
//! assert!((result.value - std::f64::consts::PI).abs() < 1e-6);
//! ```

pub mod cubature;
pub mod error;
pub mod quadrature;
pub mod traits;

use log::{debug, warn};

use crate::function::{ScalarFunction, VectorFunction};

pub use cubature::HaltonOracle;
pub use error::{IntegrateError, IntegrateResult};
pub use quadrature::{GaussKronrodRule, InfiniteDomain, RuleEstimate, adaptive_quad};
pub use traits::{
    CubatureOptions, CubatureOracle, IntegrationResult, IntegrationStatus, Interval, OracleReport,
    OracleStatus, QuadOptions,
};

fn reject(err: IntegrateError) -> IntegrationResult {
    warn!("{}", err);
    IntegrationResult::invalid()
}

/// Integrate `f` over `[lower, upper]`.
///
/// Bounds may be `-inf` and/or `+inf`; unbounded ranges are mapped onto
/// `(0, 1)` by [`InfiniteDomain`] and then handled exactly like finite ones,
/// so the result has the same shape on every path.
///
/// Input policy:
///
/// - `lower > upper` is `InvalidInput`, whether or not the bounds are finite
/// - `lower == upper` (finite) integrates to exactly `0` with status `Ok`
/// - NaN bounds, `-inf..-inf`, `+inf..+inf`, invalid tolerances and an
///   unknown `rule_order` are `InvalidInput`
///
/// See [`adaptive_quad`] for the termination statuses.
pub fn integrate<F>(f: F, lower: f64, upper: f64, options: &QuadOptions) -> IntegrationResult
where
    F: ScalarFunction,
{
    let context = || "integrate".to_string();

    if lower.is_nan() || upper.is_nan() || lower > upper {
        return reject(IntegrateError::InvalidInterval {
            a: lower,
            b: upper,
            context: context(),
        });
    }
    if let Err(e) = options.validate() {
        return reject(e);
    }
    let Some(rule) = GaussKronrodRule::from_points(options.rule_order) else {
        return reject(IntegrateError::InvalidParameter {
            parameter: "rule_order".to_string(),
            message: format!(
                "no Gauss-Kronrod rule with {} points (expected 15, 21, 31, 41, 51 or 61)",
                options.rule_order
            ),
        });
    };

    if lower == upper {
        if lower.is_finite() {
            return IntegrationResult::zero();
        }
        return reject(IntegrateError::InvalidInterval {
            a: lower,
            b: upper,
            context: context(),
        });
    }

    if lower.is_finite() && upper.is_finite() {
        return adaptive_quad(&f, lower, upper, rule, options);
    }

    match InfiniteDomain::new(f, lower, upper) {
        Some(mapped) => {
            debug!("integrate: mapping [{}, {}] onto (0, 1)", lower, upper);
            adaptive_quad(&mapped, 0.0, 1.0, rule, options)
        }
        None => reject(IntegrateError::InvalidInterval {
            a: lower,
            b: upper,
            context: context(),
        }),
    }
}

/// Integrate `f` over the box `[lower[0], upper[0]] x ... x [lower[n-1], upper[n-1]]`
/// with the default [`HaltonOracle`].
///
/// ```
/// use quadmin::{integrate_box, CubatureOptions};
///
/// let f = |x: &[f64]| x[0] * x[1];
/// let result = integrate_box(f, &[0.0, 0.0], &[1.0, 2.0], &CubatureOptions::default());
/// assert!((result.value - 1.0).abs() < 1e-2);
/// ```
pub fn integrate_box<F>(
    f: F,
    lower: &[f64],
    upper: &[f64],
    options: &CubatureOptions,
) -> IntegrationResult
where
    F: VectorFunction,
{
    integrate_box_with(&HaltonOracle, f, lower, upper, options)
}

/// Integrate `f` over a box with a caller-supplied cubature routine.
///
/// The region and options are validated here; the oracle then receives `f`,
/// the bounds and `options` unchanged, and its [`OracleStatus`] is mapped onto
/// [`IntegrationStatus`]. The `subdivisions` field of the result carries the
/// oracle's round count.
///
/// Empty or mismatched bounds, non-finite bounds and `lower[i] > upper[i]` are
/// `InvalidInput`. A box with zero volume integrates to exactly `0`.
pub fn integrate_box_with<O, F>(
    oracle: &O,
    f: F,
    lower: &[f64],
    upper: &[f64],
    options: &CubatureOptions,
) -> IntegrationResult
where
    O: CubatureOracle + ?Sized,
    F: VectorFunction,
{
    if lower.is_empty() || lower.len() != upper.len() {
        return reject(IntegrateError::InvalidInput {
            context: format!(
                "integrate_box: bounds of length {} and {}",
                lower.len(),
                upper.len()
            ),
        });
    }
    for (&a, &b) in lower.iter().zip(upper) {
        if !(a.is_finite() && b.is_finite()) || a > b {
            return reject(IntegrateError::InvalidInterval {
                a,
                b,
                context: "integrate_box".to_string(),
            });
        }
    }
    if let Err(e) = options.validate() {
        return reject(e);
    }
    if lower.iter().zip(upper).any(|(a, b)| a == b) {
        return IntegrationResult::zero();
    }

    let report = oracle.integrate(&f, lower, upper, options);
    let status = IntegrationStatus::from(report.status);
    debug!(
        "integrate_box: {:?} after {} rounds, {} evaluations (value {}, error {})",
        report.status, report.rounds, report.neval, report.value, report.error
    );
    if !status.is_ok() {
        warn!("integrate_box: oracle finished with {:?}", report.status);
    }

    IntegrationResult {
        value: report.value,
        error_estimate: report.error,
        status,
        neval: report.neval,
        subdivisions: report.rounds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::f64::consts::PI;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_constant_function() {
        init();
        for &(a, b) in &[(0.0, 1.0), (-3.5, 2.0), (1e-3, 1e3)] {
            let result = integrate(|_| 2.5, a, b, &QuadOptions::default());
            assert_eq!(result.status, IntegrationStatus::Ok);
            assert_relative_eq!(result.value, 2.5 * (b - a), max_relative = 1e-12);
        }
    }

    #[test]
    fn test_slow_convergence_regression() {
        init();
        let f = |x: f64| 1.0 / ((x + 1.0) * x.sqrt());
        let result = integrate(f, 0.0, f64::INFINITY, &QuadOptions::default());
        assert_eq!(result.status, IntegrationStatus::Ok);
        assert_relative_eq!(result.value, PI, max_relative = 1e-7);

        let loose = QuadOptions::default().tolerances(0.0, 1e-6);
        let result = integrate(f, 0.0, f64::INFINITY, &loose);
        assert_eq!(result.status, IntegrationStatus::Ok);
        assert_relative_eq!(result.value, PI, max_relative = 1e-6);
    }

    #[test]
    fn test_every_rule_order() {
        let f = |x: f64| 1.0 / ((x + 1.0) * x.sqrt());
        for points in [15, 21, 31, 41, 51, 61] {
            let options = QuadOptions::default().rule_order(points);
            let result = integrate(f, 0.0, f64::INFINITY, &options);
            assert_eq!(result.status, IntegrationStatus::Ok, "rule {}", points);
            assert_relative_eq!(result.value, PI, max_relative = 1e-7);
            assert_eq!(result.neval % points, 0);
        }
    }

    #[test]
    fn test_even_function_symmetry() {
        let f = |x: f64| (-x * x).exp();
        let options = QuadOptions::default();
        let whole = integrate(f, f64::NEG_INFINITY, f64::INFINITY, &options);
        let half = integrate(f, 0.0, f64::INFINITY, &options);
        assert!(whole.status.is_ok() && half.status.is_ok());
        assert_relative_eq!(whole.value, 2.0 * half.value, max_relative = 1e-10);
        assert_relative_eq!(whole.value, PI.sqrt(), max_relative = 1e-10);
    }

    #[test]
    fn test_lower_infinite_bound() {
        let result = integrate(|x: f64| x.exp(), f64::NEG_INFINITY, 0.0, &QuadOptions::default());
        assert_eq!(result.status, IntegrationStatus::Ok);
        assert_relative_eq!(result.value, 1.0, max_relative = 1e-8);
    }

    #[test]
    fn test_reversed_bounds_are_invalid() {
        let options = QuadOptions::default();
        for &(a, b) in &[
            (1.0, 0.0),
            (f64::INFINITY, 0.0),
            (0.0, f64::NEG_INFINITY),
            (f64::INFINITY, f64::NEG_INFINITY),
        ] {
            let result = integrate(|x: f64| x, a, b, &options);
            assert_eq!(result.status, IntegrationStatus::InvalidInput);
            assert!(result.value.is_nan());
            assert_eq!(result.neval, 0);
        }
    }

    #[test]
    fn test_degenerate_and_malformed_bounds() {
        let options = QuadOptions::default();
        let result = integrate(|x: f64| x, 2.0, 2.0, &options);
        assert_eq!(result.status, IntegrationStatus::Ok);
        assert_eq!(result.value, 0.0);
        assert_eq!(result.error_estimate, 0.0);

        for &(a, b) in &[
            (f64::NAN, 1.0),
            (0.0, f64::NAN),
            (f64::INFINITY, f64::INFINITY),
            (f64::NEG_INFINITY, f64::NEG_INFINITY),
        ] {
            assert_eq!(
                integrate(|x: f64| x, a, b, &options).status,
                IntegrationStatus::InvalidInput
            );
        }
    }

    #[test]
    fn test_invalid_options() {
        let f = |x: f64| x;
        let bad_rule = QuadOptions::default().rule_order(17);
        assert_eq!(integrate(f, 0.0, 1.0, &bad_rule).status, IntegrationStatus::InvalidInput);

        let bad_tol = QuadOptions::default().tolerances(-1.0, 1e-8);
        assert_eq!(integrate(f, 0.0, 1.0, &bad_tol).status, IntegrationStatus::InvalidInput);
        assert!(matches!(
            integrate(f, 0.0, 1.0, &bad_rule).into_result(),
            Err(IntegrateError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_nan_integrand_surfaces() {
        let result = integrate(|x: f64| (x - 2.0).sqrt(), 0.0, 1.0, &QuadOptions::default());
        assert_eq!(result.status, IntegrationStatus::Divergent);
        assert!(result.value.is_nan());
    }

    #[test]
    fn test_idempotent() {
        let f = |x: f64| (1.0 + x * x).ln() / (1.0 + x * x);
        let options = QuadOptions::default();
        let a = integrate(f, 0.0, f64::INFINITY, &options);
        let b = integrate(f, 0.0, f64::INFINITY, &options);
        assert_eq!(a.value.to_bits(), b.value.to_bits());
        assert_eq!(a.error_estimate.to_bits(), b.error_estimate.to_bits());
        assert_eq!(a.neval, b.neval);
        // ∫_0^∞ ln(1 + x²) / (1 + x²) dx = π ln 2
        assert_relative_eq!(a.value, PI * 2f64.ln(), max_relative = 1e-7);
    }

    /// Records what it was called with and answers with a canned report.
    struct Recording {
        seen: RefCell<Vec<(Vec<f64>, Vec<f64>, CubatureOptions)>>,
        status: OracleStatus,
    }

    impl CubatureOracle for Recording {
        fn integrate<F>(
            &self,
            f: &F,
            lower: &[f64],
            upper: &[f64],
            options: &CubatureOptions,
        ) -> OracleReport
        where
            F: VectorFunction + ?Sized,
        {
            self.seen
                .borrow_mut()
                .push((lower.to_vec(), upper.to_vec(), options.clone()));
            OracleReport {
                value: f.evaluate(lower),
                error: 0.5,
                neval: 1,
                rounds: 3,
                status: self.status,
            }
        }
    }

    #[test]
    fn test_box_forwards_unchanged() {
        let oracle = Recording {
            seen: RefCell::new(Vec::new()),
            status: OracleStatus::BudgetExhausted,
        };
        let options = CubatureOptions::with_max_evals(77).tolerances(1e-3, 1e-4).seed(9);
        let result = integrate_box_with(&oracle, |x: &[f64]| x[0] + x[1], &[1.0, 2.0], &[3.0, 4.0], &options);

        let seen = oracle.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, vec![1.0, 2.0]);
        assert_eq!(seen[0].1, vec![3.0, 4.0]);
        assert_eq!(seen[0].2, options);

        assert_eq!(result.value, 3.0);
        assert_eq!(result.error_estimate, 0.5);
        assert_eq!(result.status, IntegrationStatus::MaxSubdivisionsReached);
        assert_eq!(result.subdivisions, 3);
    }

    #[test]
    fn test_box_status_mapping() {
        for (oracle_status, expected) in [
            (OracleStatus::Converged, IntegrationStatus::Ok),
            (OracleStatus::BudgetExhausted, IntegrationStatus::MaxSubdivisionsReached),
            (OracleStatus::NonFinite, IntegrationStatus::Divergent),
            (OracleStatus::Rejected, IntegrationStatus::InvalidInput),
        ] {
            let oracle = Recording {
                seen: RefCell::new(Vec::new()),
                status: oracle_status,
            };
            let result = integrate_box_with(&oracle, |_: &[f64]| 1.0, &[0.0], &[1.0], &CubatureOptions::default());
            assert_eq!(result.status, expected);
        }
    }

    #[test]
    fn test_box_validation() {
        let f = |_: &[f64]| 1.0;
        let options = CubatureOptions::default();
        assert_eq!(integrate_box(f, &[], &[], &options).status, IntegrationStatus::InvalidInput);
        assert_eq!(integrate_box(f, &[0.0], &[1.0, 2.0], &options).status, IntegrationStatus::InvalidInput);
        assert_eq!(integrate_box(f, &[0.0, 2.0], &[1.0, 1.0], &options).status, IntegrationStatus::InvalidInput);
        assert_eq!(
            integrate_box(f, &[0.0], &[f64::INFINITY], &options).status,
            IntegrationStatus::InvalidInput
        );

        let flat = integrate_box(f, &[0.0, 1.0], &[1.0, 1.0], &options);
        assert_eq!(flat.status, IntegrationStatus::Ok);
        assert_eq!(flat.value, 0.0);
        assert_eq!(flat.neval, 0);
    }

    #[test]
    fn test_box_budget_below_replicas_is_rejected() {
        let oracle = Recording {
            seen: RefCell::new(Vec::new()),
            status: OracleStatus::Converged,
        };
        let options = CubatureOptions::with_max_evals(5);
        let result = integrate_box_with(&oracle, |_: &[f64]| 1.0, &[0.0], &[1.0], &options);
        assert_eq!(result.status, IntegrationStatus::InvalidInput);
        assert_eq!(result.neval, 0);
        assert!(oracle.seen.borrow().is_empty());
    }

    #[test]
    fn test_box_smooth_integrand() {
        init();
        // ∫_[0,π]^3 sin(x) sin(y) sin(z) = 8
        let f = |x: &[f64]| x.iter().map(|v| v.sin()).product::<f64>();
        let options = CubatureOptions::with_max_evals(20_000).tolerances(1e-3, 1e-3);
        let result = integrate_box(f, &[0.0; 3], &[PI; 3], &options);
        assert!(matches!(
            result.status,
            IntegrationStatus::Ok | IntegrationStatus::MaxSubdivisionsReached
        ));
        assert_relative_eq!(result.value, 8.0, max_relative = 1e-2);
        assert!(result.neval <= 20_000);
    }
}
