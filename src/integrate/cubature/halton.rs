//! Randomized quasi-Monte-Carlo over a box.

use log::{trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::function::VectorFunction;
use crate::integrate::traits::{CubatureOptions, CubatureOracle, OracleReport, OracleStatus};

/// Points per replica in the first round (capped by the budget).
const INITIAL_POINTS: usize = 16;

/// Van der Corput radical inverse of `index` in `base`, in `[0, 1)`.
fn van_der_corput(index: usize, base: usize) -> f64 {
    let mut result = 0.0;
    let mut digit = 1.0 / base as f64;
    let mut n = index;

    while n > 0 {
        result += (n % base) as f64 * digit;
        digit /= base as f64;
        n /= base;
    }

    result
}

/// The first `count` primes, one Halton base per dimension.
fn first_primes(count: usize) -> Vec<usize> {
    let mut primes: Vec<usize> = Vec::with_capacity(count);
    let mut candidate = 2;
    while primes.len() < count {
        if primes
            .iter()
            .take_while(|&&p| p * p <= candidate)
            .all(|&p| candidate % p != 0)
        {
            primes.push(candidate);
        }
        candidate += 1;
    }
    primes
}

/// Randomized Halton cubature.
///
/// Runs `replicas` independent copies of the Halton sequence, each shifted
/// modulo 1 by a random vector (Cranley-Patterson rotation). The estimate is
/// the mean over replicas and the error is their standard error. Every round
/// doubles the number of points per replica, reusing all earlier samples,
/// until the error meets the tolerance or the next round would exceed
/// `max_evals`.
///
/// The shifts come from a [`StdRng`] seeded with `options.seed`, so results
/// are reproducible for a fixed seed.
#[derive(Debug, Clone, Copy, Default)]
pub struct HaltonOracle;

impl CubatureOracle for HaltonOracle {
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
        let dim = lower.len();
        let replicas = options.replicas;

        if dim == 0 || upper.len() != dim || replicas < 2 || options.max_evals < replicas {
            warn!(
                "halton: rejected request (dim {}, replicas {}, max_evals {})",
                dim, replicas, options.max_evals
            );
            return OracleReport {
                value: f64::NAN,
                error: f64::NAN,
                neval: 0,
                rounds: 0,
                status: OracleStatus::Rejected,
            };
        }

        let bases = first_primes(dim);
        let width: Vec<f64> = lower.iter().zip(upper).map(|(a, b)| b - a).collect();
        let volume: f64 = width.iter().product();

        let mut rng = StdRng::seed_from_u64(options.seed);
        let shifts: Vec<f64> = (0..replicas * dim).map(|_| rng.gen_range(0.0..1.0)).collect();

        let mut sums = vec![0.0; replicas];
        let mut points_per_replica = 0;
        let mut batch = INITIAL_POINTS.min(options.max_evals / replicas).max(1);
        let mut neval = 0;
        let mut rounds = 0;

        let mut coords = Vec::new();
        let mut values = Vec::new();

        loop {
            // Sample Halton indices points_per_replica + 1 ..= points_per_replica + batch
            let rows = replicas * batch;
            coords.clear();
            coords.reserve(rows * dim);
            for r in 0..replicas {
                let shift = &shifts[r * dim..(r + 1) * dim];
                for k in 0..batch {
                    let index = points_per_replica + k + 1;
                    for d in 0..dim {
                        let u = (van_der_corput(index, bases[d]) + shift[d]).fract();
                        coords.push(lower[d] + width[d] * u);
                    }
                }
            }
            values.clear();
            values.resize(rows, 0.0);
            f.evaluate_many(&coords, &mut values);

            for (r, chunk) in values.chunks_exact(batch).enumerate() {
                sums[r] += chunk.iter().sum::<f64>();
            }
            points_per_replica += batch;
            neval += rows;
            rounds += 1;

            let estimates: Vec<f64> = sums
                .iter()
                .map(|s| volume * s / points_per_replica as f64)
                .collect();
            let mean = estimates.iter().sum::<f64>() / replicas as f64;
            let variance = estimates.iter().map(|e| (e - mean).powi(2)).sum::<f64>()
                / (replicas - 1) as f64;
            let error = (variance / replicas as f64).sqrt();

            trace!(
                "halton: round {} with {} evaluations, value {}, error {}",
                rounds, neval, mean, error
            );

            let report = |status| OracleReport {
                value: mean,
                error,
                neval,
                rounds,
                status,
            };

            if !mean.is_finite() || !error.is_finite() {
                return report(OracleStatus::NonFinite);
            }
            if error <= options.target(mean) {
                return report(OracleStatus::Converged);
            }

            batch = points_per_replica;
            if neval + replicas * batch > options.max_evals {
                return report(OracleStatus::BudgetExhausted);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_van_der_corput() {
        assert_eq!(van_der_corput(1, 2), 0.5);
        assert_eq!(van_der_corput(2, 2), 0.25);
        assert_eq!(van_der_corput(3, 2), 0.75);
        assert_abs_diff_eq!(van_der_corput(5, 3), 7.0 / 9.0, epsilon = 1e-15);
    }

    #[test]
    fn test_first_primes() {
        assert_eq!(first_primes(8), vec![2, 3, 5, 7, 11, 13, 17, 19]);
        assert_eq!(first_primes(40).last(), Some(&173));
    }

    #[test]
    fn test_product_integrand() {
        let f = |x: &[f64]| x[0] * x[1];
        let report = HaltonOracle.integrate(&f, &[0.0, 0.0], &[1.0, 1.0], &CubatureOptions::default());
        assert_abs_diff_eq!(report.value, 0.25, epsilon = 1e-2);
        assert!(report.neval <= 1000);
        assert!(report.rounds >= 1);
    }

    #[test]
    fn test_constant_converges_in_one_round() {
        let f = |_: &[f64]| 3.0;
        let options = CubatureOptions::default();
        let report = HaltonOracle.integrate(&f, &[0.0, -1.0, 2.0], &[2.0, 1.0, 2.5], &options);
        assert_eq!(report.status, OracleStatus::Converged);
        assert_eq!(report.rounds, 1);
        assert_abs_diff_eq!(report.value, 3.0 * 2.0 * 2.0 * 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_budget_is_respected() {
        let f = |x: &[f64]| (10.0 * x[0]).sin() * (7.0 * x[1]).cos();
        let options = CubatureOptions::with_max_evals(500).tolerances(1e-15, 0.0);
        let report = HaltonOracle.integrate(&f, &[0.0, 0.0], &[1.0, 1.0], &options);
        assert_eq!(report.status, OracleStatus::BudgetExhausted);
        assert!(report.neval <= 500);
    }

    #[test]
    fn test_seed_reproducibility() {
        let f = |x: &[f64]| (x[0] + x[1]).exp();
        let options = CubatureOptions::default().seed(42);
        let a = HaltonOracle.integrate(&f, &[0.0, 0.0], &[1.0, 1.0], &options);
        let b = HaltonOracle.integrate(&f, &[0.0, 0.0], &[1.0, 1.0], &options);
        assert_eq!(a.value.to_bits(), b.value.to_bits());
        assert_eq!(a.error.to_bits(), b.error.to_bits());
    }

    #[test]
    fn test_non_finite_integrand() {
        let f = |x: &[f64]| if x[0] > 0.5 { f64::INFINITY } else { 1.0 };
        let report = HaltonOracle.integrate(&f, &[0.0], &[1.0], &CubatureOptions::default());
        assert_eq!(report.status, OracleStatus::NonFinite);
    }
}
