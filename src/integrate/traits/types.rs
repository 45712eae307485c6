//! Types for integration algorithms.

use serde::{Deserialize, Serialize};

use crate::integrate::error::{IntegrateError, IntegrateResult};

/// Options for one-dimensional adaptive quadrature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadOptions {
    /// Absolute tolerance (default: 1.49e-8)
    pub eps_abs: f64,
    /// Relative tolerance (default: 1.49e-8)
    pub eps_rel: f64,
    /// Number of Kronrod points per interval: 15, 21, 31, 41, 51 or 61 (default: 41)
    pub rule_order: usize,
    /// Maximum number of intervals in the worklist (default: 100)
    pub max_subdivisions: usize,
}

impl Default for QuadOptions {
    fn default() -> Self {
        Self {
            eps_abs: 1.49e-8,
            eps_rel: 1.49e-8,
            rule_order: 41,
            max_subdivisions: 100,
        }
    }
}

impl QuadOptions {
    /// Set both tolerances.
    pub fn tolerances(mut self, eps_abs: f64, eps_rel: f64) -> Self {
        self.eps_abs = eps_abs;
        self.eps_rel = eps_rel;
        self
    }

    /// Set the Kronrod point count of the rule.
    pub fn rule_order(mut self, points: usize) -> Self {
        self.rule_order = points;
        self
    }

    /// Set the subdivision budget.
    pub fn max_subdivisions(mut self, limit: usize) -> Self {
        self.max_subdivisions = limit;
        self
    }

    /// The tolerance the global error has to meet for a given integral value.
    #[inline]
    pub fn target(&self, value: f64) -> f64 {
        self.eps_abs.max(self.eps_rel * value.abs())
    }

    pub(crate) fn validate(&self) -> IntegrateResult<()> {
        validate_tolerances(self.eps_abs, self.eps_rel)?;
        if self.max_subdivisions == 0 {
            return Err(IntegrateError::InvalidParameter {
                parameter: "max_subdivisions".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Options for box cubature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CubatureOptions {
    /// Absolute tolerance (default: 1e-6)
    pub eps_abs: f64,
    /// Relative tolerance (default: 1e-6)
    pub eps_rel: f64,
    /// Maximum number of integrand evaluations (default: 1000)
    pub max_evals: usize,
    /// Independent randomized replicas used for the error estimate (default: 8)
    pub replicas: usize,
    /// Seed for the randomization (default: 0)
    pub seed: u64,
}

impl Default for CubatureOptions {
    fn default() -> Self {
        Self {
            eps_abs: 1e-6,
            eps_rel: 1e-6,
            max_evals: 1000,
            replicas: 8,
            seed: 0,
        }
    }
}

impl CubatureOptions {
    /// Create options with a given evaluation budget.
    pub fn with_max_evals(max_evals: usize) -> Self {
        Self {
            max_evals,
            ..Default::default()
        }
    }

    /// Set both tolerances.
    pub fn tolerances(mut self, eps_abs: f64, eps_rel: f64) -> Self {
        self.eps_abs = eps_abs;
        self.eps_rel = eps_rel;
        self
    }

    /// Set the number of randomized replicas.
    pub fn replicas(mut self, replicas: usize) -> Self {
        self.replicas = replicas;
        self
    }

    /// Set the random seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// The tolerance the error estimate has to meet for a given integral value.
    #[inline]
    pub fn target(&self, value: f64) -> f64 {
        self.eps_abs.max(self.eps_rel * value.abs())
    }

    pub(crate) fn validate(&self) -> IntegrateResult<()> {
        validate_tolerances(self.eps_abs, self.eps_rel)?;
        if self.max_evals == 0 {
            return Err(IntegrateError::InvalidParameter {
                parameter: "max_evals".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.replicas < 2 {
            return Err(IntegrateError::InvalidParameter {
                parameter: "replicas".to_string(),
                message: "at least 2 replicas are needed for an error estimate".to_string(),
            });
        }
        if self.max_evals < self.replicas {
            return Err(IntegrateError::InvalidParameter {
                parameter: "max_evals".to_string(),
                message: format!(
                    "budget of {} evaluations cannot cover {} replicas",
                    self.max_evals, self.replicas
                ),
            });
        }
        Ok(())
    }
}

fn validate_tolerances(eps_abs: f64, eps_rel: f64) -> IntegrateResult<()> {
    if eps_abs.is_nan() || eps_abs < 0.0 {
        return Err(IntegrateError::InvalidParameter {
            parameter: "eps_abs".to_string(),
            message: format!("must be non-negative, got {}", eps_abs),
        });
    }
    if eps_rel.is_nan() || eps_rel < 0.0 {
        return Err(IntegrateError::InvalidParameter {
            parameter: "eps_rel".to_string(),
            message: format!("must be non-negative, got {}", eps_rel),
        });
    }
    if eps_abs <= 0.0 && eps_rel < 50.0 * f64::EPSILON {
        return Err(IntegrateError::InvalidParameter {
            parameter: "eps_rel".to_string(),
            message: "must be at least 50 * machine epsilon when eps_abs is zero".to_string(),
        });
    }
    Ok(())
}

/// Termination status shared by every integrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntegrationStatus {
    /// The requested tolerance was met.
    Ok,
    /// The interval or evaluation budget ran out; the result is a best effort.
    MaxSubdivisionsReached,
    /// Refinement stopped reducing the error estimate.
    RoundoffLimited,
    /// The integral appears divergent or the integrand produced non-finite values.
    Divergent,
    /// Malformed bounds, dimensions or options.
    InvalidInput,
}

impl IntegrationStatus {
    /// Whether the tolerance was met.
    #[inline]
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

/// Result of an integration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntegrationResult {
    /// Computed integral value
    pub value: f64,
    /// Estimated absolute error
    pub error_estimate: f64,
    /// Termination status
    pub status: IntegrationStatus,
    /// Number of function evaluations
    pub neval: usize,
    /// Number of leaf intervals (1-D) or sampling rounds (boxes) at termination
    pub subdivisions: usize,
}

impl IntegrationResult {
    /// The result for rejected input: no value, no estimate, nothing evaluated.
    pub fn invalid() -> Self {
        Self {
            value: f64::NAN,
            error_estimate: f64::NAN,
            status: IntegrationStatus::InvalidInput,
            neval: 0,
            subdivisions: 0,
        }
    }

    /// An exact zero, used for degenerate domains.
    pub fn zero() -> Self {
        Self {
            value: 0.0,
            error_estimate: 0.0,
            status: IntegrationStatus::Ok,
            neval: 0,
            subdivisions: 0,
        }
    }

    /// Convert a non-`Ok` status into the matching [`IntegrateError`].
    ///
    /// ```
    /// use quadmin::{integrate, QuadOptions};
    ///
    /// let value = integrate(|x: f64| x * x, 0.0, 3.0, &QuadOptions::default())
    ///     .into_result()
    ///     .map(|r| r.value);
    /// assert!((value.unwrap() - 9.0).abs() < 1e-10);
    /// ```
    pub fn into_result(self) -> IntegrateResult<Self> {
        let context = "integrate".to_string();
        match self.status {
            IntegrationStatus::Ok => Ok(self),
            IntegrationStatus::MaxSubdivisionsReached => Err(IntegrateError::DidNotConverge {
                subdivisions: self.subdivisions,
                error: self.error_estimate,
                context,
            }),
            IntegrationStatus::RoundoffLimited => Err(IntegrateError::RoundoffLimited {
                error: self.error_estimate,
                context,
            }),
            IntegrationStatus::Divergent => Err(IntegrateError::Divergent {
                value: self.value,
                context,
            }),
            IntegrationStatus::InvalidInput => Err(IntegrateError::InvalidInput { context }),
        }
    }
}

/// A leaf of the adaptive subdivision worklist.
///
/// Invariants: `low < high` and `error >= 0` (or NaN when the integrand
/// produced non-finite values on this interval).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    /// Left end
    pub low: f64,
    /// Right end
    pub high: f64,
    /// Kronrod estimate of the integral over `[low, high]`
    pub estimate: f64,
    /// Local error estimate
    pub error: f64,
}
