//! The seam between the box integrator and the cubature routine doing the work.

use serde::{Deserialize, Serialize};

use crate::function::VectorFunction;

use super::types::{CubatureOptions, IntegrationStatus};

/// Status reported by a cubature routine, in its own terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OracleStatus {
    /// The error estimate met the tolerance.
    Converged,
    /// The evaluation budget ran out first.
    BudgetExhausted,
    /// The integrand produced `NaN` or `±inf`.
    NonFinite,
    /// The routine refused the request (dimension, options).
    Rejected,
}

impl From<OracleStatus> for IntegrationStatus {
    fn from(status: OracleStatus) -> Self {
        match status {
            OracleStatus::Converged => IntegrationStatus::Ok,
            OracleStatus::BudgetExhausted => IntegrationStatus::MaxSubdivisionsReached,
            OracleStatus::NonFinite => IntegrationStatus::Divergent,
            OracleStatus::Rejected => IntegrationStatus::InvalidInput,
        }
    }
}

/// What a cubature routine hands back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OracleReport {
    /// Integral estimate
    pub value: f64,
    /// Absolute error estimate
    pub error: f64,
    /// Number of integrand evaluations
    pub neval: usize,
    /// Number of refinement rounds
    pub rounds: usize,
    /// Termination status
    pub status: OracleStatus,
}

/// A routine that integrates a [`VectorFunction`] over an axis-aligned box.
///
/// [`integrate_box_with`](crate::integrate::integrate_box_with) validates the
/// region, then calls `integrate` with the function and options exactly as the
/// caller supplied them. Implementations may assume `lower.len() == upper.len() > 0`
/// and `lower[i] < upper[i]`; they should batch evaluations through
/// [`VectorFunction::evaluate_many`].
pub trait CubatureOracle {
    /// Integrate `f` over `[lower, upper]`.
    fn integrate<F>(
        &self,
        f: &F,
        lower: &[f64],
        upper: &[f64],
        options: &CubatureOptions,
    ) -> OracleReport
    where
        F: VectorFunction + ?Sized;
}
