//! Error types for integration operations.

use thiserror::Error;

/// Result type for integration operations.
pub type IntegrateResult<T> = Result<T, IntegrateError>;

/// Errors that can occur during integration.
///
/// The integrators themselves report failures through
/// [`IntegrationStatus`](super::IntegrationStatus); these errors are what a
/// non-`Ok` status turns into via [`IntegrationResult::into_result`](super::IntegrationResult::into_result),
/// and what input validation produces before it is logged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegrateError {
    /// Invalid integration interval.
    #[error("Invalid interval [{a}, {b}] in {context}")]
    InvalidInterval { a: f64, b: f64, context: String },

    /// Invalid parameter value.
    #[error("Invalid parameter '{parameter}': {message}")]
    InvalidParameter { parameter: String, message: String },

    /// Invalid input array size or dimensions.
    #[error("Invalid input in {context}")]
    InvalidInput { context: String },

    /// The subdivision or evaluation budget ran out before the tolerance was met.
    ///
    /// `subdivisions` is the leaf count (or cubature round count) of the
    /// reported estimate, not the configured budget.
    #[error("{context}: tolerance not reached (error estimate {error} with {subdivisions} subdivisions)")]
    DidNotConverge {
        subdivisions: usize,
        error: f64,
        context: String,
    },

    /// Refinement stopped reducing the error estimate.
    #[error("{context}: roundoff limits the achievable accuracy (error estimate: {error})")]
    RoundoffLimited { error: f64, context: String },

    /// The integral appears to diverge or the integrand produced non-finite values.
    #[error("{context}: integral appears divergent (value: {value})")]
    Divergent { value: f64, context: String },
}
