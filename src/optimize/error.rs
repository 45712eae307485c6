//! Error types for optimization operations.

use thiserror::Error;

/// Result type for optimization operations.
pub type OptimizeResult<T> = Result<T, OptimizeError>;

/// Errors that can occur during optimization.
///
/// [`minimize`](super::minimize) itself reports through
/// [`OptimizationStatus`](super::OptimizationStatus); these are what a failure
/// status turns into via [`OptimizationResult::into_result`](super::OptimizationResult::into_result).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizeError {
    /// The solver did not converge within the maximum iterations.
    #[error("{context}: did not converge after {iterations} iterations (gradient norm: {gradient_norm})")]
    DidNotConverge {
        iterations: usize,
        gradient_norm: f64,
        context: String,
    },

    /// No step length satisfying the line-search conditions was found.
    #[error("{context}: line search failed at iteration {iteration}")]
    LineSearchFailed { iteration: usize, context: String },

    /// Invalid parameter value.
    #[error("Invalid parameter '{parameter}': {message}")]
    InvalidParameter { parameter: String, message: String },

    /// Invalid input array size or values.
    #[error("Invalid input in {context}")]
    InvalidInput { context: String },
}
