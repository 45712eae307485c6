//! Options and results for L-BFGS minimization.

use serde::{Deserialize, Serialize};

use crate::optimize::error::{OptimizeError, OptimizeResult};

/// Step-length strategy used along each search direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineSearchMethod {
    /// Bracketing and zoom until the strong Wolfe conditions hold.
    #[default]
    StrongWolfe,
    /// Armijo sufficient decrease only, halving the step on failure.
    Backtracking,
}

/// Options for L-BFGS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LbfgsOptions {
    /// Maximum number of iterations (default: 300)
    pub max_iter: usize,
    /// Relative function-decrease tolerance (default: 1e-10)
    pub f_tol: f64,
    /// Gradient L2-norm tolerance (default: 1e-8)
    pub g_tol: f64,
    /// Number of correction pairs to store (default: 10)
    pub history: usize,
    /// Line search strategy (default: strong Wolfe)
    pub line_search: LineSearchMethod,
    /// Sufficient-decrease constant (default: 1e-4)
    pub c1: f64,
    /// Curvature constant (default: 0.9)
    pub c2: f64,
    /// Maximum step expansions while bracketing (default: 20)
    pub max_bracket: usize,
    /// Maximum interpolation steps inside a bracket (default: 20)
    pub max_zoom: usize,
}

impl Default for LbfgsOptions {
    fn default() -> Self {
        Self {
            max_iter: 300,
            f_tol: 1e-10,
            g_tol: 1e-8,
            history: 10,
            line_search: LineSearchMethod::StrongWolfe,
            c1: 1e-4,
            c2: 0.9,
            max_bracket: 20,
            max_zoom: 20,
        }
    }
}

impl LbfgsOptions {
    /// Set both stopping tolerances.
    pub fn tolerances(mut self, f_tol: f64, g_tol: f64) -> Self {
        self.f_tol = f_tol;
        self.g_tol = g_tol;
        self
    }

    /// Set the iteration budget.
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the history depth.
    pub fn history(mut self, m: usize) -> Self {
        self.history = m;
        self
    }

    /// Choose the line search.
    pub fn line_search(mut self, method: LineSearchMethod) -> Self {
        self.line_search = method;
        self
    }

    pub(crate) fn validate(&self) -> OptimizeResult<()> {
        let invalid = |parameter: &str, message: String| {
            Err(OptimizeError::InvalidParameter {
                parameter: parameter.to_string(),
                message,
            })
        };

        if self.history == 0 {
            return invalid("history", "must be at least 1".to_string());
        }
        if self.f_tol.is_nan() || self.f_tol < 0.0 {
            return invalid("f_tol", format!("must be non-negative, got {}", self.f_tol));
        }
        if self.g_tol.is_nan() || self.g_tol < 0.0 {
            return invalid("g_tol", format!("must be non-negative, got {}", self.g_tol));
        }
        if !(self.c1 > 0.0 && self.c1 < self.c2 && self.c2 < 1.0) {
            return invalid(
                "c1, c2",
                format!("need 0 < c1 < c2 < 1, got c1 = {}, c2 = {}", self.c1, self.c2),
            );
        }
        if self.max_bracket == 0 || self.max_zoom == 0 {
            return invalid("max_bracket, max_zoom", "must be at least 1".to_string());
        }
        Ok(())
    }
}

/// How a minimization run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimizationStatus {
    /// A stopping tolerance was met.
    Converged,
    /// `max_iter` iterations ran without meeting a tolerance.
    MaxIterationsReached,
    /// No acceptable step was found along the search direction.
    LineSearchFailed,
    /// Empty start, non-finite start value or gradient, or invalid options.
    InvalidInput,
}

/// Result of a minimization run.
///
/// `x` and `fun` are the best point reached, even when the status is not
/// [`OptimizationStatus::Converged`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Final position
    pub x: Vec<f64>,
    /// Function value at `x`
    pub fun: f64,
    /// Number of completed iterations
    pub iterations: usize,
    /// Termination status
    pub status: OptimizationStatus,
    /// Number of function (and gradient) evaluations
    pub nfev: usize,
    /// L2 norm of the gradient at `x`
    pub gradient_norm: f64,
    /// Curvature pairs discarded because `s·y` was not positive enough
    pub rejected_pairs: usize,
}

impl OptimizationResult {
    /// Whether a stopping tolerance was met.
    #[inline]
    pub fn converged(&self) -> bool {
        self.status == OptimizationStatus::Converged
    }

    /// Convert a non-converged status into the matching [`OptimizeError`].
    pub fn into_result(self) -> OptimizeResult<Self> {
        let context = "minimize".to_string();
        match self.status {
            OptimizationStatus::Converged => Ok(self),
            OptimizationStatus::MaxIterationsReached => Err(OptimizeError::DidNotConverge {
                iterations: self.iterations,
                gradient_norm: self.gradient_norm,
                context,
            }),
            OptimizationStatus::LineSearchFailed => Err(OptimizeError::LineSearchFailed {
                iteration: self.iterations,
                context,
            }),
            OptimizationStatus::InvalidInput => Err(OptimizeError::InvalidInput { context }),
        }
    }
}
