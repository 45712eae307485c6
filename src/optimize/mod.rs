//! Gradient-based minimization.
//!
//! - [`minimize`] - L-BFGS with a strong Wolfe or backtracking line search
//!
//! The objective is a [`GradientFunction`](crate::GradientFunction). Wrap a
//! closure returning the value and writing the gradient in
//! [`GradientFn`](crate::GradientFn), or promote a value-only function with
//! [`FiniteDifference`](crate::FiniteDifference).
//!
//! # Example
//!
//! ```
//! use quadmin::{minimize, FiniteDifference, LbfgsOptions};
//!
//! // Minimize (x - 1)^2 + (y - 2)^2 with a numerical gradient
//! let f = FiniteDifference::new(|x: &[f64]| (x[0] - 1.0).powi(2) + (x[1] - 2.0).powi(2));
//! let result = minimize(f, &[0.0, 0.0], &LbfgsOptions::default());
//! assert!(result.converged());
//! assert!((result.x[1] - 2.0).abs() < 1e-5);
//! ```

pub mod error;
pub mod minimize;
pub(crate) mod utils;

pub use error::{OptimizeError, OptimizeResult};
pub use minimize::{
    LbfgsOptions, LineSearchMethod, OptimizationResult, OptimizationStatus, minimize,
};
