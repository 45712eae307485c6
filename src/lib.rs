//! quadmin - adaptive quadrature, box cubature and L-BFGS minimization
//!
//! quadmin integrates and minimizes real functions given as plain closures or
//! as implementations of three small traits. Everything works on `f64` slices.
//!
//! # Modules
//!
//! - [`function`] - [`ScalarFunction`], [`VectorFunction`], [`GradientFunction`]
//!   and the [`GradientFn`] / [`FiniteDifference`] adapters
//! - [`integrate`] - adaptive Gauss-Kronrod quadrature on finite and infinite
//!   ranges, cubature over boxes
//! - [`optimize`] - L-BFGS minimization
//!
//! # Error Handling
//!
//! The numerical entry points never panic on bad input and never return `Err`:
//! they return a result record with a status ([`IntegrationStatus`],
//! [`OptimizationStatus`]) next to the best estimate computed. Each record has
//! an `into_result()` that turns failure statuses into [`IntegrateError`] or
//! [`OptimizeError`] for use with `?`.
//!
//! # Logging
//!
//! Diagnostics go through the [`log`](https://docs.rs/log) facade: `warn!` for
//! rejected input and failed runs, `debug!` on termination, `trace!` per
//! subdivision or iteration. Install any logger to see them.
//!
//! # Example
//!
//! ```
//! use quadmin::{integrate, minimize, GradientFn, LbfgsOptions, QuadOptions};
//!
//! // ∫_{-∞}^{∞} exp(-x²) dx = √π
//! let result = integrate(|x: f64| (-x * x).exp(), f64::NEG_INFINITY, f64::INFINITY, &QuadOptions::default());
//! assert!((result.value - std::f64::consts::PI.sqrt()).abs() < 1e-10);
//!
//! // min (x - 3)²
//! let f = GradientFn(|x: &[f64], g: &mut [f64]| {
//!     g[0] = 2.0 * (x[0] - 3.0);
//!     (x[0] - 3.0).powi(2)
//! });
//! let result = minimize(f, &[0.0], &LbfgsOptions::default());
//! assert!((result.x[0] - 3.0).abs() < 1e-8);
//! ```

pub mod function;
pub mod integrate;
pub mod optimize;

mod proptests;

// Re-export main types for convenience
pub use function::{FiniteDifference, GradientFn, GradientFunction, ScalarFunction, VectorFunction};
pub use integrate::{
    CubatureOptions, CubatureOracle, GaussKronrodRule, HaltonOracle, IntegrateError,
    IntegrateResult, IntegrationResult, IntegrationStatus, QuadOptions, integrate, integrate_box,
    integrate_box_with,
};
pub use optimize::{
    LbfgsOptions, LineSearchMethod, OptimizationResult, OptimizationStatus, OptimizeError,
    OptimizeResult, minimize,
};
