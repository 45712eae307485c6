//! One-dimensional adaptive quadrature.
//!
//! [`GaussKronrodRule`] evaluates a single interval, [`adaptive_quad`] drives
//! bisection over a finite range, and [`InfiniteDomain`] maps unbounded
//! ranges onto `(0, 1)` so the same driver handles them.

mod adaptive;
mod gauss_kronrod;
mod infinite;

pub use adaptive::adaptive_quad;
pub use gauss_kronrod::{GaussKronrodRule, RuleEstimate};
pub use infinite::InfiniteDomain;
