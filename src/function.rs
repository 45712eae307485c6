//! Function abstractions consumed by the integrators and the optimizer.
//!
//! Callers hand their mathematics to quadmin through three narrow traits:
//!
//! - [`ScalarFunction`] - `f: R -> R`, integrated by [`crate::integrate::integrate`]
//! - [`VectorFunction`] - `f: R^n -> R`, integrated by [`crate::integrate::integrate_box`]
//! - [`GradientFunction`] - `f: R^n -> R` together with `∇f`, minimized by
//!   [`crate::optimize::minimize`]
//!
//! Plain closures implement the first two directly. Gradient-providing closures
//! are wrapped in [`GradientFn`]; value-only functions can be promoted with
//! [`FiniteDifference`].
//!
//! None of the traits report errors. A function that is evaluated outside its
//! domain should return `NaN` or `±inf`; the engines surface such values through
//! their status codes instead of panicking.
//!
//! # Example
//!
//! ```
//! use quadmin::{ScalarFunction, VectorFunction};
//!
//! let square = |x: f64| x * x;
//! assert_eq!(square.evaluate(3.0), 9.0);
//!
//! let norm2 = |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>();
//! assert_eq!(norm2.evaluate(&[3.0, 4.0]), 25.0);
//! ```

use crate::optimize::utils::CENTRAL_DIFF_EPS;

/// A real function of one real variable.
pub trait ScalarFunction {
    /// Evaluate `f(x)`.
    fn evaluate(&self, x: f64) -> f64;

    /// Evaluate `f` at every abscissa in `xs`, writing into `out`.
    ///
    /// Quadrature rules call this once per interval with all of their nodes.
    /// Override it when a vectorized evaluation is cheaper than repeated
    /// single-point calls. `xs` and `out` always have the same length.
    fn evaluate_many(&self, xs: &[f64], out: &mut [f64]) {
        for (x, y) in xs.iter().zip(out.iter_mut()) {
            *y = self.evaluate(*x);
        }
    }
}

impl<F> ScalarFunction for F
where
    F: Fn(f64) -> f64,
{
    #[inline]
    fn evaluate(&self, x: f64) -> f64 {
        self(x)
    }
}

/// A real function of a real vector.
pub trait VectorFunction {
    /// Evaluate `f(x)`.
    fn evaluate(&self, x: &[f64]) -> f64;

    /// Evaluate `f` at a batch of points.
    ///
    /// `points` is row-major with one point per row; its length is
    /// `out.len() * dim`. The default implementation calls [`evaluate`](Self::evaluate)
    /// row by row.
    fn evaluate_many(&self, points: &[f64], out: &mut [f64]) {
        if out.is_empty() {
            return;
        }
        let dim = points.len() / out.len();
        for (row, y) in points.chunks_exact(dim.max(1)).zip(out.iter_mut()) {
            *y = self.evaluate(row);
        }
    }
}

impl<F> VectorFunction for F
where
    F: Fn(&[f64]) -> f64,
{
    #[inline]
    fn evaluate(&self, x: &[f64]) -> f64 {
        self(x)
    }
}

/// A real function of a real vector that also provides its gradient.
///
/// `evaluate_with_gradient` returns `f(x)` and writes `∇f(x)` into `gradient`,
/// which has the same length as `x`. The contents of `gradient` are only
/// meaningful when the returned value is finite.
pub trait GradientFunction: VectorFunction {
    /// Evaluate `f(x)` and write `∇f(x)` into `gradient`.
    fn evaluate_with_gradient(&self, x: &[f64], gradient: &mut [f64]) -> f64;
}

/// Adapter turning a closure `|x, grad| -> f(x)` into a [`GradientFunction`].
///
/// ```
/// use quadmin::{GradientFn, GradientFunction};
///
/// let sphere = GradientFn(|x: &[f64], g: &mut [f64]| {
///     for (gi, xi) in g.iter_mut().zip(x) {
///         *gi = 2.0 * xi;
///     }
///     x.iter().map(|v| v * v).sum::<f64>()
/// });
///
/// let mut g = [0.0; 2];
/// assert_eq!(sphere.evaluate_with_gradient(&[1.0, 2.0], &mut g), 5.0);
/// assert_eq!(g, [2.0, 4.0]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct GradientFn<F>(pub F);

impl<F> VectorFunction for GradientFn<F>
where
    F: Fn(&[f64], &mut [f64]) -> f64,
{
    fn evaluate(&self, x: &[f64]) -> f64 {
        let mut scratch = vec![0.0; x.len()];
        (self.0)(x, &mut scratch)
    }
}

impl<F> GradientFunction for GradientFn<F>
where
    F: Fn(&[f64], &mut [f64]) -> f64,
{
    #[inline]
    fn evaluate_with_gradient(&self, x: &[f64], gradient: &mut [f64]) -> f64 {
        (self.0)(x, gradient)
    }
}

/// Central-difference gradient for a value-only [`VectorFunction`].
///
/// Each gradient costs `2n` extra evaluations. The step for coordinate `i` is
/// `eps * max(1, |x_i|)`.
#[derive(Debug, Clone)]
pub struct FiniteDifference<F> {
    inner: F,
    eps: f64,
}

impl<F> FiniteDifference<F> {
    /// Wrap `inner` with the default relative step.
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            eps: CENTRAL_DIFF_EPS,
        }
    }

    /// Override the relative step.
    pub fn with_step(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }
}

impl<F: VectorFunction> VectorFunction for FiniteDifference<F> {
    #[inline]
    fn evaluate(&self, x: &[f64]) -> f64 {
        self.inner.evaluate(x)
    }

    fn evaluate_many(&self, points: &[f64], out: &mut [f64]) {
        self.inner.evaluate_many(points, out);
    }
}

impl<F: VectorFunction> GradientFunction for FiniteDifference<F> {
    fn evaluate_with_gradient(&self, x: &[f64], gradient: &mut [f64]) -> f64 {
        let fx = self.inner.evaluate(x);
        let mut probe = x.to_vec();

        for i in 0..x.len() {
            let h = self.eps * x[i].abs().max(1.0);
            probe[i] = x[i] + h;
            let f_plus = self.inner.evaluate(&probe);
            probe[i] = x[i] - h;
            let f_minus = self.inner.evaluate(&probe);
            probe[i] = x[i];
            gradient[i] = (f_plus - f_minus) / (2.0 * h);
        }

        fx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct Counting;

    impl ScalarFunction for Counting {
        fn evaluate(&self, x: f64) -> f64 {
            x + 1.0
        }
    }

    #[test]
    fn test_default_batch_matches_pointwise() {
        let xs = [0.0, 1.0, 2.5];
        let mut out = [0.0; 3];
        Counting.evaluate_many(&xs, &mut out);
        assert_eq!(out, [1.0, 2.0, 3.5]);
    }

    #[test]
    fn test_vector_batch_rows() {
        let f = |x: &[f64]| x[0] * x[1];
        let points = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let mut out = [0.0; 3];
        f.evaluate_many(&points, &mut out);
        assert_eq!(out, [2.0, 12.0, 30.0]);
    }

    #[test]
    fn test_finite_difference_gradient() {
        let rosen = |x: &[f64]| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2);
        let fd = FiniteDifference::new(rosen);

        let x = [-1.2, 1.0];
        let mut g = [0.0; 2];
        let fx = fd.evaluate_with_gradient(&x, &mut g);

        assert_relative_eq!(fx, 24.2, epsilon = 1e-12);
        // Analytic gradient at (-1.2, 1): (-215.6, -88)
        assert_relative_eq!(g[0], -215.6, max_relative = 1e-6);
        assert_relative_eq!(g[1], -88.0, max_relative = 1e-6);
    }

    #[test]
    fn test_gradient_fn_value_only() {
        let f = GradientFn(|x: &[f64], g: &mut [f64]| {
            g[0] = 1.0;
            x[0]
        });
        assert_eq!(VectorFunction::evaluate(&f, &[4.0]), 4.0);
    }
}
