//! Mapping of infinite and semi-infinite ranges onto `(0, 1)`.

use crate::function::ScalarFunction;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mapping {
    /// `(-inf, inf)`: `x = (1 - t) / t`, both tails folded together
    Whole,
    /// `[a, inf)`: `x = a + (1 - t) / t`
    Upper(f64),
    /// `(-inf, b]`: `x = b - (1 - t) / t`
    Lower(f64),
}

/// A [`ScalarFunction`] on `(0, 1)` whose integral equals that of `f` over an
/// unbounded range.
///
/// | range         | substitution          | integrand on `(0, 1)`        |
/// |---------------|-----------------------|------------------------------|
/// | `(-inf, inf)` | `x = (1 - t) / t`     | `(f(x) + f(-x)) / t²`        |
/// | `[a, inf)`    | `x = a + (1 - t) / t` | `f(x) / t²`                  |
/// | `(-inf, b]`   | `x = b - (1 - t) / t` | `f(x) / t²`                  |
///
/// The mapped integrand is singular at `t = 0`; Gauss-Kronrod abscissae never
/// reach the endpoints, so it is only ever evaluated strictly inside.
/// Where `f` vanishes the mapped value is exactly `0`, which keeps rapidly
/// decaying tails from turning into `0 * inf`.
///
/// ```
/// use quadmin::integrate::quadrature::InfiniteDomain;
/// use quadmin::ScalarFunction;
///
/// let g = InfiniteDomain::new(|x: f64| (-x).exp(), 0.0, f64::INFINITY).unwrap();
/// // t = 0.5 maps to x = 1
/// assert!((g.evaluate(0.5) - 4.0 * (-1.0f64).exp()).abs() < 1e-15);
/// ```
#[derive(Debug, Clone)]
pub struct InfiniteDomain<F> {
    inner: F,
    mapping: Mapping,
}

impl<F> InfiniteDomain<F> {
    /// Wrap `inner` for integration over `[lower, upper]`.
    ///
    /// Returns `None` unless at least one bound is infinite and the pair
    /// describes a non-empty range (`lower = -inf` or `upper = +inf`, no NaN).
    pub fn new(inner: F, lower: f64, upper: f64) -> Option<Self> {
        if lower.is_nan() || upper.is_nan() {
            return None;
        }
        let mapping = match (lower == f64::NEG_INFINITY, upper == f64::INFINITY) {
            (true, true) => Mapping::Whole,
            (false, true) if lower.is_finite() => Mapping::Upper(lower),
            (true, false) if upper.is_finite() => Mapping::Lower(upper),
            _ => return None,
        };
        Some(Self { inner, mapping })
    }
}

impl<F: ScalarFunction> InfiniteDomain<F> {
    #[inline]
    fn scale(sum: f64, t: f64) -> f64 {
        if sum == 0.0 { 0.0 } else { sum / (t * t) }
    }
}

impl<F: ScalarFunction> ScalarFunction for InfiniteDomain<F> {
    fn evaluate(&self, t: f64) -> f64 {
        let u = (1.0 - t) / t;
        let sum = match self.mapping {
            Mapping::Whole => self.inner.evaluate(u) + self.inner.evaluate(-u),
            Mapping::Upper(a) => self.inner.evaluate(a + u),
            Mapping::Lower(b) => self.inner.evaluate(b - u),
        };
        Self::scale(sum, t)
    }

    fn evaluate_many(&self, ts: &[f64], out: &mut [f64]) {
        let n = ts.len();
        let mut xs: Vec<f64> = ts
            .iter()
            .map(|&t| {
                let u = (1.0 - t) / t;
                match self.mapping {
                    Mapping::Whole => u,
                    Mapping::Upper(a) => a + u,
                    Mapping::Lower(b) => b - u,
                }
            })
            .collect();

        if self.mapping == Mapping::Whole {
            xs.extend(ts.iter().map(|&t| -((1.0 - t) / t)));
            let mut fx = vec![0.0; 2 * n];
            self.inner.evaluate_many(&xs, &mut fx);
            for (i, y) in out.iter_mut().enumerate() {
                *y = Self::scale(fx[i] + fx[n + i], ts[i]);
            }
        } else {
            self.inner.evaluate_many(&xs, out);
            for (y, &t) in out.iter_mut().zip(ts) {
                *y = Self::scale(*y, t);
            }
        }
    }
}
