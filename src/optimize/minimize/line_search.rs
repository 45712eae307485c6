//! Step-length selection along a descent direction.
//!
//! Both searches work on the restriction `phi(alpha) = f(x + alpha d)`, given as
//! a closure returning `(phi(alpha), phi'(alpha))`. A non-finite `phi(alpha)`
//! means the step is too long. On success the last evaluated `alpha` is the
//! accepted one, so the caller can keep the point and gradient it computed.

/// Halving steps tried by the backtracking search.
const BACKTRACK_STEPS: usize = 50;
/// Step shrink factor of the backtracking search.
const BACKTRACK_SHRINK: f64 = 0.5;
/// Step growth factor while bracketing.
const BRACKET_GROWTH: f64 = 2.0;
/// Interpolated trial steps must stay this far (relative) from the bracket ends.
const ZOOM_SAFEGUARD: f64 = 0.1;

/// Constants of the strong Wolfe search.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WolfeParams {
    pub c1: f64,
    pub c2: f64,
    pub max_bracket: usize,
    pub max_zoom: usize,
}

/// An accepted step length and the function value there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Accepted {
    pub alpha: f64,
    pub value: f64,
}

/// Armijo backtracking: halve `alpha` until
/// `phi(alpha) <= phi(0) + c1 alpha phi'(0)`.
pub(crate) fn backtracking<P>(
    phi: &mut P,
    phi0: f64,
    dphi0: f64,
    alpha_init: f64,
    c1: f64,
) -> Option<Accepted>
where
    P: FnMut(f64) -> (f64, f64),
{
    let mut alpha = alpha_init;
    for _ in 0..BACKTRACK_STEPS {
        let (value, _) = phi(alpha);
        if value.is_finite() && value <= phi0 + c1 * alpha * dphi0 {
            return Some(Accepted { alpha, value });
        }
        alpha *= BACKTRACK_SHRINK;
    }
    None
}

/// Strong Wolfe search by bracketing then zooming (Nocedal & Wright, Alg. 3.5).
///
/// Accepts `alpha` with `phi(alpha) <= phi(0) + c1 alpha phi'(0)` and
/// `|phi'(alpha)| <= c2 |phi'(0)|`. Requires `dphi0 < 0`.
pub(crate) fn strong_wolfe<P>(
    phi: &mut P,
    phi0: f64,
    dphi0: f64,
    alpha_init: f64,
    params: &WolfeParams,
) -> Option<Accepted>
where
    P: FnMut(f64) -> (f64, f64),
{
    let mut prev = Trial {
        alpha: 0.0,
        value: phi0,
        slope: dphi0,
    };
    let mut alpha = alpha_init;

    for i in 0..params.max_bracket {
        let (value, slope) = phi(alpha);
        let trial = Trial {
            alpha,
            value,
            slope,
        };

        if !value.is_finite() || value > phi0 + params.c1 * alpha * dphi0 || (i > 0 && value >= prev.value) {
            return zoom(phi, phi0, dphi0, prev, trial, params);
        }
        if slope.abs() <= -params.c2 * dphi0 {
            return Some(Accepted { alpha, value });
        }
        if slope >= 0.0 {
            return zoom(phi, phi0, dphi0, trial, prev, params);
        }

        prev = trial;
        alpha *= BRACKET_GROWTH;
    }
    None
}

#[derive(Debug, Clone, Copy)]
struct Trial {
    alpha: f64,
    value: f64,
    slope: f64,
}

/// Shrink the bracket between `lo` (lowest value satisfying sufficient
/// decrease so far) and `hi` until a strong Wolfe point is found.
fn zoom<P>(
    phi: &mut P,
    phi0: f64,
    dphi0: f64,
    mut lo: Trial,
    mut hi: Trial,
    params: &WolfeParams,
) -> Option<Accepted>
where
    P: FnMut(f64) -> (f64, f64),
{
    for _ in 0..params.max_zoom {
        let left = lo.alpha.min(hi.alpha);
        let right = lo.alpha.max(hi.alpha);
        let margin = ZOOM_SAFEGUARD * (right - left);

        let alpha = match cubic_minimizer(&lo, &hi) {
            Some(a) if a >= left + margin && a <= right - margin => a,
            _ => 0.5 * (lo.alpha + hi.alpha),
        };
        if alpha == lo.alpha || alpha == hi.alpha {
            return None;
        }

        let (value, slope) = phi(alpha);
        let trial = Trial {
            alpha,
            value,
            slope,
        };

        if !value.is_finite() || value > phi0 + params.c1 * alpha * dphi0 || value >= lo.value {
            hi = trial;
        } else {
            if slope.abs() <= -params.c2 * dphi0 {
                return Some(Accepted { alpha, value });
            }
            if slope * (hi.alpha - lo.alpha) >= 0.0 {
                hi = lo;
            }
            lo = trial;
        }
    }
    None
}

/// Minimizer of the cubic matching value and slope at both ends.
fn cubic_minimizer(a: &Trial, b: &Trial) -> Option<f64> {
    if !(a.value.is_finite() && b.value.is_finite() && a.slope.is_finite() && b.slope.is_finite()) {
        return None;
    }
    let d1 = a.slope + b.slope - 3.0 * (a.value - b.value) / (a.alpha - b.alpha);
    let disc = d1 * d1 - a.slope * b.slope;
    if disc < 0.0 {
        return None;
    }
    let d2 = disc.sqrt().copysign(b.alpha - a.alpha);
    let denom = b.slope - a.slope + 2.0 * d2;
    if denom == 0.0 {
        return None;
    }
    let t = b.alpha - (b.alpha - a.alpha) * (b.slope + d2 - d1) / denom;
    t.is_finite().then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const PARAMS: WolfeParams = WolfeParams {
        c1: 1e-4,
        c2: 0.9,
        max_bracket: 20,
        max_zoom: 20,
    };

    #[test]
    fn test_cubic_minimizer_exact_on_cubic() {
        // phi(a) = (a - 1)^3 - 3(a - 1), local minimum at a = 2
        let phi = |a: f64| ((a - 1.0).powi(3) - 3.0 * (a - 1.0), 3.0 * (a - 1.0).powi(2) - 3.0);
        let at = |a: f64| {
            let (value, slope) = phi(a);
            Trial {
                alpha: a,
                value,
                slope,
            }
        };
        let t = cubic_minimizer(&at(1.5), &at(3.0)).unwrap();
        assert_relative_eq!(t, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_strong_wolfe_on_quadratic() {
        // phi(a) = (a - 3)^2, phi'(0) = -6
        let mut evals = 0;
        let mut phi = |a: f64| {
            evals += 1;
            ((a - 3.0).powi(2), 2.0 * (a - 3.0))
        };
        let step = strong_wolfe(&mut phi, 9.0, -6.0, 1.0, &PARAMS).unwrap();
        assert!(step.value <= 9.0 + 1e-4 * step.alpha * -6.0);
        assert!((2.0 * (step.alpha - 3.0)).abs() <= 0.9 * 6.0);
        assert!(evals >= 1);
    }

    #[test]
    fn test_strong_wolfe_zooms_after_overshoot() {
        let mut phi = |a: f64| ((a - 0.1).powi(2), 2.0 * (a - 0.1));
        let step = strong_wolfe(&mut phi, 0.01, -0.2, 10.0, &PARAMS).unwrap();
        assert!(step.alpha < 10.0);
        assert!((2.0 * (step.alpha - 0.1)).abs() <= 0.9 * 0.2);
    }

    #[test]
    fn test_non_finite_trial_shrinks_step() {
        let mut phi = |a: f64| {
            if a > 1.0 {
                (f64::NAN, f64::NAN)
            } else {
                ((a - 0.5).powi(2), 2.0 * (a - 0.5))
            }
        };
        let step = strong_wolfe(&mut phi, 0.25, -1.0, 4.0, &PARAMS).unwrap();
        assert!(step.alpha <= 1.0);

        // alpha = 1 only ties phi(0), so one more halving is needed
        let step = backtracking(&mut phi, 0.25, -1.0, 4.0, 1e-4).unwrap();
        assert_eq!(step.alpha, 0.5);
    }

    #[test]
    fn test_unbounded_direction_fails() {
        let mut phi = |a: f64| (-a, -1.0);
        assert!(strong_wolfe(&mut phi, 0.0, -1.0, 1.0, &PARAMS).is_none());
    }

    #[test]
    fn test_backtracking_gives_up() {
        // Never decreases along the direction
        let mut phi = |a: f64| (a, 1.0);
        assert!(backtracking(&mut phi, 0.0, -1.0, 1.0, 1e-4).is_none());
    }
}
