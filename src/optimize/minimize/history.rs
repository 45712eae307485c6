//! Bounded FIFO of L-BFGS correction pairs.

use std::collections::VecDeque;

use crate::optimize::utils::{CURVATURE_EPS, axpy, dot};

/// One correction pair `s = x_{k+1} - x_k`, `y = g_{k+1} - g_k`.
#[derive(Debug, Clone)]
struct CurvaturePair {
    s: Vec<f64>,
    y: Vec<f64>,
    /// `1 / (s·y)`
    rho: f64,
}

/// The `m` most recent correction pairs, oldest first.
///
/// Inserting into a full history evicts the oldest pair. Only pairs with
/// sufficiently positive curvature are stored, which keeps the implicit
/// inverse-Hessian approximation positive definite.
#[derive(Debug, Clone)]
pub(crate) struct History {
    pairs: VecDeque<CurvaturePair>,
    capacity: usize,
    alpha: Vec<f64>,
}

impl History {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            pairs: VecDeque::with_capacity(capacity),
            capacity,
            alpha: vec![0.0; capacity],
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.pairs.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.pairs.clear();
    }

    /// Store a pair, or reject it when `s·y <= CURVATURE_EPS * y·y`.
    ///
    /// Returns whether the pair was stored.
    pub(crate) fn push(&mut self, s: Vec<f64>, y: Vec<f64>) -> bool {
        let sy = dot(&s, &y);
        let yy = dot(&y, &y);
        if !sy.is_finite() || !yy.is_finite() || sy <= CURVATURE_EPS * yy {
            return false;
        }
        if self.pairs.len() == self.capacity {
            self.pairs.pop_front();
        }
        self.pairs.push_back(CurvaturePair { s, y, rho: 1.0 / sy });
        true
    }

    /// Two-loop recursion: write `-H g` into `direction`.
    ///
    /// `H` is the implicit inverse Hessian, seeded with `γI` where
    /// `γ = s·y / y·y` of the newest pair. With no pairs this is `-g`.
    pub(crate) fn direction(&mut self, gradient: &[f64], direction: &mut [f64]) {
        direction.copy_from_slice(gradient);
        let q = direction;

        for (i, pair) in self.pairs.iter().enumerate().rev() {
            let a = pair.rho * dot(&pair.s, q);
            self.alpha[i] = a;
            axpy(-a, &pair.y, q);
        }

        if let Some(newest) = self.pairs.back() {
            let gamma = 1.0 / (newest.rho * dot(&newest.y, &newest.y));
            q.iter_mut().for_each(|v| *v *= gamma);
        }

        for (i, pair) in self.pairs.iter().enumerate() {
            let b = pair.rho * dot(&pair.y, q);
            axpy(self.alpha[i] - b, &pair.s, q);
        }

        q.iter_mut().for_each(|v| *v = -*v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_history_is_steepest_descent() {
        let mut h = History::new(3);
        let mut d = [0.0; 2];
        h.direction(&[1.0, -2.0], &mut d);
        assert_eq!(d, [-1.0, 2.0]);
    }

    #[test]
    fn test_rejects_non_positive_curvature() {
        let mut h = History::new(3);
        assert!(!h.push(vec![1.0, 0.0], vec![-1.0, 0.0]));
        assert!(!h.push(vec![1.0, 0.0], vec![0.0, 1.0]));
        assert!(!h.push(vec![f64::NAN, 0.0], vec![1.0, 0.0]));
        assert!(h.is_empty());
        assert!(h.push(vec![1.0, 0.0], vec![2.0, 0.0]));
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn test_fifo_eviction() {
        let mut h = History::new(2);
        for k in 1..=3 {
            let v = k as f64;
            assert!(h.push(vec![v], vec![2.0 * v]));
        }
        assert_eq!(h.len(), 2);
        assert_eq!(h.pairs.front().map(|p| p.s[0]), Some(2.0));
        assert_eq!(h.pairs.back().map(|p| p.s[0]), Some(3.0));
    }

    #[test]
    fn test_recovers_newton_step_on_quadratic() {
        // f = x² + 5y², Hessian diag(2, 10); pairs along both axes pin it down
        let mut h = History::new(5);
        assert!(h.push(vec![1.0, 0.0], vec![2.0, 0.0]));
        assert!(h.push(vec![0.0, 1.0], vec![0.0, 10.0]));

        let g = [4.0, 20.0];
        let mut d = [0.0; 2];
        h.direction(&g, &mut d);
        assert_relative_eq!(d[0], -2.0, epsilon = 1e-12);
        assert_relative_eq!(d[1], -2.0, epsilon = 1e-12);
    }
}
