//! Shared vector helpers for the optimizer.

/// Default relative step for central finite differences (about `ε^(1/3)`).
pub const CENTRAL_DIFF_EPS: f64 = 6e-6;

/// Curvature pairs with `s·y <= CURVATURE_EPS * y·y` are discarded.
pub const CURVATURE_EPS: f64 = 1e-10;

/// Dot product of two equally long vectors.
#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Compute the L2 (Euclidean) norm of a vector.
#[inline]
pub fn norm(v: &[f64]) -> f64 {
    dot(v, v).sqrt()
}

/// `y += alpha * x`
#[inline]
pub fn axpy(alpha: f64, x: &[f64], y: &mut [f64]) {
    for (yi, xi) in y.iter_mut().zip(x) {
        *yi += alpha * xi;
    }
}

/// Whether every component is finite.
#[inline]
pub fn all_finite(v: &[f64]) -> bool {
    v.iter().all(|x| x.is_finite())
}
