//! L-BFGS (Limited-memory BFGS) quasi-Newton minimization.
//!
//! L-BFGS stores the `m` most recent correction pairs `(s_k, y_k)`:
//! - `s_k = x_{k+1} - x_k` (position change)
//! - `y_k = ∇f_{k+1} - ∇f_k` (gradient change)
//!
//! The search direction comes from the two-loop recursion, which applies the
//! implicit inverse Hessian to the gradient in O(mn) without forming it.

use log::{debug, trace, warn};

use crate::function::GradientFunction;
use crate::optimize::error::OptimizeError;
use crate::optimize::utils::{all_finite, dot, norm};

use super::history::History;
use super::line_search::{WolfeParams, backtracking, strong_wolfe};
use super::types::{LbfgsOptions, LineSearchMethod, OptimizationResult, OptimizationStatus};

/// Minimize `f` starting from `x0` with L-BFGS.
///
/// Each iteration computes a direction by two-loop recursion over the stored
/// correction pairs, searches along it, and records the new pair. Pairs with
/// `s·y <= 1e-10 y·y` are skipped and counted in `rejected_pairs`. If the
/// direction is not a descent direction the history is dropped and steepest
/// descent is used. While the history is empty the first trial step is
/// `min(1, 1/‖g‖)`, otherwise `1`.
///
/// The run stops with:
/// - `Converged` when `‖g‖ <= g_tol` or `|f_old - f_new| <= f_tol max(1, |f_old|)`
/// - `MaxIterationsReached` after `max_iter` iterations
/// - `LineSearchFailed` when no acceptable step exists along the direction
/// - `InvalidInput` for an empty `x0`, a non-finite value or gradient at `x0`,
///   or invalid options
///
/// The iterates depend only on the inputs, so repeated runs are bit-identical.
///
/// # Example
///
/// ```
/// use quadmin::{minimize, GradientFn, LbfgsOptions};
///
/// let rosenbrock = GradientFn(|x: &[f64], g: &mut [f64]| {
///     g[0] = -2.0 * (1.0 - x[0]) - 400.0 * x[0] * (x[1] - x[0] * x[0]);
///     g[1] = 200.0 * (x[1] - x[0] * x[0]);
///     (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2)
/// });
///
/// let result = minimize(rosenbrock, &[-1.2, 1.0], &LbfgsOptions::default());
/// assert!(result.converged());
/// assert!((result.x[0] - 1.0).abs() < 1e-4);
/// ```
pub fn minimize<F>(f: F, x0: &[f64], options: &LbfgsOptions) -> OptimizationResult
where
    F: GradientFunction,
{
    let n = x0.len();
    let invalid = |x: Vec<f64>, fun: f64, nfev: usize, err: OptimizeError| {
        warn!("{}", err);
        OptimizationResult {
            x,
            fun,
            iterations: 0,
            status: OptimizationStatus::InvalidInput,
            nfev,
            gradient_norm: f64::NAN,
            rejected_pairs: 0,
        }
    };

    if n == 0 {
        let err = OptimizeError::InvalidInput {
            context: "lbfgs: empty initial guess".to_string(),
        };
        return invalid(Vec::new(), f64::NAN, 0, err);
    }
    if let Err(err) = options.validate() {
        return invalid(x0.to_vec(), f64::NAN, 0, err);
    }

    let mut x = x0.to_vec();
    let mut grad = vec![0.0; n];
    let mut fx = f.evaluate_with_gradient(&x, &mut grad);
    let mut nfev = 1;

    if !fx.is_finite() || !all_finite(&grad) {
        let err = OptimizeError::InvalidInput {
            context: format!("lbfgs: non-finite value or gradient at the initial guess (f = {})", fx),
        };
        return invalid(x, fx, nfev, err);
    }

    let wolfe = WolfeParams {
        c1: options.c1,
        c2: options.c2,
        max_bracket: options.max_bracket,
        max_zoom: options.max_zoom,
    };
    let mut history = History::new(options.history);
    let mut rejected_pairs = 0;
    let mut direction = vec![0.0; n];
    let mut x_trial = vec![0.0; n];
    let mut g_trial = vec![0.0; n];
    let mut grad_norm = norm(&grad);

    let finish = |x: Vec<f64>,
                  fun: f64,
                  iterations: usize,
                  status: OptimizationStatus,
                  nfev: usize,
                  gradient_norm: f64,
                  rejected_pairs: usize| {
        debug!(
            "lbfgs: {:?} after {} iterations, {} evaluations (f = {}, |g| = {})",
            status, iterations, nfev, fun, gradient_norm
        );
        if status == OptimizationStatus::LineSearchFailed {
            warn!("lbfgs: line search failed at iteration {}", iterations);
        }
        OptimizationResult {
            x,
            fun,
            iterations,
            status,
            nfev,
            gradient_norm,
            rejected_pairs,
        }
    };

    for iter in 0..options.max_iter {
        if grad_norm <= options.g_tol {
            return finish(x, fx, iter, OptimizationStatus::Converged, nfev, grad_norm, rejected_pairs);
        }

        history.direction(&grad, &mut direction);
        let mut slope = dot(&grad, &direction);
        if !(slope < 0.0 && slope.is_finite()) {
            trace!("lbfgs: iteration {}: not a descent direction, resetting history", iter);
            history.clear();
            for (d, g) in direction.iter_mut().zip(&grad) {
                *d = -g;
            }
            slope = -grad_norm * grad_norm;
        }

        let alpha_init = if history.is_empty() {
            (1.0 / grad_norm).min(1.0)
        } else {
            1.0
        };

        let mut phi = |alpha: f64| {
            for ((xt, xi), di) in x_trial.iter_mut().zip(&x).zip(&direction) {
                *xt = xi + alpha * di;
            }
            nfev += 1;
            let value = f.evaluate_with_gradient(&x_trial, &mut g_trial);
            (value, dot(&g_trial, &direction))
        };

        let accepted = match options.line_search {
            LineSearchMethod::StrongWolfe => strong_wolfe(&mut phi, fx, slope, alpha_init, &wolfe),
            LineSearchMethod::Backtracking => {
                backtracking(&mut phi, fx, slope, alpha_init, options.c1)
            }
        };

        let Some(step) = accepted else {
            return finish(
                x,
                fx,
                iter,
                OptimizationStatus::LineSearchFailed,
                nfev,
                grad_norm,
                rejected_pairs,
            );
        };

        // The accepted point is the last one the line search evaluated
        let s: Vec<f64> = x_trial.iter().zip(&x).map(|(a, b)| a - b).collect();
        let y: Vec<f64> = g_trial.iter().zip(&grad).map(|(a, b)| a - b).collect();
        if !history.push(s, y) {
            rejected_pairs += 1;
            trace!("lbfgs: iteration {}: rejected curvature pair", iter);
        }

        let f_old = fx;
        std::mem::swap(&mut x, &mut x_trial);
        std::mem::swap(&mut grad, &mut g_trial);
        fx = step.value;
        grad_norm = norm(&grad);

        trace!(
            "lbfgs: iteration {}: alpha = {}, f = {}, |g| = {}, history = {}",
            iter,
            step.alpha,
            fx,
            grad_norm,
            history.len()
        );

        if grad_norm <= options.g_tol
            || (f_old - fx).abs() <= options.f_tol * f_old.abs().max(1.0)
        {
            return finish(
                x,
                fx,
                iter + 1,
                OptimizationStatus::Converged,
                nfev,
                grad_norm,
                rejected_pairs,
            );
        }
    }

    finish(
        x,
        fx,
        options.max_iter,
        OptimizationStatus::MaxIterationsReached,
        nfev,
        grad_norm,
        rejected_pairs,
    )
}
