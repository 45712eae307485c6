//! Globally adaptive bisection driven by a max-error worklist.
//!
//! The leaves of the subdivision live in a [`BinaryHeap`] ordered by local
//! error, so the next interval to bisect is always the one contributing most
//! to the global error. The heap size is the subdivision count, which makes the
//! budget a plain size cap.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::{debug, trace, warn};

use crate::function::ScalarFunction;
use crate::integrate::traits::{IntegrationResult, IntegrationStatus, Interval, QuadOptions};

use super::gauss_kronrod::GaussKronrodRule;

/// Children keeping at least this share of their parent's error count as a stall.
const STALL_RATIO: f64 = 0.99;
/// Relative change of the local value below which a stall is attributed to roundoff.
const ROUNDOFF_VALUE_RTOL: f64 = 1e-5;
/// Consecutive roundoff stalls before giving up with `RoundoffLimited`.
const ROUNDOFF_STALL_LIMIT: usize = 6;
/// Children of a nested split keeping at least this share of the parent's error
/// count toward divergence.
const DIVERGENCE_RATIO: f64 = 0.999;
/// Consecutive nested, non-improving splits before giving up with `Divergent`.
const DIVERGENCE_STALL_LIMIT: usize = 16;
/// Running totals are re-summed from the leaves every this many splits.
const RESUM_PERIOD: usize = 256;
/// Running totals are also re-summed when a split cancels the error total
/// below this share of its previous value.
const RESUM_DROP: f64 = 1e-3;

/// Heap entry: larger error first, leftmost first among equal errors.
#[derive(Debug, Clone, Copy)]
struct Leaf(Interval);

impl PartialEq for Leaf {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Leaf {}

impl PartialOrd for Leaf {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Leaf {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .error
            .total_cmp(&other.0.error)
            .then_with(|| other.0.low.total_cmp(&self.0.low))
    }
}

/// Global value and error over the current leaves.
#[derive(Debug, Clone, Copy)]
struct Totals {
    value: f64,
    error: f64,
}

impl Totals {
    fn of(heap: &BinaryHeap<Leaf>) -> Self {
        heap.iter().fold(Self { value: 0.0, error: 0.0 }, |acc, leaf| Self {
            value: acc.value + leaf.0.estimate,
            error: acc.error + leaf.0.error,
        })
    }

    fn is_finite(&self) -> bool {
        self.value.is_finite() && self.error.is_finite()
    }
}

#[derive(Debug, Clone, Copy)]
struct Snapshot {
    value: f64,
    error: f64,
    leaves: usize,
}

/// Tracks consecutive refinements that failed to reduce the error.
///
/// Roundoff stalls may come from anywhere in the range. Divergence stalls only
/// count while every split refines a child of the previous split, i.e. while
/// bisection keeps closing in on one point without the error shrinking.
#[derive(Debug, Default)]
struct StallDetector {
    roundoff: usize,
    divergent: usize,
    last_split: Option<(f64, f64, f64)>,
}

#[derive(Debug, PartialEq, Eq)]
enum Stall {
    None,
    Roundoff,
    Divergent,
}

impl StallDetector {
    fn record(&mut self, parent: &Interval, left: &Interval, right: &Interval) -> Stall {
        let children_error = left.error + right.error;
        let children_value = left.estimate + right.estimate;
        let nested = self.last_split.is_some_and(|(low, mid, high)| {
            (parent.low == low && parent.high == mid) || (parent.low == mid && parent.high == high)
        });
        self.last_split = Some((left.low, left.high, right.high));

        if parent.error > 0.0 && children_error >= STALL_RATIO * parent.error {
            let moved = (children_value - parent.estimate).abs();
            if moved <= ROUNDOFF_VALUE_RTOL * children_value.abs() {
                self.roundoff += 1;
                self.divergent = 0;
            } else if nested && children_error >= DIVERGENCE_RATIO * parent.error {
                self.divergent += 1;
                self.roundoff = 0;
            } else {
                self.roundoff = 0;
                self.divergent = 0;
            }
        } else {
            self.roundoff = 0;
            self.divergent = 0;
        }

        if self.roundoff >= ROUNDOFF_STALL_LIMIT {
            Stall::Roundoff
        } else if self.divergent >= DIVERGENCE_STALL_LIMIT {
            Stall::Divergent
        } else {
            Stall::None
        }
    }
}

fn evaluate_interval<F>(f: &F, rule: GaussKronrodRule, low: f64, high: f64) -> (Interval, usize)
where
    F: ScalarFunction + ?Sized,
{
    let est = rule.evaluate(f, low, high);
    (
        Interval {
            low,
            high,
            estimate: est.kronrod,
            error: est.error,
        },
        est.neval,
    )
}

/// Adaptive Gauss-Kronrod quadrature over a finite interval `[a, b]`.
///
/// Repeatedly bisects the leaf with the largest error estimate until the
/// summed error satisfies `error <= max(eps_abs, eps_rel * |value|)`.
///
/// Termination, checked in this order after every refinement:
///
/// - a non-finite global value or error gives [`IntegrationStatus::Divergent`]
/// - the tolerance gives [`IntegrationStatus::Ok`]
/// - `max_subdivisions` leaves give [`IntegrationStatus::MaxSubdivisionsReached`]
/// - a worst leaf that no longer splits in floating point gives
///   [`IntegrationStatus::RoundoffLimited`]
/// - 6 consecutive refinements whose children keep 99% of the parent's error
///   without moving its value (relative `1e-5`) give `RoundoffLimited`
/// - 16 consecutive refinements, each splitting a child of the previous one,
///   whose children keep 99.9% of the parent's error while moving its value
///   give `Divergent`
///
/// Every exit other than `Ok` reports the lowest-error state seen so far, so a
/// larger budget never yields a larger error estimate. Only when the very first
/// evaluation is non-finite is that non-finite state reported.
///
/// Global totals are updated per split and re-summed from the leaves
/// periodically, after heavy cancellation, and before `Ok` is accepted.
///
/// `a` and `b` must be finite with `a < b`; anything else is `InvalidInput`.
pub fn adaptive_quad<F>(
    f: &F,
    a: f64,
    b: f64,
    rule: GaussKronrodRule,
    options: &QuadOptions,
) -> IntegrationResult
where
    F: ScalarFunction + ?Sized,
{
    if !(a.is_finite() && b.is_finite() && a < b) {
        warn!("adaptive_quad: invalid interval [{}, {}]", a, b);
        return IntegrationResult::invalid();
    }
    if let Err(e) = options.validate() {
        warn!("adaptive_quad: {}", e);
        return IntegrationResult::invalid();
    }

    let (root, mut neval) = evaluate_interval(f, rule, a, b);
    let mut heap = BinaryHeap::with_capacity(options.max_subdivisions + 1);
    heap.push(Leaf(root));

    let mut totals = Totals {
        value: root.estimate,
        error: root.error,
    };
    let mut splits = 0usize;
    let mut best: Option<Snapshot> = None;
    let mut stalls = StallDetector::default();

    let finish = |status: IntegrationStatus, snap: Snapshot, neval: usize| {
        debug!(
            "adaptive_quad: {:?} after {} leaves, {} evaluations (value {}, error {})",
            status, snap.leaves, neval, snap.value, snap.error
        );
        IntegrationResult {
            value: snap.value,
            error_estimate: snap.error,
            status,
            neval,
            subdivisions: snap.leaves,
        }
    };

    loop {
        if !totals.is_finite() {
            let snap = best.unwrap_or(Snapshot {
                value: totals.value,
                error: totals.error,
                leaves: heap.len(),
            });
            return finish(IntegrationStatus::Divergent, snap, neval);
        }

        if totals.error <= options.target(totals.value) {
            totals = Totals::of(&heap);
            if totals.error <= options.target(totals.value) {
                let current = Snapshot {
                    value: totals.value,
                    error: totals.error,
                    leaves: heap.len(),
                };
                return finish(IntegrationStatus::Ok, current, neval);
            }
        }

        let best_so_far = match best {
            Some(b) if b.error <= totals.error => b,
            _ => Snapshot {
                value: totals.value,
                error: totals.error,
                leaves: heap.len(),
            },
        };
        best = Some(best_so_far);

        if heap.len() >= options.max_subdivisions {
            return finish(IntegrationStatus::MaxSubdivisionsReached, best_so_far, neval);
        }

        // The heap is never empty here
        let Some(Leaf(parent)) = heap.pop() else {
            return finish(IntegrationStatus::Divergent, best_so_far, neval);
        };

        let mid = 0.5 * (parent.low + parent.high);
        if !(parent.low < mid && mid < parent.high) {
            trace!(
                "adaptive_quad: [{}, {}] cannot be split further",
                parent.low, parent.high
            );
            return finish(IntegrationStatus::RoundoffLimited, best_so_far, neval);
        }

        let (left, n_left) = evaluate_interval(f, rule, parent.low, mid);
        let (right, n_right) = evaluate_interval(f, rule, mid, parent.high);
        neval += n_left + n_right;

        trace!(
            "adaptive_quad: split [{}, {}] error {} -> {} + {}",
            parent.low, parent.high, parent.error, left.error, right.error
        );

        heap.push(Leaf(left));
        heap.push(Leaf(right));

        splits += 1;
        let previous_error = totals.error;
        totals.value += left.estimate + right.estimate - parent.estimate;
        totals.error += left.error + right.error - parent.error;
        if splits % RESUM_PERIOD == 0 || totals.error < RESUM_DROP * previous_error {
            totals = Totals::of(&heap);
        }

        match stalls.record(&parent, &left, &right) {
            Stall::None => {}
            Stall::Roundoff => {
                return finish(IntegrationStatus::RoundoffLimited, best_so_far, neval);
            }
            Stall::Divergent => {
                return finish(IntegrationStatus::Divergent, best_so_far, neval);
            }
        }
    }
}
