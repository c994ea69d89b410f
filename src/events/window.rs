//! # Event window and optimal time
//!
//! Once a scan step hits a date where the detection predicate holds, the event is turned into
//! a record in two steps:
//!
//! 1. [`calculate_event_duration`] walks away from the hit, one step at a time in both
//!    directions, while the predicate keeps holding. Each direction is capped so a predicate
//!    that never turns false still terminates. An edge that stopped on the predicate is then
//!    bisected between its last true step and the first false one.
//! 2. [`find_optimal_event_time`] minimizes the event metric inside the window: a coarse uniform
//!    sampling (both ends included), then a ternary search on the bracket around the best
//!    coarse sample. The best value seen in *either* phase is returned, so a non-unimodal metric
//!    can only make the answer coarser, never worse than a coarse sample.

use crate::constants::{Days, MJD};

/// Start/end dates around a hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventWindow {
    pub start: MJD,
    pub end: MJD,
    /// At least one side stopped on the expansion cap rather than on the predicate.
    pub capped: bool,
}

impl EventWindow {
    /// Single-date window.
    pub fn at(date: MJD) -> Self {
        EventWindow {
            start: date,
            end: date,
            capped: false,
        }
    }

    pub fn contains(&self, date: MJD) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn duration(&self) -> Days {
        self.end - self.start
    }
}

/// Best date found by [`find_optimal_event_time`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimalTime {
    pub date: MJD,
    pub metric: f64,
}

/// Last date reachable from `hit` in steps of `step` (signed) while `predicate` holds, and
/// whether the walk was cut by `max_days`.
fn expand<F: FnMut(MJD) -> bool>(
    predicate: &mut F,
    hit: MJD,
    step: Days,
    max_days: Days,
) -> (MJD, bool) {
    let mut edge = hit;
    let mut taken = 0.0;
    loop {
        if taken + step.abs() > max_days {
            return (edge, true);
        }
        let next = edge + step;
        if !predicate(next) {
            return (edge, false);
        }
        edge = next;
        taken += step.abs();
    }
}

/// Move `inside` (predicate true) toward `outside` (predicate false), halving the gap
/// `iterations` times. The returned date still satisfies the predicate.
fn bisect_edge<F: FnMut(MJD) -> bool>(
    predicate: &mut F,
    mut inside: MJD,
    mut outside: MJD,
    iterations: usize,
) -> MJD {
    for _ in 0..iterations {
        let mid = 0.5 * (inside + outside);
        if predicate(mid) {
            inside = mid;
        } else {
            outside = mid;
        }
    }
    inside
}

/// Expand a hit into the window during which `predicate` holds.
///
/// Arguments
/// ---------
/// * `predicate`: detection predicate; it is expected to hold at `hit`.
/// * `hit`: date at which the predicate was found true.
/// * `step`: expansion step (days, > 0).
/// * `max_days`: cap on the expansion in each direction.
/// * `edge_bisections`: bisection iterations on each uncapped edge (0 keeps step resolution).
///
/// Return
/// ------
/// * An [`EventWindow`] with `start ≤ hit ≤ end`, the predicate holding at both ends. Unless
///   `capped`, the predicate fails at a date within `step / 2^edge_bisections` past each end.
pub fn calculate_event_duration<F: FnMut(MJD) -> bool>(
    mut predicate: F,
    hit: MJD,
    step: Days,
    max_days: Days,
    edge_bisections: usize,
) -> EventWindow {
    let step = step.abs();
    let (mut start, capped_before) = expand(&mut predicate, hit, -step, max_days);
    let (mut end, capped_after) = expand(&mut predicate, hit, step, max_days);

    if !capped_before {
        start = bisect_edge(&mut predicate, start, start - step, edge_bisections);
    }
    if !capped_after {
        end = bisect_edge(&mut predicate, end, end + step, edge_bisections);
    }

    let capped = capped_before || capped_after;
    if capped {
        tracing::warn!(
            hit,
            start,
            end,
            max_days,
            "event window expansion reached its cap"
        );
    }

    EventWindow { start, end, capped }
}

/// Date of minimum `metric` inside `window`.
///
/// Arguments
/// ---------
/// * `metric`: scalar to minimize (angle spread, degrees).
/// * `window`: search interval.
/// * `coarse_samples`: number of uniform samples, both ends included (at least 2 are taken).
/// * `ternary_iterations`: refinement iterations around the best coarse sample.
///
/// Return
/// ------
/// * The best `(date, metric)` seen over both phases; `date` always lies in the window and
///   `metric` is never above the metric at either window end.
pub fn find_optimal_event_time<F: FnMut(MJD) -> f64>(
    mut metric: F,
    window: &EventWindow,
    coarse_samples: usize,
    ternary_iterations: usize,
) -> OptimalTime {
    let mut best = OptimalTime {
        date: window.start,
        metric: metric(window.start),
    };
    if window.end <= window.start {
        return best;
    }

    let consider = |date: MJD, value: f64, best: &mut OptimalTime| {
        if value < best.metric {
            *best = OptimalTime {
                date,
                metric: value,
            };
        }
    };

    let n = coarse_samples.max(2);
    let span = window.end - window.start;
    let coarse_step = span / (n - 1) as f64;
    for k in 1..n {
        let date = if k == n - 1 {
            window.end
        } else {
            window.start + coarse_step * k as f64
        };
        let value = metric(date);
        consider(date, value, &mut best);
    }

    let mut lo = (best.date - coarse_step).max(window.start);
    let mut hi = (best.date + coarse_step).min(window.end);
    for _ in 0..ternary_iterations {
        let third = (hi - lo) / 3.0;
        let (m1, m2) = (lo + third, hi - third);
        let (f1, f2) = (metric(m1), metric(m2));
        consider(m1, f1, &mut best);
        consider(m2, f2, &mut best);
        if f1 < f2 {
            hi = m2;
        } else {
            lo = m1;
        }
    }

    best
}
