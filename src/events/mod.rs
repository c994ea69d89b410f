//! # Astronomical events
//!
//! Detection, refinement and incremental search of rare geometric configurations seen from
//! the Earth:
//!
//! * **Transit**: one or more bodies crossing the solar disk (or passing within a tolerance
//!   of the Sun), nearer to the Earth than the Sun.
//! * **Alignment**: several bodies whose geocentric ecliptic longitudes fit in a small arc.
//!
//! ## Modules
//!
//! * [`detector`] – pure predicates and scalar metrics at a single date.
//! * [`window`] – expansion of a hit into a `[start, end]` window and optimal-time refinement.
//! * [`search`] – the batched, cancellable search state machine.
//!
//! This module holds the shared vocabulary: [`EventKind`], [`FoundEvent`], the per-tick
//! [`SearchSpeed`] and every tunable of the pipeline in [`SearchParams`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use orrery::events::{SearchParams, SearchSpeed};
//!
//! let params = SearchParams::builder()
//!     .steps_per_tick(SearchSpeed::High, 50)
//!     .calc_batch_size(5_000)
//!     .max_continuous_events(25)
//!     .max_window_days(365.25)
//!     .build()
//!     .unwrap();
//! ```
use serde::{Deserialize, Serialize};
use std::cmp::Ordering::{Equal, Greater, Less};
use std::fmt;

use crate::{
    constants::{Days, Degree, MJD},
    kepler::KeplerSolverParams,
    orrery_errors::OrreryError,
    time::format_mjd,
};

pub mod detector;
pub mod search;
pub mod window;

/// Body every geometry is measured from.
pub const OBSERVER_ID: &str = "earth";

/// Body whose disk is crossed during a transit.
pub const STAR_ID: &str = "sun";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Transit,
    Alignment,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Transit => write!(f, "transit"),
            EventKind::Alignment => write!(f, "alignment"),
        }
    }
}

/// An event found by the search, immutable once recorded.
///
/// `start ≤ optimal ≤ end` always holds, and the detection predicate holds at `optimal`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoundEvent {
    /// Monotonically increasing within one search state.
    pub id: u64,
    pub kind: EventKind,
    /// Sorted target ids.
    pub target_ids: Vec<String>,
    pub start: MJD,
    pub end: MJD,
    pub optimal: MJD,
    /// Metric value at `optimal` (degrees).
    pub min_angle: Degree,
}

impl FoundEvent {
    /// Window length in days (`0` for a single-day event).
    pub fn duration(&self) -> Days {
        self.end - self.start
    }
}

impl fmt::Display for FoundEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} of {} at {} (window {} .. {}, {:.4}°)",
            self.id,
            self.kind,
            self.target_ids.join(", "),
            format_mjd(self.optimal),
            format_mjd(self.start),
            format_mjd(self.end),
            self.min_angle
        )
    }
}

/// Interactive pacing of a searching (visible) scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SearchSpeed {
    Low,
    #[default]
    Medium,
    High,
}

/// Tunables of the event pipeline.
///
/// Every limit that keeps a search, a window expansion or the optimizer bounded lives here
/// rather than as a literal in the algorithms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Predicate evaluations per tick while searching at each speed.
    pub low_steps_per_tick: usize,
    pub medium_steps_per_tick: usize,
    pub high_steps_per_tick: usize,

    /// Predicate evaluations per calculating batch.
    pub calc_batch_size: usize,

    /// Scan step (days).
    pub step_days: Days,

    /// Continuous mode stops after this many events.
    pub max_continuous_events: usize,

    /// Simulated span (days) after which any search completes.
    pub max_search_span_days: Days,

    /// Cap on the window expansion, in each direction (days).
    pub max_window_days: Days,

    /// Bisections of each window edge below the scan step.
    pub edge_bisections: usize,

    /// Coarse samples of the optimizer, both window ends included.
    pub coarse_samples: usize,

    /// Ternary-search iterations of the optimizer.
    pub ternary_iterations: usize,

    pub kepler: KeplerSolverParams,
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams {
            low_steps_per_tick: 1,
            medium_steps_per_tick: 5,
            high_steps_per_tick: 20,
            calc_batch_size: 2_000,
            step_days: 1.0,
            max_continuous_events: 50,
            max_search_span_days: 200.0 * 365.25,
            max_window_days: 3652.5,
            edge_bisections: 16,
            coarse_samples: 20,
            ternary_iterations: 10,
            kepler: KeplerSolverParams::default(),
        }
    }
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> SearchParamsBuilder {
        SearchParamsBuilder::new()
    }

    /// Predicate evaluations per searching tick at `speed`.
    pub fn steps_per_tick(&self, speed: SearchSpeed) -> usize {
        match speed {
            SearchSpeed::Low => self.low_steps_per_tick,
            SearchSpeed::Medium => self.medium_steps_per_tick,
            SearchSpeed::High => self.high_steps_per_tick,
        }
    }
}

/// Builder for [`SearchParams`], with validation.
#[derive(Debug, Clone)]
pub struct SearchParamsBuilder {
    params: SearchParams,
}

impl Default for SearchParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: SearchParams::default(),
        }
    }

    // --- Pacing ---
    pub fn steps_per_tick(mut self, speed: SearchSpeed, v: usize) -> Self {
        match speed {
            SearchSpeed::Low => self.params.low_steps_per_tick = v,
            SearchSpeed::Medium => self.params.medium_steps_per_tick = v,
            SearchSpeed::High => self.params.high_steps_per_tick = v,
        }
        self
    }
    pub fn calc_batch_size(mut self, v: usize) -> Self {
        self.params.calc_batch_size = v;
        self
    }
    pub fn step_days(mut self, v: Days) -> Self {
        self.params.step_days = v;
        self
    }

    // --- Caps ---
    pub fn max_continuous_events(mut self, v: usize) -> Self {
        self.params.max_continuous_events = v;
        self
    }
    pub fn max_search_span_days(mut self, v: Days) -> Self {
        self.params.max_search_span_days = v;
        self
    }
    pub fn max_window_days(mut self, v: Days) -> Self {
        self.params.max_window_days = v;
        self
    }

    // --- Refinement ---
    pub fn edge_bisections(mut self, v: usize) -> Self {
        self.params.edge_bisections = v;
        self
    }

    // --- Optimizer ---
    pub fn coarse_samples(mut self, v: usize) -> Self {
        self.params.coarse_samples = v;
        self
    }
    pub fn ternary_iterations(mut self, v: usize) -> Self {
        self.params.ternary_iterations = v;
        self
    }

    // --- Solver ---
    pub fn kepler(mut self, v: KeplerSolverParams) -> Self {
        self.params.kepler = v;
        self
    }

    /// Return true iff x > 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn gt0(x: f64) -> bool {
        x.partial_cmp(&0.0) == Some(Greater)
    }

    /// Return true iff x >= 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn ge0(x: f64) -> bool {
        matches!(x.partial_cmp(&0.0), Some(Greater) | Some(Equal))
    }

    /// Return true iff a <= b and comparable (i.e., not NaN).
    #[inline]
    fn le(a: f64, b: f64) -> bool {
        matches!(a.partial_cmp(&b), Some(Less) | Some(Equal))
    }

    /// Finalize the builder.
    ///
    /// Validation rules
    /// -----------------
    /// * every `*_steps_per_tick`, `calc_batch_size`, `max_continuous_events` ≥ 1;
    /// * `step_days > 0`, `max_search_span_days > 0`;
    /// * `0 ≤ max_window_days ≤ max_search_span_days`;
    /// * `coarse_samples ≥ 2`;
    /// * `kepler.max_iter ≥ 1`, `kepler.tolerance > 0`.
    ///
    /// `ternary_iterations = 0` is accepted and reduces the optimizer to its coarse pass;
    /// `edge_bisections = 0` keeps window edges on the scan step.
    pub fn build(self) -> Result<SearchParams, OrreryError> {
        let p = &self.params;

        if p.low_steps_per_tick == 0 || p.medium_steps_per_tick == 0 || p.high_steps_per_tick == 0
        {
            return Err(OrreryError::InvalidSearchParams(
                "steps per tick must be >= 1 for every speed".into(),
            ));
        }
        if p.calc_batch_size == 0 {
            return Err(OrreryError::InvalidSearchParams(
                "calc_batch_size must be >= 1".into(),
            ));
        }
        if p.max_continuous_events == 0 {
            return Err(OrreryError::InvalidSearchParams(
                "max_continuous_events must be >= 1".into(),
            ));
        }
        if !Self::gt0(p.step_days) {
            return Err(OrreryError::InvalidSearchParams(
                "step_days must be > 0".into(),
            ));
        }
        if !Self::gt0(p.max_search_span_days) {
            return Err(OrreryError::InvalidSearchParams(
                "max_search_span_days must be > 0".into(),
            ));
        }
        if !Self::ge0(p.max_window_days) || !Self::le(p.max_window_days, p.max_search_span_days) {
            return Err(OrreryError::InvalidSearchParams(
                "max_window_days must satisfy 0 <= max_window_days <= max_search_span_days".into(),
            ));
        }
        if p.coarse_samples < 2 {
            return Err(OrreryError::InvalidSearchParams(
                "coarse_samples must be >= 2".into(),
            ));
        }
        if p.kepler.max_iter == 0 || !Self::gt0(p.kepler.tolerance) {
            return Err(OrreryError::InvalidSearchParams(
                "kepler solver needs max_iter >= 1 and tolerance > 0".into(),
            ));
        }

        Ok(self.params)
    }
}

#[cfg(test)]
mod events_test {
    use super::*;

    #[test]
    fn test_default_params_build() {
        let built = SearchParams::builder().build().unwrap();
        assert_eq!(built, SearchParams::default());
        assert_eq!(built.max_window_days, 3652.5);
        assert_eq!(built.coarse_samples, 20);
        assert_eq!(built.ternary_iterations, 10);
        assert_eq!(built.edge_bisections, 16);
        assert_eq!(built.kepler.max_iter, 100);
    }

    #[test]
    fn test_builder_setters() {
        let p = SearchParams::builder()
            .steps_per_tick(SearchSpeed::Low, 2)
            .steps_per_tick(SearchSpeed::High, 99)
            .step_days(0.5)
            .ternary_iterations(0)
            .edge_bisections(0)
            .build()
            .unwrap();
        assert_eq!(p.steps_per_tick(SearchSpeed::Low), 2);
        assert_eq!(p.steps_per_tick(SearchSpeed::Medium), 5);
        assert_eq!(p.steps_per_tick(SearchSpeed::High), 99);
        assert_eq!(p.step_days, 0.5);
        assert_eq!(p.edge_bisections, 0);
    }

    #[test]
    fn test_builder_rejects_invalid() {
        let invalid = [
            SearchParams::builder().steps_per_tick(SearchSpeed::Medium, 0),
            SearchParams::builder().calc_batch_size(0),
            SearchParams::builder().max_continuous_events(0),
            SearchParams::builder().step_days(0.0),
            SearchParams::builder().step_days(f64::NAN),
            SearchParams::builder().max_search_span_days(-1.0),
            SearchParams::builder().max_window_days(-1.0),
            SearchParams::builder()
                .max_search_span_days(100.0)
                .max_window_days(200.0),
            SearchParams::builder().coarse_samples(1),
            SearchParams::builder().kepler(KeplerSolverParams {
                max_iter: 0,
                tolerance: 1e-6,
            }),
        ];
        for builder in invalid {
            assert!(matches!(
                builder.build(),
                Err(OrreryError::InvalidSearchParams(_))
            ));
        }
    }

    #[test]
    fn test_found_event_display() {
        let event = FoundEvent {
            id: 1,
            kind: EventKind::Transit,
            target_ids: vec!["mercury".into()],
            start: 57517.5,
            end: 57517.5,
            optimal: 57517.5,
            min_angle: 0.1234,
        };
        let text = event.to_string();
        assert!(text.starts_with("#1 transit of mercury at 2016-05-09"));
        assert!(text.contains("0.1234°"));
        assert_eq!(event.duration(), 0.0);
    }
}
