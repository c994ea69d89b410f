//! # Event search scheduler
//!
//! A search scans simulated time one step at a time, evaluating the detection predicate in
//! bounded batches so the host stays responsive between them.
//!
//! ## States
//!
//! ```text
//!            start(Searching)               hit, not continuous
//!   Idle ───────────────────────► Searching ─────────────────────► Idle
//!     │      start(Calculating)              hit, continuous: restart past the window
//!     └─────────────────────────► Calculating ──► … ──► Completed (event or span cap)
//!
//!   Searching/Calculating ──pause──► Paused ──resume──► previous mode
//!   Searching/Calculating ──stop───► Idle (at the next tick boundary)
//! ```
//!
//! * **Searching** evaluates a few steps per tick, chosen by [`SearchSpeed`], so the scanned
//!   date can be shown advancing.
//! * **Calculating** evaluates a large batch per tick, decoupled from the visible date.
//! * **Continuous** searches resume right past each found window until the event-count or
//!   simulated-span cap completes them.
//!
//! The [`SearchConfig`] is captured by value when a search starts. Found events survive stops,
//! and a window guard keyed on `(kind, sorted targets)` makes the scan jump over the last found
//! window instead of finding the same event again, including across restarts.
//!
//! All state lives in a [`SearchState`] owned by the caller; [`SearchEngine::tick`] mutates it
//! explicitly, which keeps the machine testable without any render loop.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::{
    constants::{Days, Degree, MJD},
    ephemeris::{PositionProvider, PrecisionMode},
    events::{
        detector::{event_holds, event_metric},
        window::{calculate_event_duration, find_optimal_event_time, EventWindow},
        EventKind, FoundEvent, SearchParams, SearchSpeed, OBSERVER_ID, STAR_ID,
    },
    orrery_errors::OrreryError,
    time::TimeDirection,
};

/// Mean apparent angular radius of the Sun seen from the Earth (degrees).
pub const SOLAR_ANGULAR_RADIUS_DEG: Degree = 0.2666;

/// Detection settings captured when a search starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Transit threshold outside strict mode, and alignment spread limit (degrees).
    pub tolerance: Degree,
    pub solar_angular_radius: Degree,
    /// Require an actual crossing of the solar disk for transits.
    pub strict: bool,
    pub precision: PrecisionMode,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            tolerance: 1.0,
            solar_angular_radius: SOLAR_ANGULAR_RADIUS_DEG,
            strict: false,
            precision: PrecisionMode::Kepler,
        }
    }
}

impl SearchConfig {
    /// Angle (degrees) under which a body counts as transiting.
    pub fn transit_threshold(&self) -> Degree {
        if self.strict {
            self.solar_angular_radius
        } else {
            self.tolerance
        }
    }

    pub fn validate(&self) -> Result<(), OrreryError> {
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(OrreryError::InvalidSearchParams(
                "tolerance must be finite and >= 0".into(),
            ));
        }
        if !(self.solar_angular_radius.is_finite() && self.solar_angular_radius > 0.0) {
            return Err(OrreryError::InvalidSearchParams(
                "solar_angular_radius must be finite and > 0".into(),
            ));
        }
        Ok(())
    }
}

/// How a search spends its ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchMode {
    /// Few steps per tick; the scan date is meant to be displayed.
    Searching(SearchSpeed),
    /// Large batches, not paced to the visible date.
    Calculating,
}

/// What to look for and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub kind: EventKind,
    pub targets: Vec<String>,
    pub mode: SearchMode,
    pub continuous: bool,
    pub direction: TimeDirection,
}

impl SearchRequest {
    pub fn new<I, S>(kind: EventKind, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SearchRequest {
            kind,
            targets: targets.into_iter().map(Into::into).collect(),
            mode: SearchMode::Searching(SearchSpeed::default()),
            continuous: false,
            direction: TimeDirection::Forward,
        }
    }

    pub fn transit<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(EventKind::Transit, targets)
    }

    pub fn alignment<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(EventKind::Alignment, targets)
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn continuous(mut self, continuous: bool) -> Self {
        self.continuous = continuous;
        self
    }

    pub fn direction(mut self, direction: TimeDirection) -> Self {
        self.direction = direction;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SearchPhase {
    #[default]
    Idle,
    Searching,
    Calculating,
    Paused,
    Completed,
}

/// Last found window, with the key of the search that found it.
#[derive(Debug, Clone, PartialEq)]
struct WindowGuard {
    kind: EventKind,
    targets: Vec<String>,
    window: EventWindow,
}

impl WindowGuard {
    /// Where a scan arriving at `date` with signed `step` resumes, if the guard applies.
    fn exit(&self, request: &SearchRequest, date: MJD, step: Days) -> Option<MJD> {
        if self.kind != request.kind
            || self.targets != request.targets
            || !self.window.contains(date)
        {
            return None;
        }
        Some(step_past(&self.window, date, step))
    }
}

/// First date of the grid `from + k·step` (k ≥ 1) lying outside `window` in the direction of
/// the signed `step`. Bisected window edges fall between grid dates; the scan resumes on its
/// own grid rather than on the edge.
fn step_past(window: &EventWindow, from: MJD, step: Days) -> MJD {
    let edge = if step > 0.0 { window.end } else { window.start };
    let inside_steps = ((edge - from) / step).floor().max(0.0);
    from + (inside_steps + 1.0) * step
}

/// Snapshot for status displays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchProgress {
    pub phase: SearchPhase,
    pub cursor: MJD,
    /// Simulated days scanned since the search started.
    pub scanned_days: Days,
    /// `scanned_days` over the span cap, in `[0, 1]`.
    pub span_fraction: f64,
    pub iterations: u64,
    pub elapsed: Duration,
    pub found_this_run: usize,
    pub total_found: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionReason {
    /// A continuous search found its maximum number of events.
    EventLimit,
    /// The maximum simulated span was scanned.
    SpanLimit,
}

/// Result of one [`SearchEngine::tick`].
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No running search.
    Inactive,
    /// A pending stop took effect.
    Stopped,
    /// The batch ran out without a hit; the scan now stands at `date`.
    Advanced { date: MJD },
    /// An event was found and recorded. Check [`SearchState::phase`] for what follows.
    Found(FoundEvent),
    Completed(CompletionReason),
}

/// Search state, owned by a single controller.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    phase: SearchPhase,
    request: Option<SearchRequest>,
    config: SearchConfig,
    origin: MJD,
    cursor: MJD,
    iterations: u64,
    elapsed: Duration,
    found: Vec<FoundEvent>,
    next_id: u64,
    found_this_run: usize,
    guard: Option<WindowGuard>,
    stop_requested: bool,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    /// Searching, calculating or paused.
    pub fn is_active(&self) -> bool {
        matches!(
            self.phase,
            SearchPhase::Searching | SearchPhase::Calculating | SearchPhase::Paused
        )
    }

    /// Searching or calculating.
    pub fn is_running(&self) -> bool {
        matches!(self.phase, SearchPhase::Searching | SearchPhase::Calculating)
    }

    pub fn request(&self) -> Option<&SearchRequest> {
        self.request.as_ref()
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Next date to be evaluated (or the optimal date of the last event once a single search
    /// has finished).
    pub fn cursor(&self) -> MJD {
        self.cursor
    }

    pub fn origin(&self) -> MJD {
        self.origin
    }

    /// Every event found since this state was created, oldest first.
    pub fn found(&self) -> &[FoundEvent] {
        &self.found
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }

    /// Account wall-clock time spent on the running search.
    pub fn add_elapsed(&mut self, dt: Duration) {
        if self.is_running() {
            self.elapsed += dt;
        }
    }

    /// Ask the running search to stop at the next tick boundary. A paused search stops at once.
    pub fn request_stop(&mut self) -> Result<(), OrreryError> {
        match self.phase {
            SearchPhase::Searching | SearchPhase::Calculating => {
                self.stop_requested = true;
                Ok(())
            }
            SearchPhase::Paused => {
                self.phase = SearchPhase::Idle;
                info!(
                    iterations = self.iterations,
                    found = self.found_this_run,
                    "paused event search stopped"
                );
                Ok(())
            }
            SearchPhase::Idle | SearchPhase::Completed => Err(OrreryError::NoActiveSearch),
        }
    }

    pub fn pause(&mut self) -> Result<(), OrreryError> {
        if !self.is_running() {
            return Err(OrreryError::NoActiveSearch);
        }
        self.phase = SearchPhase::Paused;
        debug!(cursor = self.cursor, "event search paused");
        Ok(())
    }

    /// Resume a paused search in the mode it was running in, keeping its statistics.
    pub fn resume(&mut self) -> Result<(), OrreryError> {
        match (self.phase, &self.request) {
            (SearchPhase::Paused, Some(request)) => {
                self.phase = Self::running_phase(request.mode);
                debug!(cursor = self.cursor, "event search resumed");
                Ok(())
            }
            _ => Err(OrreryError::NoActiveSearch),
        }
    }

    /// Switch an active search between searching speeds and calculating.
    pub fn set_mode(&mut self, mode: SearchMode) -> Result<(), OrreryError> {
        if !self.is_active() {
            return Err(OrreryError::NoActiveSearch);
        }
        let Some(request) = self.request.as_mut() else {
            return Err(OrreryError::NoActiveSearch);
        };
        request.mode = mode;
        if self.phase != SearchPhase::Paused {
            self.phase = Self::running_phase(mode);
        }
        Ok(())
    }

    /// Forget found events. Ids keep increasing.
    pub fn clear_history(&mut self) {
        self.found.clear();
        self.guard = None;
    }

    pub fn progress(&self, params: &SearchParams) -> SearchProgress {
        let scanned_days = (self.cursor - self.origin).abs();
        SearchProgress {
            phase: self.phase,
            cursor: self.cursor,
            scanned_days,
            span_fraction: (scanned_days / params.max_search_span_days).clamp(0.0, 1.0),
            iterations: self.iterations,
            elapsed: self.elapsed,
            found_this_run: self.found_this_run,
            total_found: self.found.len(),
        }
    }

    fn running_phase(mode: SearchMode) -> SearchPhase {
        match mode {
            SearchMode::Searching(_) => SearchPhase::Searching,
            SearchMode::Calculating => SearchPhase::Calculating,
        }
    }

    /// Append a found event and move the scan according to the request.
    fn record(
        &mut self,
        request: &SearchRequest,
        window: EventWindow,
        optimal: MJD,
        min_angle: Degree,
        resume: MJD,
        params: &SearchParams,
    ) -> FoundEvent {
        self.next_id += 1;
        let event = FoundEvent {
            id: self.next_id,
            kind: request.kind,
            target_ids: request.targets.clone(),
            start: window.start,
            end: window.end,
            optimal,
            min_angle,
        };
        self.found.push(event.clone());
        self.found_this_run += 1;
        self.guard = Some(WindowGuard {
            kind: request.kind,
            targets: request.targets.clone(),
            window,
        });
        debug!(%event, "event found");

        if request.continuous {
            self.cursor = resume;
            if self.found_this_run >= params.max_continuous_events {
                self.phase = SearchPhase::Completed;
                info!(
                    found = self.found_this_run,
                    iterations = self.iterations,
                    "continuous event search completed"
                );
            }
        } else {
            self.cursor = optimal;
            self.phase = SearchPhase::Idle;
            info!(iterations = self.iterations, "event search finished");
        }

        event
    }
}

/// Drives [`SearchState`] with a fixed set of [`SearchParams`].
#[derive(Debug, Clone, Default)]
pub struct SearchEngine {
    params: SearchParams,
}

impl SearchEngine {
    pub fn new(params: SearchParams) -> Self {
        SearchEngine { params }
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// Start a search at `date`.
    ///
    /// Arguments
    /// ---------
    /// * `state`: must not hold an active search.
    /// * `provider`: used to check that every target can be positioned.
    /// * `request`: kind, targets, mode, continuous flag and direction.
    /// * `config`: detection settings, captured by value.
    /// * `date`: first date evaluated.
    ///
    /// Return
    /// ------
    /// * `Err(SearchAlreadyActive)` if a search is running or paused,
    ///   `Err(InvalidSearchTargets)` / `Err(UnknownBody)` for bad targets,
    ///   `Err(InvalidSearchParams)` for a bad config.
    pub fn start<P: PositionProvider + ?Sized>(
        &self,
        state: &mut SearchState,
        provider: &P,
        mut request: SearchRequest,
        config: SearchConfig,
        date: MJD,
    ) -> Result<(), OrreryError> {
        if state.is_active() {
            return Err(OrreryError::SearchAlreadyActive);
        }
        if !date.is_finite() {
            return Err(OrreryError::InvalidDate(format!("{date}")));
        }
        config.validate()?;
        Self::validate_targets(provider, &mut request, &config, date)?;

        info!(
            kind = %request.kind,
            targets = ?request.targets,
            mode = ?request.mode,
            continuous = request.continuous,
            direction = ?request.direction,
            date,
            "event search started"
        );

        state.phase = SearchState::running_phase(request.mode);
        state.request = Some(request);
        state.config = config;
        state.origin = date;
        state.cursor = date;
        state.iterations = 0;
        state.elapsed = Duration::ZERO;
        state.found_this_run = 0;
        state.stop_requested = false;
        Ok(())
    }

    /// Sort the targets and check they can be searched for.
    fn validate_targets<P: PositionProvider + ?Sized>(
        provider: &P,
        request: &mut SearchRequest,
        config: &SearchConfig,
        date: MJD,
    ) -> Result<(), OrreryError> {
        request.targets.sort();

        if request.targets.is_empty() {
            return Err(OrreryError::InvalidSearchTargets(
                "at least one target is required".into(),
            ));
        }
        if request.kind == EventKind::Alignment && request.targets.len() < 2 {
            return Err(OrreryError::InvalidSearchTargets(
                "an alignment needs at least two targets".into(),
            ));
        }
        if let Some((dup, _)) = request.targets.iter().tuple_windows().find(|(a, b)| a == b) {
            return Err(OrreryError::InvalidSearchTargets(format!(
                "{dup} is listed twice"
            )));
        }
        if let Some(t) = request
            .targets
            .iter()
            .find(|t| *t == OBSERVER_ID || *t == STAR_ID)
        {
            return Err(OrreryError::InvalidSearchTargets(format!(
                "{t} cannot be a target"
            )));
        }

        let needed = [OBSERVER_ID, STAR_ID]
            .into_iter()
            .chain(request.targets.iter().map(String::as_str));
        for id in needed {
            if provider.position(id, date, config.precision).is_none() {
                return Err(OrreryError::UnknownBody(id.to_string()));
            }
        }
        Ok(())
    }

    /// Run one bounded batch of the current search.
    ///
    /// The batch is `steps_per_tick(speed)` evaluations while searching and `calc_batch_size`
    /// while calculating. A pending stop takes effect before any evaluation.
    pub fn tick<P: PositionProvider + ?Sized>(
        &self,
        state: &mut SearchState,
        provider: &P,
    ) -> TickOutcome {
        if !state.is_running() {
            return TickOutcome::Inactive;
        }
        if state.stop_requested {
            state.stop_requested = false;
            state.phase = SearchPhase::Idle;
            info!(
                iterations = state.iterations,
                found = state.found_this_run,
                "event search stopped"
            );
            return TickOutcome::Stopped;
        }
        let Some(request) = state.request.clone() else {
            state.phase = SearchPhase::Idle;
            return TickOutcome::Inactive;
        };

        let budget = match request.mode {
            SearchMode::Searching(speed) => self.params.steps_per_tick(speed),
            SearchMode::Calculating => self.params.calc_batch_size,
        };
        let step = self.params.step_days * request.direction.sign();
        let config = state.config;
        let holds = |t: MJD| event_holds(provider, request.kind, t, &request.targets, &config);

        for _ in 0..budget {
            let date = state.cursor;
            if (date - state.origin).abs() > self.params.max_search_span_days {
                state.phase = SearchPhase::Completed;
                warn!(
                    origin = state.origin,
                    date,
                    max_span = self.params.max_search_span_days,
                    found = state.found_this_run,
                    "event search reached its span cap"
                );
                return TickOutcome::Completed(CompletionReason::SpanLimit);
            }

            if let Some(exit) = state
                .guard
                .as_ref()
                .and_then(|g| g.exit(&request, date, step))
            {
                state.cursor = exit;
                continue;
            }

            state.iterations += 1;
            if holds(date) {
                let (window, optimal, min_angle) =
                    self.refine(provider, &request, &config, date, &holds);
                let resume = step_past(&window, date, step);
                let event =
                    state.record(&request, window, optimal, min_angle, resume, &self.params);
                return TickOutcome::Found(event);
            }
            state.cursor = date + step;
        }

        TickOutcome::Advanced { date: state.cursor }
    }

    /// Window, optimal date and metric of a hit.
    ///
    /// The optimizer's date is kept only when the predicate also holds there; otherwise the hit
    /// date itself is reported, so the recorded optimal date always satisfies the predicate.
    fn refine<P, F>(
        &self,
        provider: &P,
        request: &SearchRequest,
        config: &SearchConfig,
        hit: MJD,
        holds: &F,
    ) -> (EventWindow, MJD, Degree)
    where
        P: PositionProvider + ?Sized,
        F: Fn(MJD) -> bool,
    {
        let metric =
            |t: MJD| event_metric(provider, request.kind, t, &request.targets, config.precision);

        let window = calculate_event_duration(
            holds,
            hit,
            self.params.step_days,
            self.params.max_window_days,
            self.params.edge_bisections,
        );
        let best = find_optimal_event_time(
            &metric,
            &window,
            self.params.coarse_samples,
            self.params.ternary_iterations,
        );

        if best.metric.is_finite() && holds(best.date) {
            (window, best.date, best.metric)
        } else {
            (window, hit, metric(hit))
        }
    }
}
