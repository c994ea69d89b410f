//! # Simulation clock
//!
//! Single owner of the current date and of the event search. The host drives it with two
//! calls:
//!
//! * [`SimulationClock::frame`] once per rendered frame. With no search running the date moves
//!   by `base_days_per_second × speed × direction × dt`. A *searching* search is ticked once
//!   per frame instead, and the date follows its scan so progress stays visible.
//! * [`SimulationClock::poll`] whenever the host is idle. It drains the cooperative
//!   [`TaskQueue`], where a *calculating* search keeps rescheduling its next batch until it
//!   finishes. The visible date is left alone apart from found events and periodic
//!   [`ClockEvent::SearchProgress`] reports.
//!
//! The command surface (`set_date`, `set_speed`, `set_direction`, `start_search`,
//! `stop_search`, `pause_search`, `resume_search`) is the only way to mutate this state.

use std::cmp::Ordering::{Equal, Greater};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::{
    constants::MJD,
    ephemeris::PositionProvider,
    events::{
        search::{
            CompletionReason, SearchConfig, SearchEngine, SearchMode, SearchPhase,
            SearchProgress, SearchRequest, SearchState, TickOutcome,
        },
        FoundEvent,
    },
    orrery_errors::OrreryError,
    simulation::task_queue::TaskQueue,
    time::{format_mjd, TimeDirection},
};

/// Pacing parameters of the clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockParams {
    /// Simulated days per real second at speed 1.
    pub base_days_per_second: f64,
    /// Calculation batches between two progress reports.
    pub status_interval: u64,
    /// Upper bound on batches run by a single [`SimulationClock::poll`].
    pub max_batches_per_poll: usize,
}

impl Default for ClockParams {
    fn default() -> Self {
        ClockParams {
            base_days_per_second: 1.0,
            status_interval: 10,
            max_batches_per_poll: 1,
        }
    }
}

impl ClockParams {
    pub fn builder() -> ClockParamsBuilder {
        ClockParamsBuilder::new()
    }
}

/// Builder for [`ClockParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct ClockParamsBuilder {
    params: ClockParams,
}

impl ClockParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: ClockParams::default(),
        }
    }

    pub fn base_days_per_second(mut self, v: f64) -> Self {
        self.params.base_days_per_second = v;
        self
    }
    pub fn status_interval(mut self, v: u64) -> Self {
        self.params.status_interval = v;
        self
    }
    pub fn max_batches_per_poll(mut self, v: usize) -> Self {
        self.params.max_batches_per_poll = v;
        self
    }

    pub fn build(self) -> Result<ClockParams, OrreryError> {
        let p = &self.params;
        if p.base_days_per_second.partial_cmp(&0.0) != Some(Greater)
            || !p.base_days_per_second.is_finite()
        {
            return Err(OrreryError::InvalidClockParams(
                "base_days_per_second must be finite and > 0".into(),
            ));
        }
        if p.status_interval == 0 {
            return Err(OrreryError::InvalidClockParams(
                "status_interval must be >= 1".into(),
            ));
        }
        if p.max_batches_per_poll == 0 {
            return Err(OrreryError::InvalidClockParams(
                "max_batches_per_poll must be >= 1".into(),
            ));
        }
        Ok(self.params)
    }
}

/// Notifications for the host UI.
#[derive(Debug, Clone, PartialEq)]
pub enum ClockEvent {
    EventFound(FoundEvent),
    SearchProgress(SearchProgress),
    SearchStopped,
    SearchCompleted(CompletionReason),
}

/// Deferred work owned by the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClockTask {
    CalculationBatch,
}

/// Date, speed, direction and search controller.
#[derive(Debug)]
pub struct SimulationClock<P> {
    provider: P,
    engine: SearchEngine,
    params: ClockParams,
    date: MJD,
    speed: f64,
    direction: TimeDirection,
    search: SearchState,
    tasks: TaskQueue<ClockTask>,
    batches: u64,
}

impl<P: PositionProvider> SimulationClock<P> {
    pub fn new(provider: P, engine: SearchEngine, params: ClockParams, date: MJD) -> Self {
        SimulationClock {
            provider,
            engine,
            params,
            date,
            speed: 1.0,
            direction: TimeDirection::Forward,
            search: SearchState::new(),
            tasks: TaskQueue::new(),
            batches: 0,
        }
    }

    pub fn date(&self) -> MJD {
        self.date
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn direction(&self) -> TimeDirection {
        self.direction
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    pub fn params(&self) -> &ClockParams {
        &self.params
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub fn found_events(&self) -> &[FoundEvent] {
        self.search.found()
    }

    pub fn progress(&self) -> SearchProgress {
        self.search.progress(self.engine.params())
    }

    /// Whether [`poll`](Self::poll) has queued work.
    pub fn has_pending_work(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Jump to `date`. Refused while a search is running or paused.
    pub fn set_date(&mut self, date: MJD) -> Result<(), OrreryError> {
        if !date.is_finite() {
            return Err(OrreryError::InvalidDate(format!("{date}")));
        }
        if self.search.is_active() {
            return Err(OrreryError::SearchAlreadyActive);
        }
        self.date = date;
        info!(date = %format_mjd(date), "clock date set");
        Ok(())
    }

    /// Set the speed multiplier (`0` freezes time).
    pub fn set_speed(&mut self, speed: f64) -> Result<(), OrreryError> {
        if !matches!(speed.partial_cmp(&0.0), Some(Greater) | Some(Equal)) || !speed.is_finite() {
            return Err(OrreryError::InvalidClockParams(format!(
                "speed must be finite and >= 0, got {speed}"
            )));
        }
        self.speed = speed;
        info!(speed, "clock speed changed");
        Ok(())
    }

    pub fn set_direction(&mut self, direction: TimeDirection) {
        if self.direction != direction {
            self.direction = direction;
            info!(?direction, "clock direction changed");
        }
    }

    pub fn reverse_direction(&mut self) {
        self.set_direction(self.direction.reversed());
    }

    /// Start a search from the current date, scanning in the clock's current direction.
    pub fn start_search(
        &mut self,
        request: SearchRequest,
        config: SearchConfig,
    ) -> Result<(), OrreryError> {
        let request = request.direction(self.direction);
        self.engine
            .start(&mut self.search, &self.provider, request, config, self.date)?;
        self.batches = 0;
        self.tasks.clear();
        if self.search.phase() == SearchPhase::Calculating {
            self.tasks.schedule(ClockTask::CalculationBatch);
        }
        Ok(())
    }

    /// Ask the search to stop; it takes effect at the next tick boundary.
    pub fn stop_search(&mut self) -> Result<(), OrreryError> {
        self.search.request_stop()
    }

    /// Pause the search, keeping its statistics and found events.
    pub fn pause_search(&mut self) -> Result<(), OrreryError> {
        self.search.pause()?;
        self.tasks.cancel_where(|t| *t == ClockTask::CalculationBatch);
        Ok(())
    }

    /// Resume a paused search where it left off.
    pub fn resume_search(&mut self) -> Result<(), OrreryError> {
        self.search.resume()?;
        self.schedule_batch_if_calculating();
        Ok(())
    }

    /// Switch the active search between searching speeds and calculating.
    pub fn set_search_mode(&mut self, mode: SearchMode) -> Result<(), OrreryError> {
        self.search.set_mode(mode)?;
        match mode {
            SearchMode::Calculating => self.schedule_batch_if_calculating(),
            SearchMode::Searching(_) => {
                self.tasks.cancel_where(|t| *t == ClockTask::CalculationBatch);
            }
        }
        Ok(())
    }

    /// Advance by one rendered frame of `dt` wall-clock time.
    pub fn frame(&mut self, dt: Duration) -> Vec<ClockEvent> {
        match self.search.phase() {
            SearchPhase::Searching => {
                self.search.add_elapsed(dt);
                let outcome = self.engine.tick(&mut self.search, &self.provider);
                if let TickOutcome::Advanced { date } = outcome {
                    self.date = date;
                }
                self.handle(outcome)
            }
            SearchPhase::Calculating | SearchPhase::Paused => Vec::new(),
            SearchPhase::Idle | SearchPhase::Completed => {
                self.date += self.params.base_days_per_second
                    * self.speed
                    * self.direction.sign()
                    * dt.as_secs_f64();
                Vec::new()
            }
        }
    }

    /// Run queued calculation batches, at most `max_batches_per_poll` of them.
    pub fn poll(&mut self) -> Vec<ClockEvent> {
        let mut events = Vec::new();
        for _ in 0..self.params.max_batches_per_poll {
            let Some(task) = self.tasks.next_task() else {
                break;
            };
            match task {
                ClockTask::CalculationBatch => events.extend(self.run_batch()),
            }
        }
        events
    }

    fn run_batch(&mut self) -> Vec<ClockEvent> {
        let started = Instant::now();
        let outcome = self.engine.tick(&mut self.search, &self.provider);
        self.search.add_elapsed(started.elapsed());
        self.batches += 1;

        let mut events = self.handle(outcome);

        if self.search.phase() == SearchPhase::Calculating {
            if self.batches % self.params.status_interval == 0 {
                let progress = self.progress();
                debug!(
                    cursor = %format_mjd(progress.cursor),
                    scanned_days = progress.scanned_days,
                    iterations = progress.iterations,
                    found = progress.found_this_run,
                    "calculation status"
                );
                events.push(ClockEvent::SearchProgress(progress));
            }
            self.tasks.schedule(ClockTask::CalculationBatch);
        }
        events
    }

    fn schedule_batch_if_calculating(&mut self) {
        if self.search.phase() == SearchPhase::Calculating
            && !self
                .tasks
                .contains_where(|t| *t == ClockTask::CalculationBatch)
        {
            self.tasks.schedule(ClockTask::CalculationBatch);
        }
    }

    fn handle(&mut self, outcome: TickOutcome) -> Vec<ClockEvent> {
        match outcome {
            TickOutcome::Inactive | TickOutcome::Advanced { .. } => Vec::new(),
            TickOutcome::Stopped => {
                self.tasks.clear();
                vec![ClockEvent::SearchStopped]
            }
            TickOutcome::Found(event) => {
                self.date = event.optimal;
                let mut events = vec![ClockEvent::EventFound(event)];
                if self.search.phase() == SearchPhase::Completed {
                    events.push(ClockEvent::SearchCompleted(CompletionReason::EventLimit));
                }
                events
            }
            TickOutcome::Completed(reason) => vec![ClockEvent::SearchCompleted(reason)],
        }
    }
}
