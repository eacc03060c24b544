//! Stopwatch engine.
//!
//! Accumulates clock deltas while running and keeps an ordered lap ledger.
//! Like the countdown, it never assumes a tick interval: each tick adds
//! exactly the time that passed since the previous reading.

use std::fmt;
use std::rc::Rc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::lap::Lap;
use crate::clock::{elapsed_between, Clock};
use crate::error::EngineError;
use crate::events::Event;
use crate::phase::Phase;
use crate::scheduler::{Scheduler, TickHandle};

/// Persistable stopwatch state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopwatchState {
    pub elapsed_ms: u64,
    pub running: bool,
    #[serde(default)]
    pub laps: Vec<Lap>,
    #[serde(default)]
    pub last_tick_ms: Option<u64>,
}

impl StopwatchState {
    pub fn phase(&self) -> Phase {
        if self.running {
            Phase::Running
        } else if self.elapsed_ms > 0 || !self.laps.is_empty() {
            Phase::Paused
        } else {
            Phase::Idle
        }
    }
}

pub struct StopwatchEngine {
    state: StopwatchState,
    clock: Rc<dyn Clock>,
    scheduler: Box<dyn Scheduler>,
    pending: Option<TickHandle>,
}

impl fmt::Debug for StopwatchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopwatchEngine")
            .field("state", &self.state)
            .field("pending", &self.pending)
            .finish()
    }
}

impl StopwatchEngine {
    pub fn new(clock: Rc<dyn Clock>, scheduler: Box<dyn Scheduler>) -> Self {
        Self {
            state: StopwatchState::default(),
            clock,
            scheduler,
            pending: None,
        }
    }

    /// Rebuild from saved state, re-arming the tick if it was running.
    pub fn restore(mut state: StopwatchState, clock: Rc<dyn Clock>, scheduler: Box<dyn Scheduler>) -> Self {
        if state.running && state.last_tick_ms.is_none() {
            state.last_tick_ms = Some(clock.now_ms());
        }
        let mut engine = Self {
            state,
            clock,
            scheduler,
            pending: None,
        };
        if engine.state.running {
            engine.schedule_next();
        }
        engine
    }

    pub fn state(&self) -> &StopwatchState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.state.elapsed_ms
    }

    pub fn laps(&self) -> &[Lap] {
        &self.state.laps
    }

    pub fn has_pending_tick(&self) -> bool {
        self.pending.is_some()
    }

    /// Lap with the shortest split. Ties go to the earliest lap.
    pub fn fastest_lap(&self) -> Option<&Lap> {
        self.state
            .laps
            .iter()
            .min_by_key(|lap| (lap.split_since_last, lap.index))
    }

    /// Lap with the longest split. Ties go to the earliest lap.
    pub fn slowest_lap(&self) -> Option<&Lap> {
        self.state
            .laps
            .iter()
            .max_by_key(|lap| (lap.split_since_last, std::cmp::Reverse(lap.index)))
    }

    /// Clear everything and start counting from zero.
    pub fn start(&mut self) -> Event {
        self.state.elapsed_ms = 0;
        self.state.laps.clear();
        self.state.running = true;
        self.state.last_tick_ms = Some(self.clock.now_ms());
        self.schedule_next();
        tracing::debug!("stopwatch started");
        Event::StopwatchStarted { at: Utc::now() }
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.state.running {
            return None;
        }
        self.state.running = false;
        self.cancel_pending();
        tracing::debug!(elapsed_ms = self.state.elapsed_ms, "stopwatch paused");
        Some(Event::StopwatchPaused {
            elapsed_ms: self.state.elapsed_ms,
            at: Utc::now(),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        if self.state.running {
            return None;
        }
        self.state.running = true;
        self.state.last_tick_ms = Some(self.clock.now_ms());
        self.schedule_next();
        tracing::debug!(elapsed_ms = self.state.elapsed_ms, "stopwatch resumed");
        Some(Event::StopwatchResumed {
            elapsed_ms: self.state.elapsed_ms,
            at: Utc::now(),
        })
    }

    pub fn reset(&mut self) -> Event {
        self.pause();
        self.state.elapsed_ms = 0;
        self.state.laps.clear();
        self.state.last_tick_ms = None;
        Event::StopwatchReset { at: Utc::now() }
    }

    /// Record a lap at the current reading.
    ///
    /// # Errors
    /// `InvalidTransition` unless running.
    pub fn lap(&mut self) -> Result<Event, EngineError> {
        if !self.state.running {
            return Err(EngineError::InvalidTransition {
                operation: "lap",
                phase: self.phase(),
            });
        }
        let lap = Lap::following(&self.state.laps, self.state.elapsed_ms);
        self.state.laps.push(lap);
        tracing::debug!(
            index = lap.index,
            total_at_lap = lap.total_at_lap,
            split_since_last = lap.split_since_last,
            "lap recorded"
        );
        Ok(Event::LapRecorded {
            lap,
            at: Utc::now(),
        })
    }

    /// Accumulate the clock delta since the previous tick.
    pub fn tick(&mut self, now_ms: u64) {
        if !self.state.running {
            return;
        }
        if let Some(handle) = self.pending.take() {
            self.scheduler.consume_tick(handle);
        }
        let last = self.state.last_tick_ms.unwrap_or(now_ms);
        let delta = elapsed_between(last, now_ms);
        self.state.last_tick_ms = Some(now_ms);
        self.state.elapsed_ms = self.state.elapsed_ms.saturating_add(delta.ms);
        self.schedule_next();
    }

    pub fn tick_now(&mut self) {
        let now = self.clock.now_ms();
        self.tick(now);
    }

    /// Release the outstanding tick request and hand back the state.
    pub fn dispose(mut self) -> StopwatchState {
        self.cancel_pending();
        self.state
    }

    fn schedule_next(&mut self) {
        self.cancel_pending();
        self.pending = Some(self.scheduler.request_tick());
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_tick(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::scheduler::PollingScheduler;

    fn engine() -> (StopwatchEngine, ManualClock, PollingScheduler) {
        let clock = ManualClock::new(500);
        let sched = PollingScheduler::new();
        let engine = StopwatchEngine::new(Rc::new(clock.clone()), Box::new(sched.clone()));
        (engine, clock, sched)
    }

    #[test]
    fn laps_record_totals_and_splits() {
        let (mut sw, clock, _sched) = engine();
        sw.start();
        clock.advance(1_500);
        sw.tick(clock.now_ms());
        sw.lap().unwrap();
        assert_eq!(
            sw.laps()[0],
            Lap {
                index: 0,
                total_at_lap: 1_500,
                split_since_last: 1_500
            }
        );

        clock.advance(1_000);
        sw.tick(clock.now_ms());
        sw.lap().unwrap();
        assert_eq!(
            sw.laps()[1],
            Lap {
                index: 1,
                total_at_lap: 2_500,
                split_since_last: 1_000
            }
        );
    }

    #[test]
    fn lap_while_paused_is_rejected() {
        let (mut sw, clock, _sched) = engine();
        sw.start();
        clock.advance(100);
        sw.tick(clock.now_ms());
        sw.pause();
        let err = sw.lap().unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidTransition {
                operation: "lap",
                phase: Phase::Paused
            }
        );
        assert!(sw.laps().is_empty());
    }

    #[test]
    fn start_clears_previous_session() {
        let (mut sw, clock, sched) = engine();
        sw.start();
        clock.advance(700);
        sw.tick(clock.now_ms());
        sw.lap().unwrap();
        sw.start();
        assert_eq!(sw.elapsed_ms(), 0);
        assert!(sw.laps().is_empty());
        assert_eq!(sched.pending_count(), 1);
    }

    #[test]
    fn paused_time_is_not_accumulated() {
        let (mut sw, clock, sched) = engine();
        sw.start();
        clock.advance(200);
        sw.tick(clock.now_ms());
        sw.pause();
        assert!(!sched.has_pending());
        clock.advance(10_000);
        sw.tick(clock.now_ms());
        assert_eq!(sw.elapsed_ms(), 200);

        sw.resume();
        clock.advance(300);
        sw.tick(clock.now_ms());
        assert_eq!(sw.elapsed_ms(), 500);
    }

    #[test]
    fn pause_and_resume_are_idempotent() {
        let (mut sw, _clock, sched) = engine();
        sw.start();
        assert!(sw.resume().is_none());
        assert_eq!(sched.requested_count(), 1);
        assert!(sw.pause().is_some());
        let once = sw.state().clone();
        assert!(sw.pause().is_none());
        assert_eq!(sw.state(), &once);
    }

    #[test]
    fn clock_regression_adds_nothing() {
        let (mut sw, clock, _sched) = engine();
        sw.start();
        clock.advance(1_000);
        sw.tick(clock.now_ms());
        clock.rewind(50);
        sw.tick(clock.now_ms());
        assert_eq!(sw.elapsed_ms(), 1_000);
    }

    #[test]
    fn reset_returns_to_idle() {
        let (mut sw, clock, sched) = engine();
        sw.start();
        clock.advance(1_000);
        sw.tick(clock.now_ms());
        sw.lap().unwrap();
        sw.reset();
        assert_eq!(sw.phase(), Phase::Idle);
        assert_eq!(sw.elapsed_ms(), 0);
        assert!(sw.laps().is_empty());
        assert!(!sched.has_pending());
    }

    #[test]
    fn fastest_and_slowest_laps() {
        let (mut sw, clock, _sched) = engine();
        sw.start();
        for split in [900, 400, 1_200, 400] {
            clock.advance(split);
            sw.tick(clock.now_ms());
            sw.lap().unwrap();
        }
        assert_eq!(sw.fastest_lap().map(|l| l.index), Some(1));
        assert_eq!(sw.slowest_lap().map(|l| l.index), Some(2));
    }

    #[test]
    fn restore_rearms_running_stopwatch() {
        let (mut sw, clock, _sched) = engine();
        sw.start();
        clock.advance(250);
        sw.tick(clock.now_ms());
        let saved = sw.dispose();

        let sched = PollingScheduler::new();
        let mut restored = StopwatchEngine::restore(saved, Rc::new(clock.clone()), Box::new(sched.clone()));
        assert!(sched.has_pending());
        clock.advance(750);
        restored.tick(clock.now_ms());
        assert_eq!(restored.elapsed_ms(), 1_000);
    }
}
