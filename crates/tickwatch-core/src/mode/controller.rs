//! Mode controller.
//!
//! Owns both engines and decides which one is live. Only the live engine may
//! hold a tick request: switching modes pauses the engine being left, and
//! commands addressed to the inactive engine are refused.

use std::rc::Rc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::Mode;
use crate::clock::Clock;
use crate::error::EngineError;
use crate::events::Event;
use crate::phase::Phase;
use crate::scheduler::Scheduler;
use crate::snapshot::Snapshot;
use crate::stopwatch::{StopwatchEngine, StopwatchState};
use crate::timer::{TimerEngine, TimerState};

/// Everything needed to rebuild a controller later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerState {
    pub mode: Mode,
    pub timer: TimerState,
    pub stopwatch: StopwatchState,
}

impl ControllerState {
    /// Fresh state with the countdown holding `timer_total_ms`.
    pub fn new(timer_total_ms: u64) -> Self {
        Self {
            mode: Mode::Timer,
            timer: TimerState::new(timer_total_ms),
            stopwatch: StopwatchState::default(),
        }
    }
}

#[derive(Debug)]
pub struct ModeController {
    mode: Mode,
    timer: TimerEngine,
    stopwatch: StopwatchEngine,
}

impl ModeController {
    /// Build a controller in timer mode around two idle engines.
    pub fn new(timer: TimerEngine, stopwatch: StopwatchEngine) -> Self {
        let mut controller = Self {
            mode: Mode::Timer,
            timer,
            stopwatch,
        };
        controller.stopwatch.pause();
        controller
    }

    /// Rebuild from saved state, sharing one clock and scheduler.
    ///
    /// If the saved state claims both engines were running, the inactive one
    /// is restored paused.
    pub fn restore<S>(mut state: ControllerState, clock: Rc<dyn Clock>, scheduler: S) -> Self
    where
        S: Scheduler + Clone + 'static,
    {
        match state.mode {
            Mode::Timer => state.stopwatch.running = false,
            Mode::Stopwatch => state.timer.running = false,
        }
        let timer = TimerEngine::restore(state.timer, Rc::clone(&clock), Box::new(scheduler.clone()));
        let stopwatch = StopwatchEngine::restore(state.stopwatch, clock, Box::new(scheduler));
        Self {
            mode: state.mode,
            timer,
            stopwatch,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn timer(&self) -> &TimerEngine {
        &self.timer
    }

    pub fn stopwatch(&self) -> &StopwatchEngine {
        &self.stopwatch
    }

    /// True while the live engine wants another tick.
    pub fn has_pending_tick(&self) -> bool {
        match self.mode {
            Mode::Timer => self.timer.has_pending_tick(),
            Mode::Stopwatch => self.stopwatch.has_pending_tick(),
        }
    }

    pub fn is_running(&self) -> bool {
        match self.mode {
            Mode::Timer => self.timer.is_running(),
            Mode::Stopwatch => self.stopwatch.is_running(),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            mode: self.mode,
            timer: (&self.timer).into(),
            stopwatch: (&self.stopwatch).into(),
        }
    }

    pub fn state(&self) -> ControllerState {
        ControllerState {
            mode: self.mode,
            timer: self.timer.state().clone(),
            stopwatch: self.stopwatch.state().clone(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Make `mode` the live engine.
    ///
    /// The engine being left is paused; the target keeps whatever state it
    /// had and is not started.
    pub fn switch_to(&mut self, mode: Mode) -> Option<Event> {
        if mode == self.mode {
            return None;
        }
        match self.mode {
            Mode::Timer => {
                self.timer.pause();
            }
            Mode::Stopwatch => {
                self.stopwatch.pause();
            }
        }
        let from = self.mode;
        self.mode = mode;
        tracing::debug!(%from, to = %mode, "mode switched");
        Some(Event::ModeSwitched {
            from,
            to: mode,
            at: Utc::now(),
        })
    }

    /// # Errors
    /// `InactiveMode` outside timer mode, otherwise as [`TimerEngine::start`].
    pub fn start_timer(&mut self, duration_ms: u64) -> Result<Event, EngineError> {
        self.require(Mode::Timer)?;
        self.timer.start(duration_ms)
    }

    /// # Errors
    /// `InactiveMode` outside stopwatch mode.
    pub fn start_stopwatch(&mut self) -> Result<Event, EngineError> {
        self.require(Mode::Stopwatch)?;
        Ok(self.stopwatch.start())
    }

    pub fn pause(&mut self) -> Option<Event> {
        match self.mode {
            Mode::Timer => self.timer.pause(),
            Mode::Stopwatch => self.stopwatch.pause(),
        }
    }

    pub fn resume(&mut self) -> Result<Option<Event>, EngineError> {
        match self.mode {
            Mode::Timer => self.timer.resume(),
            Mode::Stopwatch => Ok(self.stopwatch.resume()),
        }
    }

    /// Pause if running, resume otherwise. An idle countdown starts a new
    /// run of its full duration.
    pub fn toggle(&mut self) -> Result<Option<Event>, EngineError> {
        if self.is_running() {
            return Ok(self.pause());
        }
        if self.mode == Mode::Timer && self.timer.phase() == Phase::Idle {
            let total = self.timer.total_ms();
            return self.timer.start(total).map(Some);
        }
        self.resume()
    }

    pub fn reset(&mut self) -> Event {
        match self.mode {
            Mode::Timer => self.timer.reset(),
            Mode::Stopwatch => self.stopwatch.reset(),
        }
    }

    /// # Errors
    /// `InactiveMode` outside stopwatch mode, `InvalidTransition` unless running.
    pub fn lap(&mut self) -> Result<Event, EngineError> {
        self.require(Mode::Stopwatch)?;
        self.stopwatch.lap()
    }

    /// Change the countdown duration. Allowed in either mode while the
    /// countdown is stopped.
    pub fn set_timer_duration(&mut self, duration_ms: u64) -> Result<(), EngineError> {
        self.timer.set_duration(duration_ms)
    }

    pub fn adjust_timer_duration(&mut self, delta_secs: i64) -> Result<u64, EngineError> {
        self.timer.adjust_duration(delta_secs)
    }

    /// Deliver a tick to the live engine.
    pub fn tick(&mut self, now_ms: u64) -> Option<Event> {
        match self.mode {
            Mode::Timer => self.timer.tick(now_ms),
            Mode::Stopwatch => {
                self.stopwatch.tick(now_ms);
                None
            }
        }
    }

    /// Release both engines' tick requests and hand back their state.
    pub fn dispose(self) -> ControllerState {
        ControllerState {
            mode: self.mode,
            timer: self.timer.dispose(),
            stopwatch: self.stopwatch.dispose(),
        }
    }

    fn require(&self, mode: Mode) -> Result<(), EngineError> {
        if self.mode == mode {
            Ok(())
        } else {
            Err(EngineError::InactiveMode { mode })
        }
    }
}
