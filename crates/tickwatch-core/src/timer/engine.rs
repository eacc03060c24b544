//! Countdown engine.
//!
//! The engine is a delta-driven state machine. It does not use internal
//! threads: it asks its scheduler for a tick and the driver calls `tick(now)`
//! while a request is outstanding. Progress is computed from the elapsed clock
//! delta, never from a fixed step, so an irregular call cadence cannot make
//! the countdown drift.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Paused | Finished)
//! Paused -> Running
//! Finished -> Idle (reset / start)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(300_000, clock, scheduler);
//! engine.start(300_000)?;
//! // While the scheduler has a pending tick:
//! engine.tick(clock.now_ms()); // Some(Event::TimerFinished(..)) once at zero
//! ```

use std::fmt;
use std::rc::Rc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::{elapsed_between, Clock};
use crate::duration::{self, MAX_DURATION_MS};
use crate::error::EngineError;
use crate::events::{Event, TimerFinished};
use crate::phase::Phase;
use crate::scheduler::{Scheduler, TickHandle};

/// Persistable countdown state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub total_ms: u64,
    /// Always `<= total_ms`.
    pub remaining_ms: u64,
    pub running: bool,
    /// Set when this run reached zero; cleared by `start` and `reset`.
    pub finished_once: bool,
    /// Clock reading at the last tick, start or resume.
    #[serde(default)]
    pub last_tick_ms: Option<u64>,
    pub run_id: Uuid,
}

impl TimerState {
    pub fn new(total_ms: u64) -> Self {
        let total_ms = total_ms.min(MAX_DURATION_MS);
        Self {
            total_ms,
            remaining_ms: total_ms,
            running: false,
            finished_once: false,
            last_tick_ms: None,
            run_id: Uuid::new_v4(),
        }
    }

    /// Derived phase.
    ///
    /// A countdown paused before any time elapsed reads as `Idle`.
    pub fn phase(&self) -> Phase {
        if self.running {
            Phase::Running
        } else if self.finished_once {
            Phase::Finished
        } else if self.remaining_ms < self.total_ms {
            Phase::Paused
        } else {
            Phase::Idle
        }
    }
}

/// Core countdown engine.
pub struct TimerEngine {
    state: TimerState,
    clock: Rc<dyn Clock>,
    scheduler: Box<dyn Scheduler>,
    pending: Option<TickHandle>,
}

impl fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerEngine")
            .field("state", &self.state)
            .field("pending", &self.pending)
            .finish()
    }
}

impl TimerEngine {
    /// Create an idle engine holding `total_ms` (clamped to the duration bound).
    pub fn new(total_ms: u64, clock: Rc<dyn Clock>, scheduler: Box<dyn Scheduler>) -> Self {
        Self {
            state: TimerState::new(total_ms),
            clock,
            scheduler,
            pending: None,
        }
    }

    /// Rebuild an engine from saved state.
    ///
    /// A running countdown gets a fresh tick request; time that passed while
    /// it was stored is picked up by the next tick.
    pub fn restore(mut state: TimerState, clock: Rc<dyn Clock>, scheduler: Box<dyn Scheduler>) -> Self {
        state.total_ms = state.total_ms.min(MAX_DURATION_MS);
        state.remaining_ms = state.remaining_ms.min(state.total_ms);
        if state.running && state.remaining_ms == 0 {
            state.running = false;
        }
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

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn total_ms(&self) -> u64 {
        self.state.total_ms
    }

    pub fn remaining_ms(&self) -> u64 {
        self.state.remaining_ms
    }

    pub fn run_id(&self) -> Uuid {
        self.state.run_id
    }

    pub fn has_pending_tick(&self) -> bool {
        self.pending.is_some()
    }

    /// 0.0 .. 1.0 of the countdown consumed.
    pub fn progress(&self) -> f64 {
        let total = self.state.total_ms;
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.state.remaining_ms as f64 / total as f64)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a fresh run of `duration_ms`.
    ///
    /// # Errors
    /// `InvalidDuration` if the duration is zero or above the bound; the
    /// engine is left untouched.
    pub fn start(&mut self, duration_ms: u64) -> Result<Event, EngineError> {
        if !duration::is_valid(duration_ms) {
            tracing::debug!(duration_ms, "timer start rejected");
            return Err(EngineError::InvalidDuration { duration_ms });
        }
        self.state.total_ms = duration_ms;
        self.state.remaining_ms = duration_ms;
        self.state.running = true;
        self.state.finished_once = false;
        self.state.run_id = Uuid::new_v4();
        self.state.last_tick_ms = Some(self.clock.now_ms());
        self.schedule_next();
        tracing::debug!(duration_ms, run_id = %self.state.run_id, "timer started");
        Ok(Event::TimerStarted {
            run_id: self.state.run_id,
            duration_ms,
            at: Utc::now(),
        })
    }

    /// Stop counting. Returns `None` if the countdown was not running.
    pub fn pause(&mut self) -> Option<Event> {
        if !self.state.running {
            return None;
        }
        self.state.running = false;
        self.cancel_pending();
        tracing::debug!(remaining_ms = self.state.remaining_ms, "timer paused");
        Some(Event::TimerPaused {
            run_id: self.state.run_id,
            remaining_ms: self.state.remaining_ms,
            at: Utc::now(),
        })
    }

    /// Continue counting from the current remaining time.
    ///
    /// Returns `Ok(None)` if already running.
    ///
    /// # Errors
    /// `InvalidTransition` when nothing is left to count down.
    pub fn resume(&mut self) -> Result<Option<Event>, EngineError> {
        if self.state.running {
            return Ok(None);
        }
        if self.state.remaining_ms == 0 {
            return Err(EngineError::InvalidTransition {
                operation: "resume",
                phase: self.phase(),
            });
        }
        self.state.running = true;
        self.state.last_tick_ms = Some(self.clock.now_ms());
        self.schedule_next();
        tracing::debug!(remaining_ms = self.state.remaining_ms, "timer resumed");
        Ok(Some(Event::TimerResumed {
            run_id: self.state.run_id,
            remaining_ms: self.state.remaining_ms,
            at: Utc::now(),
        }))
    }

    /// Pause if needed and rewind to the full duration.
    ///
    /// Ends the current run: the event carries the old `run_id`, and any
    /// later resume counts down under a fresh one.
    pub fn reset(&mut self) -> Event {
        self.pause();
        let ended = self.state.run_id;
        self.state.remaining_ms = self.state.total_ms;
        self.state.finished_once = false;
        self.state.last_tick_ms = None;
        self.state.run_id = Uuid::new_v4();
        Event::TimerReset {
            run_id: ended,
            total_ms: self.state.total_ms,
            at: Utc::now(),
        }
    }

    /// Replace the configured duration while stopped.
    ///
    /// Zero is accepted here (an empty input); `start` rejects it later.
    ///
    /// # Errors
    /// `InvalidTransition` while running, `InvalidDuration` above the bound.
    pub fn set_duration(&mut self, duration_ms: u64) -> Result<(), EngineError> {
        if self.state.running {
            return Err(EngineError::InvalidTransition {
                operation: "change duration",
                phase: Phase::Running,
            });
        }
        if duration_ms > MAX_DURATION_MS {
            return Err(EngineError::InvalidDuration { duration_ms });
        }
        self.state.total_ms = duration_ms;
        self.state.remaining_ms = duration_ms;
        self.state.finished_once = false;
        self.state.last_tick_ms = None;
        Ok(())
    }

    /// Shift the configured duration by whole seconds (preset buttons).
    ///
    /// # Errors
    /// Same as [`set_duration`](Self::set_duration).
    pub fn adjust_duration(&mut self, delta_secs: i64) -> Result<u64, EngineError> {
        let next = duration::adjust(self.state.total_ms, delta_secs);
        self.set_duration(next)?;
        Ok(next)
    }

    /// Advance by the clock delta since the previous tick.
    ///
    /// Returns `Some(Event::TimerFinished(..))` on the tick that reaches zero,
    /// and never again for the same run.
    pub fn tick(&mut self, now_ms: u64) -> Option<Event> {
        if !self.state.running {
            return None;
        }
        if let Some(handle) = self.pending.take() {
            self.scheduler.consume_tick(handle);
        }

        let last = self.state.last_tick_ms.unwrap_or(now_ms);
        let delta = elapsed_between(last, now_ms);
        self.state.last_tick_ms = Some(now_ms);

        let before = self.state.remaining_ms;
        self.state.remaining_ms = before.saturating_sub(delta.ms);

        if before > 0 && self.state.remaining_ms == 0 && !self.state.finished_once {
            self.state.finished_once = true;
            self.state.running = false;
            tracing::info!(
                duration_ms = self.state.total_ms,
                run_id = %self.state.run_id,
                "timer finished"
            );
            return Some(Event::TimerFinished(TimerFinished {
                run_id: self.state.run_id,
                duration_ms: self.state.total_ms,
                at: Utc::now(),
            }));
        }

        if self.state.running {
            self.schedule_next();
        }
        None
    }

    /// Tick using the engine's own clock.
    pub fn tick_now(&mut self) -> Option<Event> {
        let now = self.clock.now_ms();
        self.tick(now)
    }

    /// Release the outstanding tick request and hand back the state.
    ///
    /// `running` is kept as-is so [`restore`](Self::restore) can pick the
    /// countdown up again.
    pub fn dispose(mut self) -> TimerState {
        self.cancel_pending();
        self.state
    }

    // ── Internal ─────────────────────────────────────────────────────

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
