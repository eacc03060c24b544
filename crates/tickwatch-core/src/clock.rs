//! Clock sources.
//!
//! Engines never read the host time directly; they go through a [`Clock`] so
//! tests can drive time by hand. Readings are plain milliseconds.
//!
//! A clock is expected to be non-decreasing, but callers must not rely on it:
//! [`elapsed_between`] folds any regression into a zero delta.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Source of millisecond timestamps.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Elapsed time between two readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delta {
    pub ms: u64,
    /// `now` was earlier than `previous`; `ms` was clamped to zero.
    pub regressed: bool,
}

/// `now - previous`, or zero if the clock went backwards.
pub fn elapsed_between(previous: u64, now: u64) -> Delta {
    match now.checked_sub(previous) {
        Some(ms) => Delta { ms, regressed: false },
        None => {
            tracing::warn!(previous, now, "clock regression; treating as zero elapsed");
            Delta { ms: 0, regressed: true }
        }
    }
}

/// Wall clock in milliseconds since the Unix epoch.
///
/// Survives process restarts, which is what the CLI needs when it persists
/// `last_tick_ms` between invocations.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Monotonic clock counting milliseconds since construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Hand-driven clock for tests and simulations.
///
/// Clones share the same reading, so a test can keep one handle and give
/// another to the engine.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get().saturating_add(ms));
    }

    /// Move the reading backwards to simulate host clock skew.
    pub fn rewind(&self, ms: u64) {
        self.now.set(self.now.get().saturating_sub(ms));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}
