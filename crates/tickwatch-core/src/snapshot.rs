//! Read-only views handed to presentation.

use serde::{Deserialize, Serialize};

use crate::mode::Mode;
use crate::phase::Phase;
use crate::stopwatch::{Lap, StopwatchEngine};
use crate::timer::TimerEngine;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub mode: Mode,
    pub timer: TimerSnapshot,
    pub stopwatch: StopwatchSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub total_ms: u64,
    pub remaining_ms: u64,
    pub running: bool,
    pub phase: Phase,
    /// 0.0 .. 1.0 of the countdown consumed.
    pub progress: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopwatchSnapshot {
    pub elapsed_ms: u64,
    pub running: bool,
    pub phase: Phase,
    pub laps: Vec<Lap>,
}

impl From<&TimerEngine> for TimerSnapshot {
    fn from(engine: &TimerEngine) -> Self {
        Self {
            total_ms: engine.total_ms(),
            remaining_ms: engine.remaining_ms(),
            running: engine.is_running(),
            phase: engine.phase(),
            progress: engine.progress(),
        }
    }
}

impl From<&StopwatchEngine> for StopwatchSnapshot {
    fn from(engine: &StopwatchEngine) -> Self {
        Self {
            elapsed_ms: engine.elapsed_ms(),
            running: engine.is_running(),
            phase: engine.phase(),
            laps: engine.laps().to_vec(),
        }
    }
}
