use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::mode::Mode;
use crate::stopwatch::Lap;

/// Every state change in an engine produces an Event.
///
/// Timer events carry the `run_id` of the countdown they belong to. Each
/// `start` opens a new run, so a consumer still busy with an older run's
/// `TimerFinished` can tell it apart from the current one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        run_id: Uuid,
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        run_id: Uuid,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        run_id: Uuid,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        run_id: Uuid,
        total_ms: u64,
        at: DateTime<Utc>,
    },
    /// Countdown reached zero. Fired once per run.
    TimerFinished(TimerFinished),
    StopwatchStarted {
        at: DateTime<Utc>,
    },
    StopwatchPaused {
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    StopwatchResumed {
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    StopwatchReset {
        at: DateTime<Utc>,
    },
    LapRecorded {
        lap: Lap,
        at: DateTime<Utc>,
    },
    ModeSwitched {
        from: Mode,
        to: Mode,
        at: DateTime<Utc>,
    },
}

/// Payload of [`Event::TimerFinished`], handed to finish notifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerFinished {
    pub run_id: Uuid,
    /// The countdown's full duration.
    pub duration_ms: u64,
    pub at: DateTime<Utc>,
}

impl Event {
    /// Stable snake_case name, used for logs and CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::TimerStarted { .. } => "timer_started",
            Event::TimerPaused { .. } => "timer_paused",
            Event::TimerResumed { .. } => "timer_resumed",
            Event::TimerReset { .. } => "timer_reset",
            Event::TimerFinished(_) => "timer_finished",
            Event::StopwatchStarted { .. } => "stopwatch_started",
            Event::StopwatchPaused { .. } => "stopwatch_paused",
            Event::StopwatchResumed { .. } => "stopwatch_resumed",
            Event::StopwatchReset { .. } => "stopwatch_reset",
            Event::LapRecorded { .. } => "lap_recorded",
            Event::ModeSwitched { .. } => "mode_switched",
        }
    }

    pub fn as_finished(&self) -> Option<&TimerFinished> {
        match self {
            Event::TimerFinished(finished) => Some(finished),
            _ => None,
        }
    }
}
