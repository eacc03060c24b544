mod controller;

use serde::{Deserialize, Serialize};

pub use controller::{ControllerState, ModeController};

/// Which engine is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Timer,
    Stopwatch,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Timer => f.write_str("timer"),
            Mode::Stopwatch => f.write_str("stopwatch"),
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "timer" | "countdown" => Ok(Mode::Timer),
            "stopwatch" | "sw" => Ok(Mode::Stopwatch),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}
