mod engine;
mod lap;

pub use engine::{StopwatchEngine, StopwatchState};
pub use lap::Lap;
