pub mod config;
pub mod history;
pub mod mode;
pub mod run;
pub mod status;
pub mod stopwatch;
pub mod timer;

use tickwatch_core::{EngineError, Mode};

use crate::app::Session;

/// Fail unless `mode` is the live engine, so a `timer` subcommand never
/// pauses or resets the stopwatch.
fn require_mode(session: &Session, mode: Mode) -> Result<(), EngineError> {
    if session.controller.mode() == mode {
        Ok(())
    } else {
        Err(EngineError::InactiveMode { mode })
    }
}
