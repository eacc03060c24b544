use clap::Subcommand;
use tickwatch_core::Mode;

use super::require_mode;
use crate::app::Session;

#[derive(Subcommand)]
pub enum StopwatchAction {
    /// Start from zero
    Start,
    /// Pause the stopwatch
    Pause,
    /// Resume counting
    Resume,
    /// Pause if running, resume otherwise
    Toggle,
    /// Clear elapsed time and laps
    Reset,
    /// Record a lap
    Lap,
    /// Print stopwatch state as JSON
    Status,
}

pub fn run(action: StopwatchAction) -> Result<(), Box<dyn std::error::Error>> {
    Session::with(|session| apply(session, action))
}

fn apply(session: &mut Session, action: StopwatchAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        StopwatchAction::Start => {
            require_mode(session, Mode::Stopwatch)?;
            session.record_stopwatch_session();
            let event = session.controller.start_stopwatch()?;
            session.print_event(&event)?;
        }
        StopwatchAction::Pause => {
            require_mode(session, Mode::Stopwatch)?;
            let event = session.controller.pause();
            session.print_outcome(event.as_ref())?;
        }
        StopwatchAction::Resume => {
            require_mode(session, Mode::Stopwatch)?;
            let event = session.controller.resume()?;
            session.print_outcome(event.as_ref())?;
        }
        StopwatchAction::Toggle => {
            require_mode(session, Mode::Stopwatch)?;
            let event = session.controller.toggle()?;
            session.print_outcome(event.as_ref())?;
        }
        StopwatchAction::Reset => {
            require_mode(session, Mode::Stopwatch)?;
            session.record_stopwatch_session();
            let event = session.controller.reset();
            session.print_event(&event)?;
        }
        StopwatchAction::Lap => {
            let event = session.controller.lap()?;
            session.print_event(&event)?;
        }
        StopwatchAction::Status => {
            println!(
                "{}",
                serde_json::to_string_pretty(&session.controller.snapshot().stopwatch)?
            );
        }
    }
    Ok(())
}
