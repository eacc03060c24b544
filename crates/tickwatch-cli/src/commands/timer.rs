use clap::Subcommand;
use tickwatch_core::{Event, Mode};

use super::require_mode;
use crate::app::Session;
use crate::display::parse_duration;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a countdown (defaults to the current duration)
    Start {
        /// HH:MM:SS, MM:SS or seconds
        #[arg(value_parser = parse_duration)]
        duration: Option<u64>,
    },
    /// Pause the countdown
    Pause,
    /// Resume a paused countdown
    Resume,
    /// Pause if running, resume otherwise
    Toggle,
    /// Stop and restore the full duration
    Reset,
    /// Change the duration of a stopped countdown
    Set {
        /// HH:MM:SS, MM:SS or seconds
        #[arg(value_parser = parse_duration)]
        duration: u64,
    },
    /// Nudge the duration of a stopped countdown by whole seconds
    Adjust {
        #[arg(allow_hyphen_values = true)]
        seconds: i64,
    },
    /// Print countdown state as JSON
    Status,
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    Session::with(|session| apply(session, action))
}

fn apply(session: &mut Session, action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TimerAction::Start { duration } => {
            require_mode(session, Mode::Timer)?;
            let duration = duration.unwrap_or_else(|| session.controller.timer().total_ms());
            let event = session.controller.start_timer(duration)?;
            session.remember_duration(duration);
            session.print_event(&event)?;
        }
        TimerAction::Pause => {
            require_mode(session, Mode::Timer)?;
            let event = session.controller.pause();
            session.print_outcome(event.as_ref())?;
        }
        TimerAction::Resume => {
            require_mode(session, Mode::Timer)?;
            let event = session.controller.resume()?;
            session.print_outcome(event.as_ref())?;
        }
        TimerAction::Toggle => {
            require_mode(session, Mode::Timer)?;
            let event = session.controller.toggle()?;
            if let Some(Event::TimerStarted { duration_ms, .. }) = &event {
                session.remember_duration(*duration_ms);
            }
            session.print_outcome(event.as_ref())?;
        }
        TimerAction::Reset => {
            require_mode(session, Mode::Timer)?;
            let event = session.controller.reset();
            session.print_event(&event)?;
        }
        TimerAction::Set { duration } => {
            session.controller.set_timer_duration(duration)?;
            if duration > 0 {
                session.remember_duration(duration);
            }
            println!(
                "{}",
                serde_json::to_string_pretty(&session.controller.snapshot().timer)?
            );
        }
        TimerAction::Adjust { seconds } => {
            let duration = session.controller.adjust_timer_duration(seconds)?;
            if duration > 0 {
                session.remember_duration(duration);
            }
            println!(
                "{}",
                serde_json::to_string_pretty(&session.controller.snapshot().timer)?
            );
        }
        TimerAction::Status => {
            println!(
                "{}",
                serde_json::to_string_pretty(&session.controller.snapshot().timer)?
            );
        }
    }
    Ok(())
}
