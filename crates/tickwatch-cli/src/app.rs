//! Per-invocation session: load state, catch up, run a command, save.

use std::io::Write;
use std::rc::Rc;

use chrono::{Duration, Utc};
use tickwatch_core::notify::{self, FinishNotifier, NotifyError};
use tickwatch_core::storage::RunKind;
use tickwatch_core::{
    Clock, Config, ControllerState, Database, DurationStore, Event, ModeController,
    PollingScheduler, SystemClock, TimerFinished,
};

use crate::display::format_hms;

/// Rings the terminal bell.
pub struct BellNotifier;

impl FinishNotifier for BellNotifier {
    fn notify(&mut self, _finished: &TimerFinished) -> Result<(), NotifyError> {
        let mut err = std::io::stderr();
        err.write_all(b"\x07")?;
        err.flush()?;
        Ok(())
    }
}

/// Prints a finish message on stderr.
pub struct MessageNotifier;

impl FinishNotifier for MessageNotifier {
    fn notify(&mut self, finished: &TimerFinished) -> Result<(), NotifyError> {
        writeln!(
            std::io::stderr(),
            "Timer finished: {} is up",
            format_hms(finished.duration_ms)
        )?;
        Ok(())
    }
}

pub struct Session {
    pub db: Database,
    pub config: Config,
    pub clock: Rc<SystemClock>,
    pub controller: ModeController,
    notifiers: Vec<Box<dyn FinishNotifier>>,
}

impl Session {
    /// Open storage, restore the controller and catch it up to now.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::load_or_default();
        let db = Database::open()?;

        let state = match db.load_controller_state() {
            Ok(Some(state)) => state,
            Ok(None) => ControllerState::new(initial_duration(&db, &config)),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable saved state");
                db.clear_controller_state()?;
                ControllerState::new(initial_duration(&db, &config))
            }
        };

        let clock = Rc::new(SystemClock);
        let controller = ModeController::restore(state, clock.clone(), PollingScheduler::new());

        let mut notifiers: Vec<Box<dyn FinishNotifier>> = Vec::new();
        if config.alerts.sound {
            notifiers.push(Box::new(BellNotifier));
        }
        if config.alerts.notify {
            notifiers.push(Box::new(MessageNotifier));
        }

        let mut session = Self {
            db,
            config,
            clock,
            controller,
            notifiers,
        };
        if let Some(event) = session.catch_up() {
            // stdout is reserved for the command's own document.
            eprintln!("{}", serde_json::to_string(&event)?);
        }
        Ok(session)
    }

    /// Deliver one tick if the live engine asked for it.
    pub fn catch_up(&mut self) -> Option<Event> {
        if !self.controller.has_pending_tick() {
            return None;
        }
        let now = self.clock.now_ms();
        let event = self.controller.tick(now)?;
        self.handle(&event);
        Some(event)
    }

    /// Side effects of an event: history, alerts.
    ///
    /// Storage and notifier failures are logged, never propagated.
    fn handle(&mut self, event: &Event) {
        let Some(finished) = event.as_finished() else {
            return;
        };
        let started_at = finished.at - Duration::milliseconds(finished.duration_ms as i64);
        if let Err(e) = self.db.record_run(
            RunKind::Timer,
            finished.duration_ms,
            0,
            started_at,
            finished.at,
        ) {
            tracing::warn!(error = %e, "failed to record finished countdown");
        }
        notify::dispatch(event, &mut self.notifiers);
    }

    /// Record the stopwatch session about to be cleared, if it measured anything.
    pub fn record_stopwatch_session(&self) {
        let sw = self.controller.stopwatch();
        if sw.elapsed_ms() == 0 {
            return;
        }
        let now = Utc::now();
        let started_at = now - Duration::milliseconds(sw.elapsed_ms() as i64);
        if let Err(e) = self.db.record_run(
            RunKind::Stopwatch,
            sw.elapsed_ms(),
            sw.laps().len() as u32,
            started_at,
            now,
        ) {
            tracing::warn!(error = %e, "failed to record stopwatch session");
        }
    }

    /// Remember a duration the user chose. Failures only log.
    pub fn remember_duration(&self, duration_ms: u64) {
        if let Err(e) = self.db.save_duration(duration_ms) {
            tracing::warn!(error = %e, duration_ms, "failed to save last duration");
        }
    }

    pub fn print_event(&self, event: &Event) -> Result<(), Box<dyn std::error::Error>> {
        println!("{}", serde_json::to_string_pretty(event)?);
        Ok(())
    }

    /// Print the event if there is one, otherwise the current snapshot.
    pub fn print_outcome(&self, event: Option<&Event>) -> Result<(), Box<dyn std::error::Error>> {
        match event {
            Some(event) => self.print_event(event),
            None => self.print_snapshot(),
        }
    }

    pub fn print_snapshot(&self) -> Result<(), Box<dyn std::error::Error>> {
        println!(
            "{}",
            serde_json::to_string_pretty(&self.controller.snapshot())?
        );
        Ok(())
    }

    /// Release tick requests and persist the controller.
    ///
    /// # Errors
    /// Returns an error if the state cannot be written.
    pub fn close(self) -> Result<(), Box<dyn std::error::Error>> {
        let state = self.controller.dispose();
        self.db.save_controller_state(&state)?;
        Ok(())
    }

    /// Open a session, apply `command` and save, whether or not the command
    /// succeeded. A finish delivered by the catch-up tick is then persisted
    /// even when the command itself is refused.
    pub fn with<F>(command: F) -> Result<(), Box<dyn std::error::Error>>
    where
        F: FnOnce(&mut Session) -> Result<(), Box<dyn std::error::Error>>,
    {
        let mut session = Self::open()?;
        let outcome = command(&mut session);
        session.close()?;
        outcome
    }
}

fn initial_duration(db: &Database, config: &Config) -> u64 {
    match db.load_duration() {
        Ok(Some(ms)) if tickwatch_core::duration::is_valid(ms) => ms,
        Ok(_) => config.timer.default_duration_ms,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unreadable saved duration");
            config.timer.default_duration_ms
        }
    }
}
