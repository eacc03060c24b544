//! Finish notification interface.
//!
//! The engine only emits [`TimerFinished`]; what happens next (a beep, a
//! desktop notification, nothing) is up to the consumer. Failures come back
//! as [`NotifyError`] so the caller can decide to log or retry. They never
//! reach engine state.

use thiserror::Error;

use crate::events::{Event, TimerFinished};

#[derive(Error, Debug)]
pub enum NotifyError {
    /// The user or platform has not granted notification permission.
    #[error("Notification permission denied")]
    PermissionDenied,

    /// The output device or notification service is not available.
    #[error("Notification backend unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub trait FinishNotifier {
    fn notify(&mut self, finished: &TimerFinished) -> Result<(), NotifyError>;
}

/// Outcome of fanning one finish out to several notifiers.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failures: Vec<NotifyError>,
}

/// Hand a finish event to every notifier, collecting failures instead of
/// stopping at the first one. Non-finish events are ignored.
pub fn dispatch(event: &Event, notifiers: &mut [Box<dyn FinishNotifier>]) -> DispatchReport {
    let mut report = DispatchReport::default();
    let Some(finished) = event.as_finished() else {
        return report;
    };
    for notifier in notifiers.iter_mut() {
        match notifier.notify(finished) {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                tracing::warn!(error = %e, run_id = %finished.run_id, "finish notifier failed");
                report.failures.push(e);
            }
        }
    }
    report
}

/// Notifier that records what it was given. Useful in tests and as a
/// building block for consumers that want to poll for finishes.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub received: Vec<TimerFinished>,
}

impl FinishNotifier for RecordingNotifier {
    fn notify(&mut self, finished: &TimerFinished) -> Result<(), NotifyError> {
        self.received.push(finished.clone());
        Ok(())
    }
}
