//! Integration tests for finish delivery and duration persistence around a
//! controller-driven frame loop.

use std::rc::Rc;

use tickwatch_core::notify::{dispatch, FinishNotifier, NotifyError, RecordingNotifier};
use tickwatch_core::storage::MemoryDurationStore;
use tickwatch_core::{
    Clock, ControllerState, DurationStore, Event, ManualClock, ModeController, PollingScheduler,
    TimerFinished,
};

struct Unplugged;

impl FinishNotifier for Unplugged {
    fn notify(&mut self, _finished: &TimerFinished) -> Result<(), NotifyError> {
        Err(NotifyError::Unavailable("no audio device".into()))
    }
}

fn controller(total_ms: u64) -> (ModeController, ManualClock, PollingScheduler) {
    let clock = ManualClock::new(0);
    let sched = PollingScheduler::new();
    let ctl = ModeController::restore(
        ControllerState::new(total_ms),
        Rc::new(clock.clone()),
        sched.clone(),
    );
    (ctl, clock, sched)
}

/// Tick while a request is outstanding, handing every event to `notifiers`.
fn drive(
    ctl: &mut ModeController,
    clock: &ManualClock,
    sched: &PollingScheduler,
    step_ms: u64,
    notifiers: &mut [Box<dyn FinishNotifier>],
) -> Vec<Event> {
    let mut events = Vec::new();
    while sched.has_pending() {
        clock.advance(step_ms);
        if let Some(event) = ctl.tick(clock.now_ms()) {
            dispatch(&event, notifiers);
            events.push(event);
        }
    }
    events
}

#[test]
fn test_finish_reaches_notifiers_once_despite_failures() {
    let (mut ctl, clock, sched) = controller(2_000);
    let started = ctl.start_timer(2_000).unwrap();

    let mut notifiers: Vec<Box<dyn FinishNotifier>> =
        vec![Box::new(Unplugged), Box::new(RecordingNotifier::default())];
    let events = drive(&mut ctl, &clock, &sched, 16, &mut notifiers);

    assert_eq!(events.len(), 1);
    let finished = events[0].as_finished().unwrap();
    assert!(matches!(started, Event::TimerStarted { run_id, .. } if run_id == finished.run_id));
    assert_eq!(ctl.timer().remaining_ms(), 0);

    // Later frames deliver nothing more.
    clock.advance(5_000);
    assert!(ctl.tick(clock.now_ms()).is_none());
    let report = dispatch(&events[0], &mut notifiers[..1]);
    assert_eq!(report.failures.len(), 1);
}

#[test]
fn test_recording_notifier_sees_each_run() {
    let (mut ctl, clock, sched) = controller(500);
    let mut recorder = RecordingNotifier::default();

    for _ in 0..2 {
        ctl.start_timer(500).unwrap();
        for event in drive(&mut ctl, &clock, &sched, 100, &mut []) {
            if let Some(finished) = event.as_finished() {
                recorder.notify(finished).unwrap();
            }
        }
    }

    assert_eq!(recorder.received.len(), 2);
    assert_ne!(recorder.received[0].run_id, recorder.received[1].run_id);
    assert!(recorder.received.iter().all(|f| f.duration_ms == 500));
}

#[test]
fn test_chosen_duration_seeds_next_controller() {
    let store = MemoryDurationStore::new(None);
    assert_eq!(store.load_duration().unwrap(), None);

    let (mut ctl, _clock, _sched) = controller(300_000);
    ctl.set_timer_duration(90_000).unwrap();
    store.save_duration(ctl.timer().total_ms()).unwrap();

    let saved = store.load_duration().unwrap().unwrap();
    let (next, _clock, _sched) = controller(saved);
    assert_eq!(next.timer().total_ms(), 90_000);
    assert_eq!(next.timer().remaining_ms(), 90_000);
}
