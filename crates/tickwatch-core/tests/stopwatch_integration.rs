//! Integration tests for the stopwatch engine and its lap ledger.

use std::rc::Rc;

use proptest::prelude::*;
use tickwatch_core::{Clock, Lap, ManualClock, PollingScheduler, StopwatchEngine};

fn stopwatch() -> (StopwatchEngine, ManualClock, PollingScheduler) {
    let clock = ManualClock::new(50_000);
    let sched = PollingScheduler::new();
    let engine = StopwatchEngine::new(Rc::new(clock.clone()), Box::new(sched.clone()));
    (engine, clock, sched)
}

#[test]
fn test_two_laps_ledger() {
    let (mut sw, clock, _sched) = stopwatch();
    sw.start();

    clock.advance(1_500);
    sw.tick(clock.now_ms());
    sw.lap().unwrap();

    clock.advance(1_000);
    sw.tick(clock.now_ms());
    sw.lap().unwrap();

    assert_eq!(
        sw.laps(),
        &[
            Lap {
                index: 0,
                total_at_lap: 1_500,
                split_since_last: 1_500
            },
            Lap {
                index: 1,
                total_at_lap: 2_500,
                split_since_last: 1_000
            },
        ]
    );
}

#[test]
fn test_lap_without_tick_uses_last_accumulated_reading() {
    let (mut sw, clock, _sched) = stopwatch();
    sw.start();
    clock.advance(800);
    sw.tick(clock.now_ms());
    // Time moved but no tick yet: the lap sees the last ticked value.
    clock.advance(200);
    sw.lap().unwrap();
    assert_eq!(sw.laps()[0].total_at_lap, 800);
}

#[test]
fn test_double_lap_records_zero_split() {
    let (mut sw, clock, _sched) = stopwatch();
    sw.start();
    clock.advance(400);
    sw.tick(clock.now_ms());
    sw.lap().unwrap();
    sw.lap().unwrap();
    assert_eq!(sw.laps()[1].split_since_last, 0);
    assert_eq!(sw.laps()[1].total_at_lap, 400);
}

proptest! {
    #[test]
    fn prop_lap_totals_monotonic_and_splits_sum(
        splits in proptest::collection::vec(0u64..10_000, 1..30),
    ) {
        let (mut sw, clock, _sched) = stopwatch();
        sw.start();
        for split in &splits {
            clock.advance(*split);
            sw.tick(clock.now_ms());
            sw.lap().unwrap();
        }

        let laps = sw.laps();
        prop_assert_eq!(laps.len(), splits.len());
        for pair in laps.windows(2) {
            prop_assert!(pair[1].total_at_lap >= pair[0].total_at_lap);
            prop_assert_eq!(pair[1].index, pair[0].index + 1);
        }
        let sum: u64 = laps.iter().map(|l| l.split_since_last).sum();
        prop_assert_eq!(sum, laps.last().unwrap().total_at_lap);
        for (lap, split) in laps.iter().zip(&splits) {
            prop_assert_eq!(lap.split_since_last, *split);
        }
    }

    #[test]
    fn prop_elapsed_never_decreases_under_skew(
        steps in proptest::collection::vec(-100i64..1_000, 1..60),
    ) {
        let (mut sw, clock, _sched) = stopwatch();
        sw.start();
        for step in steps {
            let before = sw.elapsed_ms();
            if step < 0 {
                clock.rewind(step.unsigned_abs());
            } else {
                clock.advance(step as u64);
            }
            sw.tick(clock.now_ms());
            prop_assert!(sw.elapsed_ms() >= before);
        }
    }
}
