//! # tickwatch Core Library
//!
//! Countdown timer and stopwatch engines driven by an external tick loop.
//! The CLI binary is a thin layer over this crate; any other front-end
//! (a GUI frame loop, a test) drives the same engines.
//!
//! ## Architecture
//!
//! - **Clock**: millisecond readings behind the [`Clock`] trait
//! - **Scheduler**: engines request and cancel ticks through [`Scheduler`];
//!   the driver calls `tick(now)` while a request is outstanding
//! - **Engines**: [`TimerEngine`] counts down, [`StopwatchEngine`] counts up
//!   and records laps. Both advance by clock deltas, so an irregular tick
//!   cadence does not cause drift
//! - **Mode Controller**: [`ModeController`] keeps exactly one engine live
//! - **Storage**: SQLite key/value and run history, TOML configuration
//!
//! The core is single-threaded: shared handles are `Rc`, and engines are
//! expected to be driven serially.

pub mod clock;
pub mod duration;
pub mod error;
pub mod events;
pub mod mode;
pub mod notify;
pub mod phase;
pub mod scheduler;
pub mod snapshot;
pub mod stopwatch;
pub mod storage;
pub mod timer;

pub use clock::{Clock, ManualClock, MonotonicClock, SystemClock};
pub use error::{ConfigError, CoreError, EngineError, StorageError};
pub use events::{Event, TimerFinished};
pub use mode::{ControllerState, Mode, ModeController};
pub use notify::{FinishNotifier, NotifyError};
pub use phase::Phase;
pub use scheduler::{PollingScheduler, Scheduler, TickHandle};
pub use snapshot::{Snapshot, StopwatchSnapshot, TimerSnapshot};
pub use stopwatch::{Lap, StopwatchEngine, StopwatchState};
pub use storage::{Config, Database, DurationStore};
pub use timer::{TimerEngine, TimerState};
