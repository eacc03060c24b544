//! Countdown duration bounds and field helpers.
//!
//! Durations are milliseconds in `[0, MAX_DURATION_MS]`.

/// 23:59:59.999
pub const MAX_DURATION_MS: u64 = 86_399_999;

/// Largest whole-second duration reachable through the h/m/s fields.
pub const MAX_FIELD_DURATION_SECS: u64 = 23 * 3600 + 59 * 60 + 59;

/// Duration used when nothing has been saved yet (5 minutes).
pub const DEFAULT_DURATION_MS: u64 = 5 * 60 * 1000;

/// Hours, minutes and seconds of a duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hms {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

/// Build a duration from fields, clamping each to its range.
pub fn from_hms(hours: u64, minutes: u64, seconds: u64) -> u64 {
    let h = hours.min(23);
    let m = minutes.min(59);
    let s = seconds.min(59);
    ((h * 60 + m) * 60 + s) * 1000
}

/// Split a duration into whole fields; sub-second remainder is dropped.
pub fn hms(ms: u64) -> Hms {
    let total_secs = ms / 1000;
    Hms {
        hours: total_secs / 3600,
        minutes: (total_secs % 3600) / 60,
        seconds: total_secs % 60,
    }
}

/// Move a duration by whole seconds, clamped to `[0, 23:59:59]`.
///
/// The result is always a whole number of seconds.
pub fn adjust(ms: u64, delta_secs: i64) -> u64 {
    let secs = (ms / 1000) as i64;
    let next = secs
        .saturating_add(delta_secs)
        .clamp(0, MAX_FIELD_DURATION_SECS as i64);
    next as u64 * 1000
}

pub fn is_valid(ms: u64) -> bool {
    ms > 0 && ms <= MAX_DURATION_MS
}
