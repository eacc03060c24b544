//! Terminal formatting and duration parsing.

use tickwatch_core::duration::{self, MAX_FIELD_DURATION_SECS};

/// `HH:MM:SS`, sub-second remainder truncated.
pub fn format_hms(ms: u64) -> String {
    let t = duration::hms(ms);
    format!("{:02}:{:02}:{:02}", t.hours, t.minutes, t.seconds)
}

/// `HH:MM:SS.cc` with centiseconds, for the stopwatch.
pub fn format_hms_cs(ms: u64) -> String {
    let cs = (ms % 1000) / 10;
    format!("{}.{:02}", format_hms(ms), cs)
}

/// Parse `HH:MM:SS`, `MM:SS` or a bare number of seconds into milliseconds.
///
/// Colon-separated fields are clamped individually (hours to 23, minutes and
/// seconds to 59). A bare number is a total in seconds, clamped to 23:59:59.
pub fn parse_duration(input: &str) -> Result<u64, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("empty duration".into());
    }
    let fields = input
        .split(':')
        .map(|f| {
            f.trim()
                .parse::<u64>()
                .map_err(|_| format!("invalid duration field '{f}' in '{input}'"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    match fields.as_slice() {
        [secs] => Ok((*secs).min(MAX_FIELD_DURATION_SECS) * 1000),
        [m, s] => Ok(duration::from_hms(0, *m, *s)),
        [h, m, s] => Ok(duration::from_hms(*h, *m, *s)),
        _ => Err(format!("expected HH:MM:SS, MM:SS or SS, got '{input}'")),
    }
}

/// Text progress bar, `width` cells wide.
pub fn progress_bar(progress: f64, width: usize) -> String {
    let filled = ((progress.clamp(0.0, 1.0)) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}
