//! Live display: drive the tick loop from a tokio interval.
//!
//! Keys (one per line on stdin): `p` pause/resume, `l` lap, `r` reset,
//! `m` switch mode, `q` quit. Quitting leaves a running engine running;
//! Ctrl-C pauses it first.

use std::io::Write;
use std::time::Duration;

use tickwatch_core::Mode;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

use crate::app::Session;
use crate::display::{format_hms, format_hms_cs, progress_bar};

const BAR_WIDTH: usize = 30;

enum Exit {
    Quit,
    Interrupted,
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    // Engine state is `Rc`-shared, so the loop stays on this thread.
    runtime.block_on(live())
}

async fn live() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::open()?;
    let mut interval = tokio::time::interval(Duration::from_millis(session.config.tick.interval_ms));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let exit = loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Some(event) = session.catch_up() {
                    clear_line();
                    session.print_event(&event)?;
                }
                render(&session);
            }
            line = lines.next_line(), if stdin_open => {
                match line? {
                    Some(line) => {
                        if let Some(exit) = handle_key(&mut session, line.trim())? {
                            break exit;
                        }
                        render(&session);
                    }
                    None => stdin_open = false,
                }
            }
            _ = &mut ctrl_c => break Exit::Interrupted,
        }
    };

    clear_line();
    if let Exit::Interrupted = exit {
        if let Some(event) = session.controller.pause() {
            session.print_event(&event)?;
        }
    }
    tracing::debug!(mode = %session.controller.mode(), "leaving live display");
    session.close()
}

fn handle_key(session: &mut Session, key: &str) -> Result<Option<Exit>, Box<dyn std::error::Error>> {
    let outcome = match key {
        "q" => return Ok(Some(Exit::Quit)),
        "p" => session.controller.toggle(),
        "l" => session.controller.lap().map(Some),
        "r" => {
            if session.controller.mode() == Mode::Stopwatch {
                session.record_stopwatch_session();
            }
            Ok(Some(session.controller.reset()))
        }
        "m" => {
            let next = match session.controller.mode() {
                Mode::Timer => Mode::Stopwatch,
                Mode::Stopwatch => Mode::Timer,
            };
            Ok(session.controller.switch_to(next))
        }
        "" => Ok(None),
        other => {
            clear_line();
            eprintln!("unknown key '{other}' (p pause/resume, l lap, r reset, m mode, q quit)");
            Ok(None)
        }
    };

    match outcome {
        Ok(Some(event)) => {
            clear_line();
            session.print_event(&event)?;
        }
        Ok(None) => {}
        Err(e) => {
            clear_line();
            eprintln!("{e}");
        }
    }
    Ok(None)
}

fn render(session: &Session) {
    let snapshot = session.controller.snapshot();
    let line = match snapshot.mode {
        Mode::Timer => {
            let t = &snapshot.timer;
            format!(
                "timer     {} {} {}",
                format_hms(t.remaining_ms),
                progress_bar(t.progress, BAR_WIDTH),
                t.phase
            )
        }
        Mode::Stopwatch => {
            let sw = &snapshot.stopwatch;
            format!(
                "stopwatch {} laps:{} {}",
                format_hms_cs(sw.elapsed_ms),
                sw.laps.len(),
                sw.phase
            )
        }
    };
    let mut err = std::io::stderr();
    let _ = write!(err, "\r\x1b[2K{line}");
    let _ = err.flush();
}

fn clear_line() {
    let mut err = std::io::stderr();
    let _ = write!(err, "\r\x1b[2K");
    let _ = err.flush();
}
