use clap::{Parser, Subcommand};
use tickwatch_core::Mode;
use tracing_subscriber::EnvFilter;

mod app;
mod commands;
mod display;

#[derive(Parser)]
#[command(name = "tickwatch", version, about = "Countdown timer and stopwatch")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Countdown control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Stopwatch control
    Stopwatch {
        #[command(subcommand)]
        action: commands::stopwatch::StopwatchAction,
    },
    /// Switch between timer and stopwatch
    Mode {
        /// "timer" or "stopwatch"
        mode: Mode,
    },
    /// Print both engines as JSON
    Status,
    /// Live display with keyboard control
    Run,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Finished countdowns and stopwatch sessions
    History {
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TICKWATCH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Stopwatch { action } => commands::stopwatch::run(action),
        Commands::Mode { mode } => commands::mode::run(mode),
        Commands::Status => commands::status::run(),
        Commands::Run => commands::run::run(),
        Commands::Config { action } => commands::config::run(action),
        Commands::History { limit } => commands::history::run(limit),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
