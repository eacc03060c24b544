mod config;
pub mod database;

pub use config::{AlertsConfig, Config, TickConfig, TimerConfig, UiConfig};
pub use database::{Database, RunKind, RunRecord};

use std::cell::Cell;
use std::path::PathBuf;

use crate::error::StorageError;

/// Returns the data directory, creating it if needed.
///
/// `TICKWATCH_DATA_DIR` overrides the location outright. Otherwise it is
/// `~/.config/tickwatch[-dev]/`, with `TICKWATCH_ENV=dev` selecting the
/// development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("TICKWATCH_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("TICKWATCH_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("tickwatch-dev")
            } else {
                base_dir.join("tickwatch")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Best-effort cache of the last countdown duration the user chose.
pub trait DurationStore {
    fn load_duration(&self) -> Result<Option<u64>, StorageError>;
    fn save_duration(&self, duration_ms: u64) -> Result<(), StorageError>;
}

/// In-memory [`DurationStore`].
#[derive(Debug, Default)]
pub struct MemoryDurationStore {
    value: Cell<Option<u64>>,
}

impl MemoryDurationStore {
    pub fn new(initial: Option<u64>) -> Self {
        Self {
            value: Cell::new(initial),
        }
    }
}

impl DurationStore for MemoryDurationStore {
    fn load_duration(&self) -> Result<Option<u64>, StorageError> {
        Ok(self.value.get())
    }

    fn save_duration(&self, duration_ms: u64) -> Result<(), StorageError> {
        self.value.set(Some(duration_ms));
        Ok(())
    }
}
