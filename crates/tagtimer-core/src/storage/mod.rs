mod config;
pub mod database;
pub mod entries;
pub mod kv;

pub use config::{
    ActivityConfig, ActivityLayout, Config, LogConfig, NotificationsConfig, TimerConfig,
    MAX_ACTIVITY_DAYS,
};
pub use database::Database;
pub use entries::{EntryStore, ENTRIES_KEY};
pub use kv::{KeyValueStore, MemoryKv};

use std::path::PathBuf;

/// Returns `~/.config/tagtimer[-dev]/` based on TAGTIMER_ENV.
///
/// Set TAGTIMER_ENV=dev to use development data directory, or
/// TAGTIMER_DATA_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("TAGTIMER_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("TAGTIMER_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("tagtimer-dev")
            } else {
                base_dir.join("tagtimer")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
