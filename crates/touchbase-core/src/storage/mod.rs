mod config;
pub mod database;
pub mod migrations;
pub mod reminders;

pub use config::{Config, DisplayConfig, ListConfig, RemindersConfig};
pub use database::ContactDb;
pub use reminders::{PendingReminder, ReminderOutbox};

use std::path::PathBuf;

use crate::error::Result;

/// Database file name inside [`data_dir`].
pub const DB_FILE: &str = "touchbase.db";

/// Returns `~/.config/touchbase[-dev]/` based on TOUCHBASE_ENV.
///
/// Set TOUCHBASE_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("TOUCHBASE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("touchbase-dev")
    } else {
        base_dir.join("touchbase")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
