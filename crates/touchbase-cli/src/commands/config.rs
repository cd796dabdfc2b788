//! Configuration commands for CLI.

use clap::Subcommand;
use touchbase_core::{Config, ConfigError};

use super::CliResult;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one setting
    Get {
        /// Dot-path key, e.g. "list.default_order" or "reminders.hour"
        key: String,
    },
    /// Change one setting and save it
    Set {
        /// Dot-path key
        key: String,
        /// New value
        value: String,
    },
    /// Print every setting as `key = value`
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Restore the default settings
    Reset,
}

pub fn run(action: ConfigAction) -> CliResult {
    match action {
        ConfigAction::Get { key } => {
            let value = Config::load_or_default()
                .get(&key)
                .ok_or(ConfigError::UnknownKey(key))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            println!("{key} = {}", config.get(&key).unwrap_or(value));
        }
        ConfigAction::List { json } => {
            let config = Config::load()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
                return Ok(());
            }
            for (key, value) in config.entries() {
                println!("{key} = {value}");
            }
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("Settings restored to defaults");
        }
    }
    Ok(())
}
