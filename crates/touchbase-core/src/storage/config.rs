//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Default contact list order
//! - Reminder defaults and the time of day reminders fire
//! - Display language and date format
//!
//! Configuration is stored at `~/.config/touchbase/config.toml`.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::data_dir;
use crate::error::{ConfigError, CoreError, Result};
use crate::phrase::Locale;
use crate::reminder::ReminderTime;
use crate::view::OrderMode;

/// Contact list configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ListConfig {
    #[serde(default)]
    pub default_order: OrderMode,
}

/// Reminder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemindersConfig {
    /// Whether new contacts get reminders unless told otherwise.
    #[serde(default = "default_true")]
    pub enabled_by_default: bool,
    #[serde(default = "default_hour")]
    pub hour: u32,
    #[serde(default = "default_minute")]
    pub minute: u32,
}

/// Display configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub locale: Locale,
    /// chrono format string for dates shown to the user.
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/touchbase/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub list: ListConfig,
    #[serde(default)]
    pub reminders: RemindersConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

// Default functions
fn default_true() -> bool {
    true
}
fn default_hour() -> u32 {
    9
}
fn default_minute() -> u32 {
    15
}
fn default_date_format() -> String {
    "%d.%m.%y".into()
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            enabled_by_default: true,
            hour: default_hour(),
            minute: default_minute(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            date_format: default_date_format(),
        }
    }
}

impl DisplayConfig {
    /// Format `date` for display, falling back to ISO 8601 when
    /// `date_format` cannot render a date.
    pub fn format_date(&self, date: NaiveDate) -> String {
        render_date(date, &self.date_format)
            .unwrap_or_else(|| date.format("%Y-%m-%d").to_string())
    }
}

fn render_date(date: NaiveDate, format: &str) -> Option<String> {
    let items = StrftimeItems::new(format);
    if items.clone().any(|item| matches!(item, Item::Error)) {
        return None;
    }
    let mut out = String::new();
    // Time specifiers parse fine but fail when given only a date.
    write!(out, "{}", date.format_with_items(items)).ok()?;
    Some(out)
}

fn check_date_format(format: &str) -> Result<(), ConfigError> {
    let sample = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap_or(NaiveDate::MIN);
    match render_date(sample, format) {
        Some(_) => Ok(()),
        None => Err(ConfigError::InvalidValue {
            key: "display.date_format".into(),
            message: format!("'{format}' is not a usable date format"),
        }),
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(root: &mut serde_json::Value, key: &str, value: &str) -> Result<()> {
        let unknown = || CoreError::from(ConfigError::UnknownKey(key.to_string()));
        let invalid = |message: String| {
            CoreError::from(ConfigError::InvalidValue {
                key: key.to_string(),
                message,
            })
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => serde_json::Value::Number(
                        value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?
                            .into(),
                    ),
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("cannot set a whole section".into()));
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing the defaults there if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, writing defaults");
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(err) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: err.to_string(),
            }
            .into()),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Check values serde cannot: the reminder time must be a real time of
    /// day and the date format must render a date.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.reminder_time()?;
        check_date_format(&self.display.date_format)
    }

    pub fn reminder_time(&self) -> Result<ReminderTime, ConfigError> {
        ReminderTime::new(self.reminders.hour, self.reminders.minute)
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Every settable key in dot-path form with its current value.
    pub fn entries(&self) -> Vec<(String, String)> {
        fn walk(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
            match value {
                serde_json::Value::Object(map) => {
                    for (key, child) in map {
                        let path = if prefix.is_empty() {
                            key.clone()
                        } else {
                            format!("{prefix}.{key}")
                        };
                        walk(&path, child, out);
                    }
                }
                serde_json::Value::String(s) => out.push((prefix.to_string(), s.clone())),
                other => out.push((prefix.to_string(), other.to_string())),
            }
        }

        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            walk("", &json, &mut out);
        }
        out
    }

    /// Set a config value by key without saving. Returns error if key is unknown
    /// or the new value does not fit the field.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.apply(key, value)?;
        self.save()
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|err| {
            warn!(error = %err, "falling back to default configuration");
            Self::default()
        })
    }
}
