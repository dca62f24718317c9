//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Default timer length and the preset shortcuts
//! - How the activity heat-map window is laid out
//! - Whether to ring the terminal bell on completion
//! - Log level
//!
//! Configuration is stored at `~/.config/tagtimer/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::activity::ActivityWindow;
use crate::error::{ConfigError, CoreError, ValidationError};
use crate::timer::{DEFAULT_MINUTES, MAX_MINUTES, MIN_MINUTES};

/// Timer-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_minutes")]
    pub default_minutes: u32,
    #[serde(default = "default_presets")]
    pub presets: Vec<u32>,
    /// How often the foreground countdown redraws.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLayout {
    /// Flat run of days ending today.
    Trailing,
    /// Whole weeks, Sunday first, like a contribution graph.
    Weeks,
}

/// Activity heat-map configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityConfig {
    #[serde(default = "default_layout")]
    pub layout: ActivityLayout,
    #[serde(default = "default_trailing_days")]
    pub trailing_days: u32,
    #[serde(default = "default_weeks")]
    pub weeks: u32,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub bell: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/tagtimer/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub activity: ActivityConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub log: LogConfig,
}

// Default functions
fn default_minutes() -> u32 {
    DEFAULT_MINUTES
}
fn default_presets() -> Vec<u32> {
    vec![30, 60, 90]
}
fn default_tick_interval_ms() -> u64 {
    100
}
fn default_layout() -> ActivityLayout {
    ActivityLayout::Trailing
}
fn default_trailing_days() -> u32 {
    84
}
fn default_weeks() -> u32 {
    53
}
/// Upper bound for the heat-map window, roughly ten years.
pub const MAX_ACTIVITY_DAYS: u32 = 3_660;

fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "warn".into()
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            default_minutes: default_minutes(),
            presets: default_presets(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            layout: default_layout(),
            trailing_days: default_trailing_days(),
            weeks: default_weeks(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { bell: true }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
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

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
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
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
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

    fn path() -> Result<PathBuf, CoreError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, CoreError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), CoreError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), CoreError> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using default configuration");
            Self::default()
        })
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

    /// Set a config value by dot-separated key. The change is validated but
    /// not saved; call [`Config::save`] afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let in_range = |m: &u32| (MIN_MINUTES..=MAX_MINUTES).contains(m);
        if !in_range(&self.timer.default_minutes) {
            return Err(ConfigError::InvalidValue {
                key: "timer.default_minutes".into(),
                message: format!("must be between {MIN_MINUTES} and {MAX_MINUTES}"),
            });
        }
        if !self.timer.presets.iter().all(in_range) {
            return Err(ConfigError::InvalidValue {
                key: "timer.presets".into(),
                message: format!("every preset must be between {MIN_MINUTES} and {MAX_MINUTES}"),
            });
        }
        if !(1..=MAX_ACTIVITY_DAYS).contains(&self.activity.trailing_days) {
            return Err(ConfigError::InvalidValue {
                key: "activity.trailing_days".into(),
                message: format!("must be between 1 and {MAX_ACTIVITY_DAYS}"),
            });
        }
        let max_weeks = MAX_ACTIVITY_DAYS / 7;
        if !(1..=max_weeks).contains(&self.activity.weeks) {
            return Err(ConfigError::InvalidValue {
                key: "activity.weeks".into(),
                message: format!("must be between 1 and {max_weeks}"),
            });
        }
        Ok(())
    }

    /// Minutes of the preset at `index` (zero-based).
    pub fn preset(&self, index: usize) -> Result<u32, ValidationError> {
        self.timer
            .presets
            .get(index)
            .copied()
            .ok_or(ValidationError::UnknownPreset {
                index,
                len: self.timer.presets.len(),
            })
    }

    /// Heat-map window for the configured layout.
    pub fn activity_window(&self) -> ActivityWindow {
        match self.activity.layout {
            ActivityLayout::Trailing => ActivityWindow::Trailing {
                days: self.activity.trailing_days,
            },
            ActivityLayout::Weeks => ActivityWindow::Weeks {
                weeks: self.activity.weeks,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.timer.default_minutes, 25);
        assert_eq!(parsed.timer.presets, vec![30, 60, 90]);
        assert_eq!(parsed.activity.layout, ActivityLayout::Trailing);
        assert!(parsed.notifications.bell);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[activity]\nlayout = \"weeks\"\n").unwrap();
        assert_eq!(parsed.activity.layout, ActivityLayout::Weeks);
        assert_eq!(parsed.activity.weeks, 53);
        assert_eq!(parsed.timer.tick_interval_ms, 100);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.default_minutes").as_deref(), Some("25"));
        assert_eq!(cfg.get("notifications.bell").as_deref(), Some("true"));
        assert_eq!(cfg.get("activity.layout").as_deref(), Some("trailing"));
        assert!(cfg.get("timer.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.set("notifications.bell", "false").unwrap();
        cfg.set("timer.default_minutes", "50").unwrap();
        cfg.set("timer.presets", "[15, 45]").unwrap();
        cfg.set("activity.layout", "weeks").unwrap();
        assert!(!cfg.notifications.bell);
        assert_eq!(cfg.timer.default_minutes, 50);
        assert_eq!(cfg.timer.presets, vec![15, 45]);
        assert_eq!(cfg.activity.layout, ActivityLayout::Weeks);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("timer.nonexistent_key", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn set_rejects_invalid_values() {
        let mut cfg = Config::default();
        assert!(cfg.set("notifications.bell", "not_a_bool").is_err());
        assert!(cfg.set("timer.default_minutes", "0").is_err());
        assert!(cfg.set("timer.default_minutes", "241").is_err());
        assert!(cfg.set("activity.layout", "spiral").is_err());
        assert_eq!(cfg.timer.default_minutes, 25);
        assert_eq!(cfg.activity.layout, ActivityLayout::Trailing);
    }

    #[test]
    fn preset_lookup() {
        let cfg = Config::default();
        assert_eq!(cfg.preset(1), Ok(60));
        assert_eq!(
            cfg.preset(3),
            Err(ValidationError::UnknownPreset { index: 3, len: 3 })
        );
    }

    #[test]
    fn activity_window_follows_layout() {
        let mut cfg = Config::default();
        assert_eq!(cfg.activity_window(), ActivityWindow::Trailing { days: 84 });
        cfg.activity.layout = ActivityLayout::Weeks;
        assert_eq!(cfg.activity_window(), ActivityWindow::Weeks { weeks: 53 });
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.timer.default_minutes, 25);
        assert!(path.exists());

        let mut changed = cfg.clone();
        changed.set("timer.default_minutes", "45").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().timer.default_minutes, 45);
    }

    #[test]
    fn activity_window_is_bounded() {
        let mut cfg = Config::default();
        assert!(cfg.set("activity.weeks", "1000000000").is_err());
        assert!(cfg.set("activity.trailing_days", "0").is_err());
        assert!(cfg.set("activity.trailing_days", "3661").is_err());
        assert_eq!(cfg.activity_window(), ActivityWindow::Trailing { days: 84 });
        cfg.set("activity.trailing_days", "3660").unwrap();
        cfg.set("activity.weeks", "522").unwrap();
        assert!(cfg.set("activity.weeks", "523").is_err());
    }

    #[test]
    fn load_from_rejects_out_of_range_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[activity]\nweeks = 0\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(CoreError::Config(ConfigError::InvalidValue { .. }))
        ));
        std::fs::write(&path, "[timer]\ndefault_minutes = 500\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn load_from_corrupt_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timer = [[[").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
