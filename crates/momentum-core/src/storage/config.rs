//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Focus and break lengths for sessions started from widgets
//! - The calendar used to decide which day a completion belongs to
//! - Where the app-group shared store lives
//!
//! Configuration is stored at `~/.config/momentum/config.toml`.

use std::path::PathBuf;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::ConfigError;

/// Focus timer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_focus_minutes")]
    pub focus_minutes: u32,
    #[serde(default = "default_break_minutes")]
    pub break_minutes: u32,
}

/// Streak calendar configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreakConfig {
    /// Fixed offset from UTC in minutes. Unset means the device's local zone.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
}

/// Shared store location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Directory shared with widget processes. Unset means the data dir.
    #[serde(default)]
    pub app_group_dir: Option<PathBuf>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/momentum/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub streak: StreakConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
}

/// Offsets must stay strictly inside one day.
const MAX_UTC_OFFSET_MINUTES: i32 = 24 * 60;

fn default_focus_minutes() -> u32 {
    25
}
fn default_break_minutes() -> u32 {
    5
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            focus_minutes: default_focus_minutes(),
            break_minutes: default_break_minutes(),
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

    fn parse_scalar(key: &str, value: &str) -> Result<serde_json::Value, ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        if let Ok(n) = value.parse::<i64>() {
            return Ok(serde_json::Value::Number(n.into()));
        }
        if let Ok(n) = value.parse::<f64>() {
            return serde_json::Number::from_f64(n)
                .map(serde_json::Value::Number)
                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")));
        }
        Err(invalid(format!("cannot parse '{value}' as number")))
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
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
                    serde_json::Value::Bool(_) => {
                        let parsed = value.parse::<bool>().map_err(|e| ConfigError::InvalidValue {
                            key: key.to_string(),
                            message: e.to_string(),
                        })?;
                        serde_json::Value::Bool(parsed)
                    }
                    serde_json::Value::Number(_) => Self::parse_scalar(key, value)?,
                    // Optional settings: "none" or "" unsets, numbers stay numbers.
                    serde_json::Value::Null => match value {
                        "" | "none" => serde_json::Value::Null,
                        _ => Self::parse_scalar(key, value)
                            .unwrap_or_else(|_| serde_json::Value::String(value.into())),
                    },
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Self =
                    toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using default configuration");
            Self::default()
        })
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
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

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check value ranges serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` for a UTC offset of a full day or more.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(minutes) = self.streak.utc_offset_minutes {
            if minutes.unsigned_abs() >= MAX_UTC_OFFSET_MINUTES.unsigned_abs() {
                return Err(ConfigError::InvalidValue {
                    key: "streak.utc_offset_minutes".into(),
                    message: format!(
                        "{minutes} is outside -{max}..{max} (exclusive)",
                        max = MAX_UTC_OFFSET_MINUTES
                    ),
                });
            }
        }
        Ok(())
    }

    /// Set a config value by key and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    pub fn focus_secs(&self) -> u64 {
        u64::from(self.timer.focus_minutes) * 60
    }

    pub fn break_secs(&self) -> u64 {
        u64::from(self.timer.break_minutes) * 60
    }

    /// Calendar override for the streak engine; `None` means device local.
    pub fn utc_offset(&self) -> Option<FixedOffset> {
        self.streak
            .utc_offset_minutes
            .and_then(|minutes| minutes.checked_mul(60))
            .and_then(FixedOffset::east_opt)
    }

    /// Directory of the shared store.
    ///
    /// # Errors
    /// Returns an error if the default data dir cannot be created.
    pub fn app_group_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.bridge.app_group_dir {
            Some(dir) => Ok(dir.clone()),
            None => data_dir(),
        }
    }
}
