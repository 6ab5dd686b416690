//! JSON-based application configuration.
//!
//! A flat record of phase durations (minutes), the number of work cycles
//! before a long break, and whether finishing a work phase locks the screen.
//!
//! Configuration is stored at `~/.config/pomolock/config.json`. Reading never
//! fails: a missing, unreadable or invalid file yields the defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, ValidationError};
use crate::timer::Phase;

const CONFIG_FILE: &str = "config.json";

/// Application configuration.
///
/// Unknown fields in the file are ignored and missing ones take their
/// default, so older or hand-edited files keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Work phase length in minutes.
    #[serde(default = "default_work_time")]
    pub work_time: u32,
    /// Short break length in minutes.
    #[serde(default = "default_short_break")]
    pub short_break: u32,
    /// Long break length in minutes.
    #[serde(default = "default_long_break")]
    pub long_break: u32,
    /// Work phases before a long break.
    #[serde(default = "default_cycles")]
    pub cycles: u32,
    /// Lock the screen when a work phase completes.
    #[serde(default = "default_true")]
    pub auto_lock: bool,
}

// Default functions
fn default_work_time() -> u32 {
    25
}
fn default_short_break() -> u32 {
    5
}
fn default_long_break() -> u32 {
    15
}
fn default_cycles() -> u32 {
    4
}
fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            work_time: default_work_time(),
            short_break: default_short_break(),
            long_break: default_long_break(),
            cycles: default_cycles(),
            auto_lock: true,
        }
    }
}

impl Config {
    /// Default location of the config file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join(CONFIG_FILE))
    }

    /// Load from the default location, returning defaults on any error.
    pub fn load() -> Self {
        match Self::path() {
            Ok(path) => Self::load_from(&path),
            Err(e) => {
                tracing::warn!("using default configuration: {e}");
                Self::default()
            }
        }
    }

    /// Load from `path`, returning defaults on any error.
    ///
    /// A missing file is the normal first-run case and is not logged above
    /// debug level.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Self::default();
        }
        match Self::try_load_from(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!("using default configuration: {e}");
                Self::default()
            }
        }
    }

    /// Strict variant of [`Config::load_from`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// holds a non-positive duration or cycle count.
    pub fn try_load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let cfg: Config = serde_json::from_str(&content).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        cfg.validate().map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(cfg)
    }

    /// Persist to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = serde_json::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Persist to the default location. Failures are logged, not returned.
    pub fn save(&self) {
        let result = Self::path().and_then(|path| self.save_to(&path));
        if let Err(e) = result {
            tracing::warn!("{e}");
        }
    }

    /// Check the invariants every loaded or edited config must hold.
    ///
    /// # Errors
    ///
    /// Returns the first field that is not greater than zero.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("work_time", self.work_time),
            ("short_break", self.short_break),
            ("long_break", self.long_break),
            ("cycles", self.cycles),
        ];
        for (field, value) in fields {
            if value == 0 {
                return Err(ValidationError::NonPositive {
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Configured length of `phase` in seconds.
    pub fn phase_duration_secs(&self, phase: Phase) -> u64 {
        let minutes = match phase {
            Phase::Work => self.work_time,
            Phase::ShortBreak => self.short_break,
            Phase::LongBreak => self.long_break,
        };
        u64::from(minutes).saturating_mul(60)
    }

    /// Get a config value as string by key.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "work_time" => self.work_time.to_string(),
            "short_break" => self.short_break.to_string(),
            "long_break" => self.long_break.to_string(),
            "cycles" => self.cycles.to_string(),
            "auto_lock" => self.auto_lock.to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Set a config value by key.
    ///
    /// The edit is applied to a copy and only committed once the whole
    /// record validates, so a rejected value leaves `self` untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value does not parse, or
    /// the result would violate [`Config::validate`].
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut next = self.clone();
        let value = value.trim();
        match key {
            "work_time" => next.work_time = parse_minutes(key, value)?,
            "short_break" => next.short_break = parse_minutes(key, value)?,
            "long_break" => next.long_break = parse_minutes(key, value)?,
            "cycles" => next.cycles = parse_minutes(key, value)?,
            "auto_lock" => {
                next.auto_lock = value.parse::<bool>().map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("cannot parse '{value}' as true/false"),
                })?
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        next.validate().map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        *self = next;
        Ok(())
    }
}

fn parse_minutes(key: &str, value: &str) -> Result<u32, ConfigError> {
    // Parse as signed first so "-5" reports as non-positive rather than garbage.
    let n = value.parse::<i64>().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("cannot parse '{value}' as a whole number"),
    })?;
    if n <= 0 {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must be greater than 0".to_string(),
        });
    }
    u32::try_from(n).map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("{n} is too large"),
    })
}
