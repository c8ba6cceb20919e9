//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Daily budget (`timer_minutes`) and vacation mode
//! - Overlay appearance (title, colors, button text, todo list, image)
//!
//! Configuration is stored at `~/.config/detoxie/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;

pub const DEFAULT_TIMER_MINUTES: i64 = 5;
pub const DEFAULT_HOST_PACKAGE: &str = "com.detoxie";

/// Overlay appearance. Purely presentational; the tracker only forwards it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_background_color")]
    pub background_color: String,
    #[serde(default = "default_text_color")]
    pub text_color: String,
    #[serde(default = "default_button_text")]
    pub button_text: String,
    #[serde(default)]
    pub todos: Vec<String>,
    /// Base64-encoded motivational image.
    #[serde(default)]
    pub vision_image: Option<String>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/detoxie/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Daily budget in minutes. Non-positive values fall back to the default.
    #[serde(default = "default_timer_minutes")]
    pub timer_minutes: i64,
    /// Keep tracking but never show an overlay.
    #[serde(default)]
    pub vacation_mode: bool,
    /// Package id of the tracking app itself.
    #[serde(default = "default_host_package")]
    pub host_package: String,
    #[serde(default)]
    pub overlay: OverlayConfig,
}

fn default_timer_minutes() -> i64 {
    DEFAULT_TIMER_MINUTES
}
fn default_host_package() -> String {
    DEFAULT_HOST_PACKAGE.into()
}
fn default_title() -> String {
    "Time's up!".into()
}
fn default_background_color() -> String {
    "#FFFFFF".into()
}
fn default_text_color() -> String {
    "#000000".into()
}
fn default_button_text() -> String {
    "Close".into()
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            background_color: default_background_color(),
            text_color: default_text_color(),
            button_text: default_button_text(),
            todos: Vec::new(),
            vision_image: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timer_minutes: DEFAULT_TIMER_MINUTES,
            vacation_mode: false,
            host_package: default_host_package(),
            overlay: OverlayConfig::default(),
        }
    }
}

impl Config {
    /// Daily limit in milliseconds. Never fails: invalid minutes mean 5.
    pub fn daily_limit_ms(&self) -> u64 {
        let minutes = if self.timer_minutes > 0 {
            self.timer_minutes as u64
        } else {
            DEFAULT_TIMER_MINUTES as u64
        };
        minutes.saturating_mul(60 * 1000)
    }

    pub fn half_threshold_ms(&self) -> u64 {
        self.daily_limit_ms() / 2
    }

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
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<i64>() {
                            serde_json::Value::Number(n.into())
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as integer")));
                        }
                    }
                    serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    serde_json::Value::Object(_) => return Err(invalid("is a section".into())),
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default on-disk location.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
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

    /// Set a value by dot-separated key in memory. Returns error if the key
    /// is unknown or the value has the wrong type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

/// Source of the configuration the tracker reads on every evaluation.
pub trait ConfigProvider {
    fn config(&self) -> Config;
}

impl ConfigProvider for Config {
    fn config(&self) -> Config {
        self.clone()
    }
}

/// Re-reads the TOML file on every call, so edits made by the UI apply to
/// the next signal. Unreadable files yield the defaults.
#[derive(Debug, Clone)]
pub struct FileConfigProvider {
    path: PathBuf,
}

impl FileConfigProvider {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_location() -> Result<Self, ConfigError> {
        Ok(Self::new(Config::path()?))
    }
}

impl ConfigProvider for FileConfigProvider {
    fn config(&self) -> Config {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %self.path.display(), error = %e, "invalid config, using defaults");
                Config::default()
            }),
            Err(_) => Config::default(),
        }
    }
}
