//! Configuration file support for fattrace.
//!
//! User preferences are stored as versioned JSON, by default under the
//! platform config directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color_utils::ColorMap;
use crate::constants::{DEFAULT_MAX_HISTORY, DEFAULT_PAN_MERGE_LIMIT, DEFAULT_ZOOM_STEP};
use crate::undo::LogConfig;
use crate::view::DisplayMode;

const APP_DIR: &str = "fattrace";
const CONFIG_FILE: &str = "config.json";

/// Verbosity written to the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Format version written by this build. Files with a higher version are
/// rejected.
pub const CONFIG_VERSION: u32 = 1;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub version: u32,
    #[serde(default)]
    pub preferences: UserPreferences,
}

/// Tunable behaviour; every field falls back to its default when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default)]
    pub log_level: LogLevel,

    /// Maximum number of undo steps
    #[serde(default = "default_max_history")]
    pub max_history: usize,

    /// Pan events folded into one undo step
    #[serde(default = "default_pan_merge_limit")]
    pub pan_merge_limit: usize,

    /// Zoom change per wheel notch
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f64,

    /// Display mode after loading a dataset
    #[serde(default)]
    pub default_display_mode: DisplayMode,

    /// Color map of the primary slice texture
    #[serde(default)]
    pub primary_color_map: ColorMap,

    /// Color map of the secondary slice texture
    #[serde(default = "default_secondary_color_map")]
    pub secondary_color_map: ColorMap,
}

fn default_max_history() -> usize {
    DEFAULT_MAX_HISTORY
}

fn default_pan_merge_limit() -> usize {
    DEFAULT_PAN_MERGE_LIMIT
}

fn default_zoom_step() -> f64 {
    DEFAULT_ZOOM_STEP
}

fn default_secondary_color_map() -> ColorMap {
    ColorMap::Hot
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            max_history: default_max_history(),
            pan_merge_limit: default_pan_merge_limit(),
            zoom_step: default_zoom_step(),
            default_display_mode: DisplayMode::default(),
            primary_color_map: ColorMap::default(),
            secondary_color_map: default_secondary_color_map(),
        }
    }
}

impl UserPreferences {
    /// History settings for the command log.
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            max_history: self.max_history.max(1),
            pan_merge_limit: self.pan_merge_limit,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            preferences: UserPreferences::default(),
        }
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a config file body, rejecting versions this build cannot read.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(json)?;
        match config.version {
            found if found > CONFIG_VERSION => Err(ConfigError::UnsupportedVersion {
                found,
                supported: CONFIG_VERSION,
            }),
            _ => Ok(config),
        }
    }

    /// `<config dir>/fattrace/config.json`, with `~/.config` standing in for
    /// platforms without a config directory.
    pub fn default_path() -> Option<PathBuf> {
        let base = dirs::config_dir().or_else(|| dirs::home_dir().map(|home| home.join(".config")))?;
        Some(base.join(APP_DIR).join(CONFIG_FILE))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::from_json(&std::fs::read_to_string(path)?)?;
        log::info!("Config read from {:?}", path);
        Ok(config)
    }

    /// Write the config, creating missing parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = self.to_json()?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, json)?;
        log::info!("Config written to {:?}", path);
        Ok(())
    }

    /// Read `path`, or the default path when `None`. A missing or broken
    /// file yields the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path.map(Path::to_path_buf).or_else(Self::default_path) else {
            return Self::default();
        };
        if !path.is_file() {
            log::debug!("Using default config, {:?} does not exist", path);
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring config {:?}: {}", path, e);
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Malformed config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Config version {found} is newer than the supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Config file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_roundtrip() {
        let mut config = AppConfig::new();
        config.preferences.log_level = LogLevel::Debug;
        config.preferences.default_display_mode = DisplayMode::FatFraction;
        config.preferences.secondary_color_map = ColorMap::Jet;

        let json = config.to_json().unwrap();
        assert!(json.contains("\"debug\""));
        assert_eq!(AppConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_missing_preferences_use_defaults() {
        let config = AppConfig::from_json(r#"{"version": 1, "preferences": {"zoom_step": 0.1}}"#).unwrap();
        assert_eq!(config.preferences.zoom_step, 0.1);
        assert_eq!(config.preferences.max_history, DEFAULT_MAX_HISTORY);
        assert_eq!(config.preferences.secondary_color_map, ColorMap::Hot);

        let config = AppConfig::from_json(r#"{"version": 1}"#).unwrap();
        assert_eq!(config.preferences, UserPreferences::default());
    }

    #[test]
    fn test_version_too_new() {
        let json = format!(r#"{{"version": {}}}"#, CONFIG_VERSION + 1);
        assert!(matches!(
            AppConfig::from_json(&json),
            Err(ConfigError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut config = AppConfig::new();
        config.preferences.pan_merge_limit = 7;
        config.save(&path).unwrap();

        assert_eq!(AppConfig::load(&path).unwrap(), config);
        assert_eq!(AppConfig::load_or_default(Some(&path)), config);
    }

    #[test]
    fn test_load_or_default_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert_eq!(AppConfig::load_or_default(Some(&missing)), AppConfig::default());

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert_eq!(AppConfig::load_or_default(Some(&broken)), AppConfig::default());
    }

    #[test]
    fn test_log_level_filter() {
        assert_eq!(log::LevelFilter::from(LogLevel::default()), log::LevelFilter::Info);
        assert_eq!(log::LevelFilter::from(LogLevel::Trace), log::LevelFilter::Trace);
    }

    #[test]
    fn test_default_path_file_name() {
        if let Some(path) = AppConfig::default_path() {
            assert!(path.ends_with("fattrace/config.json"));
        }
    }

    #[test]
    fn test_log_config() {
        let mut preferences = UserPreferences::default();
        preferences.max_history = 0;
        preferences.pan_merge_limit = 3;
        let log = preferences.log_config();
        assert_eq!(log.max_history, 1);
        assert_eq!(log.pan_merge_limit, 3);
    }
}
