//! Application configuration.
//!
//! Everything is read from one TOML file. Each section falls back to its
//! defaults when missing, so an empty file is a valid configuration.
//!
//! ```toml
//! [store]
//! data_dir = "critters"
//! level_cap = 100
//! level_increment = 1
//!
//! [layout]
//! name = [1, 3]
//! color = [5, 5]
//!
//! [debounce]
//! scan_length_secs = 1.0
//! cooldown_secs = 2.0
//! ```

use crate::generation::{
    load_names, CollectibleFactory, DigitLayout, LayoutError, LookupError, LookupTables,
};
use crate::scanner::{CaptureConfig, CaptureConfigError, DebounceConfig, DebounceConfigError};
use crate::store::{DEFAULT_LEVEL_CAP, SETTINGS_FILE_NAME};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),
    #[error("invalid digit layout: {0}")]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error("invalid capture settings: {0}")]
    Capture(#[from] CaptureConfigError),
    #[error("invalid debounce settings: {0}")]
    Debounce(#[from] DebounceConfigError),
    #[error("level cap {cap} is below the largest start level {max_start_level}")]
    LevelCap { cap: u8, max_start_level: u32 },
    #[error("level increment must be at least 1")]
    LevelIncrement,
}

/// Storage and progression settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding one JSON record per collectible.
    pub data_dir: PathBuf,
    /// Settings file name inside `data_dir`.
    pub settings_file: String,
    pub level_cap: u8,
    /// Levels gained per counted scan.
    pub level_increment: u32,
    /// Optional newline-separated name table replacing the built-in one.
    pub names_file: Option<PathBuf>,
    pub max_names: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("critters"),
            settings_file: SETTINGS_FILE_NAME.to_owned(),
            level_cap: DEFAULT_LEVEL_CAP,
            level_increment: 1,
            names_file: None,
            max_names: 1000,
        }
    }
}

impl StoreConfig {
    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(&self.settings_file)
    }
}

/// Full configuration file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub layout: DigitLayout,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub debounce: DebounceConfig,
}

impl AppConfig {
    /// Loads and validates configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks the settings that do not need the lookup tables.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.capture.validate()?;
        self.debounce.validate()?;

        let max_start_level = self.layout.max_start_level();
        if u32::from(self.store.level_cap) < max_start_level {
            return Err(ConfigError::LevelCap {
                cap: self.store.level_cap,
                max_start_level,
            });
        }
        if self.store.level_increment == 0 {
            return Err(ConfigError::LevelIncrement);
        }
        Ok(())
    }

    /// Builds the lookup tables, loading the name table if one is configured.
    pub fn tables(&self) -> Result<LookupTables, ConfigError> {
        let tables = LookupTables::builtin();
        match &self.store.names_file {
            Some(path) => Ok(tables.with_names(load_names(path, self.store.max_names)?)),
            None => Ok(tables),
        }
    }

    /// Builds a factory and checks the layout against its tables.
    pub fn factory(&self) -> Result<CollectibleFactory, ConfigError> {
        Ok(CollectibleFactory::new(self.layout.clone(), self.tables()?)?)
    }
}
