//! Persisted user settings.
//!
//! Settings live in their own JSON file next to the collectible records.
//! The file is created with defaults on first open and rewritten on every
//! change.

use super::sorting::SortingMode;
use crate::codec::CODE_LENGTH;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default file name inside the data directory.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Settings errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("settings file {path} is malformed: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("settings file name {0:?} would collide with collectible records")]
    CollidingName(String),
    #[error("downscale factor must be at least 1, got {0}")]
    InvalidDownscale(i32),
}

/// Values the user can change from the app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub sorting_mode: i32,
    pub first_time: bool,
    pub scanner_downscale_factor: i32,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            sorting_mode: SortingMode::default().index(),
            first_time: true,
            scanner_downscale_factor: 2,
        }
    }
}

impl UserSettings {
    /// Sorting mode, with unknown values read as oldest-first.
    pub fn sorting(&self) -> SortingMode {
        SortingMode::from_index(self.sorting_mode)
    }
}

/// A settings record bound to its file.
#[derive(Debug)]
pub struct SettingsFile {
    path: PathBuf,
    settings: UserSettings,
}

impl SettingsFile {
    /// Reads the settings file, creating it from `defaults` when absent.
    pub fn open(path: impl Into<PathBuf>, defaults: UserSettings) -> Result<Self, SettingsError> {
        let path = path.into();
        check_file_name(&path)?;

        if !path.exists() {
            tracing::info!(path = %path.display(), "Creating settings file with defaults");
            let file = Self {
                path,
                settings: defaults,
            };
            file.write()?;
            return Ok(file);
        }

        let content = fs::read_to_string(&path).map_err(|source| SettingsError::Io {
            path: path.clone(),
            source,
        })?;
        let settings = serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), ?settings, "Loaded settings");
        Ok(Self { path, settings })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &UserSettings {
        &self.settings
    }

    pub fn set_sorting_mode(&mut self, mode: SortingMode) -> Result<(), SettingsError> {
        self.update(|s| s.sorting_mode = mode.index())
    }

    pub fn set_first_time(&mut self, first_time: bool) -> Result<(), SettingsError> {
        self.update(|s| s.first_time = first_time)
    }

    pub fn set_scanner_downscale_factor(&mut self, factor: i32) -> Result<(), SettingsError> {
        if factor < 1 {
            return Err(SettingsError::InvalidDownscale(factor));
        }
        self.update(|s| s.scanner_downscale_factor = factor)
    }

    /// Applies a change and rewrites the file. The in-memory copy only
    /// changes if the write succeeds.
    fn update(&mut self, change: impl FnOnce(&mut UserSettings)) -> Result<(), SettingsError> {
        let previous = self.settings.clone();
        change(&mut self.settings);
        if let Err(e) = self.write() {
            self.settings = previous;
            return Err(e);
        }
        Ok(())
    }

    fn write(&self) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(&self.settings).map_err(|source| {
            SettingsError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, json).map_err(|source| SettingsError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

fn check_file_name(path: &Path) -> Result<(), SettingsError> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    if stem.len() == CODE_LENGTH && stem.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SettingsError::CollidingName(stem.to_owned()));
    }
    Ok(())
}
