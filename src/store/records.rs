//! Keyed persistence of collectible records.
//!
//! One record per origin code. The directory backend writes each record
//! to `{originCode}.json`, so regenerating the collection is a directory
//! scan for 8-digit JSON file names.

use crate::codec::{OriginCode, CODE_LENGTH};
use crate::generation::Collectible;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from a record backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("record {path} is not a valid collectible: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode record {code}: {source}")]
    Encode {
        code: OriginCode,
        #[source]
        source: serde_json::Error,
    },
}

/// A persistent map from origin code to collectible.
pub trait RecordStore {
    /// Loads one record, or `None` if it has never been saved.
    fn load(&self, code: &OriginCode) -> Result<Option<Collectible>, StoreError>;

    /// Writes a record, replacing any previous version.
    fn save(&mut self, collectible: &Collectible) -> Result<(), StoreError>;

    /// Loads every stored record.
    fn load_all(&self) -> Result<Vec<Collectible>, StoreError>;

    /// Deletes every record and returns how many were removed.
    ///
    /// Best effort: a record that cannot be removed is logged and skipped.
    fn erase_all(&mut self) -> Result<usize, StoreError>;
}

/// Records stored as one JSON file each inside a directory.
#[derive(Debug, Clone)]
pub struct JsonDirectory {
    root: PathBuf,
}

impl JsonDirectory {
    /// Opens (and creates if needed) a record directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StoreError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    /// Directory holding the records.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the record for `code`.
    pub fn record_path(&self, code: &OriginCode) -> PathBuf {
        self.root.join(format!("{code}.json"))
    }

    /// Paths of every file named like a record.
    fn record_files(&self) -> Result<Vec<PathBuf>, StoreError> {
        let entries = fs::read_dir(&self.root).map_err(|source| StoreError::Io {
            path: self.root.clone(),
            source,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: self.root.clone(),
                source,
            })?;
            let path = entry.path();
            if path.is_file() && is_record_file_name(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn read_record(path: &Path) -> Result<Collectible, StoreError> {
        let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Returns true for `????????.json` where `?` is an ASCII digit.
fn is_record_file_name(path: &Path) -> bool {
    let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
    let stem_ok = path
        .file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.len() == CODE_LENGTH && s.bytes().all(|b| b.is_ascii_digit()));
    is_json && stem_ok
}

impl RecordStore for JsonDirectory {
    fn load(&self, code: &OriginCode) -> Result<Option<Collectible>, StoreError> {
        let path = self.record_path(code);
        if !path.exists() {
            return Ok(None);
        }
        Self::read_record(&path).map(Some)
    }

    fn save(&mut self, collectible: &Collectible) -> Result<(), StoreError> {
        let path = self.record_path(&collectible.origin_code);
        let json = serde_json::to_string_pretty(collectible).map_err(|source| StoreError::Encode {
            code: collectible.origin_code,
            source,
        })?;

        // Write then rename so a failed write never leaves a torn record.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(path = %path.display(), "Collectible record saved");
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Collectible>, StoreError> {
        let files = self.record_files()?;
        tracing::info!(
            count = files.len(),
            root = %self.root.display(),
            "Found saved collectibles"
        );

        let mut records = Vec::with_capacity(files.len());
        for path in files {
            match Self::read_record(&path) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(error = %e, "Skipping unreadable collectible record"),
            }
        }
        Ok(records)
    }

    fn erase_all(&mut self) -> Result<usize, StoreError> {
        let files = self.record_files()?;
        let mut deleted = 0;
        for path in &files {
            match fs::remove_file(path) {
                Ok(()) => deleted += 1,
                Err(e) => tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to delete collectible record"
                ),
            }
        }
        tracing::info!(deleted, found = files.len(), "Erased collectible records");
        Ok(deleted)
    }
}

/// In-memory records, for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecords {
    records: BTreeMap<OriginCode, Collectible>,
}

impl MemoryRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for MemoryRecords {
    fn load(&self, code: &OriginCode) -> Result<Option<Collectible>, StoreError> {
        Ok(self.records.get(code).cloned())
    }

    fn save(&mut self, collectible: &Collectible) -> Result<(), StoreError> {
        self.records
            .insert(collectible.origin_code, collectible.clone());
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Collectible>, StoreError> {
        Ok(self.records.values().cloned().collect())
    }

    fn erase_all(&mut self) -> Result<usize, StoreError> {
        let deleted = self.records.len();
        self.records.clear();
        Ok(deleted)
    }
}
