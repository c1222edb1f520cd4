//! Collection persistence and progression.
//!
//! The [`CollectibleStore`] turns stabilized scans into events and keeps
//! one persisted record per origin code. User settings are stored
//! separately in a [`SettingsFile`].

mod collection;
mod records;
mod settings;
mod sorting;

pub use collection::{CollectibleStore, ScanError, ScanEvent, DEFAULT_LEVEL_CAP};
pub use records::{JsonDirectory, MemoryRecords, RecordStore, StoreError};
pub use settings::{SettingsError, SettingsFile, UserSettings, SETTINGS_FILE_NAME};
pub use sorting::{sort_collection, SortingMode};
