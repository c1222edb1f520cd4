//! Bike Critters Library
//!
//! Turns the 8-digit barcode on a shared bicycle into a collectible
//! critter. The same barcode always produces the same critter; scanning
//! it again on a later day levels it up.
//!
//! # Architecture
//!
//! ```text
//! camera → decode worker → debouncer → store → records
//!                                        ↓
//!                                     factory (codec + tables)
//! ```
//!
//! - [`codec`]: origin code normalization, digit windows, outline shuffle
//! - [`generation`]: lookup tables, digit layout, [`CollectibleFactory`]
//! - [`store`]: per-scan state machine, JSON records, settings, sorting
//! - [`scanner`]: frames, decoder seam, debouncer, background decode worker
//! - [`pipeline`]: the frame loop tying scanner and store together
//!
//! # Example
//!
//! ```
//! use bike_critters::{CollectibleFactory, CollectibleStore, MemoryRecords, ScanEvent};
//!
//! let mut store = CollectibleStore::open(
//!     CollectibleFactory::default(),
//!     MemoryRecords::new(),
//!     100,
//! )
//! .unwrap();
//!
//! match store.scan("12345678", 1).unwrap() {
//!     ScanEvent::New(critter) => assert_eq!(critter.current_level, critter.start_level),
//!     other => panic!("unexpected {other:?}"),
//! }
//! assert!(matches!(
//!     store.scan("12345678", 1).unwrap(),
//!     ScanEvent::AlreadyScannedToday(_)
//! ));
//! ```

#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod codec;
pub mod config;
pub mod generation;
pub mod metrics;
pub mod pipeline;
pub mod scanner;
pub mod store;

// Re-export commonly used types at crate root
pub use codec::{DigitRange, OriginCode, OutlinePoint, RejectReason};
pub use config::{AppConfig, ConfigError};
pub use generation::{Collectible, CollectibleFactory, DigitLayout, GenerationError, LookupTables};
pub use pipeline::{RunOptions, ScanPipeline};
pub use scanner::{BarcodeDecoder, DebounceConfig, DecodeWorker, Frame, ScanDebouncer, StableScan};
pub use store::{
    CollectibleStore, JsonDirectory, MemoryRecords, RecordStore, ScanError, ScanEvent, SortingMode,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
