//! Prometheus metrics for the scan pipeline.
//!
//! # Metrics Exposed
//!
//! - `bike_critters_frames_total` - Frames handed to the decoder
//! - `bike_critters_readings_total` - Frames with a barcode reading
//! - `bike_critters_frames_replaced` - Frames evicted from the decode mailbox
//! - `bike_critters_stable_scans_total` - Debounced scans
//! - `bike_critters_last_vote_share` - Agreement within the last scan window
//! - `bike_critters_scan_outcomes_total{outcome}` - Store outcomes per scan
//! - `bike_critters_collection_size` - Collectibles in the session
//!
//! # Example
//!
//! ```
//! use bike_critters::metrics::ScanMetrics;
//!
//! let metrics = ScanMetrics::new().expect("metrics registry");
//! metrics.record_outcome("new");
//! assert!(metrics.encode().unwrap().contains("outcome=\"new\""));
//! ```

mod collector;

pub use collector::{MetricsError, ScanMetrics};
