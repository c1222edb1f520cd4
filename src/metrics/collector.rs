//! Scan pipeline metrics and registry.

use prometheus::{Encoder, Gauge, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// Prometheus registry for the scan pipeline.
pub struct ScanMetrics {
    registry: Registry,

    // Frame metrics
    frames_total: IntCounter,
    readings_total: IntCounter,
    frames_replaced: IntGauge,

    // Scan metrics
    stable_scans_total: IntCounter,
    vote_share: Gauge,
    outcomes_total: IntCounterVec,

    // Collection metrics
    collection_size: IntGauge,
}

impl ScanMetrics {
    /// Creates a registry with every scan metric registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let frames_total = IntCounter::new(
            "bike_critters_frames_total",
            "Frames handed to the barcode decoder",
        )?;
        let readings_total = IntCounter::new(
            "bike_critters_readings_total",
            "Frames in which the decoder found a barcode",
        )?;
        let frames_replaced = IntGauge::new(
            "bike_critters_frames_replaced",
            "Frames evicted from the decode mailbox before decoding",
        )?;

        let stable_scans_total = IntCounter::new(
            "bike_critters_stable_scans_total",
            "Readings that won a debounce window",
        )?;
        let vote_share = Gauge::new(
            "bike_critters_last_vote_share",
            "Share of readings that agreed with the last stable scan",
        )?;
        let outcomes_total = IntCounterVec::new(
            Opts::new(
                "bike_critters_scan_outcomes_total",
                "Stable scans by store outcome",
            ),
            &["outcome"],
        )?;

        let collection_size = IntGauge::new(
            "bike_critters_collection_size",
            "Collectibles in the session collection",
        )?;

        registry.register(Box::new(frames_total.clone()))?;
        registry.register(Box::new(readings_total.clone()))?;
        registry.register(Box::new(frames_replaced.clone()))?;
        registry.register(Box::new(stable_scans_total.clone()))?;
        registry.register(Box::new(vote_share.clone()))?;
        registry.register(Box::new(outcomes_total.clone()))?;
        registry.register(Box::new(collection_size.clone()))?;

        Ok(Self {
            registry,
            frames_total,
            readings_total,
            frames_replaced,
            stable_scans_total,
            vote_share,
            outcomes_total,
            collection_size,
        })
    }

    /// Counts one decoded frame.
    pub fn record_frame(&self, found_barcode: bool) {
        self.frames_total.inc();
        if found_barcode {
            self.readings_total.inc();
        }
    }

    pub fn set_frames_replaced(&self, replaced: u64) {
        self.frames_replaced.set(replaced as i64);
    }

    /// Counts a stable scan and its vote share.
    pub fn record_stable_scan(&self, votes: usize, total: usize) {
        self.stable_scans_total.inc();
        if total > 0 {
            self.vote_share.set(votes as f64 / total as f64);
        }
    }

    /// Counts a store outcome such as `new` or `leveled_up`.
    pub fn record_outcome(&self, outcome: &str) {
        self.outcomes_total.with_label_values(&[outcome]).inc();
    }

    pub fn set_collection_size(&self, size: usize) {
        self.collection_size.set(size as i64);
    }

    /// Returns how many stable scans ended with `outcome`.
    pub fn outcome_count(&self, outcome: &str) -> u64 {
        self.outcomes_total.with_label_values(&[outcome]).get()
    }

    pub fn frames(&self) -> u64 {
        self.frames_total.get()
    }

    pub fn stable_scans(&self) -> u64 {
        self.stable_scans_total.get()
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_creation() {
        assert!(ScanMetrics::new().is_ok());
    }

    #[test]
    fn test_counters() {
        let metrics = ScanMetrics::new().unwrap();
        metrics.record_frame(true);
        metrics.record_frame(false);
        metrics.record_stable_scan(8, 10);
        metrics.record_outcome("new");
        metrics.record_outcome("new");
        metrics.record_outcome("already_scanned_today");

        assert_eq!(metrics.frames(), 2);
        assert_eq!(metrics.readings_total.get(), 1);
        assert_eq!(metrics.stable_scans(), 1);
        assert_eq!(metrics.outcome_count("new"), 2);
        assert_eq!(metrics.outcome_count("level_capped"), 0);
        assert!((metrics.vote_share.get() - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_encode() {
        let metrics = ScanMetrics::new().unwrap();
        metrics.set_collection_size(3);
        metrics.record_outcome("leveled_up");

        let output = metrics.encode().unwrap();
        assert!(output.contains("bike_critters_collection_size 3"));
        assert!(output.contains("bike_critters_scan_outcomes_total{outcome=\"leveled_up\"} 1"));
    }
}
