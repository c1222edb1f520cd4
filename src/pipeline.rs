//! Frame-driven scan pipeline.
//!
//! Wires decoder readings through the [`ScanDebouncer`] into the
//! [`CollectibleStore`]. Everything here runs on the caller's thread; only
//! decoding happens on the [`DecodeWorker`] thread.
//!
//! Store failures never stop the loop. They are logged, counted, and the
//! scan is treated as ignored.

use crate::metrics::ScanMetrics;
use crate::scanner::{Camera, CameraError, Decoded, DecodeWorker, ScanDebouncer, WorkerError};
use crate::store::{CollectibleStore, RecordStore, ScanEvent};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;

/// Errors that end a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("camera error: {0}")]
    Camera(#[from] CameraError),
    #[error("decode worker error: {0}")]
    Worker(#[from] WorkerError),
}

/// Limits for [`ScanPipeline::run`].
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Stop after this many frames. `None` runs until stopped.
    pub max_frames: Option<u64>,
    /// Simulated time between frames.
    pub frame_interval: Duration,
    /// How long to wait for a decode result each frame.
    pub result_timeout: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_frames: None,
            frame_interval: Duration::from_millis(33),
            result_timeout: Duration::from_millis(33),
        }
    }
}

/// What a run produced.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub frames: u64,
    pub events: Vec<ScanEvent>,
}

/// Debouncer plus store, driven one frame at a time.
pub struct ScanPipeline<R: RecordStore> {
    debouncer: ScanDebouncer,
    store: CollectibleStore<R>,
    level_increment: u32,
    metrics: Option<ScanMetrics>,
}

impl<R: RecordStore> ScanPipeline<R> {
    pub fn new(debouncer: ScanDebouncer, store: CollectibleStore<R>, level_increment: u32) -> Self {
        Self {
            debouncer,
            store,
            level_increment,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: ScanMetrics) -> Self {
        metrics.set_collection_size(self.store.collection().len());
        self.metrics = Some(metrics);
        self
    }

    pub fn store(&self) -> &CollectibleStore<R> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut CollectibleStore<R> {
        &mut self.store
    }

    pub fn debouncer(&self) -> &ScanDebouncer {
        &self.debouncer
    }

    pub fn debouncer_mut(&mut self) -> &mut ScanDebouncer {
        &mut self.debouncer
    }

    pub fn metrics(&self) -> Option<&ScanMetrics> {
        self.metrics.as_ref()
    }

    /// Handles one frame's decoder output at the current time.
    pub fn on_frame(&mut self, reading: Option<&Decoded>, dt: Duration) -> Option<ScanEvent> {
        self.on_frame_at(reading, dt, Utc::now())
    }

    /// Handles one frame's decoder output, stamping any scan with `now`.
    ///
    /// Returns the store event when a debounce window closes.
    pub fn on_frame_at(
        &mut self,
        reading: Option<&Decoded>,
        dt: Duration,
        now: DateTime<Utc>,
    ) -> Option<ScanEvent> {
        if let Some(metrics) = &self.metrics {
            metrics.record_frame(reading.is_some());
        }

        let stable = self
            .debouncer
            .step(reading.map(|d| d.text.as_str()), dt)?;
        if let Some(metrics) = &self.metrics {
            metrics.record_stable_scan(stable.votes, stable.total);
        }

        match self.store.scan_at(&stable.text, self.level_increment, now) {
            Ok(event) => {
                tracing::info!(
                    reading = %stable.text,
                    outcome = event.kind(),
                    "Scan processed"
                );
                if let Some(metrics) = &self.metrics {
                    metrics.record_outcome(event.kind());
                    metrics.set_collection_size(self.store.collection().len());
                }
                Some(event)
            }
            Err(e) => {
                tracing::error!(reading = %stable.text, error = %e, "Scan ignored");
                if let Some(metrics) = &self.metrics {
                    metrics.record_outcome("failed");
                }
                None
            }
        }
    }

    /// Captures frames, decodes them on `worker` and feeds the results
    /// through the pipeline until `stop` is set or the frame limit is hit.
    pub fn run<C: Camera>(
        &mut self,
        camera: &mut C,
        worker: &mut DecodeWorker,
        options: &RunOptions,
        stop: &AtomicBool,
    ) -> Result<RunSummary, PipelineError> {
        let mut summary = RunSummary::default();

        while !stop.load(Ordering::SeqCst) {
            if options.max_frames.is_some_and(|max| summary.frames >= max) {
                break;
            }

            let frame = camera.capture()?;
            worker.submit(frame)?;
            summary.frames += 1;

            let mut results = Vec::new();
            if let Some(first) = worker.recv_timeout(options.result_timeout) {
                results.push(first);
            }
            results.extend(worker.poll());

            if results.is_empty() {
                summary.events.extend(self.on_frame(None, options.frame_interval));
            }
            for (i, result) in results.iter().enumerate() {
                let dt = if i == 0 {
                    options.frame_interval
                } else {
                    Duration::ZERO
                };
                summary
                    .events
                    .extend(self.on_frame(result.decoded.as_ref(), dt));
            }

            if let Some(metrics) = &self.metrics {
                metrics.set_frames_replaced(worker.replaced_frames());
            }
        }

        tracing::info!(
            frames = summary.frames,
            events = summary.events.len(),
            "Pipeline run finished"
        );
        Ok(summary)
    }
}
