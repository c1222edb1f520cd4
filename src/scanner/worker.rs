//! Background barcode decoding.
//!
//! Decoding is the expensive step of a scan, so it runs on its own thread.
//! Frames go in through a single-slot mailbox: if the worker is still busy
//! when a new frame arrives, the waiting frame is replaced, so the newest
//! frame always wins. Results come back over an unbounded queue and are
//! handed out strictly in submission order; anything older than the last
//! delivered result is dropped.

use super::decoder::{BarcodeDecoder, Decoded};
use super::frame::Frame;
use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;

/// How long the worker waits for a frame before rechecking the stop flag.
const IDLE_POLL: Duration = Duration::from_millis(100);

/// Decode worker errors.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("failed to spawn decode thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("decode worker has stopped")]
    Stopped,
}

struct Job {
    ticket: u64,
    frame: Frame,
}

/// A finished decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeResult {
    /// Submission order of the frame.
    pub ticket: u64,
    /// Camera sequence number of the frame.
    pub sequence: u64,
    pub decoded: Option<Decoded>,
}

/// Owns the decode thread.
pub struct DecodeWorker {
    jobs: Option<Sender<Job>>,
    /// Second handle on the mailbox, used to evict a waiting frame.
    mailbox: Receiver<Job>,
    results: Receiver<DecodeResult>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    next_ticket: u64,
    last_delivered: Option<u64>,
    replaced: u64,
}

impl DecodeWorker {
    /// Starts a worker that downscales each frame by `downscale_factor` and
    /// converts it to grayscale before handing it to `decoder`.
    pub fn spawn<D>(mut decoder: D, downscale_factor: u32) -> Result<Self, WorkerError>
    where
        D: BarcodeDecoder + 'static,
    {
        let (job_tx, job_rx) = bounded::<Job>(1);
        let (result_tx, result_rx) = unbounded::<DecodeResult>();
        let running = Arc::new(AtomicBool::new(true));

        let mailbox = job_rx.clone();
        let flag = Arc::clone(&running);
        let handle = thread::Builder::new()
            .name("decode-worker".into())
            .spawn(move || {
                tracing::debug!("Decode worker started");
                while flag.load(Ordering::SeqCst) {
                    match job_rx.recv_timeout(IDLE_POLL) {
                        Ok(job) => {
                            let frame = job.frame.downscale(downscale_factor).to_gray();
                            let result = DecodeResult {
                                ticket: job.ticket,
                                sequence: frame.sequence(),
                                decoded: decoder.decode(&frame),
                            };
                            if result_tx.send(result).is_err() {
                                break;
                            }
                        }
                        Err(RecvTimeoutError::Timeout) => continue,
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                tracing::debug!("Decode worker stopped");
            })
            .map_err(WorkerError::Spawn)?;

        Ok(Self {
            jobs: Some(job_tx),
            mailbox,
            results: result_rx,
            running,
            handle: Some(handle),
            next_ticket: 0,
            last_delivered: None,
            replaced: 0,
        })
    }

    /// Queues a frame for decoding and returns its ticket.
    ///
    /// A frame still waiting in the mailbox is discarded in favour of this one.
    pub fn submit(&mut self, frame: Frame) -> Result<u64, WorkerError> {
        let jobs = self.jobs.as_ref().ok_or(WorkerError::Stopped)?;
        let ticket = self.next_ticket;
        self.next_ticket += 1;

        let mut job = Job { ticket, frame };
        loop {
            match jobs.try_send(job) {
                Ok(()) => return Ok(ticket),
                Err(TrySendError::Full(back)) => {
                    if let Ok(stale) = self.mailbox.try_recv() {
                        self.replaced += 1;
                        tracing::trace!(ticket = stale.ticket, "Replaced waiting frame");
                    }
                    job = back;
                }
                Err(TrySendError::Disconnected(_)) => return Err(WorkerError::Stopped),
            }
        }
    }

    /// Returns finished decodes in submission order without blocking.
    pub fn poll(&mut self) -> Vec<DecodeResult> {
        let mut delivered = Vec::new();
        while let Ok(result) = self.results.try_recv() {
            if let Some(result) = self.accept(result) {
                delivered.push(result);
            }
        }
        delivered
    }

    /// Waits up to `timeout` for the next in-order result.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<DecodeResult> {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            let left = deadline.saturating_duration_since(std::time::Instant::now());
            let result = self.results.recv_timeout(left).ok()?;
            if let Some(result) = self.accept(result) {
                return Some(result);
            }
        }
    }

    fn accept(&mut self, result: DecodeResult) -> Option<DecodeResult> {
        if self.last_delivered.is_some_and(|last| result.ticket <= last) {
            tracing::debug!(ticket = result.ticket, "Dropping out-of-order decode result");
            return None;
        }
        self.last_delivered = Some(result.ticket);
        Some(result)
    }

    /// Frames evicted from the mailbox before they were decoded.
    pub fn replaced_frames(&self) -> u64 {
        self.replaced
    }

    /// Stops the thread and waits for it to exit.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.jobs = None;
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Decode worker panicked");
            }
        }
    }
}

impl Drop for DecodeWorker {
    fn drop(&mut self) {
        self.stop();
    }
}
