//! Majority-vote filter over per-frame decoder readings.
//!
//! A live decoder misreads frames now and then. The debouncer collects
//! readings for a fixed scan window, emits the most frequent one, then
//! sits in a cooldown so the same barcode is not committed twice in a row.
//!
//! ```text
//! Searching --valid reading--> Scanning --window elapsed--> Cooldown
//!     ^                                                        |
//!     +------------------- cooldown elapsed -------------------+
//! ```

use crate::codec::CODE_LENGTH;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Debouncer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
    /// Length of the voting window in seconds.
    pub scan_length_secs: f32,
    /// Pause after an emitted scan in seconds.
    pub cooldown_secs: f32,
    /// Readings with fewer characters are discarded.
    pub min_length: usize,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            scan_length_secs: 1.0,
            cooldown_secs: 2.0,
            min_length: CODE_LENGTH,
        }
    }
}

/// Debouncer configuration errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DebounceConfigError {
    #[error("scan length must be a positive number of seconds, got {0}")]
    InvalidScanLength(f32),
    #[error("cooldown must be a non-negative number of seconds, got {0}")]
    InvalidCooldown(f32),
    #[error("minimum reading length must be at least 1")]
    InvalidMinLength,
}

impl DebounceConfig {
    pub fn validate(&self) -> Result<(), DebounceConfigError> {
        if !self.scan_length_secs.is_finite() || self.scan_length_secs <= 0.0 {
            return Err(DebounceConfigError::InvalidScanLength(self.scan_length_secs));
        }
        if !self.cooldown_secs.is_finite() || self.cooldown_secs < 0.0 {
            return Err(DebounceConfigError::InvalidCooldown(self.cooldown_secs));
        }
        if self.min_length == 0 {
            return Err(DebounceConfigError::InvalidMinLength);
        }
        Ok(())
    }

    pub fn scan_length(&self) -> Duration {
        Duration::try_from_secs_f32(self.scan_length_secs).unwrap_or_default()
    }

    pub fn cooldown(&self) -> Duration {
        Duration::try_from_secs_f32(self.cooldown_secs).unwrap_or_default()
    }
}

/// Debouncer states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    /// Waiting for the first valid reading. No timer runs.
    Searching,
    /// Collecting readings until the scan window closes.
    Scanning,
    /// Ignoring readings until the cooldown ends.
    Cooldown,
}

/// The reading that won a scan window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StableScan {
    pub text: String,
    /// Readings that agreed with `text`.
    pub votes: usize,
    /// Readings collected in the window.
    pub total: usize,
}

/// Frame-driven debounce state machine.
#[derive(Debug)]
pub struct ScanDebouncer {
    config: DebounceConfig,
    state: DebounceState,
    remaining: Duration,
    readings: Vec<String>,
    enabled: bool,
}

impl ScanDebouncer {
    pub fn new(config: DebounceConfig) -> Self {
        Self {
            config,
            state: DebounceState::Searching,
            remaining: Duration::ZERO,
            readings: Vec::new(),
            enabled: true,
        }
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Time left on the current timer.
    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Readings collected in the current window.
    pub fn buffered(&self) -> usize {
        self.readings.len()
    }

    /// Turns scanning on or off. Turning it off resets to `Searching`.
    pub fn set_scanning_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.reset();
        }
        self.enabled = enabled;
    }

    /// Force-stops any window or cooldown.
    pub fn reset(&mut self) {
        self.state = DebounceState::Searching;
        self.remaining = Duration::ZERO;
        self.readings.clear();
    }

    /// Feeds the decoder output for one frame.
    pub fn observe(&mut self, reading: Option<&str>) {
        let Some(text) = reading else {
            return;
        };
        if !self.enabled {
            return;
        }
        if text.chars().count() < self.config.min_length {
            tracing::trace!(len = text.len(), "Discarding short reading");
            return;
        }

        match self.state {
            DebounceState::Searching => {
                self.readings.clear();
                self.readings.push(text.to_owned());
                self.remaining = self.config.scan_length();
                self.state = DebounceState::Scanning;
                tracing::debug!(reading = text, "Scan window opened");
            }
            DebounceState::Scanning => self.readings.push(text.to_owned()),
            DebounceState::Cooldown => {}
        }
    }

    /// Advances the timers by `dt` and returns a result when a window closes.
    pub fn advance(&mut self, dt: Duration) -> Option<StableScan> {
        match self.state {
            DebounceState::Searching => None,
            DebounceState::Scanning => {
                self.remaining = self.remaining.saturating_sub(dt);
                if !self.remaining.is_zero() {
                    return None;
                }
                let result = majority(&self.readings);
                self.readings.clear();
                self.state = DebounceState::Cooldown;
                self.remaining = self.config.cooldown();
                if let Some(scan) = &result {
                    tracing::info!(
                        reading = %scan.text,
                        votes = scan.votes,
                        total = scan.total,
                        "Scan stabilized"
                    );
                }
                result
            }
            DebounceState::Cooldown => {
                self.remaining = self.remaining.saturating_sub(dt);
                if self.remaining.is_zero() {
                    self.state = DebounceState::Searching;
                    tracing::debug!("Cooldown finished");
                }
                None
            }
        }
    }

    /// Observes one frame's reading and then advances by `dt`.
    pub fn step(&mut self, reading: Option<&str>, dt: Duration) -> Option<StableScan> {
        self.observe(reading);
        self.advance(dt)
    }
}

impl Default for ScanDebouncer {
    fn default() -> Self {
        Self::new(DebounceConfig::default())
    }
}

/// Most frequent reading. Ties go to the reading seen first.
fn majority(readings: &[String]) -> Option<StableScan> {
    let mut tallies: Vec<(&str, usize)> = Vec::new();
    for reading in readings {
        match tallies.iter_mut().find(|(text, _)| *text == reading.as_str()) {
            Some((_, count)) => *count += 1,
            None => tallies.push((reading.as_str(), 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (text, count) in tallies {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((text, count));
        }
    }

    best.map(|(text, votes)| StableScan {
        text: text.to_owned(),
        votes,
        total: readings.len(),
    })
}
