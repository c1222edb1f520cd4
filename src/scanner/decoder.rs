//! Barcode decoder seam.
//!
//! A decoder looks at one frame and reports the barcode text it found, if
//! any. Real decoders are external; this module provides the trait plus
//! two deterministic implementations used by tests and the simulator.

use super::frame::Frame;
use crate::codec::CODE_LENGTH;
use rand_chacha::ChaCha8Rng;
use rand_core::{RngCore, SeedableRng};
use std::collections::VecDeque;
use std::fmt;

/// Symbology reported by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BarcodeFormat {
    Ean8,
    Ean13,
    UpcA,
    #[default]
    Code128,
    Itf,
    QrCode,
    Other,
}

impl fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BarcodeFormat::Ean8 => "EAN-8",
            BarcodeFormat::Ean13 => "EAN-13",
            BarcodeFormat::UpcA => "UPC-A",
            BarcodeFormat::Code128 => "Code 128",
            BarcodeFormat::Itf => "ITF",
            BarcodeFormat::QrCode => "QR",
            BarcodeFormat::Other => "other",
        };
        f.write_str(label)
    }
}

/// A successful decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    pub format: BarcodeFormat,
}

impl Decoded {
    pub fn new(text: impl Into<String>, format: BarcodeFormat) -> Self {
        Self {
            text: text.into(),
            format,
        }
    }
}

/// Finds a barcode in a frame.
///
/// Decoders run on the decode worker thread, so they must be `Send`.
pub trait BarcodeDecoder: Send {
    fn decode(&mut self, frame: &Frame) -> Option<Decoded>;
}

impl<D: BarcodeDecoder + ?Sized> BarcodeDecoder for Box<D> {
    fn decode(&mut self, frame: &Frame) -> Option<Decoded> {
        (**self).decode(frame)
    }
}

/// Replays a fixed list of readings, one per frame, then reports nothing.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDecoder {
    script: VecDeque<Option<String>>,
    format: BarcodeFormat,
}

impl ScriptedDecoder {
    pub fn new<I, S>(readings: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            script: readings.into_iter().map(|r| r.map(Into::into)).collect(),
            format: BarcodeFormat::default(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl BarcodeDecoder for ScriptedDecoder {
    fn decode(&mut self, _frame: &Frame) -> Option<Decoded> {
        self.script
            .pop_front()
            .flatten()
            .map(|text| Decoded::new(text, self.format))
    }
}

/// Reading error rates for [`NoisyDecoder`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseProfile {
    /// Share of frames with no reading at all.
    pub miss_rate: f64,
    /// Share of frames whose reading has one wrong digit.
    pub corrupt_rate: f64,
    /// Share of frames whose reading is cut short.
    pub truncate_rate: f64,
}

impl Default for NoiseProfile {
    fn default() -> Self {
        Self {
            miss_rate: 0.2,
            corrupt_rate: 0.1,
            truncate_rate: 0.05,
        }
    }
}

/// Sees the same barcode in every frame but misreads it at seeded rates.
pub struct NoisyDecoder {
    text: String,
    format: BarcodeFormat,
    noise: NoiseProfile,
    rng: ChaCha8Rng,
}

impl NoisyDecoder {
    pub fn new(text: impl Into<String>, noise: NoiseProfile, seed: u64) -> Self {
        Self {
            text: text.into(),
            format: BarcodeFormat::Code128,
            noise,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Uniform sample in `[0, 1)`.
    fn sample(&mut self) -> f64 {
        f64::from(self.rng.next_u32()) / (f64::from(u32::MAX) + 1.0)
    }

    fn corrupt(&mut self) -> String {
        let mut digits: Vec<char> = self.text.chars().collect();
        if digits.is_empty() {
            return String::new();
        }
        let at = self.rng.next_u32() as usize % digits.len();
        let current = digits[at].to_digit(10).unwrap_or(0);
        let shift = 1 + self.rng.next_u32() % 9;
        digits[at] = char::from_digit((current + shift) % 10, 10).unwrap_or('0');
        digits.into_iter().collect()
    }

    fn truncate(&mut self) -> String {
        let keep = self.rng.next_u32() as usize % CODE_LENGTH;
        self.text.chars().take(keep).collect()
    }
}

impl fmt::Debug for NoisyDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoisyDecoder")
            .field("text", &self.text)
            .field("noise", &self.noise)
            .finish()
    }
}

impl BarcodeDecoder for NoisyDecoder {
    fn decode(&mut self, frame: &Frame) -> Option<Decoded> {
        let roll = self.sample();
        let NoiseProfile {
            miss_rate,
            corrupt_rate,
            truncate_rate,
        } = self.noise;

        let text = if roll < miss_rate {
            tracing::trace!(sequence = frame.sequence(), "Simulated miss");
            return None;
        } else if roll < miss_rate + corrupt_rate {
            self.corrupt()
        } else if roll < miss_rate + corrupt_rate + truncate_rate {
            self.truncate()
        } else {
            self.text.clone()
        };
        Some(Decoded::new(text, self.format))
    }
}
