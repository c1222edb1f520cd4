//! Camera frames, barcode decoding and scan debouncing.
//!
//! Frames come from a [`Camera`], are decoded off-thread by a
//! [`DecodeWorker`], and the per-frame readings are filtered by a
//! [`ScanDebouncer`] into stable scans.

mod camera;
mod debouncer;
mod decoder;
mod frame;
mod worker;

pub use camera::{Camera, CameraError, CaptureConfig, CaptureConfigError, MockCamera};
pub use debouncer::{
    DebounceConfig, DebounceConfigError, DebounceState, ScanDebouncer, StableScan,
};
pub use decoder::{
    BarcodeDecoder, BarcodeFormat, Decoded, NoiseProfile, NoisyDecoder, ScriptedDecoder,
};
pub use frame::{Frame, PixelFormat};
pub use worker::{DecodeResult, DecodeWorker, WorkerError};
