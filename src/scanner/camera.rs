//! Camera abstraction and capture configuration.
//!
//! The camera is only a frame source. Real hardware sits behind the
//! [`Camera`] trait; [`MockCamera`] produces synthetic frames for tests
//! and the simulator.

use super::frame::{Frame, PixelFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Capture settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub device_id: u32,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Frames are downscaled by this factor before decoding.
    pub downscale_factor: u32,
    pub grayscale: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device_id: 0,
            width: 640,
            height: 480,
            fps: 30,
            downscale_factor: 2,
            grayscale: true,
        }
    }
}

impl CaptureConfig {
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Time between frames.
    pub fn frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / f64::from(self.fps.max(1)))
    }

    pub fn validate(&self) -> Result<(), CaptureConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(CaptureConfigError::InvalidDimensions);
        }
        if self.fps == 0 || self.fps > 120 {
            return Err(CaptureConfigError::InvalidFrameRate);
        }
        if self.downscale_factor == 0 || self.downscale_factor > self.width.min(self.height) {
            return Err(CaptureConfigError::InvalidDownscale(self.downscale_factor));
        }
        Ok(())
    }
}

/// Capture configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureConfigError {
    #[error("invalid frame dimensions")]
    InvalidDimensions,
    #[error("invalid frame rate (must be 1-120 fps)")]
    InvalidFrameRate,
    #[error("invalid downscale factor {0}")]
    InvalidDownscale(u32),
}

/// Camera errors.
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("failed to configure camera: {0}")]
    ConfigFailed(#[from] CaptureConfigError),
    #[error("failed to capture frame: {0}")]
    CaptureFailed(String),
    #[error("camera not initialized")]
    NotInitialized,
}

/// A source of frames.
pub trait Camera {
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError>;

    fn capture(&mut self) -> Result<Frame, CameraError>;

    fn is_open(&self) -> bool;

    fn close(&mut self);
}

/// Camera that produces synthetic gradient frames.
#[derive(Debug, Default)]
pub struct MockCamera {
    config: Option<CaptureConfig>,
    sequence: u64,
}

impl MockCamera {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Camera for MockCamera {
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError> {
        config.validate()?;
        self.config = Some(config.clone());
        self.sequence = 0;
        tracing::info!(
            width = config.width,
            height = config.height,
            fps = config.fps,
            "MockCamera opened"
        );
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, CameraError> {
        let config = self.config.as_ref().ok_or(CameraError::NotInitialized)?;

        let format = if config.grayscale {
            PixelFormat::Gray8
        } else {
            PixelFormat::Rgba8
        };
        let len = (config.width * config.height) as usize * format.bytes_per_pixel();
        let shift = self.sequence;
        let pixels: Vec<u8> = (0..len).map(|i| ((i as u64 + shift) % 256) as u8).collect();

        self.sequence += 1;
        Ok(Frame::new(
            pixels,
            config.width,
            config.height,
            format,
            self.sequence,
        ))
    }

    fn is_open(&self) -> bool {
        self.config.is_some()
    }

    fn close(&mut self) {
        self.config = None;
        tracing::info!("MockCamera closed");
    }
}
