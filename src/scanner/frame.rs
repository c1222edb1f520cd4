//! Camera frames handed to the barcode decoder.

use std::time::Instant;

/// Pixel layout of a frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// One luminance byte per pixel.
    Gray8,
    /// Four bytes per pixel, red first.
    Rgba8,
}

impl PixelFormat {
    #[inline]
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Rgba8 => 4,
        }
    }
}

/// A single captured frame.
#[derive(Clone)]
pub struct Frame {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    format: PixelFormat,
    timestamp: Instant,
    /// Monotonic sequence number assigned by the camera.
    sequence: u64,
}

impl Frame {
    /// Creates a frame stamped with the current time.
    pub fn new(
        pixels: Vec<u8>,
        width: u32,
        height: u32,
        format: PixelFormat,
        sequence: u64,
    ) -> Self {
        Self {
            pixels,
            width,
            height,
            format,
            timestamp: Instant::now(),
            sequence,
        }
    }

    /// Creates a grayscale frame.
    pub fn gray(pixels: Vec<u8>, width: u32, height: u32, sequence: u64) -> Self {
        Self::new(pixels, width, height, PixelFormat::Gray8, sequence)
    }

    /// Returns a reference to the raw pixel data.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns the frame width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the frame height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the pixel layout.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Returns the capture timestamp.
    #[inline]
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    /// Returns the sequence number.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns the total number of pixels (width * height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Returns true if the buffer size matches the dimensions and format.
    pub fn is_valid(&self) -> bool {
        self.pixels.len() == self.pixel_count() * self.format.bytes_per_pixel()
    }

    /// Converts to grayscale using integer Rec. 601 luma weights.
    pub fn to_gray(&self) -> Frame {
        let pixels = match self.format {
            PixelFormat::Gray8 => self.pixels.clone(),
            PixelFormat::Rgba8 => self
                .pixels
                .chunks_exact(4)
                .map(|px| {
                    let luma =
                        299 * u32::from(px[0]) + 587 * u32::from(px[1]) + 114 * u32::from(px[2]);
                    (luma / 1000) as u8
                })
                .collect(),
        };
        Frame {
            pixels,
            format: PixelFormat::Gray8,
            ..self.clone()
        }
    }

    /// Keeps every `factor`-th pixel in each direction.
    ///
    /// Decoding a smaller frame is cheaper; a factor of 1 returns a copy.
    pub fn downscale(&self, factor: u32) -> Frame {
        if factor <= 1 || !self.is_valid() {
            return self.clone();
        }
        let bpp = self.format.bytes_per_pixel();
        let width = self.width.div_ceil(factor);
        let height = self.height.div_ceil(factor);
        let row_bytes = self.width as usize * bpp;

        let mut pixels = Vec::with_capacity(width as usize * height as usize * bpp);
        for y in (0..self.height as usize).step_by(factor as usize) {
            let row = &self.pixels[y * row_bytes..(y + 1) * row_bytes];
            for x in (0..self.width as usize).step_by(factor as usize) {
                pixels.extend_from_slice(&row[x * bpp..(x + 1) * bpp]);
            }
        }

        Frame {
            pixels,
            width,
            height,
            format: self.format,
            timestamp: self.timestamp,
            sequence: self.sequence,
        }
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("sequence", &self.sequence)
            .field("pixel_bytes", &self.pixels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let frame = Frame::gray(vec![0u8; 640 * 480], 640, 480, 1);
        assert_eq!(frame.width(), 640);
        assert_eq!(frame.height(), 480);
        assert_eq!(frame.sequence(), 1);
        assert!(frame.is_valid());
    }

    #[test]
    fn test_rgba_size_check() {
        let frame = Frame::new(vec![0u8; 4 * 4], 2, 2, PixelFormat::Rgba8, 1);
        assert!(frame.is_valid());
        let short = Frame::new(vec![0u8; 4], 2, 2, PixelFormat::Rgba8, 1);
        assert!(!short.is_valid());
    }

    #[test]
    fn test_to_gray() {
        let pixels = vec![255, 255, 255, 255, 0, 0, 0, 255];
        let frame = Frame::new(pixels, 2, 1, PixelFormat::Rgba8, 3);
        let gray = frame.to_gray();
        assert_eq!(gray.format(), PixelFormat::Gray8);
        assert_eq!(gray.pixels(), &[255, 0]);
        assert_eq!(gray.sequence(), 3);
    }

    #[test]
    fn test_downscale() {
        let pixels: Vec<u8> = (0..25).collect();
        let frame = Frame::gray(pixels, 5, 5, 1);
        let small = frame.downscale(2);
        assert_eq!((small.width(), small.height()), (3, 3));
        assert_eq!(small.pixels(), &[0, 2, 4, 10, 12, 14, 20, 22, 24]);
        assert!(small.is_valid());
    }
}
