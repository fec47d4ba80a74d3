use image::{ImageBuffer, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single RGB image, used both for the decoded source and for every
/// rendered output frame.
///
/// Frames are treated as immutable values by the effect engine: every
/// transform builds a new `Frame` and leaves its input untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    buffer: RgbImage,
}

impl Frame {
    /// Create a new frame from an RGB image buffer
    pub fn new(buffer: RgbImage) -> Self {
        Self { buffer }
    }

    /// Create a new frame with the given dimensions filled with black
    pub fn new_black(width: u32, height: u32) -> Self {
        Self {
            buffer: ImageBuffer::new(width, height),
        }
    }

    /// Create a new frame with the given dimensions filled with the specified color
    pub fn new_filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let buffer = ImageBuffer::from_pixel(width, height, Rgb(color));
        Self { buffer }
    }

    /// Create a frame whose pixels are computed from their coordinates
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> [u8; 3],
    {
        let buffer = ImageBuffer::from_fn(width, height, |x, y| Rgb(f(x, y)));
        Self { buffer }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    /// True when the frame has no pixels at all
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Get a pixel at the given coordinates (returns RGB array)
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.buffer.get_pixel(x, y).0
    }

    /// Get the underlying image buffer
    pub fn as_image(&self) -> &RgbImage {
        &self.buffer
    }

    /// Raw interleaved RGB bytes, row-major, three bytes per pixel
    pub fn as_rgb_bytes(&self) -> &[u8] {
        self.buffer.as_raw()
    }

    /// Create a frame from raw RGB bytes
    pub fn from_rgb_bytes(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        ImageBuffer::from_raw(width, height, data).map(|buffer| Self { buffer })
    }

    /// Save the frame as a PNG file
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), image::ImageError> {
        self.buffer
            .save_with_format(path, image::ImageFormat::Png)
    }
}

/// Encoding parameters handed to a frame sink
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoParams {
    /// Output frame rate
    pub fps: u32,

    /// Frame size (width, height); every submitted frame must match
    pub resolution: (u32, u32),

    /// Video codec passed to the encoder
    pub codec: String,

    /// Quality setting (0-100, higher is better)
    pub quality: u8,
}

impl VideoParams {
    pub fn new(fps: u32, width: u32, height: u32) -> Self {
        Self {
            fps,
            resolution: (width, height),
            ..Self::default()
        }
    }

    /// Map the 0-100 quality scale onto x264's CRF range (0 best, 51 worst)
    pub fn crf(&self) -> u8 {
        (51 - ((self.quality.min(100) as f32 / 100.0) * 51.0) as u8).clamp(0, 51)
    }
}

impl Default for VideoParams {
    fn default() -> Self {
        Self {
            fps: 30,
            resolution: (1920, 1080),
            codec: "libx264".to_string(),
            quality: 85,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_black_is_zeroed() {
        let frame = Frame::new_black(4, 3);
        assert_eq!(frame.dimensions(), (4, 3));
        assert!(frame.as_rgb_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_from_rgb_bytes_rejects_short_buffers() {
        assert!(Frame::from_rgb_bytes(2, 2, vec![0; 11]).is_none());
        assert!(Frame::from_rgb_bytes(2, 2, vec![0; 12]).is_some());
    }

    #[test]
    fn test_quality_to_crf() {
        let mut params = VideoParams::default();
        params.quality = 100;
        assert_eq!(params.crf(), 0);
        params.quality = 0;
        assert_eq!(params.crf(), 51);
    }
}
