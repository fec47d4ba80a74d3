//! Geometric and photometric primitives shared by all effects.
//!
//! Every function here takes a frame by reference and returns a fresh frame
//! of the same size, except [`resize_to`] which exists to change the size.

use image::imageops::{self, FilterType};
use image::RgbImage;

use crate::{
    error::{EffectError, Result},
    video::types::Frame,
};

/// Resampling filter for all scaling. Bilinear, matching the look of the
/// usual video-tool default rather than a sharper Lanczos.
const RESAMPLE_FILTER: FilterType = FilterType::Triangle;

/// Resize a frame to exactly `width` x `height`.
///
/// A request for the frame's current size returns an untouched copy.
pub fn resize_to(frame: &Frame, width: u32, height: u32) -> Frame {
    if frame.dimensions() == (width, height) {
        return frame.clone();
    }
    Frame::new(imageops::resize(frame.as_image(), width, height, RESAMPLE_FILTER))
}

/// Scale the frame uniformly, then center-crop (`scale >= 1`) or center-pad
/// with black (`scale < 1`) back to the original size.
///
/// Scaled sizes are truncated toward zero. Centering uses integer division,
/// so an odd excess puts the extra pixel on the right/bottom side.
pub fn scaled_crop_or_pad(frame: &Frame, scale: f64) -> Result<Frame> {
    let (width, height) = frame.dimensions();
    if frame.is_empty() {
        return Err(EffectError::EmptyImage { width, height }.into());
    }

    let new_width = (width as f64 * scale) as u32;
    let new_height = (height as f64 * scale) as u32;
    if !scale.is_finite() || new_width == 0 || new_height == 0 {
        return Err(EffectError::DegenerateScale { scale, width, height }.into());
    }

    let resized = resize_to(frame, new_width, new_height);

    if scale >= 1.0 {
        let x_start = new_width.saturating_sub(width) / 2;
        let y_start = new_height.saturating_sub(height) / 2;
        let cropped = imageops::crop_imm(resized.as_image(), x_start, y_start, width, height)
            .to_image();
        Ok(Frame::new(cropped))
    } else {
        let mut canvas = RgbImage::new(width, height);
        let x_offset = width.saturating_sub(new_width) / 2;
        let y_offset = height.saturating_sub(new_height) / 2;
        imageops::replace(&mut canvas, resized.as_image(), x_offset as i64, y_offset as i64);
        Ok(Frame::new(canvas))
    }
}

/// Shift frame content by whole pixels. Content pushed past an edge is lost
/// and the uncovered area is black.
pub fn translate(frame: &Frame, dx: i64, dy: i64) -> Frame {
    let mut out = RgbImage::new(frame.width(), frame.height());
    imageops::replace(&mut out, frame.as_image(), dx, dy);
    Frame::new(out)
}

/// Multiply every channel by `alpha`, truncating and clamping to `0..=255`.
pub fn fade(frame: &Frame, alpha: f64) -> Frame {
    let bytes = frame
        .as_rgb_bytes()
        .iter()
        .map(|&channel| (channel as f64 * alpha).clamp(0.0, 255.0) as u8)
        .collect();

    // Same length as the source buffer, so this cannot fail.
    Frame::from_rgb_bytes(frame.width(), frame.height(), bytes)
        .unwrap_or_else(|| Frame::new_black(frame.width(), frame.height()))
}
