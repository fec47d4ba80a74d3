use tracing::debug;

use crate::{
    effects::{
        geometry::{fade, resize_to, scaled_crop_or_pad, translate},
        Effect,
    },
    error::{EffectError, Result},
    video::types::Frame,
};

/// Fixed zoom used by both pan effects
const PAN_ZOOM: f64 = 1.2;

/// Position of one frame inside a sequence.
///
/// Most effects only need the normalized progress, but the fades hold for a
/// whole second at one end and so need the raw index, total and frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameClock {
    pub index: u64,
    pub total: u64,
    pub fps: u32,
}

impl FrameClock {
    pub fn new(index: u64, total: u64, fps: u32) -> Self {
        Self { index, total, fps }
    }

    /// Normalized progress `index / total`; never reaches 1.0 inside a sequence
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.index as f64 / self.total as f64
    }

    /// Opacity for fade-in: ramps with progress during the first second,
    /// then holds at 1.0.
    pub fn fade_in_alpha(&self) -> f64 {
        if (self.index as i128) < self.fps as i128 {
            self.progress()
        } else {
            1.0
        }
    }

    /// Opacity for fade-out: 1.0 until the final second, then
    /// `(total - index) / fps`.
    pub fn fade_out_alpha(&self) -> f64 {
        let index = self.index as i128;
        let total = self.total as i128;
        let fps = self.fps as i128;

        if index < total - fps {
            1.0
        } else {
            (total - index) as f64 / self.fps as f64
        }
    }
}

/// Everything needed to render one frame
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub source: &'a Frame,
    pub effect: Effect,
    pub clock: FrameClock,
    pub target_width: u32,
    pub target_height: u32,
}

impl<'a> RenderRequest<'a> {
    /// Request a frame the same size as the source
    pub fn new(source: &'a Frame, effect: Effect, clock: FrameClock) -> Self {
        Self {
            source,
            effect,
            clock,
            target_width: source.width(),
            target_height: source.height(),
        }
    }

    pub fn with_target(mut self, width: u32, height: u32) -> Self {
        self.target_width = width;
        self.target_height = height;
        self
    }

    pub fn render(&self) -> Result<Frame> {
        render_frame(
            self.source,
            self.effect,
            self.clock,
            self.target_width,
            self.target_height,
        )
    }
}

/// Render a single frame of `effect` at the position given by `clock`.
///
/// The result always measures exactly `target_width` x `target_height`; if
/// a transform comes out a different size it is resized to fit. Offsets are
/// truncated toward zero before use as pixel coordinates.
pub fn render_frame(
    image: &Frame,
    effect: Effect,
    clock: FrameClock,
    target_width: u32,
    target_height: u32,
) -> Result<Frame> {
    if image.is_empty() {
        return Err(EffectError::EmptyImage {
            width: image.width(),
            height: image.height(),
        }
        .into());
    }
    if target_width == 0 || target_height == 0 {
        return Err(EffectError::EmptyImage {
            width: target_width,
            height: target_height,
        }
        .into());
    }

    let t = clock.progress();
    let width = image.width() as f64;
    let height = image.height() as f64;

    let frame = match effect {
        Effect::ZoomIn => scaled_crop_or_pad(image, 1.0 + 0.5 * t)?,
        Effect::ZoomOut => scaled_crop_or_pad(image, 1.5 - 0.5 * t)?,
        Effect::FadeIn => fade(image, clock.fade_in_alpha()),
        Effect::FadeOut => fade(image, clock.fade_out_alpha()),
        Effect::SlideLeft => {
            let dx = (-width + width * t) as i64;
            translate(image, dx, 0)
        }
        Effect::SlideRight => {
            let dx = (width - width * t) as i64;
            translate(image, dx, 0)
        }
        Effect::PanLeftToRight => {
            let zoomed = scaled_crop_or_pad(image, PAN_ZOOM)?;
            let dx = (-0.1 * width + 0.2 * width * t) as i64;
            translate(&zoomed, dx, 0)
        }
        Effect::PanRightToLeft => {
            let zoomed = scaled_crop_or_pad(image, PAN_ZOOM)?;
            let dx = (0.1 * width - 0.2 * width * t) as i64;
            translate(&zoomed, dx, 0)
        }
        Effect::KenBurns => {
            let dx = (0.05 * width * t) as i64;
            let dy = (0.05 * height * t) as i64;
            let zoomed = scaled_crop_or_pad(image, 1.0 + 0.3 * t)?;
            translate(&zoomed, dx, dy)
        }
    };

    if frame.dimensions() != (target_width, target_height) {
        debug!(
            "Resizing {} output from {}x{} to {}x{}",
            effect,
            frame.width(),
            frame.height(),
            target_width,
            target_height
        );
        return Ok(resize_to(&frame, target_width, target_height));
    }

    Ok(frame)
}
