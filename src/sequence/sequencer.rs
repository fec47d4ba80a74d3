use std::ops::ControlFlow;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::{
    effects::{render_frame, Effect, FrameClock},
    error::{MotionError, Result, SequenceError},
    video::{sink::FrameSink, types::Frame},
};

/// Progress report emitted after each frame reaches the sink
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceProgress {
    pub frame_index: u64,
    pub total_frames: u64,
}

impl SequenceProgress {
    /// Percentage of frames submitted, `(index + 1) / total * 100`
    pub fn percent(&self) -> f64 {
        (self.frame_index + 1) as f64 / self.total_frames as f64 * 100.0
    }
}

/// Outcome of a completed sequence
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceSummary {
    pub effect: Effect,
    pub frames_written: u64,
    pub fps: u32,
    pub resolution: (u32, u32),
}

impl SequenceSummary {
    /// Playback length of the written frames in seconds
    pub fn duration_secs(&self) -> f64 {
        self.frames_written as f64 / self.fps as f64
    }
}

/// Drives the effect engine over every frame of a clip and feeds the
/// results, in order, to a [`FrameSink`].
///
/// The frame count is `int(fps * duration)` and frame `i` is rendered at
/// progress `i / total`, so the last frame stops just short of the effect's
/// end state.
#[derive(Debug, Clone)]
pub struct FrameSequencer {
    effect: Effect,
    duration: f64,
    fps: u32,
    threads: usize,
}

impl FrameSequencer {
    pub fn new(effect: Effect, duration: f64, fps: u32) -> Self {
        Self {
            effect,
            duration,
            fps,
            threads: 1,
        }
    }

    /// Render up to `threads` frames at a time in parallel. Frames still
    /// reach the sink strictly in order.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// Number of frames in the sequence, truncating `fps * duration`
    pub fn total_frames(&self) -> u64 {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return 0;
        }
        (self.fps as f64 * self.duration) as u64
    }

    /// Clock for frame `index` of this sequence
    pub fn clock(&self, index: u64) -> FrameClock {
        FrameClock::new(index, self.total_frames(), self.fps)
    }

    /// Check parameters against a source image, returning the frame count
    pub fn validate(&self, image: &Frame) -> Result<u64> {
        if self.fps == 0 {
            return Err(invalid("fps must be greater than zero"));
        }
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(invalid(format!("duration must be a positive number of seconds, got {}", self.duration)));
        }
        if image.is_empty() {
            return Err(invalid(format!("source image is empty ({}x{})", image.width(), image.height())));
        }

        let total = self.total_frames();
        if total == 0 {
            return Err(invalid(format!(
                "{}s at {} fps produces no frames",
                self.duration, self.fps
            )));
        }
        Ok(total)
    }

    /// Render the whole sequence into `sink` and finalize it
    pub fn run<S: FrameSink + ?Sized>(&self, image: &Frame, sink: &mut S) -> Result<SequenceSummary> {
        self.run_with_progress(image, sink, |_| ControlFlow::Continue(()))
    }

    /// Like [`run`](Self::run), reporting progress after every frame.
    ///
    /// Returning `ControlFlow::Break` from `on_progress` cancels the sequence
    /// before the next frame; the sink is aborted and
    /// [`SequenceError::Cancelled`] returned. Any sink error likewise aborts
    /// the sink and is returned unchanged; no later frame is submitted.
    pub fn run_with_progress<S, F>(
        &self,
        image: &Frame,
        sink: &mut S,
        mut on_progress: F,
    ) -> Result<SequenceSummary>
    where
        S: FrameSink + ?Sized,
        F: FnMut(SequenceProgress) -> ControlFlow<()>,
    {
        let total = self.validate(image)?;

        info!(
            "Rendering {} frames of {} ({}x{} @ {} fps)",
            total,
            self.effect,
            image.width(),
            image.height(),
            self.fps
        );

        let outcome = self
            .generate(image, sink, total, &mut on_progress)
            .and_then(|()| sink.finish());

        if let Err(e) = outcome {
            if e.is_cancelled() {
                info!("Sequence cancelled after {} frames", sink.frames_written());
            } else {
                warn!("Sequence failed after {} frames: {}", sink.frames_written(), e);
            }
            sink.abort();
            return Err(e);
        }

        Ok(SequenceSummary {
            effect: self.effect,
            frames_written: total,
            fps: self.fps,
            resolution: image.dimensions(),
        })
    }

    fn generate<S, F>(
        &self,
        image: &Frame,
        sink: &mut S,
        total: u64,
        on_progress: &mut F,
    ) -> Result<()>
    where
        S: FrameSink + ?Sized,
        F: FnMut(SequenceProgress) -> ControlFlow<()>,
    {
        let pool = if self.threads > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.threads)
                .build()
                .map_err(|e| MotionError::generic(format!("failed to start render threads: {}", e)))?;
            Some(pool)
        } else {
            None
        };

        let window = self.threads as u64;
        let mut start = 0;

        while start < total {
            let end = (start + window).min(total);

            let frames = match &pool {
                Some(pool) => pool.install(|| {
                    (start..end)
                        .into_par_iter()
                        .map(|index| self.render_one(image, index, total))
                        .collect::<Result<Vec<_>>>()
                })?,
                None => vec![self.render_one(image, start, total)?],
            };

            for (index, frame) in (start..end).zip(frames.iter()) {
                sink.write_frame(frame)?;
                debug!("Submitted frame {}/{}", index + 1, total);

                let progress = SequenceProgress {
                    frame_index: index,
                    total_frames: total,
                };
                if on_progress(progress).is_break() {
                    return Err(SequenceError::Cancelled {
                        frames_written: index + 1,
                    }
                    .into());
                }
            }

            start = end;
        }

        Ok(())
    }

    fn render_one(&self, image: &Frame, index: u64, total: u64) -> Result<Frame> {
        let clock = FrameClock::new(index, total, self.fps);
        render_frame(image, self.effect, clock, image.width(), image.height())
    }
}

fn invalid<S: Into<String>>(details: S) -> MotionError {
    SequenceError::InvalidParameters {
        details: details.into(),
    }
    .into()
}
