//! # Still-Motion
//!
//! Turn a single still image into a short video clip with a motion effect.
//!
//! The crate renders each frame of the clip from the source image with one
//! of nine effects (zoom, fade, slide, pan and Ken Burns) and streams the
//! frames, in order, into a frame sink such as an `ffmpeg` encoder or a PNG
//! sequence.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use still_motion::{
//!     config::Config,
//!     effects::Effect,
//!     jobs::{RenderJob, RenderPipeline},
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let pipeline = RenderPipeline::new(Config::default());
//! let job = RenderJob::from_config("beach.jpg", "beach_ken_burns.mp4", pipeline.config())
//!     .with_effect(Effect::KenBurns)
//!     .with_duration(5.0)
//!     .with_fps(24);
//!
//! let outcome = pipeline.render(&job)?;
//! println!("wrote {} frames", outcome.summary.frames_written);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - [`effects`] - The effect engine: one frame from an image, an effect and a clock
//! - [`sequence`] - Frame sequencing, progress and cancellation
//! - [`video`] - Image loading, frame type and frame sinks
//! - [`jobs`] - Single jobs, the background runner and folder processing
//! - [`config`] - Configuration management
//!
//! ## Writing Your Own Sink
//!
//! Anything that accepts frames in order can receive a clip by implementing
//! [`FrameSink`](video::FrameSink):
//!
//! ```rust,no_run
//! use still_motion::video::{Frame, FrameSink};
//! use still_motion::Result;
//!
//! struct CountingSink(u64);
//!
//! impl FrameSink for CountingSink {
//!     fn write_frame(&mut self, _frame: &Frame) -> Result<()> {
//!         self.0 += 1;
//!         Ok(())
//!     }
//!
//!     fn finish(&mut self) -> Result<()> {
//!         Ok(())
//!     }
//!
//!     fn frames_written(&self) -> u64 {
//!         self.0
//!     }
//! }
//! ```

pub mod config;
pub mod effects;
pub mod error;
pub mod jobs;
pub mod sequence;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    config::Config,
    effects::{render_frame, Effect, FrameClock},
    error::{MotionError, Result},
    jobs::{BatchProcessor, JobRunner, RenderJob, RenderPipeline},
    sequence::FrameSequencer,
    video::{Frame, FrameSink},
};
