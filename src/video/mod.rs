//! # Video Module
//!
//! Frames, image decoding, and the frame sinks that turn an ordered frame
//! stream into output files.

pub mod ffmpeg;
pub mod sink;
pub mod source;
pub mod types;

pub use ffmpeg::FfmpegSink;
pub use sink::{FrameSink, MemorySink, PngSequenceSink};
pub use source::{load_image, scan_directory};
pub use types::{Frame, VideoParams};
