//! # Frame Sequencer
//!
//! Turns one still image and an effect into an ordered stream of frames and
//! pushes them into a frame sink.

pub mod sequencer;

// Re-exports for convenience
pub use sequencer::{FrameSequencer, SequenceProgress, SequenceSummary};
