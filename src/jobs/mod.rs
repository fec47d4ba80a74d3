//! # Jobs
//!
//! Glue between the file system and the frame sequencer: single render jobs,
//! a one-at-a-time background runner and folder processing.

pub mod batch;
pub mod naming;
pub mod pipeline;
pub mod runner;

pub use batch::{BatchProcessor, BatchReport};
pub use naming::{output_path_for, unique_dir_path, unique_path};
pub use pipeline::{JobOutcome, RenderJob, RenderPipeline};
pub use runner::{CancelFlag, JobHandle, JobRunner, JobStatus};
