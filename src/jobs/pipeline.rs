use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::{
    config::{Config, SinkKind},
    effects::Effect,
    error::Result,
    jobs::naming::{output_path_for, unique_dir_path, unique_path},
    sequence::{FrameSequencer, SequenceProgress, SequenceSummary},
    video::{load_image, FfmpegSink, FrameSink, PngSequenceSink, VideoParams},
};

/// One image-to-clip job: everything the pipeline needs, nothing it keeps.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub effect: Effect,
    pub duration: f64,
    pub fps: u32,
}

impl RenderJob {
    /// Job using the effect and timing from `config`
    pub fn from_config<P: Into<PathBuf>, Q: Into<PathBuf>>(input: P, output: Q, config: &Config) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            effect: config.render.effect,
            duration: config.render.duration,
            fps: config.render.fps,
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effect = effect;
        self
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }
}

/// Result of a finished job
#[derive(Debug, Clone, PartialEq)]
pub struct JobOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub summary: SequenceSummary,
}

/// Loads an image, opens the configured sink and runs the sequencer.
///
/// The pipeline follows three steps:
/// 1. Decode the source image
/// 2. Open a frame sink sized to the image
/// 3. Render and submit every frame, then finalize the sink
pub struct RenderPipeline {
    config: Config,
}

impl RenderPipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Default output location for `input`: next to it, or inside `directory`
    /// when one is given. Honors `output.unique_names`.
    pub fn output_path(&self, input: &Path, directory: Option<&Path>, effect: Effect, prefix: &str) -> PathBuf {
        let directory = directory
            .map(Path::to_path_buf)
            .or_else(|| input.parent().map(Path::to_path_buf))
            .unwrap_or_default();

        match self.config.output.sink {
            SinkKind::Ffmpeg => {
                let path = output_path_for(input, &directory, effect, prefix, &self.config.output.container);
                if self.config.output.unique_names {
                    unique_path(&path)
                } else {
                    path
                }
            }
            SinkKind::Png => {
                let path = output_path_for(input, &directory, effect, prefix, "");
                if self.config.output.unique_names {
                    unique_dir_path(&path)
                } else {
                    path
                }
            }
        }
    }

    /// Open the configured sink for frames of `width` x `height`
    pub fn open_sink(&self, output: &Path, width: u32, height: u32, fps: u32) -> Result<Box<dyn FrameSink>> {
        match self.config.output.sink {
            SinkKind::Ffmpeg => {
                let params = VideoParams {
                    fps,
                    ..self.config.video_params(width, height)
                };
                Ok(Box::new(FfmpegSink::create(output, params)?))
            }
            SinkKind::Png => Ok(Box::new(PngSequenceSink::new(output)?)),
        }
    }

    pub fn render(&self, job: &RenderJob) -> Result<JobOutcome> {
        self.render_with_progress(job, |_| ControlFlow::Continue(()))
    }

    /// Run a job, forwarding per-frame progress to `on_progress`. A `Break`
    /// from the callback cancels the job.
    pub fn render_with_progress<F>(&self, job: &RenderJob, on_progress: F) -> Result<JobOutcome>
    where
        F: FnMut(SequenceProgress) -> ControlFlow<()>,
    {
        info!("Applying {} to {:?}", job.effect, job.input);

        // Step 1: decode
        let image = load_image(&job.input)?;
        debug!("Loaded {}x{} source", image.width(), image.height());

        // Step 2: validate timing before spawning an encoder
        let sequencer = FrameSequencer::new(job.effect, job.duration, job.fps)
            .with_threads(self.config.render.threads);
        sequencer.validate(&image)?;

        let mut sink = self.open_sink(&job.output, image.width(), image.height(), job.fps)?;

        // Step 3: render
        let summary = sequencer.run_with_progress(&image, sink.as_mut(), on_progress)?;

        info!(
            "Saved {} ({} frames, {:.1}s)",
            job.output.display(),
            summary.frames_written,
            summary.duration_secs()
        );

        Ok(JobOutcome {
            input: job.input.clone(),
            output: job.output.clone(),
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MotionError, SourceError};
    use crate::video::Frame;
    use tempfile::tempdir;

    fn png_config() -> Config {
        let mut config = Config::default();
        config.output.sink = SinkKind::Png;
        config.render.threads = 2;
        config
    }

    #[test]
    fn test_render_job_to_png_frames() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("tile.png");
        Frame::new_filled(16, 10, [30, 60, 90]).save_png(&input).unwrap();

        let pipeline = RenderPipeline::new(png_config());
        let output = pipeline.output_path(&input, None, Effect::ZoomOut, "");
        assert_eq!(output, dir.path().join("tile_zoom_out"));

        let job = RenderJob::from_config(&input, &output, pipeline.config())
            .with_effect(Effect::ZoomOut)
            .with_duration(1.0)
            .with_fps(6);
        let outcome = pipeline.render(&job).unwrap();

        assert_eq!(outcome.summary.frames_written, 6);
        assert!(output.join("frame_000005.png").exists());
        assert!(!output.join("frame_000006.png").exists());
    }

    #[test]
    fn test_decode_failure_is_reported_as_source_error() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("bad.jpg");
        std::fs::write(&input, b"nope").unwrap();

        let pipeline = RenderPipeline::new(png_config());
        let job = RenderJob::from_config(&input, dir.path().join("out"), pipeline.config());
        let err = pipeline.render(&job).unwrap_err();

        assert!(matches!(err, MotionError::Source(SourceError::DecodeFailed { .. })));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_frame_directory_collision_keeps_dotted_stem() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("trip.2024.png");
        std::fs::create_dir(dir.path().join("trip.2024_zoom_in")).unwrap();

        let pipeline = RenderPipeline::new(png_config());
        let output = pipeline.output_path(&input, None, Effect::ZoomIn, "");
        assert_eq!(output, dir.path().join("trip.2024_zoom_in_1"));
    }

    #[test]
    fn test_output_path_goes_into_requested_directory() {
        let mut config = Config::default();
        config.output.unique_names = false;
        let pipeline = RenderPipeline::new(config);

        let path = pipeline.output_path(
            Path::new("/in/cat.bmp"),
            Some(Path::new("/out")),
            Effect::FadeIn,
            "x_",
        );
        assert_eq!(path, PathBuf::from("/out/x_cat_fade_in.mp4"));
    }
}
