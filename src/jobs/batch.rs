use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::{
    config::Config,
    effects::Effect,
    error::{MotionError, Result, SequenceError, SourceError},
    jobs::pipeline::{JobOutcome, RenderJob, RenderPipeline},
    jobs::runner::CancelFlag,
    video::scan_directory,
};

/// What happened to each image in a folder run
#[derive(Debug, Default)]
pub struct BatchReport {
    pub rendered: Vec<JobOutcome>,
    /// Files that could not be decoded
    pub skipped: Vec<PathBuf>,
    /// Files that decoded but failed to render, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.rendered.len() + self.skipped.len() + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.failed.is_empty()
    }
}

/// Applies one effect to every image in a folder
pub struct BatchProcessor {
    pipeline: RenderPipeline,
    cancel: Option<CancelFlag>,
}

impl BatchProcessor {
    pub fn new(config: Config) -> Self {
        Self {
            pipeline: RenderPipeline::new(config),
            cancel: None,
        }
    }

    /// Stop between images (and between frames) once `flag` is set
    pub fn with_cancel(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    /// Render every image in `input_dir` into `output_dir`.
    ///
    /// Undecodable files are skipped with a warning and other per-file
    /// failures are recorded; errors that would hit every file the same way
    /// (missing encoder, cancellation) end the run.
    pub fn process_folder(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        effect: Effect,
        prefix: &str,
    ) -> Result<BatchReport> {
        let config = self.pipeline.config();
        let images = scan_directory(input_dir, &config.batch.extensions)?;
        std::fs::create_dir_all(output_dir)?;

        info!("Applying {} to {} images from {:?}", effect, images.len(), input_dir);

        let mut report = BatchReport::default();
        for (position, input) in images.iter().enumerate() {
            if self.is_cancelled() {
                return Err(SequenceError::Cancelled {
                    frames_written: 0,
                }
                .into());
            }

            info!("[{}/{}] {:?}", position + 1, images.len(), input);
            let output = self.pipeline.output_path(input, Some(output_dir), effect, prefix);
            let job = RenderJob::from_config(input, output, config).with_effect(effect);

            let result = self.pipeline.render_with_progress(&job, |_| {
                if self.is_cancelled() {
                    std::ops::ControlFlow::Break(())
                } else {
                    std::ops::ControlFlow::Continue(())
                }
            });

            match result {
                Ok(outcome) => report.rendered.push(outcome),
                Err(MotionError::Source(SourceError::DecodeFailed { reason, .. })) => {
                    warn!("Skipping {:?}: {}", input, reason);
                    report.skipped.push(input.clone());
                }
                Err(e) if e.is_recoverable() => {
                    warn!("Failed to render {:?}: {}", input, e);
                    report.failed.push((input.clone(), e.to_string()));
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            "Batch finished: {} rendered, {} skipped, {} failed",
            report.rendered.len(),
            report.skipped.len(),
            report.failed.len()
        );
        Ok(report)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().map_or(false, CancelFlag::is_cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SinkKind;
    use crate::video::Frame;
    use tempfile::tempdir;

    fn png_config() -> Config {
        let mut config = Config::default();
        config.output.sink = SinkKind::Png;
        config.render.duration = 0.5;
        config.render.fps = 4;
        config.render.threads = 1;
        config
    }

    #[test]
    fn test_folder_run_skips_undecodable_files() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        Frame::new_filled(10, 6, [200, 0, 0]).save_png(input.path().join("a.png")).unwrap();
        Frame::new_filled(8, 8, [0, 200, 0]).save_png(input.path().join("c.png")).unwrap();
        std::fs::write(input.path().join("b.jpg"), b"not a jpeg").unwrap();
        std::fs::write(input.path().join("notes.txt"), b"ignored").unwrap();

        let report = BatchProcessor::new(png_config())
            .process_folder(input.path(), output.path(), Effect::FadeOut, "clip_")
            .unwrap();

        assert_eq!(report.rendered.len(), 2);
        assert_eq!(report.skipped, vec![input.path().join("b.jpg")]);
        assert!(report.failed.is_empty());
        assert_eq!(report.total(), 3);
        assert!(!report.is_clean());

        let first = output.path().join("clip_a_fade_out");
        assert_eq!(report.rendered[0].output, first);
        assert_eq!(report.rendered[0].summary.frames_written, 2);
        assert!(first.join("frame_000001.png").exists());
        assert!(output.path().join("clip_c_fade_out/frame_000000.png").exists());
    }

    #[test]
    fn test_folder_without_images_is_an_error() {
        let input = tempdir().unwrap();
        std::fs::write(input.path().join("readme.md"), b"#").unwrap();
        let output = input.path().join("out");

        let err = BatchProcessor::new(png_config())
            .process_folder(input.path(), &output, Effect::ZoomIn, "")
            .unwrap_err();
        assert!(matches!(err, MotionError::Source(SourceError::NoImagesFound { .. })));
        assert!(!output.exists());
    }

    #[test]
    fn test_cancelled_batch_stops_before_first_image() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        Frame::new_black(4, 4).save_png(input.path().join("a.png")).unwrap();

        let flag = CancelFlag::new();
        flag.cancel();
        let err = BatchProcessor::new(png_config())
            .with_cancel(flag)
            .process_folder(input.path(), output.path(), Effect::ZoomIn, "")
            .unwrap_err();

        assert!(err.is_cancelled());
        assert!(!output.path().join("a_zoom_in").exists());
    }

    #[test]
    fn test_existing_outputs_are_not_overwritten() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        Frame::new_black(4, 4).save_png(input.path().join("a.png")).unwrap();
        std::fs::create_dir(output.path().join("a_slide_left")).unwrap();

        let report = BatchProcessor::new(png_config())
            .process_folder(input.path(), output.path(), Effect::SlideLeft, "")
            .unwrap();
        assert_eq!(report.rendered[0].output, output.path().join("a_slide_left_1"));
    }
}
