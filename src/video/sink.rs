use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Result, SinkError};
use crate::video::types::Frame;

/// Destination for an ordered stream of same-sized frames.
///
/// Callers submit frames in presentation order and then call
/// [`finish`](FrameSink::finish) exactly once. If the stream is abandoned
/// part-way, [`abort`](FrameSink::abort) discards whatever was produced.
pub trait FrameSink {
    /// Append the next frame
    fn write_frame(&mut self, frame: &Frame) -> Result<()>;

    /// Flush and finalize the output. Failures here are real failures: the
    /// output is not usable.
    fn finish(&mut self) -> Result<()>;

    /// Give up on the output. Best effort, never fails.
    fn abort(&mut self) {}

    /// Number of frames accepted so far
    fn frames_written(&self) -> u64;
}

impl<S: FrameSink + ?Sized> FrameSink for Box<S> {
    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        (**self).write_frame(frame)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }

    fn abort(&mut self) {
        (**self).abort()
    }

    fn frames_written(&self) -> u64 {
        (**self).frames_written()
    }
}

/// Reject frames whose size differs from the first one the sink was set up for
pub(crate) fn check_frame_size(frame: &Frame, expected: (u32, u32)) -> Result<()> {
    if frame.dimensions() != expected {
        return Err(SinkError::FrameSizeMismatch {
            got_width: frame.width(),
            got_height: frame.height(),
            expected_width: expected.0,
            expected_height: expected.1,
        }
        .into());
    }
    Ok(())
}

/// Collects frames in memory. Handy for previews, tests and embedding.
#[derive(Debug, Default)]
pub struct MemorySink {
    frames: Vec<Frame>,
    finished: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for MemorySink {
    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        if let Some(first) = self.frames.first() {
            check_frame_size(frame, first.dimensions())?;
        }
        self.frames.push(frame.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.frames.clear();
    }

    fn frames_written(&self) -> u64 {
        self.frames.len() as u64
    }
}

/// Writes each frame as `frame_000000.png`, `frame_000001.png`, ... into a
/// directory. The directory is created on construction.
pub struct PngSequenceSink {
    directory: PathBuf,
    resolution: Option<(u32, u32)>,
    written: Vec<PathBuf>,
}

impl PngSequenceSink {
    pub fn new<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();
        create_dir_all(&directory).map_err(|e| SinkError::Unavailable {
            reason: format!("cannot create frame directory {}: {}", directory.display(), e),
        })?;

        debug!("Saving frames to directory: {}", directory.display());
        Ok(Self {
            directory,
            resolution: None,
            written: Vec::new(),
        })
    }

    fn frame_path(&self, index: usize) -> PathBuf {
        self.directory.join(format!("frame_{:06}.png", index))
    }
}

impl FrameSink for PngSequenceSink {
    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        let expected = *self.resolution.get_or_insert(frame.dimensions());
        check_frame_size(frame, expected)?;

        let index = self.written.len();
        let path = self.frame_path(index);
        frame.save_png(&path).map_err(|e| SinkError::WriteFailed {
            index: index as u64,
            reason: format!("{}: {}", path.display(), e),
        })?;

        self.written.push(path);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        info!("Saved {} frames as images in {}", self.written.len(), self.directory.display());
        Ok(())
    }

    fn abort(&mut self) {
        for path in self.written.drain(..) {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!("Failed to remove partial frame {}: {}", path.display(), e);
            }
        }
    }

    fn frames_written(&self) -> u64 {
        self.written.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MotionError;
    use tempfile::tempdir;

    #[test]
    fn test_memory_sink_rejects_size_changes() {
        let mut sink = MemorySink::new();
        sink.write_frame(&Frame::new_black(4, 4)).unwrap();
        let err = sink.write_frame(&Frame::new_black(4, 5)).unwrap_err();
        assert!(matches!(err, MotionError::Sink(SinkError::FrameSizeMismatch { .. })));
        assert_eq!(sink.frames_written(), 1);
    }

    #[test]
    fn test_png_sequence_names_frames_in_order() {
        let dir = tempdir().unwrap();
        let mut sink = PngSequenceSink::new(dir.path().join("frames")).unwrap();
        for shade in [0u8, 128, 255] {
            sink.write_frame(&Frame::new_filled(3, 2, [shade; 3])).unwrap();
        }
        sink.finish().unwrap();

        let second = image::open(dir.path().join("frames/frame_000001.png")).unwrap().to_rgb8();
        assert_eq!(second.get_pixel(0, 0).0, [128, 128, 128]);
        assert_eq!(sink.frames_written(), 3);
    }

    #[test]
    fn test_png_sequence_abort_removes_frames() {
        let dir = tempdir().unwrap();
        let mut sink = PngSequenceSink::new(dir.path()).unwrap();
        sink.write_frame(&Frame::new_black(2, 2)).unwrap();
        sink.abort();
        assert!(!dir.path().join("frame_000000.png").exists());
    }
}
