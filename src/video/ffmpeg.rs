use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use tracing::{debug, info, warn};

use crate::error::{Result, SinkError};
use crate::video::sink::{check_frame_size, FrameSink};
use crate::video::types::{Frame, VideoParams};

/// Streams raw RGB frames into a system `ffmpeg` process.
///
/// Frames go over the child's stdin as `rgb24`; ffmpeg encodes them with the
/// configured codec into `yuv420p`. Odd frame sizes are padded to even by
/// one pixel, since 4:2:0 chroma needs even dimensions.
pub struct FfmpegSink {
    params: VideoParams,
    output_path: PathBuf,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    frames_written: u64,
}

impl FfmpegSink {
    pub fn check_ffmpeg_available() -> bool {
        Command::new("ffmpeg")
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Spawn the encoder. Fails with [`SinkError::Unavailable`] when ffmpeg
    /// is missing or the output directory cannot be created.
    pub fn create<P: AsRef<Path>>(output_path: P, params: VideoParams) -> Result<Self> {
        let output_path = output_path.as_ref().to_path_buf();
        let (width, height) = params.resolution;

        if width == 0 || height == 0 || params.fps == 0 {
            return Err(SinkError::Unavailable {
                reason: format!("invalid encoder parameters {}x{} @ {} fps", width, height, params.fps),
            }
            .into());
        }

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SinkError::Unavailable {
                reason: format!("cannot create output directory {}: {}", parent.display(), e),
            })?;
        }

        if !Self::check_ffmpeg_available() {
            return Err(SinkError::Unavailable {
                reason: "FFmpeg not found. Please install FFmpeg.".to_string(),
            }
            .into());
        }

        let mut cmd = Self::command(&output_path, &params);
        debug!("Spawning encoder: {:?}", cmd);

        let mut child = cmd.spawn().map_err(|e| SinkError::Unavailable {
            reason: format!("Failed to spawn FFmpeg process: {}", e),
        })?;

        let stdin = child.stdin.take().ok_or_else(|| SinkError::Unavailable {
            reason: "FFmpeg stdin was not captured".to_string(),
        })?;

        info!(
            "Encoding {}x{} @ {} fps ({}, crf {}) to {}",
            width,
            height,
            params.fps,
            params.codec,
            params.crf(),
            output_path.display()
        );

        Ok(Self {
            params,
            output_path,
            child: Some(child),
            stdin: Some(stdin),
            frames_written: 0,
        })
    }

    fn command(output_path: &Path, params: &VideoParams) -> Command {
        let (width, height) = params.resolution;

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        cmd.args([
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
            "-s",
            &format!("{}x{}", width, height),
            "-r",
            &params.fps.to_string(),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            &params.codec,
            "-pix_fmt",
            "yuv420p",
            "-crf",
            &params.crf().to_string(),
        ]);

        if width % 2 != 0 || height % 2 != 0 {
            cmd.args(["-vf", "pad=ceil(iw/2)*2:ceil(ih/2)*2"]);
        }

        cmd.arg(output_path);
        cmd
    }

    fn collect_stderr(child: Child) -> String {
        match child.wait_with_output() {
            Ok(output) => String::from_utf8_lossy(&output.stderr).trim().to_string(),
            Err(e) => e.to_string(),
        }
    }
}

impl FrameSink for FfmpegSink {
    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        check_frame_size(frame, self.params.resolution)?;

        let index = self.frames_written;
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(SinkError::WriteFailed {
                index,
                reason: "encoder is already finalized".to_string(),
            }
            .into());
        };

        if let Err(e) = stdin.write_all(frame.as_rgb_bytes()) {
            // A broken pipe means ffmpeg died; its stderr says why.
            self.stdin = None;
            let reason = match self.child.take() {
                Some(child) => format!("{} ({})", e, Self::collect_stderr(child)),
                None => e.to_string(),
            };
            return Err(SinkError::WriteFailed { index, reason }.into());
        }

        self.frames_written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        drop(self.stdin.take());

        let child = self.child.take().ok_or_else(|| SinkError::FinalizeFailed {
            reason: "encoder is already finalized".to_string(),
        })?;

        let output = child.wait_with_output().map_err(|e| SinkError::FinalizeFailed {
            reason: format!("failed to wait for FFmpeg: {}", e),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SinkError::FinalizeFailed {
                reason: format!("FFmpeg exited with {}: {}", output.status, stderr.trim()),
            }
            .into());
        }

        info!(
            "Encoded {} frames to {}",
            self.frames_written,
            self.output_path.display()
        );
        Ok(())
    }

    fn abort(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if self.output_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.output_path) {
                warn!("Failed to remove partial output {}: {}", self.output_path.display(), e);
            }
        }
    }

    fn frames_written(&self) -> u64 {
        self.frames_written
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        // Dropped without finish or abort: don't leave ffmpeg running.
        if self.child.is_some() {
            self.abort();
        }
    }
}
