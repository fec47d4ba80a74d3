use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::{
    effects::Effect,
    error::{ConfigError, Result},
    video::{source::DEFAULT_IMAGE_EXTENSIONS, VideoParams},
};

/// Main configuration for still-motion
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Effect and timing settings
    pub render: RenderConfig,

    /// Where and how frames are written
    pub output: OutputConfig,

    /// Folder processing settings
    pub batch: BatchConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.render.validate()?;
        self.output.validate()?;
        self.batch.validate()?;
        Ok(())
    }

    /// Encoder parameters for a clip of the given frame size
    pub fn video_params(&self, width: u32, height: u32) -> VideoParams {
        VideoParams {
            fps: self.render.fps,
            resolution: (width, height),
            codec: self.output.codec.clone(),
            quality: self.output.quality,
        }
    }
}

/// Effect and timing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Effect applied when none is given on the command line
    pub effect: Effect,

    /// Clip length in seconds
    pub duration: f64,

    /// Output frame rate
    pub fps: u32,

    /// Frames rendered in parallel
    pub threads: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            effect: Effect::KenBurns,
            duration: 5.0,
            fps: 30,
            threads: num_cpus::get(),
        }
    }
}

impl RenderConfig {
    fn validate(&self) -> Result<()> {
        if self.fps == 0 {
            return Err(ConfigError::InvalidValue {
                key: "render.fps".to_string(),
                value: self.fps.to_string()
            }.into());
        }

        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "render.duration".to_string(),
                value: self.duration.to_string()
            }.into());
        }

        if (self.fps as f64 * self.duration) < 1.0 {
            return Err(ConfigError::InvalidValue {
                key: "render.duration".to_string(),
                value: format!("{}s at {} fps is shorter than one frame", self.duration, self.fps)
            }.into());
        }

        if self.threads == 0 {
            return Err(ConfigError::InvalidValue {
                key: "render.threads".to_string(),
                value: self.threads.to_string()
            }.into());
        }

        Ok(())
    }
}

/// Which frame sink receives the rendered frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Encode a video through the system `ffmpeg`
    Ffmpeg,
    /// Write a numbered PNG per frame into a directory
    Png,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub sink: SinkKind,

    /// Encoder passed to ffmpeg's `-c:v`
    pub codec: String,

    /// Quality setting (0-100, higher is better)
    pub quality: u8,

    /// Video file extension
    pub container: String,

    /// Number output files (`_1`, `_2`, ...) instead of overwriting
    pub unique_names: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sink: SinkKind::Ffmpeg,
            codec: "libx264".to_string(),
            quality: 85,
            container: "mp4".to_string(),
            unique_names: true,
        }
    }
}

impl OutputConfig {
    fn validate(&self) -> Result<()> {
        if self.quality > 100 {
            return Err(ConfigError::InvalidValue {
                key: "output.quality".to_string(),
                value: self.quality.to_string()
            }.into());
        }

        if self.codec.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "output.codec".to_string(),
                value: self.codec.clone()
            }.into());
        }

        if self.container.trim().is_empty() || self.container.contains(['/', '\\', '.']) {
            return Err(ConfigError::InvalidValue {
                key: "output.container".to_string(),
                value: self.container.clone()
            }.into());
        }

        Ok(())
    }
}

/// Folder processing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// File extensions picked up from the input folder (case-insensitive)
    pub extensions: Vec<String>,

    /// Prepended to every output file name
    pub prefix: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_IMAGE_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            prefix: String::new(),
        }
    }
}

impl BatchConfig {
    fn validate(&self) -> Result<()> {
        if self.extensions.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "batch.extensions".to_string(),
                value: "[]".to_string()
            }.into());
        }

        if self.prefix.contains(['/', '\\']) {
            return Err(ConfigError::InvalidValue {
                key: "batch.prefix".to_string(),
                value: self.prefix.clone()
            }.into());
        }

        Ok(())
    }
}
