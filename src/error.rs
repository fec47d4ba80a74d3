use thiserror::Error;

/// Main error type for the still-motion library
#[derive(Error, Debug)]
pub enum MotionError {
    #[error("Image source error: {0}")]
    Source(#[from] SourceError),

    #[error("Effect error: {0}")]
    Effect(#[from] EffectError),

    #[error("Frame sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("Sequence error: {0}")]
    Sequence(#[from] SequenceError),

    #[error("Job error: {0}")]
    Job(#[from] JobError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Errors raised while reading input images
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Could not decode input image: {path} ({reason})")]
    DecodeFailed { path: String, reason: String },

    #[error("Input directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("No supported images found in directory: {path}")]
    NoImagesFound { path: String },
}

/// Errors raised by the effect engine
#[derive(Error, Debug)]
pub enum EffectError {
    #[error("Unknown effect '{name}' (available: {available})")]
    Unknown { name: String, available: String },

    #[error("Cannot render an empty image ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("Scale {scale} collapses a {width}x{height} image to nothing")]
    DegenerateScale { scale: f64, width: u32, height: u32 },
}

/// Errors raised by frame sinks
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Frame sink unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Failed to write frame {index}: {reason}")]
    WriteFailed { index: u64, reason: String },

    #[error("Failed to finalize output: {reason}")]
    FinalizeFailed { reason: String },

    #[error("Frame size mismatch: got {got_width}x{got_height}, expected {expected_width}x{expected_height}")]
    FrameSizeMismatch {
        got_width: u32,
        got_height: u32,
        expected_width: u32,
        expected_height: u32,
    },
}

/// Errors raised by the frame sequencer
#[derive(Error, Debug)]
pub enum SequenceError {
    #[error("Invalid sequence parameters: {details}")]
    InvalidParameters { details: String },

    #[error("Sequence cancelled after {frames_written} frames")]
    Cancelled { frames_written: u64 },
}

/// Errors raised by the job driver
#[derive(Error, Debug)]
pub enum JobError {
    #[error("Another render job is already running")]
    Busy,

    #[error("Render worker stopped unexpectedly: {reason}")]
    WorkerFailed { reason: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using MotionError
pub type Result<T> = std::result::Result<T, MotionError>;

impl MotionError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Whether a batch run may skip the failing item and move on.
    ///
    /// Failures tied to a single input or output file are recoverable. A
    /// missing encoder, bad configuration or cancellation would fail every
    /// remaining item the same way, so they are not.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Source(SourceError::DecodeFailed { .. }) => true,
            Self::Sink(SinkError::Unavailable { .. }) => false,
            Self::Sink(_) => true,
            Self::Effect(EffectError::EmptyImage { .. }) => true,
            Self::Effect(EffectError::DegenerateScale { .. }) => true,
            Self::Io(_) => true,
            _ => false,
        }
    }

    /// Whether this error is a cooperative cancellation rather than a failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Sequence(SequenceError::Cancelled { .. }))
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Source(SourceError::DecodeFailed { path, .. }) => {
                format!("Could not read image '{}'. Please check the file exists and is a supported format.", path)
            }
            Self::Effect(EffectError::Unknown { name, available }) => {
                format!("Effect '{}' not found. Available effects: {}", name, available)
            }
            Self::Sink(SinkError::Unavailable { reason }) => {
                format!("Cannot write video: {}", reason)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            Self::Job(JobError::Busy) => {
                "Another effect is being processed.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_failures_are_recoverable() {
        let err: MotionError = SourceError::DecodeFailed {
            path: "broken.png".to_string(),
            reason: "truncated".to_string(),
        }
        .into();
        assert!(err.is_recoverable());
        assert!(err.user_message().contains("broken.png"));
    }

    #[test]
    fn test_missing_encoder_is_fatal() {
        let err: MotionError = SinkError::Unavailable {
            reason: "ffmpeg not found".to_string(),
        }
        .into();
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_cancellation_is_not_a_failure_to_skip() {
        let err: MotionError = SequenceError::Cancelled { frames_written: 3 }.into();
        assert!(err.is_cancelled());
        assert!(!err.is_recoverable());
    }
}
