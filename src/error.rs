use thiserror::Error;

/// Main error type for the vidmark library
#[derive(Error, Debug)]
pub enum CompositorError {
    #[error("Video processing error: {0}")]
    Video(#[from] VideoError),

    #[error("Effect error: {0}")]
    Effect(#[from] EffectError),

    #[error("Segment operation error: {0}")]
    Segment(#[from] SegmentError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Video-specific errors
#[derive(Error, Debug)]
pub enum VideoError {
    #[error("Failed to load video file: {path}")]
    LoadFailed { path: String },

    #[error("Probe failed for {path}: {reason}")]
    ProbeFailed { path: String, reason: String },

    #[error("Video encoding failed: {reason}")]
    EncodingFailed { reason: String },

    #[error("Frame processing failed: {reason}")]
    FrameProcessingFailed { reason: String },

    #[error("Invalid video parameters: {details}")]
    InvalidParameters { details: String },
}

/// Effect-specific errors
#[derive(Error, Debug)]
pub enum EffectError {
    #[error("Failed to load overlay asset: {path}")]
    AssetLoadFailed { path: String },

    #[error("Overlay asset has no alpha channel: {path}")]
    AssetMissingAlpha { path: String },

    #[error("No animation frames found in: {path}")]
    NoAnimationFrames { path: String },

    #[error("Animation frame has no numeric suffix: {name}")]
    UnnumberedAnimationFrame { name: String },

    #[error("Invalid effect window: {details}")]
    InvalidWindow { details: String },

    #[error("Invalid effect parameters: {details}")]
    InvalidParameters { details: String },
}

/// Segment-operation errors (setup faults only; strategy exhaustion is a
/// status, not an error)
#[derive(Error, Debug)]
pub enum SegmentError {
    #[error("Input file not found: {path}")]
    InputMissing { path: String },

    #[error("ffmpeg binary not available")]
    ToolMissing,

    #[error("Invalid time range: {details}")]
    InvalidRange { details: String },

    #[error("Unparseable timecode: {value}")]
    BadTimecode { value: String },
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

/// Convenience type alias for Results using CompositorError
pub type Result<T> = std::result::Result<T, CompositorError>;

impl CompositorError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Video(VideoError::LoadFailed { path }) => {
                format!("Could not load video file '{}'. Please check the file exists and is a supported format.", path)
            }
            Self::Video(VideoError::ProbeFailed { path, .. }) => {
                format!("Could not read metadata from '{}'. Is ffprobe installed and the file a valid video?", path)
            }
            Self::Effect(EffectError::AssetMissingAlpha { path }) => {
                format!("Overlay image '{}' must be a PNG with transparency (alpha channel).", path)
            }
            Self::Segment(SegmentError::ToolMissing) => {
                "ffmpeg was not found on PATH. Please install FFmpeg.".to_string()
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}
