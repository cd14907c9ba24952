//! Error handling for EchoSphere
//!
//! All errors carry enough context to produce the status line the user sees.

use thiserror::Error;

/// Result type alias for EchoSphere operations
pub type Result<T> = std::result::Result<T, EchoSphereError>;

/// Main error type for EchoSphere operations
#[derive(Error, Debug)]
pub enum EchoSphereError {
    // File Errors
    #[error("File not found: {path}")]
    FileNotFound {
        path: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Invalid audio file: {reason}")]
    InvalidAudio {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Audio contains no samples")]
    EmptyAudio,

    // External tool errors
    #[error("ffmpeg not found at '{path}'")]
    FfmpegNotFound { path: String },

    #[error("ffmpeg exited with {status}: {stderr}")]
    FfmpegFailed { status: String, stderr: String },

    #[error("ffprobe output could not be parsed: {reason}")]
    ProbeFailed { reason: String },

    // Processing Errors
    #[error("Processing error: {reason}")]
    ProcessingError { reason: String },

    #[error("Effect '{effect}' produced invalid audio (NaN/Inf)")]
    EffectOverflow { effect: String },

    #[error("Effect '{effect}' requires stereo audio")]
    StereoRequired { effect: String },

    // Export Errors
    #[error("Export failed: cannot write to {path}")]
    ExportFailed { path: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EchoSphereError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            EchoSphereError::FileNotFound { .. } => "FILE_NOT_FOUND",
            EchoSphereError::InvalidAudio { .. } => "INVALID_AUDIO",
            EchoSphereError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            EchoSphereError::EmptyAudio => "EMPTY_AUDIO",
            EchoSphereError::FfmpegNotFound { .. } => "FFMPEG_NOT_FOUND",
            EchoSphereError::FfmpegFailed { .. } => "FFMPEG_FAILED",
            EchoSphereError::ProbeFailed { .. } => "PROBE_FAILED",
            EchoSphereError::ProcessingError { .. } => "PROCESSING_ERROR",
            EchoSphereError::EffectOverflow { .. } => "EFFECT_OVERFLOW",
            EchoSphereError::StereoRequired { .. } => "STEREO_REQUIRED",
            EchoSphereError::ExportFailed { .. } => "EXPORT_FAILED",
            EchoSphereError::Io(_) => "IO_ERROR",
        }
    }

    /// Check if this error is recoverable by user action
    pub fn is_recoverable(&self) -> bool {
        match self {
            EchoSphereError::FileNotFound { .. } => true,
            EchoSphereError::InvalidAudio { .. } => true,
            EchoSphereError::UnsupportedFormat { .. } => true,
            EchoSphereError::FfmpegNotFound { .. } => true,
            EchoSphereError::ExportFailed { .. } => true,
            _ => false,
        }
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            EchoSphereError::FileNotFound { .. } => vec![
                "Check the file path is correct",
                "Verify the file hasn't been moved or deleted",
            ],
            EchoSphereError::InvalidAudio { .. } => vec![
                "Check if the file plays in another application",
                "The file may be corrupted - try re-exporting from source",
            ],
            EchoSphereError::UnsupportedFormat { .. } => vec![
                "Supported inputs: MP3, WAV, FLAC, OGG (anything ffmpeg can decode)",
                "Convert the file to WAV first",
            ],
            EchoSphereError::FfmpegNotFound { .. } => vec![
                "Install ffmpeg and make sure it is on your PATH",
                "Or point ECHOSPHERE_FFMPEG at the binary",
            ],
            EchoSphereError::FfmpegFailed { .. } => vec![
                "Run with RUST_LOG=debug to see the full ffmpeg invocation",
                "Check the input file decodes with 'ffmpeg -i <file>'",
            ],
            EchoSphereError::EffectOverflow { .. } => vec![
                "The effect settings may be too extreme",
                "Try reducing the effect intensity",
            ],
            EchoSphereError::ExportFailed { .. } => vec![
                "Check the output directory exists and is writable",
                "Free up disk space or export to a different location",
            ],
            _ => vec![],
        }
    }

    /// Get a user-friendly message for this error
    ///
    /// This is the text the original form showed in its status label.
    pub fn friendly_message(&self) -> String {
        match self {
            EchoSphereError::FileNotFound { path, .. } => {
                format!("Couldn't find '{}'. Is it still there?", path)
            }
            EchoSphereError::FfmpegNotFound { .. } => {
                "ffmpeg is required for all effects but wasn't found. \
                 Install it or set ECHOSPHERE_FFMPEG."
                    .to_string()
            }
            EchoSphereError::InvalidAudio { reason, .. } => {
                format!("This file doesn't appear to be valid audio: {}", reason)
            }
            EchoSphereError::EffectOverflow { effect } => {
                format!(
                    "The '{}' effect produced broken audio and the run was aborted.",
                    effect
                )
            }
            _ => self.to_string(),
        }
    }
}
