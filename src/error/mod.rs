//! Error handling module for ScreenTrace

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for ScreenTrace operations
#[derive(Error, Debug)]
pub enum ScreenTraceError {
    /// An image or video could not be opened or decoded
    #[error("Unreadable media {}: {}", .path.display(), .message)]
    UnreadableMedia { path: PathBuf, message: String },

    /// No reference screens were loaded, so classification is undefined
    #[error("No reference screens loaded; cannot classify frames")]
    EmptyReferenceSet,

    /// A raw timeline with zero samples was handed to the cleaner
    #[error("Raw timeline is empty; no samples were taken")]
    EmptyInput,

    /// Configuration failed validation
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// Two reference images resolve to the same screen id
    #[error("Duplicate reference screen id: {id}")]
    DuplicateScreen { id: String },

    /// The run was cancelled before completion
    #[error("Operation cancelled")]
    Cancelled,

    /// Output file write error
    #[error("Failed to write output file: {message}")]
    OutputError { message: String },

    /// A background worker panicked or was aborted
    #[error("Worker failed: {message}")]
    WorkerError { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// FFmpeg error
    #[error("FFmpeg error: {0}")]
    FFmpegError(#[from] ffmpeg_next::Error),
}

impl ScreenTraceError {
    /// Build an `UnreadableMedia` error for `path`
    pub fn unreadable(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::UnreadableMedia {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Build an `InvalidConfiguration` error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Whether a lenient media policy may skip past this error
    pub fn is_recoverable_media_error(&self) -> bool {
        matches!(self, Self::UnreadableMedia { .. } | Self::FFmpegError(_))
    }
}

/// Result type alias for ScreenTrace operations
pub type ScreenTraceResult<T> = std::result::Result<T, ScreenTraceError>;
