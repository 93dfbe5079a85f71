/// Error types shared by every Pixelfeed crate.
use std::path::PathBuf;

/// A specialized Result type for Pixelfeed operations.
pub type FeedResult<T> = Result<T, FeedError>;

/// Top-level error type. Every variant is fatal to the feed render it
/// occurs in; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("config error: {0}")]
    Config(String),

    #[error("font load error: {message} ({path:?})")]
    FontLoad { message: String, path: PathBuf },

    #[error("sink open error: {0}")]
    SinkOpen(String),

    #[error("sink write error at frame {frame}: {message}")]
    SinkWrite { frame: u64, message: String },

    #[error("range error: {0}")]
    Range(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl FeedError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        FeedError::Config(message.into())
    }

    /// Create a font loading error.
    pub fn font_load(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        FeedError::FontLoad {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Create a sink write error for the given frame.
    pub fn sink_write(frame: u64, message: impl Into<String>) -> Self {
        FeedError::SinkWrite {
            frame,
            message: message.into(),
        }
    }
}
