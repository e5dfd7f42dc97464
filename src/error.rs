//! Error types for the editing core.
//!
//! Model edits never fail: out-of-range values are clamped in place. These
//! errors cover the genuinely external work (files, HTTP, the status socket).

use std::path::PathBuf;
use thiserror::Error;

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, EditorError>;

#[derive(Error, Debug)]
pub enum EditorError {
    /// Reading or writing a local file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The HTTP client could not complete a request
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("service responded {status}: {message}")]
    Service { status: u16, message: String },

    /// The status channel socket failed
    #[error("status channel error: {0}")]
    WebSocket(String),

    /// The file extension is not a supported media type
    #[error("unsupported media file: {}", path.display())]
    UnsupportedMedia { path: PathBuf },

    /// The file exceeds the ingestion size limit
    #[error("file too large: {size} bytes (limit {limit})")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("media not found: {0}")]
    MediaNotFound(String),

    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("invalid project file: {reason}")]
    InvalidProjectFile { reason: String },
}

impl From<tokio_tungstenite::tungstenite::Error> for EditorError {
    fn from(value: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket(value.to_string())
    }
}
