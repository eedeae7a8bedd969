//! Error types for Lumen Core

use thiserror::Error;

/// Result type alias for player operations
pub type Result<T> = std::result::Result<T, Error>;

/// Player error types
#[derive(Error, Debug)]
pub enum Error {
    // Capability errors
    #[error("Streaming engine is not supported in this environment")]
    Unsupported,

    // Caller misuse
    #[error("No quality level with height {height}")]
    UnknownQuality { height: u32 },

    #[error("Manifest has not been parsed yet")]
    ManifestNotParsed,

    #[error("Media duration is not known yet")]
    DurationUnknown,

    // Boundary errors
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Media element error: {0}")]
    Media(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Returns true if playback can never start after this error
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Unsupported)
    }

    /// Returns the error code for logs
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Unsupported => "UNSUPPORTED",
            Error::UnknownQuality { .. } => "UNKNOWN_QUALITY",
            Error::ManifestNotParsed => "MANIFEST_NOT_PARSED",
            Error::DurationUnknown => "DURATION_UNKNOWN",
            Error::Storage(_) => "STORAGE",
            Error::Media(_) => "MEDIA",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::Json(_) => "JSON",
            Error::Url(_) => "URL",
        }
    }
}
