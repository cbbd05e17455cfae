/// Error types shared by the track crates.
use thiserror::Error;

/// Unified error type for track building, model loading and upload.
#[derive(Debug, Error)]
pub enum TrackError {
    /// The arc has no radius, no sweep, or a non-finite component.
    #[error("Degenerate arc: {0}")]
    DegenerateArc(String),

    /// An STL model could not be parsed.
    #[error("STL parse error: {0}")]
    Stl(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Scene configuration is malformed.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The renderer rejected a mesh upload.
    #[error("Upload failed: {0}")]
    Upload(String),
}

/// Convenience alias for `Result<T, TrackError>`.
pub type TrackResult<T> = Result<T, TrackError>;
