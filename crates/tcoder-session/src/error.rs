//! Session error types.

use thiserror::Error;

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    /// Selected file is not a video. Purely local; no network call is made.
    #[error("Please select a video file")]
    NotAVideo,

    /// Upload was rejected by the service or failed in transit.
    /// Recoverable: the session returns to the pre-upload state.
    #[error("Upload failed: {0}")]
    Upload(String),

    /// Operation is not valid in the session's current state.
    #[error("Invalid operation: {0}")]
    InvalidState(&'static str),

    /// Failed to read the selected file from disk.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
}
