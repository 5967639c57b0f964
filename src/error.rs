//! Error types for Watchlink
//!
//! Uses `thiserror` for library errors. Warnings from the service are not
//! errors; they flow through the telemetry sink only.

use thiserror::Error;

/// Result type alias for Watchlink operations
pub type WatchlinkResult<T> = Result<T, WatchlinkError>;

/// Main error type for Watchlink operations
#[derive(Error, Debug)]
pub enum WatchlinkError {
    /// The service responded with an `error` field; message is its text.
    /// Never retried internally.
    #[error("service error: {message}")]
    Protocol { message: String },

    /// A bounded read exceeded its budget. Fatal for explicit query and
    /// handshake calls; the subscription poll path never produces it.
    #[error("timed out after {timeout_ms}ms waiting for {operation}")]
    Timeout { operation: String, timeout_ms: u64 },

    /// Underlying channel failure: connect refused, broken pipe, channel
    /// closed mid-read.
    #[error("transport failure: {0}")]
    Transport(#[from] std::io::Error),

    /// Response text is not valid JSON, or not a JSON object. Carries the
    /// raw offending text for diagnosis.
    #[error("malformed response: {detail}")]
    MalformedResponse { detail: String, raw: String },
}

impl WatchlinkError {
    /// Channel delivered EOF where a response line was expected.
    pub(crate) fn channel_closed() -> Self {
        WatchlinkError::Transport(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "service closed the channel",
        ))
    }
}
