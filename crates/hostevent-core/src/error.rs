//! Error types for hostevent-core

use thiserror::Error;

/// Result type alias for hostevent operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for hostevent operations
///
/// Messages never carry the event credential; callers may log them verbatim.
#[derive(Debug, Error)]
pub enum Error {
    /// Raw event text is not well-formed, or a field required by its kind is missing
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Declared kind is not a known webhook payload shape
    #[error("Unsupported payload type: {0}")]
    UnsupportedPayloadType(String),

    /// Kind is known but has no resolution strategy
    #[error("Unknown event kind: {0}")]
    UnknownEventKind(String),

    /// A page request against the hosting API failed
    #[error("Upstream fetch failed: {0}")]
    UpstreamFetch(String),

    /// The resolution deadline elapsed
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // reqwest includes the URL but never request headers, so no token leaks here
        Error::UpstreamFetch(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::MalformedPayload(err.to_string())
    }
}

/// Fieldless error category for zero-cost pattern matching.
///
/// Single byte representation (`#[repr(u8)]`), `Copy`, no allocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorKind {
    /// Malformed event text or missing field
    MalformedPayload,
    /// Unrecognized webhook payload type
    UnsupportedPayloadType,
    /// Recognized kind without a resolution strategy
    UnknownEventKind,
    /// Hosting API failure
    UpstreamFetch,
    /// Deadline elapsed
    Timeout,
    /// Configuration error
    Config,
    /// I/O operation error
    Io,
}

impl Error {
    /// Get the error kind (zero allocation)
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Error::MalformedPayload(_) => ErrorKind::MalformedPayload,
            Error::UnsupportedPayloadType(_) => ErrorKind::UnsupportedPayloadType,
            Error::UnknownEventKind(_) => ErrorKind::UnknownEventKind,
            Error::UpstreamFetch(_) => ErrorKind::UpstreamFetch,
            Error::Timeout(_) => ErrorKind::Timeout,
            Error::Config(_) => ErrorKind::Config,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    /// Borrow the error message
    #[inline]
    pub fn message(&self) -> &str {
        match self {
            Error::MalformedPayload(msg)
            | Error::UnsupportedPayloadType(msg)
            | Error::UnknownEventKind(msg)
            | Error::UpstreamFetch(msg)
            | Error::Timeout(msg)
            | Error::Config(msg) => msg,
            Error::Io(_) => "I/O error",
        }
    }
}
