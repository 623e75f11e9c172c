//! Error types shared across Tandem crates

use std::fmt;
use thiserror::Error;

/// Result type for encode/decode operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Error severity classification
///
/// - **Recoverable**: the operation can simply be tried again
/// - **Degraded**: part of the work succeeded, sync is incomplete
/// - **Fatal**: nothing was persisted and retrying will not help without a fix
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Error can be recovered from by retrying
    Recoverable,
    /// Local state is intact but the companion did not get the update
    Degraded,
    /// Requires configuration or code changes
    Fatal,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recoverable => write!(f, "Recoverable"),
            Self::Degraded => write!(f, "Degraded"),
            Self::Fatal => write!(f, "Fatal"),
        }
    }
}

/// Errors produced while encoding or decoding a syncable item
#[derive(Debug, Error)]
pub enum CodecError {
    /// JSON serialization or parsing failed
    #[error("JSON codec error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML serialization failed
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    /// Bytes were expected to be UTF-8 text
    #[error("Payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}
