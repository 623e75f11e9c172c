//! Error types for durable store operations

use std::fmt;
use std::io;
use std::path::PathBuf;
use tandem_core::{CodecError, ErrorSeverity};
use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while persisting or loading artifacts
#[derive(Debug, Error)]
pub enum StoreError {
    /// The shared namespace could not be resolved to a directory
    #[error("Invalid shared namespace '{identifier}': {reason}")]
    InvalidNamespace { identifier: String, reason: String },

    /// No artifact exists for the requested kind
    #[error("No stored artifact named {artifact}")]
    NotFound { artifact: String },

    /// The item could not be serialized
    #[error("Failed to encode {artifact}: {source}")]
    EncodingFailed {
        artifact: String,
        source: CodecError,
    },

    /// The stored bytes do not parse as the requested kind
    #[error("Failed to decode {artifact}: {source}")]
    DecodingFailed {
        artifact: String,
        source: CodecError,
    },

    /// Writing the artifact failed
    #[error("Failed to write {}: {source}", .path.display())]
    WriteFailed { path: PathBuf, source: io::Error },

    /// Reading the artifact failed
    #[error("Failed to read {}: {source}", .path.display())]
    ReadFailed { path: PathBuf, source: io::Error },

    /// Removing the artifact failed
    #[error("Failed to delete {}: {source}", .path.display())]
    DeleteFailed { path: PathBuf, source: io::Error },
}

/// Cloneable classification of a [`StoreError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorKind {
    InvalidNamespace,
    NotFound,
    EncodingFailed,
    DecodingFailed,
    WriteFailed,
    ReadFailed,
    DeleteFailed,
}

impl StoreError {
    /// Returns the kind of this error
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            Self::InvalidNamespace { .. } => StoreErrorKind::InvalidNamespace,
            Self::NotFound { .. } => StoreErrorKind::NotFound,
            Self::EncodingFailed { .. } => StoreErrorKind::EncodingFailed,
            Self::DecodingFailed { .. } => StoreErrorKind::DecodingFailed,
            Self::WriteFailed { .. } => StoreErrorKind::WriteFailed,
            Self::ReadFailed { .. } => StoreErrorKind::ReadFailed,
            Self::DeleteFailed { .. } => StoreErrorKind::DeleteFailed,
        }
    }

    /// Returns the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotFound { .. }
            | Self::WriteFailed { .. }
            | Self::ReadFailed { .. }
            | Self::DeleteFailed { .. } => ErrorSeverity::Recoverable,

            Self::InvalidNamespace { .. }
            | Self::EncodingFailed { .. }
            | Self::DecodingFailed { .. } => ErrorSeverity::Fatal,
        }
    }
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvalidNamespace => "invalid namespace",
            Self::NotFound => "not found",
            Self::EncodingFailed => "encoding failed",
            Self::DecodingFailed => "decoding failed",
            Self::WriteFailed => "write failed",
            Self::ReadFailed => "read failed",
            Self::DeleteFailed => "delete failed",
        };
        f.write_str(name)
    }
}
