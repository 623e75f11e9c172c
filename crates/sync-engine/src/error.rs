// crates/sync-engine/src/error.rs
//! Error types for sync operations

use std::time::Duration;
use tandem_core::ErrorSeverity;
use tandem_store::{StoreError, StoreErrorKind};
use tandem_wear_bridge::{ChannelError, ChannelErrorKind};
use thiserror::Error;

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during synchronization
#[derive(Debug, Error)]
pub enum SyncError {
    /// The durable store rejected the operation
    #[error("Storage failed: {0}")]
    StorageFailed(#[from] StoreError),

    /// The local write succeeded but the companion did not accept the update
    #[error("Companion delivery failed: {0}")]
    CompanionFailed(#[from] ChannelError),

    /// Unclassified failure
    #[error("Sync operation failed: {0}")]
    OperationFailed(String),

    /// The caller cancelled the wait
    #[error("{operation} was cancelled")]
    Cancelled { operation: &'static str },

    /// The caller's deadline passed
    #[error("{operation} timed out after {after:?}")]
    TimedOut {
        operation: &'static str,
        after: Duration,
    },
}

/// Cloneable classification of a [`SyncError`], carried on the event stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncErrorKind {
    StorageFailed(StoreErrorKind),
    CompanionFailed(ChannelErrorKind),
    OperationFailed(String),
    Cancelled,
    TimedOut,
}

impl SyncError {
    /// Returns the kind of this error
    pub fn kind(&self) -> SyncErrorKind {
        match self {
            Self::StorageFailed(inner) => SyncErrorKind::StorageFailed(inner.kind()),
            Self::CompanionFailed(inner) => SyncErrorKind::CompanionFailed(inner.kind()),
            Self::OperationFailed(description) => SyncErrorKind::OperationFailed(description.clone()),
            Self::Cancelled { .. } => SyncErrorKind::Cancelled,
            Self::TimedOut { .. } => SyncErrorKind::TimedOut,
        }
    }

    /// Returns the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::StorageFailed(inner) => inner.severity(),
            Self::CompanionFailed(_) => ErrorSeverity::Degraded,
            Self::OperationFailed(_) => ErrorSeverity::Fatal,
            Self::Cancelled { .. } | Self::TimedOut { .. } => ErrorSeverity::Recoverable,
        }
    }

    /// True when local data was written but the companion missed the update
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::CompanionFailed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SyncError::OperationFailed("no runtime".to_string());
        assert!(err.to_string().contains("Sync operation failed"));
    }

    #[test]
    fn test_storage_failed_keeps_inner_cause() {
        let err = SyncError::from(StoreError::NotFound {
            artifact: "profile.json".to_string(),
        });
        assert!(err.to_string().contains("profile.json"));
        assert_eq!(err.kind(), SyncErrorKind::StorageFailed(StoreErrorKind::NotFound));
        assert!(!err.is_degraded());
    }

    #[test]
    fn test_companion_failure_is_degraded() {
        let err = SyncError::from(ChannelError::DeliveryFailed("rejected".to_string()));
        assert!(err.is_degraded());
        assert_eq!(err.severity(), ErrorSeverity::Degraded);
        assert_eq!(
            err.kind(),
            SyncErrorKind::CompanionFailed(ChannelErrorKind::DeliveryFailed)
        );
    }

    #[test]
    fn test_interruption_errors() {
        let err = SyncError::TimedOut {
            operation: "save",
            after: Duration::from_millis(250),
        };
        assert!(err.to_string().contains("save timed out"));
        assert_eq!(err.kind(), SyncErrorKind::TimedOut);

        let err = SyncError::Cancelled { operation: "read" };
        assert_eq!(err.to_string(), "read was cancelled");
        assert_eq!(err.severity(), ErrorSeverity::Recoverable);
    }
}
