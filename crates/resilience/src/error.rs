// crates/resilience/src/error.rs
//! Error types for interrupted operations

use thiserror::Error;

/// Result type for guarded operations
pub type ResilienceResult<T> = Result<T, ResilienceError>;

/// Reasons a guarded operation stopped waiting
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResilienceError {
    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Operation was cancelled
    #[error("Operation was cancelled")]
    Cancelled,
}
