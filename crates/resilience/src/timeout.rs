// crates/resilience/src/timeout.rs
//! Timeout and cancellation guards

use crate::error::{ResilienceError, ResilienceResult};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Awaits `operation`, giving up after `duration`
pub async fn with_timeout<F>(duration: Duration, operation: F) -> ResilienceResult<F::Output>
where
    F: Future,
{
    tokio::time::timeout(duration, operation)
        .await
        .map_err(|_| ResilienceError::Timeout(duration))
}

/// Caller-supplied bounds on how long to wait for an operation
#[derive(Debug, Clone, Default)]
pub struct OperationGuard {
    timeout: Option<Duration>,
    token: Option<CancellationToken>,
}

impl OperationGuard {
    /// Creates a guard that never interrupts
    pub fn new() -> Self {
        Self::default()
    }

    /// Gives up after `duration`
    pub fn with_timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Gives up when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Gets the timeout duration
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns true if the guard has neither a timeout nor a token
    pub fn is_unbounded(&self) -> bool {
        self.timeout.is_none() && self.token.is_none()
    }

    /// Awaits `operation` under this guard
    ///
    /// A token that is already cancelled wins over a ready operation.
    pub async fn run<F>(&self, operation: F) -> ResilienceResult<F::Output>
    where
        F: Future,
    {
        let cancelled = async {
            match &self.token {
                Some(token) => token.cancelled().await,
                None => std::future::pending::<()>().await,
            }
        };

        let bounded = async {
            match self.timeout {
                Some(duration) => with_timeout(duration, operation).await,
                None => Ok(operation.await),
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => Err(ResilienceError::Cancelled),
            result = bounded => result,
        }
    }
}
