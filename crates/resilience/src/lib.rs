// crates/resilience/src/lib.rs
//! Interruption handling for async operations
//!
//! This module lets callers bound how long they wait on an operation:
//! - Timeouts via [`with_timeout`]
//! - Cooperative cancellation via [`CancellationToken`]
//! - [`OperationGuard`] combining both
//!
//! Interrupting only abandons the *wait*. Work already handed to a spawned
//! task keeps running to completion.
//!
//! # Example
//!
//! ```rust
//! # #[tokio::main]
//! # async fn main() {
//! use std::time::Duration;
//! use tandem_resilience::{CancellationToken, OperationGuard};
//!
//! let token = CancellationToken::new();
//! let guard = OperationGuard::new()
//!     .with_timeout(Duration::from_secs(5))
//!     .with_cancellation(token.clone());
//!
//! let value = guard.run(async { 42 }).await.unwrap();
//! assert_eq!(value, 42);
//! # }
//! ```

mod error;
mod timeout;

pub use error::{ResilienceError, ResilienceResult};
pub use timeout::{with_timeout, OperationGuard};
pub use tokio_util::sync::CancellationToken;
