// crates/sync-engine/src/lib.rs
//! Cross-device synchronization engine
//!
//! This module persists app data locally and mirrors it to a paired
//! companion device:
//! - Whole-item snapshots written to a shared store
//! - Best-effort delivery to a reachable companion
//! - A broadcast stream of sync events, including inbound payloads
//!
//! # Example
//!
//! ```rust
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use serde::{Deserialize, Serialize};
//! use std::sync::Arc;
//! use tandem_core::{Encoding, Syncable};
//! use tandem_store::{SharedNamespace, SharedStore};
//! use tandem_sync_engine::{SaveOutcome, SyncConfig, SyncEvent, SyncManager};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Profile {
//!     name: String,
//! }
//!
//! impl Syncable for Profile {
//!     const SYNC_IDENTIFIER: &'static str = "profile";
//! }
//!
//! let dir = tempfile::tempdir()?;
//! let store = SharedStore::new(
//!     SharedNamespace::new("group.example").with_base_directory(dir.path()),
//!     Encoding::Json,
//! );
//! let manager = SyncManager::new(Arc::new(store), None, SyncConfig::default())?;
//! let mut events = manager.subscribe();
//!
//! let outcome = manager.save(&Profile { name: "Ada".into() }).await?;
//! assert_eq!(outcome, SaveOutcome::StoredLocally);
//! assert_eq!(events.next().await, Some(SyncEvent::DataSaved("profile".into())));
//! # Ok(())
//! # }
//! ```

mod engine;
mod error;
mod events;
mod locks;
mod protocol;
mod tracker;
mod types;

pub use engine::{SyncConfig, SyncManager};
pub use error::{SyncError, SyncErrorKind, SyncResult};
pub use events::EventSubscription;
pub use protocol::{CompanionEnvelope, UNKNOWN_TAG};
pub use tandem_resilience::{CancellationToken, OperationGuard};
pub use types::{InboundPayload, SaveOutcome, SyncEvent, SyncStats};
