//! Durable store for syncable items
//!
//! Persists whole-item snapshots into a namespace shared by every process of
//! the application (main app, extensions, helpers):
//! - One artifact per data kind, named `<syncIdentifier>.<extension>`
//! - Writes go to a temporary file first and are renamed into place
//! - The namespace is resolved on every operation, so a misconfigured
//!   identifier is reported as [`StoreError::InvalidNamespace`], not a panic
//!
//! There is no per-kind locking here; concurrent saves of the same kind race
//! and the last rename wins.
//!
//! # Example
//!
//! ```rust,no_run
//! # async fn demo() -> tandem_store::StoreResult<()> {
//! use serde::{Deserialize, Serialize};
//! use tandem_core::{Encoding, Syncable};
//! use tandem_store::{SharedNamespace, SharedStore};
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
//! let store = SharedStore::new(SharedNamespace::new("group.tandem.shared"), Encoding::Json);
//! store.save(&Profile { name: "Ada".into() }).await?;
//! let _profile: Profile = store.read().await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod namespace;
mod store;

pub use error::{StoreError, StoreErrorKind, StoreResult};
pub use namespace::SharedNamespace;
pub use store::SharedStore;
