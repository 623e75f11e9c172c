//! Core types for Tandem data synchronization
//!
//! This crate holds the pieces every other Tandem crate agrees on:
//! - The [`Syncable`] contract for application data kinds
//! - The [`Encoding`] used for persisted artifacts and companion payloads
//! - The [`ErrorSeverity`] classification shared by the error taxonomies
//!
//! # Example
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use tandem_core::{Encoding, Syncable};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Profile {
//!     name: String,
//! }
//!
//! impl Syncable for Profile {
//!     const SYNC_IDENTIFIER: &'static str = "profile";
//! }
//!
//! assert_eq!(Profile::artifact_name(), "profile.json");
//!
//! let bytes = Encoding::Json.encode(&Profile { name: "Ada".into() }).unwrap();
//! let back: Profile = Encoding::Json.decode(&bytes).unwrap();
//! assert_eq!(back.name, "Ada");
//! ```

mod encoding;
mod error;
mod syncable;

pub use encoding::Encoding;
pub use error::{CodecError, CodecResult, ErrorSeverity};
pub use syncable::Syncable;
