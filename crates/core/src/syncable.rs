//! The contract every synchronized data kind implements

use serde::de::DeserializeOwned;
use serde::Serialize;

/// An application value that can be persisted and mirrored to a companion
///
/// Each implementing type is one data *kind*. Its `SYNC_IDENTIFIER` must be
/// unique across the shared namespace, otherwise kinds overwrite each other's
/// artifacts. Values are immutable snapshots: a save replaces the previous
/// artifact wholesale.
pub trait Syncable: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Stable key for this kind, e.g. `"profile"`
    const SYNC_IDENTIFIER: &'static str;

    /// Suffix of the persisted artifact
    const STORAGE_EXTENSION: &'static str = "json";

    /// Artifact name in the shared namespace: `<identifier>.<extension>`
    fn artifact_name() -> String {
        format!("{}.{}", Self::SYNC_IDENTIFIER, Self::STORAGE_EXTENSION)
    }
}
