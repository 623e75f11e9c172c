//! Artifact persistence in the shared namespace

use crate::error::{StoreError, StoreResult};
use crate::namespace::SharedNamespace;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tandem_core::{Encoding, Syncable};
use tempfile::NamedTempFile;

/// Durable store for whole-item snapshots
#[derive(Debug, Clone)]
pub struct SharedStore {
    namespace: SharedNamespace,
    encoding: Encoding,
}

impl SharedStore {
    /// Creates a store over a namespace with the given encoding
    ///
    /// Nothing touches the filesystem until the first operation.
    pub fn new(namespace: SharedNamespace, encoding: Encoding) -> Self {
        Self {
            namespace,
            encoding,
        }
    }

    /// Returns the shared namespace
    pub fn namespace(&self) -> &SharedNamespace {
        &self.namespace
    }

    /// Returns the encoding applied to artifacts
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Encodes an item with this store's encoding
    pub fn encode<T: Syncable>(&self, item: &T) -> StoreResult<Vec<u8>> {
        self.encoding
            .encode(item)
            .map_err(|source| StoreError::EncodingFailed {
                artifact: T::artifact_name(),
                source,
            })
    }

    /// Decodes bytes as kind `T` with this store's encoding
    pub fn decode<T: Syncable>(&self, bytes: &[u8]) -> StoreResult<T> {
        self.encoding
            .decode(bytes)
            .map_err(|source| StoreError::DecodingFailed {
                artifact: T::artifact_name(),
                source,
            })
    }

    /// Resolves the full path of an artifact in the namespace
    pub async fn artifact_path(&self, artifact: &str) -> StoreResult<PathBuf> {
        if !is_plain_file_name(artifact) {
            return Err(StoreError::InvalidNamespace {
                identifier: self.namespace.identifier().to_string(),
                reason: format!("artifact name {:?} escapes the namespace", artifact),
            });
        }
        let root = self.namespace.resolve().await?;
        Ok(root.join(artifact))
    }

    /// Serializes `item` and overwrites the artifact for its kind
    pub async fn save<T: Syncable>(&self, item: &T) -> StoreResult<()> {
        let bytes = self.encode(item)?;
        self.write_encoded(&T::artifact_name(), bytes).await?;
        Ok(())
    }

    /// Writes pre-encoded bytes as the named artifact
    ///
    /// The bytes land in a temporary file in the namespace root and are then
    /// renamed over the artifact. Returns the artifact path.
    pub async fn write_encoded(&self, artifact: &str, bytes: Vec<u8>) -> StoreResult<PathBuf> {
        let path = self.artifact_path(artifact).await?;
        let target = path.clone();

        let written = tokio::task::spawn_blocking(move || write_replacing(&target, &bytes)).await;

        match written {
            Ok(Ok(())) => {
                log::debug!("Wrote artifact {}", path.display());
                Ok(path)
            }
            Ok(Err(source)) => Err(StoreError::WriteFailed { path, source }),
            Err(join_err) => Err(StoreError::WriteFailed {
                path,
                source: io::Error::other(join_err.to_string()),
            }),
        }
    }

    /// Loads and decodes the artifact for kind `T`
    pub async fn read<T: Syncable>(&self) -> StoreResult<T> {
        let artifact = T::artifact_name();
        let path = self.artifact_path(&artifact).await?;

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound { artifact });
            }
            Err(source) => return Err(StoreError::ReadFailed { path, source }),
        };

        self.decode(&bytes)
    }

    /// Returns whether an artifact exists for kind `T`
    ///
    /// Never fails: an unresolvable namespace counts as "does not exist".
    pub async fn exists<T: Syncable>(&self) -> bool {
        match self.artifact_path(&T::artifact_name()).await {
            Ok(path) => tokio::fs::try_exists(&path).await.unwrap_or(false),
            Err(e) => {
                log::debug!("Treating {} as absent: {}", T::artifact_name(), e);
                false
            }
        }
    }

    /// Removes the artifact for kind `T`
    pub async fn delete<T: Syncable>(&self) -> StoreResult<()> {
        let artifact = T::artifact_name();
        let path = self.artifact_path(&artifact).await?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                log::debug!("Deleted artifact {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound { artifact }),
            Err(source) => Err(StoreError::DeleteFailed { path, source }),
        }
    }
}

/// True for a single, non-hidden path component
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains("..")
}

fn write_replacing(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| io::Error::other("artifact path has no parent directory"))?;

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.flush()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
