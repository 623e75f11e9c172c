//! Shared namespace resolution
//!
//! A namespace identifier (for example `group.tandem.shared`) names a
//! directory that every cooperating process can reach. Resolution turns the
//! identifier into that directory, creating it on first use.

use crate::error::{StoreError, StoreResult};
use directories::ProjectDirs;
use std::path::PathBuf;

/// A storage location shared by the app and its extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedNamespace {
    identifier: String,
    base_directory: Option<PathBuf>,
}

impl SharedNamespace {
    /// Creates a namespace rooted in the platform data directory
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            base_directory: None,
        }
    }

    /// Roots the namespace under an explicit directory instead
    pub fn with_base_directory(mut self, base: impl Into<PathBuf>) -> Self {
        self.base_directory = Some(base.into());
        self
    }

    /// Returns the namespace identifier
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns the explicit base directory, if one was configured
    pub fn base_directory(&self) -> Option<&PathBuf> {
        self.base_directory.as_ref()
    }

    /// Checks that an identifier is safe to use as a directory name
    pub fn validate_identifier(identifier: &str) -> Result<(), String> {
        if identifier.trim().is_empty() {
            return Err("identifier is empty".to_string());
        }
        if identifier.contains("..") {
            return Err("identifier must not contain '..'".to_string());
        }
        if let Some(bad) = identifier
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')))
        {
            return Err(format!("identifier contains invalid character {:?}", bad));
        }
        Ok(())
    }

    /// Resolves the namespace to a directory, creating it if needed
    pub async fn resolve(&self) -> StoreResult<PathBuf> {
        Self::validate_identifier(&self.identifier).map_err(|reason| self.invalid(reason))?;

        let base = match &self.base_directory {
            Some(base) => base.clone(),
            None => Self::default_base_directory().ok_or_else(|| {
                self.invalid("could not determine the platform data directory".to_string())
            })?,
        };

        let root = base.join(&self.identifier);
        if !tokio::fs::try_exists(&root).await.unwrap_or(false) {
            tokio::fs::create_dir_all(&root)
                .await
                .map_err(|e| self.invalid(format!("cannot create {}: {}", root.display(), e)))?;
            log::info!("Created shared namespace directory: {}", root.display());
        }

        if !root.is_dir() {
            return Err(self.invalid(format!("{} is not a directory", root.display())));
        }

        Ok(root)
    }

    fn default_base_directory() -> Option<PathBuf> {
        ProjectDirs::from("", "", "tandem").map(|dirs| dirs.data_dir().join("shared"))
    }

    fn invalid(&self, reason: String) -> StoreError {
        StoreError::InvalidNamespace {
            identifier: self.identifier.clone(),
            reason,
        }
    }
}
