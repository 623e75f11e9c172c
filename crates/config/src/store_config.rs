//! Shared store configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tandem_core::Encoding;
use tandem_store::SharedNamespace;

/// Where and how synced items are stored
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// Shared namespace identifier, used as the directory name
    pub group_identifier: String,

    /// Directory holding the namespace; the platform data directory if unset
    pub base_directory: Option<PathBuf>,

    /// Serializer applied to artifacts and companion payloads
    pub encoding: Encoding,
}

impl StoreConfig {
    /// Builds the shared namespace this section describes
    pub fn namespace(&self) -> SharedNamespace {
        let namespace = SharedNamespace::new(self.group_identifier.clone());
        match &self.base_directory {
            Some(base) => namespace.with_base_directory(base.clone()),
            None => namespace,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            group_identifier: "group.tandem.shared".to_string(),
            base_directory: None,
            encoding: Encoding::Json,
        }
    }
}

impl ConfigSection for StoreConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut results = vec![Validator::namespace_identifier(
            &self.group_identifier,
            "store.group_identifier",
        )];

        if let Some(base) = &self.base_directory {
            results.push(Validator::is_absolute(base, "store.base_directory"));
        }

        Validator::collect_errors(results)
    }

    fn merge(&mut self, other: Self) {
        self.group_identifier = other.group_identifier;
        if other.base_directory.is_some() {
            self.base_directory = other.base_directory;
        }
        self.encoding = other.encoding;
    }

    fn section_name(&self) -> &'static str {
        "store"
    }
}
