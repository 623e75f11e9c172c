//! Tandem Configuration System
//!
//! This module provides the TOML configuration file read by the `tandem`
//! binary. Each section implements the `ConfigSection` trait.
//!
//! # Architecture
//!
//! - **Trait-based**: each section validates and merges itself
//! - **Graceful degradation**: invalid values are reported, never panicked on
//! - **Atomic writes**: config files are never left half written
//!
//! # Example
//!
//! ```rust
//! use tandem_config::{Config, ConfigManager};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let manager = ConfigManager::with_directory(dir.path().to_path_buf()).unwrap();
//!
//! // A missing file yields defaults
//! let config = manager.load().unwrap_or_else(|e| {
//!     eprintln!("Config error: {}, using defaults", e);
//!     Config::default()
//! });
//!
//! println!("Namespace: {}", config.store.group_identifier);
//! ```

mod error;
mod manager;
mod overrides;
mod persistence;
mod validation;

// Config sections
pub mod app_config;
mod companion_config;
mod engine_config;
mod store_config;

pub use error::{ConfigError, ConfigResult, ValidationError};
pub use manager::ConfigManager;
pub use overrides::ENV_PREFIX;
pub use validation::{ConfigSection, Validator};

pub use app_config::{AppConfig, LogLevel};
pub use companion_config::CompanionConfig;
pub use engine_config::EngineConfig;
pub use store_config::StoreConfig;

use serde::{Deserialize, Serialize};

/// Current config file format version
pub const CONFIG_VERSION: u32 = 1;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Config file format version
    pub version: u32,

    /// Application-level settings
    pub app: AppConfig,

    /// Shared store location and encoding
    pub store: StoreConfig,

    /// Companion device channel
    pub companion: CompanionConfig,

    /// Sync engine tuning
    pub engine: EngineConfig,
}

impl Config {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the entire configuration
    ///
    /// Returns all validation errors found across all sections.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(mut e) = self.app.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.store.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.companion.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.engine.validate() {
            errors.append(&mut e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Merges this config with another, preferring values from `other`
    pub fn merge(&mut self, other: Config) {
        self.app.merge(other.app);
        self.store.merge(other.store);
        self.companion.merge(other.companion);
        self.engine.merge(other.engine);
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            app: AppConfig::default(),
            store: StoreConfig::default(),
            companion: CompanionConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}
