//! Sync engine configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};

/// Sync engine tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Events buffered per subscriber
    pub event_capacity: usize,

    /// Run operations on the same kind one at a time
    pub serialize_per_kind: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_capacity: 128,
            serialize_per_kind: false,
        }
    }
}

impl ConfigSection for EngineConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![Validator::in_range(
            self.event_capacity,
            1,
            65_536,
            "engine.event_capacity",
        )])
    }

    fn merge(&mut self, other: Self) {
        self.event_capacity = other.event_capacity;
        self.serialize_per_kind = other.serialize_per_kind;
    }

    fn section_name(&self) -> &'static str {
        "engine"
    }
}
