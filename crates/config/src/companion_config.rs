//! Companion device configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound for `companion.send_timeout_ms`
const MAX_SEND_TIMEOUT_MS: u64 = 300_000;

/// Companion channel settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompanionConfig {
    /// Attach a companion channel at startup
    pub enabled: bool,

    /// Longest wait for the transport to accept a payload; 0 waits forever
    pub send_timeout_ms: u64,
}

impl CompanionConfig {
    /// Returns the send timeout, `None` when unbounded
    pub fn send_timeout(&self) -> Option<Duration> {
        (self.send_timeout_ms > 0).then(|| Duration::from_millis(self.send_timeout_ms))
    }
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            send_timeout_ms: 10_000,
        }
    }
}

impl ConfigSection for CompanionConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![Validator::in_range(
            self.send_timeout_ms,
            0,
            MAX_SEND_TIMEOUT_MS,
            "companion.send_timeout_ms",
        )])
    }

    fn merge(&mut self, other: Self) {
        self.enabled = other.enabled;
        self.send_timeout_ms = other.send_timeout_ms;
    }

    fn section_name(&self) -> &'static str {
        "companion"
    }
}
