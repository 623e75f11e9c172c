//! Environment variable overrides
//!
//! Variables follow the pattern `TANDEM_<SECTION>_<FIELD>`, for example
//! `TANDEM_APP_LOG_LEVEL=debug`. Unparseable values are logged and ignored.

use crate::Config;
use std::path::PathBuf;

/// Prefix shared by every override variable
pub const ENV_PREFIX: &str = "TANDEM_";

impl Config {
    /// Applies `TANDEM_*` overrides from the given variables
    ///
    /// Returns the number of overrides applied.
    pub fn apply_env_overrides<I, K, V>(&mut self, vars: I) -> usize
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut applied = 0;

        for (key, value) in vars {
            let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value = value.as_ref();

            let accepted = match name {
                "APP_LOG_LEVEL" => value.parse().map(|level| self.app.log_level = level),
                "APP_COLOR_OUTPUT" => parse_bool(value).map(|b| self.app.color_output = b),
                "STORE_GROUP_IDENTIFIER" => {
                    self.store.group_identifier = value.to_string();
                    Ok(())
                }
                "STORE_BASE_DIRECTORY" => {
                    self.store.base_directory = Some(PathBuf::from(value));
                    Ok(())
                }
                "COMPANION_ENABLED" => parse_bool(value).map(|b| self.companion.enabled = b),
                "COMPANION_SEND_TIMEOUT_MS" => value
                    .parse()
                    .map(|ms| self.companion.send_timeout_ms = ms)
                    .map_err(|e| format!("{}", e)),
                "ENGINE_EVENT_CAPACITY" => value
                    .parse()
                    .map(|n| self.engine.event_capacity = n)
                    .map_err(|e| format!("{}", e)),
                _ => continue,
            };

            match accepted {
                Ok(()) => {
                    log::info!("Config override {}{} applied", ENV_PREFIX, name);
                    applied += 1;
                }
                Err(reason) => {
                    log::warn!("Ignoring {}{}={:?}: {}", ENV_PREFIX, name, value, reason);
                }
            }
        }

        applied
    }
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("expected a boolean, got {:?}", other)),
    }
}
