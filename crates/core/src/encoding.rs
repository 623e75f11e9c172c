//! Byte encodings for persisted artifacts and companion payloads

use crate::error::CodecResult;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Structured encoding applied to every artifact and payload
///
/// The same encoding must be used on both ends of a store or a companion
/// link; decode(encode(x)) yields a value equal to `x`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Compact JSON
    #[default]
    Json,
    /// Indented JSON, easier to inspect on disk
    PrettyJson,
    /// TOML (the item must serialize as a table)
    Toml,
}

impl Encoding {
    /// Encodes a value into bytes
    pub fn encode<T: Serialize>(&self, value: &T) -> CodecResult<Vec<u8>> {
        match self {
            Encoding::Json => Ok(serde_json::to_vec(value)?),
            Encoding::PrettyJson => Ok(serde_json::to_vec_pretty(value)?),
            Encoding::Toml => Ok(toml::to_string(value)?.into_bytes()),
        }
    }

    /// Decodes bytes produced by [`Encoding::encode`]
    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> CodecResult<T> {
        match self {
            Encoding::Json | Encoding::PrettyJson => Ok(serde_json::from_slice(bytes)?),
            Encoding::Toml => {
                let text = std::str::from_utf8(bytes)?;
                Ok(toml::from_str(text)?)
            }
        }
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Encoding::Json => write!(f, "json"),
            Encoding::PrettyJson => write!(f, "prettyjson"),
            Encoding::Toml => write!(f, "toml"),
        }
    }
}
