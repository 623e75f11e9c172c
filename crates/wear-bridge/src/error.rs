//! Error types for companion channel operations

use std::fmt;
use thiserror::Error;

/// Result type for channel operations
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Errors that can occur when delivering to the companion device
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChannelError {
    /// The session has not finished activating
    #[error("Companion session is not activated")]
    NotActivated,

    /// The companion is not reachable right now
    #[error("Companion device is not reachable")]
    NotReachable,

    /// The transport refused the payload
    #[error("Companion delivery failed: {0}")]
    DeliveryFailed(String),
}

/// Cloneable classification of a [`ChannelError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelErrorKind {
    NotActivated,
    NotReachable,
    DeliveryFailed,
}

impl ChannelError {
    /// Returns the kind of this error
    pub fn kind(&self) -> ChannelErrorKind {
        match self {
            Self::NotActivated => ChannelErrorKind::NotActivated,
            Self::NotReachable => ChannelErrorKind::NotReachable,
            Self::DeliveryFailed(_) => ChannelErrorKind::DeliveryFailed,
        }
    }
}

impl fmt::Display for ChannelErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotActivated => "not activated",
            Self::NotReachable => "not reachable",
            Self::DeliveryFailed => "delivery failed",
        };
        f.write_str(name)
    }
}
