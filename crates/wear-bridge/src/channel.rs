//! The companion channel contract

use crate::error::ChannelResult;
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use tokio::sync::mpsc;

/// Receiving end of the inbound payload sequence
pub type InboundReceiver = mpsc::UnboundedReceiver<Bytes>;

/// Lifecycle of the companion session
///
/// `Inactive -> Activating -> Activated`, with `Deactivated` and `Failed` as
/// exits. Transitions come from the platform transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationState {
    /// Activation has not been requested
    Inactive,
    /// Activation requested, transport has not answered yet
    Activating,
    /// Session is usable
    Activated,
    /// Session was torn down by the transport
    Deactivated,
    /// Activation failed
    Failed(String),
}

impl ActivationState {
    /// Returns true once the session is usable
    pub fn is_activated(&self) -> bool {
        matches!(self, Self::Activated)
    }
}

impl fmt::Display for ActivationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inactive => write!(f, "inactive"),
            Self::Activating => write!(f, "activating"),
            Self::Activated => write!(f, "activated"),
            Self::Deactivated => write!(f, "deactivated"),
            Self::Failed(reason) => write!(f, "failed ({})", reason),
        }
    }
}

/// Bidirectional, best-effort link to a paired device
#[async_trait]
pub trait CompanionChannel: Send + Sync {
    /// Requests activation; a no-op when unsupported or already underway
    fn activate(&self);

    /// Current session lifecycle state
    fn activation_state(&self) -> ActivationState;

    /// Point-in-time, advisory reachability
    fn is_reachable(&self) -> bool;

    /// Hands a payload to the transport
    ///
    /// `Ok` means the transport accepted it, not that the peer received it.
    async fn send(&self, payload: Bytes) -> ChannelResult<()>;

    /// Takes the inbound payload sequence
    ///
    /// The sequence has a single consumer; later calls return `None`.
    fn take_inbound(&self) -> Option<InboundReceiver>;
}
