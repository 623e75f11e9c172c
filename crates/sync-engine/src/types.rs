// crates/sync-engine/src/types.rs
//! Core sync types and data structures

use crate::error::SyncErrorKind;
use bytes::Bytes;
use chrono::{DateTime, Utc};

/// One synchronization outcome, broadcast to live subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// An item was written to the durable store
    DataSaved(String),
    /// An item was removed from the durable store
    DataDeleted(String),
    /// The companion transport accepted an item
    WatchDataSent(String),
    /// The companion pushed a payload
    WatchDataReceived(InboundPayload),
    /// An operation failed
    Error(SyncErrorKind),
}

impl SyncEvent {
    /// Returns true for error events
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// A payload pushed from the companion device
///
/// `tag` is the sync identifier the sender framed the payload with, or
/// [`crate::UNKNOWN_TAG`] when the frame could not be read. `body` holds the
/// encoded item bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundPayload {
    pub tag: String,
    pub body: Bytes,
}

/// How far a successful save got
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written locally; no companion attached or it was unreachable
    StoredLocally,
    /// Written locally and accepted by the companion transport
    Delivered,
}

impl SaveOutcome {
    /// Returns true if the companion transport accepted the item
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// Running totals of everything emitted on the event stream
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncStats {
    /// Items written to the store
    pub saves: u64,
    /// Items removed from the store
    pub deletes: u64,
    /// Items accepted by the companion transport
    pub deliveries: u64,
    /// Payloads received from the companion
    pub inbound: u64,
    /// Errors raised
    pub errors: u64,
    /// When the last local write completed
    pub last_saved: Option<DateTime<Utc>>,
    /// Most recent error
    pub last_error: Option<SyncErrorKind>,
}

impl SyncStats {
    /// Returns true if any error has been recorded
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}
