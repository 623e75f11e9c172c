// crates/sync-engine/src/protocol.rs
//! Companion wire framing
//!
//! Frame layout: `u16` big-endian identifier length, the UTF-8 sync
//! identifier, then the encoded item bytes.

use crate::error::{SyncError, SyncResult};
use crate::types::InboundPayload;
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Tag given to inbound frames that could not be read
pub const UNKNOWN_TAG: &str = "unknown";

/// An encoded item addressed by its sync identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanionEnvelope {
    pub sync_identifier: String,
    pub body: Bytes,
}

impl CompanionEnvelope {
    /// Creates a new envelope
    pub fn new(sync_identifier: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            sync_identifier: sync_identifier.into(),
            body: body.into(),
        }
    }

    /// Frames the envelope for the transport
    pub fn encode(&self) -> SyncResult<Bytes> {
        let id = self.sync_identifier.as_bytes();
        let id_len = u16::try_from(id.len()).map_err(|_| {
            SyncError::OperationFailed(format!(
                "sync identifier is {} bytes, frames allow at most {}",
                id.len(),
                u16::MAX
            ))
        })?;

        let mut frame = BytesMut::with_capacity(2 + id.len() + self.body.len());
        frame.put_u16(id_len);
        frame.put_slice(id);
        frame.put_slice(&self.body);
        Ok(frame.freeze())
    }

    /// Reads a frame, returning `None` if it is malformed
    pub fn decode(mut frame: Bytes) -> Option<Self> {
        if frame.remaining() < 2 {
            return None;
        }
        let id_len = frame.get_u16() as usize;
        if id_len == 0 || frame.remaining() < id_len {
            return None;
        }

        let id = frame.split_to(id_len);
        let sync_identifier = std::str::from_utf8(&id).ok()?.to_string();
        Some(Self {
            sync_identifier,
            body: frame,
        })
    }
}

impl InboundPayload {
    /// Builds a payload from a raw inbound frame
    ///
    /// Unreadable frames are kept whole under [`UNKNOWN_TAG`].
    pub fn from_frame(frame: Bytes) -> Self {
        match CompanionEnvelope::decode(frame.clone()) {
            Some(envelope) => Self {
                tag: envelope.sync_identifier,
                body: envelope.body,
            },
            None => Self {
                tag: UNKNOWN_TAG.to_string(),
                body: frame,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_layout() {
        let envelope = CompanionEnvelope::new("profile", Bytes::from_static(br#"{"name":"Ada"}"#));
        let frame = envelope.encode().unwrap();

        assert_eq!(&frame[..2], &[0, 7]);
        assert_eq!(&frame[2..9], b"profile");
        assert_eq!(&frame[9..], br#"{"name":"Ada"}"#);
    }

    #[test]
    fn test_decode_recovers_envelope() {
        let envelope = CompanionEnvelope::new("preferences", Bytes::from_static(b"dark_mode = true"));
        let decoded = CompanionEnvelope::decode(envelope.encode().unwrap()).unwrap();
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn test_empty_body_is_allowed() {
        let envelope = CompanionEnvelope::new("marker", Bytes::new());
        let decoded = CompanionEnvelope::decode(envelope.encode().unwrap()).unwrap();
        assert!(decoded.body.is_empty());
    }

    #[test]
    fn test_malformed_frames() {
        assert!(CompanionEnvelope::decode(Bytes::new()).is_none());
        assert!(CompanionEnvelope::decode(Bytes::from_static(&[0])).is_none());
        // Zero-length identifier
        assert!(CompanionEnvelope::decode(Bytes::from_static(&[0, 0, b'x'])).is_none());
        // Declared identifier longer than the frame
        assert!(CompanionEnvelope::decode(Bytes::from_static(&[0, 9, b'a'])).is_none());
        // Identifier is not UTF-8
        assert!(CompanionEnvelope::decode(Bytes::from_static(&[0, 1, 0xff])).is_none());
    }

    #[test]
    fn test_oversized_identifier_is_rejected() {
        let envelope = CompanionEnvelope::new("x".repeat(70_000), Bytes::new());
        assert!(matches!(
            envelope.encode(),
            Err(SyncError::OperationFailed(_))
        ));
    }

    #[test]
    fn test_inbound_payload_from_frame() {
        let frame = CompanionEnvelope::new("profile", Bytes::from_static(b"{}"))
            .encode()
            .unwrap();
        let payload = InboundPayload::from_frame(frame);
        assert_eq!(payload.tag, "profile");
        assert_eq!(payload.body, Bytes::from_static(b"{}"));

        let raw = Bytes::from_static(b"?");
        let payload = InboundPayload::from_frame(raw.clone());
        assert_eq!(payload.tag, UNKNOWN_TAG);
        assert_eq!(payload.body, raw);
    }
}
