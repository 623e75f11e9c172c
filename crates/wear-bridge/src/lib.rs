//! Companion device bridge
//!
//! A session-oriented, best-effort link to a paired device (typically a
//! watch). The platform transport drives activation and reachability; this
//! crate only observes those transitions and exposes:
//! - [`CompanionChannel`]: the contract the sync engine depends on
//! - [`WearSession`]: the channel implementation over a [`SessionTransport`]
//! - [`LoopbackTransport`]: an in-memory paired transport for tests and demos
//!
//! # Example
//!
//! ```rust
//! # #[tokio::main]
//! # async fn main() {
//! use bytes::Bytes;
//! use tandem_wear_bridge::{CompanionChannel, LoopbackTransport, WearSession};
//!
//! let (phone_transport, watch_transport, _link) = LoopbackTransport::pair();
//! let phone = WearSession::new(phone_transport);
//! let watch = WearSession::new(watch_transport);
//!
//! phone.activate();
//! watch.activate();
//! assert!(phone.is_reachable());
//!
//! let mut inbound = watch.take_inbound().unwrap();
//! phone.send(Bytes::from_static(b"hello")).await.unwrap();
//! assert_eq!(inbound.recv().await.unwrap(), Bytes::from_static(b"hello"));
//! # }
//! ```

mod channel;
mod error;
mod loopback;
mod session;

pub use channel::{ActivationState, CompanionChannel, InboundReceiver};
pub use error::{ChannelError, ChannelErrorKind, ChannelResult};
pub use loopback::{LoopbackLink, LoopbackTransport};
pub use session::{SessionEvents, SessionTransport, UnsupportedTransport, WearSession};
