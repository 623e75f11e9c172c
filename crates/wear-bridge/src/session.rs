//! Companion session over a platform transport

use crate::channel::{ActivationState, CompanionChannel, InboundReceiver};
use crate::error::{ChannelError, ChannelResult};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch};

/// The platform side of a companion session
///
/// Implementations report activation, reachability and inbound payloads
/// through the [`SessionEvents`] handle passed to `request_activation`.
#[async_trait]
pub trait SessionTransport: Send + Sync {
    /// Whether the host supports a companion device at all
    fn is_supported(&self) -> bool {
        true
    }

    /// Starts activation; completion is reported through `events`
    fn request_activation(&self, events: SessionEvents);

    /// Hands a payload to the platform for delivery
    async fn transmit(&self, payload: Bytes) -> Result<(), String>;
}

/// Transport for hosts without companion support
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedTransport;

#[async_trait]
impl SessionTransport for UnsupportedTransport {
    fn is_supported(&self) -> bool {
        false
    }

    fn request_activation(&self, _events: SessionEvents) {}

    async fn transmit(&self, _payload: Bytes) -> Result<(), String> {
        Err("companion devices are not supported on this host".to_string())
    }
}

struct SessionShared {
    activation: watch::Sender<ActivationState>,
    reachable: AtomicBool,
    inbound: mpsc::UnboundedSender<Bytes>,
}

/// Callback handle the transport uses to report session changes
#[derive(Clone)]
pub struct SessionEvents {
    shared: Arc<SessionShared>,
}

impl SessionEvents {
    /// Records an activation state transition
    ///
    /// Leaving the activated state also clears reachability.
    pub fn activation_changed(&self, state: ActivationState) {
        if !state.is_activated() {
            self.shared.reachable.store(false, Ordering::SeqCst);
        }
        log::info!("Companion session {}", state);
        self.shared.activation.send_replace(state);
    }

    /// Records a reachability change
    pub fn reachability_changed(&self, reachable: bool) {
        let previous = self.shared.reachable.swap(reachable, Ordering::SeqCst);
        if previous != reachable {
            log::debug!("Companion reachability changed to {}", reachable);
        }
    }

    /// Queues a payload pushed by the paired device
    pub fn payload_received(&self, payload: Bytes) {
        let len = payload.len();
        if self.shared.inbound.send(payload).is_err() {
            log::warn!("Dropped inbound payload of {} bytes: no consumer", len);
        }
    }
}

/// Companion channel backed by a [`SessionTransport`]
///
/// The session owns its transport exclusively.
pub struct WearSession {
    transport: Box<dyn SessionTransport>,
    events: SessionEvents,
    inbound: Mutex<Option<InboundReceiver>>,
}

impl WearSession {
    /// Creates an inactive session over a transport
    pub fn new(transport: impl SessionTransport + 'static) -> Self {
        let (activation, _) = watch::channel(ActivationState::Inactive);
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

        let shared = Arc::new(SessionShared {
            activation,
            reachable: AtomicBool::new(false),
            inbound: inbound_tx,
        });

        Self {
            transport: Box::new(transport),
            events: SessionEvents { shared },
            inbound: Mutex::new(Some(inbound_rx)),
        }
    }

    /// Returns the handle the transport reports through
    pub fn events(&self) -> SessionEvents {
        self.events.clone()
    }

    /// Subscribes to activation state transitions
    pub fn watch_activation(&self) -> watch::Receiver<ActivationState> {
        self.events.shared.activation.subscribe()
    }
}

#[async_trait]
impl CompanionChannel for WearSession {
    fn activate(&self) {
        if !self.transport.is_supported() {
            log::debug!("Companion devices unsupported on this host, skipping activation");
            return;
        }

        let mut requested = false;
        self.events.shared.activation.send_if_modified(|state| match state {
            ActivationState::Activating | ActivationState::Activated => false,
            _ => {
                *state = ActivationState::Activating;
                requested = true;
                true
            }
        });

        if requested {
            log::info!("Requesting companion session activation");
            self.transport.request_activation(self.events.clone());
        }
    }

    fn activation_state(&self) -> ActivationState {
        self.events.shared.activation.borrow().clone()
    }

    fn is_reachable(&self) -> bool {
        self.events.shared.reachable.load(Ordering::SeqCst)
    }

    async fn send(&self, payload: Bytes) -> ChannelResult<()> {
        if !self.activation_state().is_activated() {
            return Err(ChannelError::NotActivated);
        }
        if !self.is_reachable() {
            return Err(ChannelError::NotReachable);
        }

        let len = payload.len();
        self.transport
            .transmit(payload)
            .await
            .map_err(ChannelError::DeliveryFailed)?;

        log::debug!("Companion transport accepted {} bytes", len);
        Ok(())
    }

    fn take_inbound(&self) -> Option<InboundReceiver> {
        self.inbound.lock().ok().and_then(|mut slot| slot.take())
    }
}
