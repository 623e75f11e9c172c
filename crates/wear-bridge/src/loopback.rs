//! In-memory paired transport
//!
//! Two [`LoopbackTransport`] ends stand in for a phone and its watch. A
//! payload transmitted on one end is delivered to the other end's inbound
//! sequence. Both ends are reachable once both sessions are activated and the
//! link is connected. The [`LoopbackLink`] controller simulates connectivity
//! loss and transport rejections.

use crate::channel::ActivationState;
use crate::session::{SessionEvents, SessionTransport};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Endpoint {
    events: Mutex<Option<SessionEvents>>,
}

impl Endpoint {
    fn events(&self) -> Option<SessionEvents> {
        self.events.lock().ok().and_then(|slot| slot.clone())
    }

    fn attach(&self, events: SessionEvents) {
        if let Ok(mut slot) = self.events.lock() {
            *slot = Some(events);
        }
    }

    fn detach(&self) -> Option<SessionEvents> {
        self.events.lock().ok().and_then(|mut slot| slot.take())
    }
}

struct LinkState {
    connected: AtomicBool,
    rejecting: AtomicBool,
}

/// Controller shared by both ends of a loopback pair
#[derive(Clone)]
pub struct LoopbackLink {
    ends: [Arc<Endpoint>; 2],
    state: Arc<LinkState>,
}

impl LoopbackLink {
    /// Simulates the devices moving out of range
    pub fn disconnect(&self) {
        self.state.connected.store(false, Ordering::SeqCst);
        self.refresh();
    }

    /// Simulates the devices coming back into range
    pub fn reconnect(&self) {
        self.state.connected.store(true, Ordering::SeqCst);
        self.refresh();
    }

    /// Makes both transports refuse (or accept again) every payload
    pub fn reject_deliveries(&self, reject: bool) {
        self.state.rejecting.store(reject, Ordering::SeqCst);
    }

    /// Deactivates both sessions, as when the pairing is removed
    pub fn deactivate(&self) {
        for end in &self.ends {
            if let Some(events) = end.detach() {
                events.activation_changed(ActivationState::Deactivated);
            }
        }
    }

    /// Returns whether the link is connected
    pub fn is_connected(&self) -> bool {
        self.state.connected.load(Ordering::SeqCst)
    }

    fn refresh(&self) {
        let both_active = self.ends.iter().all(|end| end.events().is_some());
        let reachable = both_active && self.is_connected();
        for end in &self.ends {
            if let Some(events) = end.events() {
                events.reachability_changed(reachable);
            }
        }
    }
}

/// One end of an in-memory paired transport
pub struct LoopbackTransport {
    local: usize,
    link: LoopbackLink,
}

impl LoopbackTransport {
    /// Creates two linked transports and their controller
    pub fn pair() -> (LoopbackTransport, LoopbackTransport, LoopbackLink) {
        let link = LoopbackLink {
            ends: [Arc::new(Endpoint::default()), Arc::new(Endpoint::default())],
            state: Arc::new(LinkState {
                connected: AtomicBool::new(true),
                rejecting: AtomicBool::new(false),
            }),
        };

        let first = LoopbackTransport {
            local: 0,
            link: link.clone(),
        };
        let second = LoopbackTransport {
            local: 1,
            link: link.clone(),
        };

        (first, second, link)
    }

    fn remote(&self) -> &Endpoint {
        &self.link.ends[1 - self.local]
    }
}

#[async_trait]
impl SessionTransport for LoopbackTransport {
    fn request_activation(&self, events: SessionEvents) {
        self.link.ends[self.local].attach(events.clone());
        events.activation_changed(ActivationState::Activated);
        self.link.refresh();
    }

    async fn transmit(&self, payload: Bytes) -> Result<(), String> {
        if self.link.state.rejecting.load(Ordering::SeqCst) {
            return Err("transport rejected the payload".to_string());
        }
        if !self.link.is_connected() {
            return Err("paired device is out of range".to_string());
        }

        match self.remote().events() {
            Some(events) => {
                events.payload_received(payload);
                Ok(())
            }
            None => Err("paired session is not activated".to_string()),
        }
    }
}
