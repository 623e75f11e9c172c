//! Event broadcasting
//!
//! A multi-subscriber broadcast with no replay: a subscriber sees only events
//! emitted after it subscribed. Emitting never waits on subscribers; a
//! subscriber that falls more than the channel capacity behind skips ahead.

use crate::types::SyncEvent;
use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

/// Sender side of the event stream
#[derive(Clone)]
pub(crate) struct EventBroadcaster {
    tx: broadcast::Sender<SyncEvent>,
}

impl EventBroadcaster {
    /// Creates a broadcaster buffering up to `capacity` events per subscriber
    pub(crate) fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Emits an event, returning how many subscribers it reached
    pub(crate) fn emit(&self, event: SyncEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    pub(crate) fn subscribe(&self) -> EventSubscription {
        EventSubscription {
            rx: self.tx.subscribe(),
        }
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// A live view of the sync event stream
pub struct EventSubscription {
    rx: broadcast::Receiver<SyncEvent>,
}

impl EventSubscription {
    /// Waits for the next event
    ///
    /// Returns `None` once the sync manager is gone.
    pub async fn next(&mut self) -> Option<SyncEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(missed)) => {
                    log::warn!("Sync event subscriber lagged, {} events missed", missed);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next event if one is already queued
    pub fn try_next(&mut self) -> Option<SyncEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(missed)) => {
                    log::warn!("Sync event subscriber lagged, {} events missed", missed);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    /// Adapts the subscription into a [`Stream`]
    pub fn into_stream(self) -> impl Stream<Item = SyncEvent> + Send {
        futures::stream::unfold(self, |mut subscription| async move {
            subscription.next().await.map(|event| (event, subscription))
        })
    }
}
