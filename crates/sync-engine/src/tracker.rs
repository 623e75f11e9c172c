// crates/sync-engine/src/tracker.rs
//! Activity tracking for emitted events

use crate::events::{EventBroadcaster, EventSubscription};
use crate::types::{SyncEvent, SyncStats};
use chrono::Utc;
use std::sync::{Arc, Mutex};

/// Emits sync events and keeps running totals of them
#[derive(Clone)]
pub(crate) struct ActivityTracker {
    events: EventBroadcaster,
    stats: Arc<Mutex<SyncStats>>,
}

impl ActivityTracker {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            events: EventBroadcaster::new(capacity),
            stats: Arc::new(Mutex::new(SyncStats::default())),
        }
    }

    /// Records an event, then broadcasts it
    pub(crate) fn emit(&self, event: SyncEvent) {
        self.record(&event);
        let reached = self.events.emit(event);
        log::trace!("Sync event delivered to {} subscribers", reached);
    }

    pub(crate) fn subscribe(&self) -> EventSubscription {
        self.events.subscribe()
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.events.subscriber_count()
    }

    /// Returns a snapshot of the totals
    pub(crate) fn stats(&self) -> SyncStats {
        self.stats
            .lock()
            .map(|s| s.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    fn record(&self, event: &SyncEvent) {
        let mut stats = match self.stats.lock() {
            Ok(stats) => stats,
            Err(poisoned) => poisoned.into_inner(),
        };

        match event {
            SyncEvent::DataSaved(_) => {
                stats.saves += 1;
                stats.last_saved = Some(Utc::now());
            }
            SyncEvent::DataDeleted(_) => stats.deletes += 1,
            SyncEvent::WatchDataSent(_) => stats.deliveries += 1,
            SyncEvent::WatchDataReceived(_) => stats.inbound += 1,
            SyncEvent::Error(kind) => {
                stats.errors += 1;
                stats.last_error = Some(kind.clone());
            }
        }
    }
}
