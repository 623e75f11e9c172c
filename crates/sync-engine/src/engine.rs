// crates/sync-engine/src/engine.rs
//! Main sync engine

use crate::error::{SyncError, SyncResult};
use crate::events::EventSubscription;
use crate::locks::KindLocks;
use crate::protocol::CompanionEnvelope;
use crate::tracker::ActivityTracker;
use crate::types::{InboundPayload, SaveOutcome, SyncEvent, SyncStats};
use bytes::Bytes;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tandem_core::Syncable;
use tandem_resilience::{with_timeout, OperationGuard, ResilienceError};
use tandem_store::SharedStore;
use tandem_wear_bridge::{ChannelError, CompanionChannel, InboundReceiver};
use tokio::sync::{oneshot, OwnedMutexGuard};
use tokio::task::JoinHandle;

/// Per-kind permit; `None` when saves are not serialized
type KindPermit = Option<OwnedMutexGuard<()>>;

/// Configuration for the sync engine
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Events buffered per subscriber before a slow subscriber skips ahead
    pub event_capacity: usize,
    /// Longest wait for the companion transport to accept a payload
    pub send_timeout: Option<Duration>,
    /// Run save/read/delete of the same kind one at a time
    pub serialize_per_kind: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            event_capacity: 128,
            send_timeout: Some(Duration::from_secs(10)),
            serialize_per_kind: false,
        }
    }
}

/// Persists syncable items and mirrors them to an optional companion device
///
/// Every failure returned to a caller is also emitted once as
/// [`SyncEvent::Error`], so a passive subscriber sees the same history.
pub struct SyncManager {
    store: Arc<SharedStore>,
    channel: Option<Arc<dyn CompanionChannel>>,
    config: SyncConfig,
    tracker: ActivityTracker,
    locks: KindLocks,
    inbound_task: Option<JoinHandle<()>>,
}

impl SyncManager {
    /// Creates a sync manager over a store and an optional companion channel
    ///
    /// Must be called inside a Tokio runtime. When a channel is attached,
    /// its activation is requested and its inbound sequence is consumed for
    /// the lifetime of the manager.
    pub fn new(
        store: Arc<SharedStore>,
        channel: Option<Arc<dyn CompanionChannel>>,
        config: SyncConfig,
    ) -> SyncResult<Self> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            SyncError::OperationFailed("SyncManager must be created inside a Tokio runtime".into())
        })?;

        let tracker = ActivityTracker::new(config.event_capacity);

        let inbound_task = match &channel {
            Some(channel) => {
                channel.activate();
                match channel.take_inbound() {
                    Some(inbound) => Some(runtime.spawn(listen_inbound(inbound, tracker.clone()))),
                    None => {
                        log::warn!("Companion inbound sequence already taken, inbound payloads will not be observed");
                        None
                    }
                }
            }
            None => None,
        };

        log::info!(
            "Sync manager ready (namespace: {}, companion: {})",
            store.namespace().identifier(),
            if channel.is_some() { "attached" } else { "none" }
        );

        Ok(Self {
            store,
            channel,
            config,
            tracker,
            locks: KindLocks::default(),
            inbound_task,
        })
    }

    /// Creates a sync manager without a companion channel
    pub fn local_only(store: Arc<SharedStore>, config: SyncConfig) -> SyncResult<Self> {
        Self::new(store, None, config)
    }

    /// Returns the durable store
    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Returns the engine configuration
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Returns true if a companion channel is attached
    pub fn has_companion(&self) -> bool {
        self.channel.is_some()
    }

    /// Subscribes to events emitted from now on
    pub fn subscribe(&self) -> EventSubscription {
        self.tracker.subscribe()
    }

    /// Number of live event subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.tracker.subscriber_count()
    }

    /// Gets running totals of emitted events
    pub fn stats(&self) -> SyncStats {
        self.tracker.stats()
    }

    /// Persists `item`, then offers it to the companion if one is reachable
    ///
    /// An error after the local write (`CompanionFailed`) means the sync is
    /// degraded: the item is stored, the companion does not have it.
    pub async fn save<T: Syncable>(&self, item: &T) -> SyncResult<SaveOutcome> {
        let permit = self.lock_kind(T::SYNC_IDENTIFIER).await;

        let bytes = self
            .store
            .encode(item)
            .map_err(|e| self.fail(SyncError::StorageFailed(e)))?;

        let _permit = self
            .persist(T::SYNC_IDENTIFIER, T::artifact_name(), bytes.clone(), permit)
            .await?;

        let Some(channel) = self.channel.as_ref() else {
            return Ok(SaveOutcome::StoredLocally);
        };
        if !channel.is_reachable() {
            log::debug!("Companion unreachable, {} stored locally only", T::SYNC_IDENTIFIER);
            return Ok(SaveOutcome::StoredLocally);
        }

        let frame = CompanionEnvelope::new(T::SYNC_IDENTIFIER, bytes)
            .encode()
            .map_err(|e| self.fail(e))?;
        self.deliver(channel.as_ref(), T::SYNC_IDENTIFIER, frame)
            .await?;

        Ok(SaveOutcome::Delivered)
    }

    /// Loads the stored item of kind `T`
    pub async fn read<T: Syncable>(&self) -> SyncResult<T> {
        let _permit = self.lock_kind(T::SYNC_IDENTIFIER).await;

        self.store
            .read::<T>()
            .await
            .map_err(|e| self.fail(SyncError::StorageFailed(e)))
    }

    /// Returns whether an item of kind `T` is stored
    pub async fn exists<T: Syncable>(&self) -> bool {
        self.store.exists::<T>().await
    }

    /// Removes the stored item of kind `T`
    pub async fn delete<T: Syncable>(&self) -> SyncResult<()> {
        let _permit = self.lock_kind(T::SYNC_IDENTIFIER).await;

        self.store
            .delete::<T>()
            .await
            .map_err(|e| self.fail(SyncError::StorageFailed(e)))?;

        log::info!("Deleted {}", T::SYNC_IDENTIFIER);
        self.tracker
            .emit(SyncEvent::DataDeleted(T::SYNC_IDENTIFIER.to_string()));
        Ok(())
    }

    /// [`SyncManager::save`] bounded by a caller-supplied guard
    ///
    /// If the guard fires after the local write completed, `DataSaved` has
    /// already been emitted; a write still in flight completes and emits it.
    /// A write that fails after the guard fired is logged, not emitted, and
    /// the next operation on the same kind waits for it when saves are
    /// serialized.
    pub async fn save_guarded<T: Syncable>(
        &self,
        item: &T,
        guard: &OperationGuard,
    ) -> SyncResult<SaveOutcome> {
        self.guarded("save", guard, self.save(item)).await
    }

    /// [`SyncManager::read`] bounded by a caller-supplied guard
    pub async fn read_guarded<T: Syncable>(&self, guard: &OperationGuard) -> SyncResult<T> {
        self.guarded("read", guard, self.read::<T>()).await
    }

    /// [`SyncManager::delete`] bounded by a caller-supplied guard
    pub async fn delete_guarded<T: Syncable>(&self, guard: &OperationGuard) -> SyncResult<()> {
        self.guarded("delete", guard, self.delete::<T>()).await
    }

    /// Decodes an inbound payload as `T` and stores it locally
    ///
    /// The item is not sent back to the companion.
    pub async fn apply_inbound<T: Syncable>(&self, payload: &InboundPayload) -> SyncResult<T> {
        if payload.tag != T::SYNC_IDENTIFIER {
            return Err(self.fail(SyncError::OperationFailed(format!(
                "inbound payload tagged {:?} is not a {}",
                payload.tag,
                T::SYNC_IDENTIFIER
            ))));
        }

        let item = self
            .store
            .decode::<T>(&payload.body)
            .map_err(|e| self.fail(SyncError::StorageFailed(e)))?;

        let permit = self.lock_kind(T::SYNC_IDENTIFIER).await;
        self.persist(T::SYNC_IDENTIFIER, T::artifact_name(), payload.body.to_vec(), permit)
            .await?;

        Ok(item)
    }

    async fn lock_kind(&self, kind: &'static str) -> KindPermit {
        if self.config.serialize_per_kind {
            self.locks.acquire(kind).await
        } else {
            None
        }
    }

    /// Writes the artifact in a detached task
    ///
    /// The task emits `DataSaved` itself, so the event is not lost if the
    /// caller stops waiting. It also owns the kind permit until the write
    /// lands and hands it back to a caller still waiting. A storage error
    /// is emitted by the caller; once the caller is gone it is only logged,
    /// since the interruption already produced the error event.
    async fn persist(
        &self,
        id: &'static str,
        artifact: String,
        bytes: Vec<u8>,
        permit: KindPermit,
    ) -> SyncResult<KindPermit> {
        let store = Arc::clone(&self.store);
        let tracker = self.tracker.clone();
        let (done, written) = oneshot::channel();

        tokio::spawn(async move {
            let result = match store.write_encoded(&artifact, bytes).await {
                Ok(path) => {
                    log::info!("Saved {} to {}", id, path.display());
                    tracker.emit(SyncEvent::DataSaved(id.to_string()));
                    Ok(())
                }
                Err(e) => Err(SyncError::StorageFailed(e)),
            };

            if let Err((Err(e), _permit)) = done.send((result, permit)) {
                log::warn!("Saving {} failed after the caller stopped waiting: {}", id, e);
            }
        });

        match written.await {
            Ok((result, permit)) => result.map(|()| permit).map_err(|e| self.fail(e)),
            Err(_) => Err(self.fail(SyncError::OperationFailed(
                "store write task ended without a result".to_string(),
            ))),
        }
    }

    async fn deliver(
        &self,
        channel: &dyn CompanionChannel,
        id: &'static str,
        frame: Bytes,
    ) -> SyncResult<()> {
        let sent = match self.config.send_timeout {
            Some(limit) => with_timeout(limit, channel.send(frame))
                .await
                .unwrap_or_else(|_| {
                    Err(ChannelError::DeliveryFailed(format!(
                        "transport did not accept the payload within {:?}",
                        limit
                    )))
                }),
            None => channel.send(frame).await,
        };

        match sent {
            Ok(()) => {
                log::info!("Sent {} to companion", id);
                self.tracker
                    .emit(SyncEvent::WatchDataSent(id.to_string()));
                Ok(())
            }
            Err(e) => Err(self.fail(SyncError::CompanionFailed(e))),
        }
    }

    async fn guarded<F, R>(
        &self,
        operation: &'static str,
        guard: &OperationGuard,
        work: F,
    ) -> SyncResult<R>
    where
        F: Future<Output = SyncResult<R>>,
    {
        match guard.run(work).await {
            Ok(result) => result,
            Err(ResilienceError::Timeout(after)) => {
                Err(self.fail(SyncError::TimedOut { operation, after }))
            }
            Err(ResilienceError::Cancelled) => Err(self.fail(SyncError::Cancelled { operation })),
        }
    }

    /// Mirrors an error onto the event stream and hands it back
    fn fail(&self, err: SyncError) -> SyncError {
        log::warn!("Sync error ({}): {}", err.severity(), err);
        self.tracker.emit(SyncEvent::Error(err.kind()));
        err
    }
}

impl Drop for SyncManager {
    fn drop(&mut self) {
        if let Some(task) = self.inbound_task.take() {
            task.abort();
        }
    }
}

async fn listen_inbound(mut inbound: InboundReceiver, tracker: ActivityTracker) {
    while let Some(frame) = inbound.recv().await {
        let payload = InboundPayload::from_frame(frame);
        log::debug!(
            "Received {} bytes tagged {} from companion",
            payload.body.len(),
            payload.tag
        );
        tracker.emit(SyncEvent::WatchDataReceived(payload));
    }
    log::info!("Companion inbound sequence ended");
}
