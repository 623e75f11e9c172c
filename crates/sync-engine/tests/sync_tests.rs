// crates/sync-engine/tests/sync_tests.rs
//! Integration tests for sync engine

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tandem_core::{Encoding, Syncable};
use tandem_store::{SharedNamespace, SharedStore, StoreErrorKind};
use tandem_sync_engine::{
    CancellationToken, EventSubscription, InboundPayload, OperationGuard, SaveOutcome, SyncConfig,
    SyncError, SyncErrorKind, SyncEvent, SyncManager, UNKNOWN_TAG,
};
use tandem_wear_bridge::{
    ActivationState, ChannelError, ChannelErrorKind, ChannelResult, CompanionChannel,
    InboundReceiver, LoopbackLink, LoopbackTransport, WearSession,
};
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Profile {
    name: String,
}

impl Syncable for Profile {
    const SYNC_IDENTIFIER: &'static str = "profile";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Preferences {
    dark_mode: bool,
    sleep_timer_minutes: Option<u32>,
    pinned: Vec<String>,
}

impl Syncable for Preferences {
    const SYNC_IDENTIFIER: &'static str = "preferences";
}

fn ada() -> Profile {
    Profile {
        name: "Ada".to_string(),
    }
}

fn saved(id: &str) -> SyncEvent {
    SyncEvent::DataSaved(id.to_string())
}

fn store_in(temp: &TempDir, identifier: &str) -> Arc<SharedStore> {
    Arc::new(SharedStore::new(
        SharedNamespace::new(identifier).with_base_directory(temp.path()),
        Encoding::Json,
    ))
}

fn drain(events: &mut EventSubscription) -> Vec<SyncEvent> {
    std::iter::from_fn(|| events.try_next()).collect()
}

async fn next_event(events: &mut EventSubscription) -> Option<SyncEvent> {
    tokio::time::timeout(Duration::from_secs(2), events.next())
        .await
        .ok()
        .flatten()
}

/// Channel whose reachability and delivery result are set by the test
struct ScriptedChannel {
    reachable: AtomicBool,
    failing: AtomicBool,
    activations: AtomicUsize,
    sent: AtomicUsize,
}

impl ScriptedChannel {
    fn new(reachable: bool) -> Arc<Self> {
        Arc::new(Self {
            reachable: AtomicBool::new(reachable),
            failing: AtomicBool::new(false),
            activations: AtomicUsize::new(0),
            sent: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl CompanionChannel for ScriptedChannel {
    fn activate(&self) {
        self.activations.fetch_add(1, Ordering::SeqCst);
    }

    fn activation_state(&self) -> ActivationState {
        ActivationState::Activated
    }

    fn is_reachable(&self) -> bool {
        self.reachable.load(Ordering::SeqCst)
    }

    async fn send(&self, _payload: Bytes) -> ChannelResult<()> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            Err(ChannelError::DeliveryFailed("watch storage full".to_string()))
        } else {
            Ok(())
        }
    }

    fn take_inbound(&self) -> Option<InboundReceiver> {
        None
    }
}

/// Channel whose transport never accepts a payload
struct StalledChannel;

#[async_trait]
impl CompanionChannel for StalledChannel {
    fn activate(&self) {}

    fn activation_state(&self) -> ActivationState {
        ActivationState::Activated
    }

    fn is_reachable(&self) -> bool {
        true
    }

    async fn send(&self, _payload: Bytes) -> ChannelResult<()> {
        std::future::pending().await
    }

    fn take_inbound(&self) -> Option<InboundReceiver> {
        None
    }
}

struct PairedDevices {
    _temp: TempDir,
    phone: SyncManager,
    watch: SyncManager,
    watch_session: Arc<WearSession>,
    link: LoopbackLink,
}

fn paired_devices() -> PairedDevices {
    let temp = TempDir::new().expect("temp dir");
    let (phone_transport, watch_transport, link) = LoopbackTransport::pair();
    let phone_session: Arc<dyn CompanionChannel> = Arc::new(WearSession::new(phone_transport));
    let watch_session = Arc::new(WearSession::new(watch_transport));
    let watch_channel: Arc<dyn CompanionChannel> = watch_session.clone();

    let phone = SyncManager::new(
        store_in(&temp, "group.phone"),
        Some(phone_session),
        SyncConfig::default(),
    )
    .expect("phone manager");
    let watch = SyncManager::new(
        store_in(&temp, "group.watch"),
        Some(watch_channel),
        SyncConfig::default(),
    )
    .expect("watch manager");

    PairedDevices {
        _temp: temp,
        phone,
        watch,
        watch_session,
        link,
    }
}

#[tokio::test]
async fn test_save_without_companion() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let manager = SyncManager::new(store_in(&temp, "group.tandem"), None, SyncConfig::default())?;
    let mut events = manager.subscribe();

    let outcome = manager.save(&ada()).await?;

    assert_eq!(outcome, SaveOutcome::StoredLocally);
    assert!(temp.path().join("group.tandem").join("profile.json").exists());
    assert_eq!(drain(&mut events), vec![saved("profile")]);
    assert_eq!(manager.read::<Profile>().await?, ada());
    Ok(())
}

#[tokio::test]
async fn test_round_trip_preserves_optional_and_list_fields() -> Result<(), Box<dyn std::error::Error>>
{
    let temp = TempDir::new()?;
    let store = Arc::new(SharedStore::new(
        SharedNamespace::new("group.tandem").with_base_directory(temp.path()),
        Encoding::PrettyJson,
    ));
    let manager = SyncManager::new(store, None, SyncConfig::default())?;

    for prefs in [
        Preferences {
            dark_mode: true,
            sleep_timer_minutes: Some(30),
            pinned: vec!["Dune".to_string(), "Emma".to_string()],
        },
        Preferences {
            dark_mode: false,
            sleep_timer_minutes: None,
            pinned: Vec::new(),
        },
    ] {
        manager.save(&prefs).await?;
        assert_eq!(manager.read::<Preferences>().await?, prefs);
    }
    Ok(())
}

#[tokio::test]
async fn test_save_with_unreachable_companion_stays_local() -> Result<(), Box<dyn std::error::Error>>
{
    let temp = TempDir::new()?;
    let channel = ScriptedChannel::new(false);
    let manager = SyncManager::new(
        store_in(&temp, "group.tandem"),
        Some(channel.clone()),
        SyncConfig::default(),
    )?;
    let mut events = manager.subscribe();

    let outcome = manager.save(&ada()).await?;

    assert_eq!(outcome, SaveOutcome::StoredLocally);
    assert_eq!(drain(&mut events), vec![saved("profile")]);
    assert_eq!(channel.sent.load(Ordering::SeqCst), 0);
    assert_eq!(channel.activations.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn test_data_saved_precedes_watch_data_sent() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let channel = ScriptedChannel::new(true);
    let manager = SyncManager::new(
        store_in(&temp, "group.tandem"),
        Some(channel.clone()),
        SyncConfig::default(),
    )?;
    let mut events = manager.subscribe();

    let outcome = manager.save(&ada()).await?;

    assert!(outcome.is_delivered());
    assert_eq!(
        drain(&mut events),
        vec![
            saved("profile"),
            SyncEvent::WatchDataSent("profile".to_string())
        ]
    );
    assert_eq!(manager.stats().deliveries, 1);
    Ok(())
}

#[tokio::test]
async fn test_delivery_failure_keeps_local_write() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let channel = ScriptedChannel::new(true);
    channel.failing.store(true, Ordering::SeqCst);
    let manager = SyncManager::new(
        store_in(&temp, "group.tandem"),
        Some(channel.clone()),
        SyncConfig::default(),
    )?;
    let mut events = manager.subscribe();

    let err = manager.save(&ada()).await.unwrap_err();

    assert!(err.is_degraded());
    assert!(matches!(
        err,
        SyncError::CompanionFailed(ChannelError::DeliveryFailed(_))
    ));
    assert_eq!(manager.read::<Profile>().await?, ada());
    assert_eq!(
        drain(&mut events),
        vec![
            saved("profile"),
            SyncEvent::Error(SyncErrorKind::CompanionFailed(
                ChannelErrorKind::DeliveryFailed
            ))
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_delete_never_saved_emits_not_found() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let manager = SyncManager::new(store_in(&temp, "group.tandem"), None, SyncConfig::default())?;
    let mut events = manager.subscribe();

    let err = manager.delete::<Profile>().await.unwrap_err();

    assert_eq!(err.kind(), SyncErrorKind::StorageFailed(StoreErrorKind::NotFound));
    assert_eq!(
        drain(&mut events),
        vec![SyncEvent::Error(SyncErrorKind::StorageFailed(
            StoreErrorKind::NotFound
        ))]
    );
    Ok(())
}

#[tokio::test]
async fn test_delete_twice_succeeds_then_not_found() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let manager = SyncManager::new(store_in(&temp, "group.tandem"), None, SyncConfig::default())?;
    manager.save(&ada()).await?;
    let mut events = manager.subscribe();

    manager.delete::<Profile>().await?;
    let second = manager.delete::<Profile>().await;

    assert!(matches!(second, Err(SyncError::StorageFailed(_))));
    assert!(!manager.exists::<Profile>().await);
    assert_eq!(
        drain(&mut events),
        vec![
            SyncEvent::DataDeleted("profile".to_string()),
            SyncEvent::Error(SyncErrorKind::StorageFailed(StoreErrorKind::NotFound))
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_invalid_namespace_fails_every_operation() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let manager = SyncManager::new(store_in(&temp, "no spaces allowed"), None, SyncConfig::default())?;

    let invalid = SyncErrorKind::StorageFailed(StoreErrorKind::InvalidNamespace);
    assert_eq!(manager.save(&ada()).await.unwrap_err().kind(), invalid);
    assert_eq!(manager.read::<Profile>().await.unwrap_err().kind(), invalid);
    assert_eq!(manager.delete::<Profile>().await.unwrap_err().kind(), invalid);
    assert!(!manager.exists::<Profile>().await);
    assert_eq!(manager.stats().errors, 3);
    Ok(())
}

#[tokio::test]
async fn test_inbound_payloads_fan_in_once_each() {
    let devices = paired_devices();
    let mut watch_events = devices.watch.subscribe();

    for name in ["Ada", "Grace", "Hedy"] {
        let outcome = devices
            .phone
            .save(&Profile {
                name: name.to_string(),
            })
            .await
            .expect("phone save");
        assert_eq!(outcome, SaveOutcome::Delivered);
    }

    let mut received = Vec::new();
    while received.len() < 3 {
        match next_event(&mut watch_events).await {
            Some(SyncEvent::WatchDataReceived(payload)) => received.push(payload),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    assert!(received.iter().all(|p| p.tag == "profile"));
    assert!(
        tokio::time::timeout(Duration::from_millis(100), watch_events.next())
            .await
            .is_err()
    );
    assert_eq!(devices.watch.stats().inbound, 3);
}

#[tokio::test]
async fn test_apply_inbound_persists_without_echo() {
    let devices = paired_devices();
    let mut phone_events = devices.phone.subscribe();
    let mut watch_events = devices.watch.subscribe();

    devices.phone.save(&ada()).await.expect("phone save");

    let payload = match next_event(&mut watch_events).await {
        Some(SyncEvent::WatchDataReceived(payload)) => payload,
        other => panic!("unexpected event: {:?}", other),
    };

    let applied: Profile = devices
        .watch
        .apply_inbound(&payload)
        .await
        .expect("apply inbound");
    assert_eq!(applied, ada());
    assert_eq!(devices.watch.read::<Profile>().await.expect("read"), ada());
    assert_eq!(next_event(&mut watch_events).await, Some(saved("profile")));

    assert_eq!(
        drain(&mut phone_events),
        vec![
            saved("profile"),
            SyncEvent::WatchDataSent("profile".to_string())
        ]
    );
    assert!(
        tokio::time::timeout(Duration::from_millis(100), phone_events.next())
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_apply_inbound_rejects_other_kinds() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let manager = SyncManager::new(store_in(&temp, "group.tandem"), None, SyncConfig::default())?;
    let payload = InboundPayload {
        tag: "preferences".to_string(),
        body: Bytes::from_static(br#"{"name":"Ada"}"#),
    };

    let err = manager.apply_inbound::<Profile>(&payload).await.unwrap_err();

    assert!(matches!(err, SyncError::OperationFailed(_)));
    assert!(!manager.exists::<Profile>().await);
    Ok(())
}

#[tokio::test]
async fn test_undecodable_frame_is_tagged_unknown() {
    let devices = paired_devices();
    let mut watch_events = devices.watch.subscribe();

    devices
        .watch_session
        .events()
        .payload_received(Bytes::from_static(b"\x00"));

    match next_event(&mut watch_events).await {
        Some(SyncEvent::WatchDataReceived(payload)) => {
            assert_eq!(payload.tag, UNKNOWN_TAG);
            assert_eq!(payload.body, Bytes::from_static(b"\x00"));
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn test_disconnected_link_stores_locally() {
    let devices = paired_devices();
    devices.link.disconnect();
    let mut events = devices.phone.subscribe();

    let outcome = devices.phone.save(&ada()).await.expect("phone save");

    assert_eq!(outcome, SaveOutcome::StoredLocally);
    assert_eq!(drain(&mut events), vec![saved("profile")]);

    devices.link.reconnect();
    let outcome = devices.phone.save(&ada()).await.expect("phone save");
    assert_eq!(outcome, SaveOutcome::Delivered);
}

#[tokio::test]
async fn test_rejected_delivery_is_degraded() {
    let devices = paired_devices();
    devices.link.reject_deliveries(true);

    let err = devices.phone.save(&ada()).await.unwrap_err();

    assert!(err.is_degraded());
    assert_eq!(devices.phone.read::<Profile>().await.expect("read"), ada());
    assert!(!devices.watch.exists::<Profile>().await);
}

#[tokio::test]
async fn test_stalled_send_times_out() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let config = SyncConfig {
        send_timeout: Some(Duration::from_millis(50)),
        ..SyncConfig::default()
    };
    let manager = SyncManager::new(
        store_in(&temp, "group.tandem"),
        Some(Arc::new(StalledChannel)),
        config,
    )?;
    let mut events = manager.subscribe();

    let err = manager.save(&ada()).await.unwrap_err();

    match err {
        SyncError::CompanionFailed(ChannelError::DeliveryFailed(reason)) => {
            assert!(reason.contains("within"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(
        drain(&mut events),
        vec![
            saved("profile"),
            SyncEvent::Error(SyncErrorKind::CompanionFailed(
                ChannelErrorKind::DeliveryFailed
            ))
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_guard_timeout_keeps_data_saved() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let config = SyncConfig {
        send_timeout: None,
        ..SyncConfig::default()
    };
    let manager = SyncManager::new(
        store_in(&temp, "group.tandem"),
        Some(Arc::new(StalledChannel)),
        config,
    )?;
    let mut events = manager.subscribe();
    let guard = OperationGuard::new().with_timeout(Duration::from_millis(300));

    let err = manager.save_guarded(&ada(), &guard).await.unwrap_err();

    assert!(matches!(err, SyncError::TimedOut { operation: "save", .. }));
    assert_eq!(
        drain(&mut events),
        vec![saved("profile"), SyncEvent::Error(SyncErrorKind::TimedOut)]
    );
    assert_eq!(manager.read::<Profile>().await?, ada());
    Ok(())
}

#[tokio::test]
async fn test_cancelled_guard_emits_one_error() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let manager = SyncManager::new(store_in(&temp, "group.tandem"), None, SyncConfig::default())?;
    let mut events = manager.subscribe();
    let token = CancellationToken::new();
    token.cancel();
    let guard = OperationGuard::new().with_cancellation(token);

    let err = manager.read_guarded::<Profile>(&guard).await.unwrap_err();
    assert!(matches!(err, SyncError::Cancelled { operation: "read" }));

    let err = manager.delete_guarded::<Profile>(&guard).await.unwrap_err();
    assert!(matches!(err, SyncError::Cancelled { operation: "delete" }));

    assert_eq!(
        drain(&mut events),
        vec![
            SyncEvent::Error(SyncErrorKind::Cancelled),
            SyncEvent::Error(SyncErrorKind::Cancelled)
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_unbounded_guard_runs_to_completion() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let manager = SyncManager::new(store_in(&temp, "group.tandem"), None, SyncConfig::default())?;
    let guard = OperationGuard::new();

    let outcome = manager.save_guarded(&ada(), &guard).await?;
    assert_eq!(outcome, SaveOutcome::StoredLocally);
    assert_eq!(manager.read_guarded::<Profile>(&guard).await?, ada());
    manager.delete_guarded::<Profile>(&guard).await?;
    Ok(())
}

#[tokio::test]
async fn test_serialized_saves_of_one_kind() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let config = SyncConfig {
        serialize_per_kind: true,
        ..SyncConfig::default()
    };
    let manager = Arc::new(SyncManager::new(store_in(&temp, "group.tandem"), None, config)?);

    let mut handles = Vec::new();
    for i in 0..8 {
        let manager = Arc::clone(&manager);
        handles.push(tokio::spawn(async move {
            manager
                .save(&Profile {
                    name: format!("reader-{}", i),
                })
                .await
        }));
    }
    for handle in handles {
        handle.await??;
    }

    let stored = manager.read::<Profile>().await?;
    assert!(stored.name.starts_with("reader-"));
    assert_eq!(manager.stats().saves, 8);
    Ok(())
}

#[tokio::test]
async fn test_interrupted_save_does_not_overwrite_later_save() -> Result<(), Box<dyn std::error::Error>>
{
    let temp = TempDir::new()?;
    let config = SyncConfig {
        serialize_per_kind: true,
        ..SyncConfig::default()
    };
    let manager = SyncManager::new(store_in(&temp, "group.tandem"), None, config)?;
    let large = Profile {
        name: "A".repeat(8 * 1024 * 1024),
    };
    let guard = OperationGuard::new().with_timeout(Duration::from_millis(1));

    if let Err(err) = manager.save_guarded(&large, &guard).await {
        assert!(matches!(err, SyncError::TimedOut { operation: "save", .. }));
    }
    manager
        .save(&Profile {
            name: "B".to_string(),
        })
        .await?;
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(manager.read::<Profile>().await?.name, "B");
    assert_eq!(manager.stats().saves, 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_write_failing_after_timeout_emits_one_error() -> Result<(), Box<dyn std::error::Error>>
{
    let temp = TempDir::new()?;
    let blocker = temp.path().join("blocker");
    std::fs::write(&blocker, b"not a directory")?;
    let store = Arc::new(SharedStore::new(
        SharedNamespace::new("group.tandem").with_base_directory(blocker.clone()),
        Encoding::Json,
    ));
    let config = SyncConfig {
        serialize_per_kind: true,
        ..SyncConfig::default()
    };
    let manager = SyncManager::new(store, None, config)?;
    let mut events = manager.subscribe();
    let guard = OperationGuard::new().with_timeout(Duration::from_millis(1));

    let save_err = manager.save_guarded(&ada(), &guard).await.unwrap_err();
    // Waits on the kind lock until the interrupted write has finished
    let read_err = manager.read::<Profile>().await.unwrap_err();

    assert_eq!(
        read_err.kind(),
        SyncErrorKind::StorageFailed(StoreErrorKind::InvalidNamespace)
    );
    assert_eq!(
        drain(&mut events),
        vec![
            SyncEvent::Error(save_err.kind()),
            SyncEvent::Error(read_err.kind())
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_subscription_ends_with_manager() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let manager = SyncManager::new(store_in(&temp, "group.tandem"), None, SyncConfig::default())?;
    let mut events = manager.subscribe();
    assert_eq!(manager.subscriber_count(), 1);

    manager.save(&ada()).await?;
    drop(manager);

    assert_eq!(events.next().await, Some(saved("profile")));
    assert_eq!(events.next().await, None);
    Ok(())
}

#[tokio::test]
async fn test_event_stream_adapter() -> Result<(), Box<dyn std::error::Error>> {
    use futures::StreamExt;

    let temp = TempDir::new()?;
    let manager = SyncManager::new(store_in(&temp, "group.tandem"), None, SyncConfig::default())?;
    let stream = manager.subscribe().into_stream();

    manager.save(&ada()).await?;
    manager.delete::<Profile>().await?;
    drop(manager);

    let events: Vec<SyncEvent> = stream.collect().await;
    assert_eq!(
        events,
        vec![saved("profile"), SyncEvent::DataDeleted("profile".to_string())]
    );
    Ok(())
}
