// FILE: crates/cli/src/commands.rs

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use console::style;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tandem_config::{Config, ConfigManager};
use tandem_core::Syncable;
use tandem_store::{SharedNamespace, SharedStore, StoreErrorKind};
use tandem_sync_engine::{
    EventSubscription, SaveOutcome, SyncConfig, SyncErrorKind, SyncEvent, SyncManager,
};
use tandem_wear_bridge::{CompanionChannel, LoopbackTransport, UnsupportedTransport, WearSession};

/// How long the pairing demo waits for the watch to see a payload
const DEMO_RECEIVE_TIMEOUT: Duration = Duration::from_secs(2);

/// The user profile shared between the app and its companion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            updated_at: Utc::now(),
        }
    }
}

impl Syncable for Profile {
    const SYNC_IDENTIFIER: &'static str = "profile";
}

/// What `status` found
#[derive(Debug)]
pub struct Status {
    pub namespace_dir: PathBuf,
    pub profile_stored: bool,
}

/// What `pair-demo` observed
#[derive(Debug, Default)]
pub struct DemoReport {
    pub delivered: usize,
    pub received: usize,
    pub watch_profile: Option<Profile>,
}

/// Write a default config file
pub fn init_config(manager: &ConfigManager) -> Result<bool> {
    let created = manager
        .initialize()
        .context("Failed to write default config")?;

    if created {
        println!(
            "{} Config written to {}",
            style("✓").green().bold(),
            manager.config_path().display()
        );
    } else {
        println!(
            "Config already exists at {}",
            manager.config_path().display()
        );
    }

    Ok(created)
}

/// Save the profile and offer it to the companion
pub async fn save_profile(config: &Config, name: &str) -> Result<SaveOutcome> {
    let manager = open_manager(config)?;
    let mut events = manager.subscribe();

    let result = manager.save(&Profile::new(name)).await;
    log_events(&mut events);

    match result {
        Ok(outcome) => {
            let note = match outcome {
                SaveOutcome::Delivered => "saved and sent to companion",
                SaveOutcome::StoredLocally => "saved on this device",
            };
            println!("{} Profile '{}' {}", style("✓").green().bold(), name, note);
            Ok(outcome)
        }
        Err(e) if e.is_degraded() => {
            println!(
                "{} Profile '{}' saved, companion not updated: {}",
                style("!").yellow().bold(),
                name,
                e
            );
            Ok(SaveOutcome::StoredLocally)
        }
        Err(e) => Err(e).context("Failed to save profile"),
    }
}

/// Show the stored profile
pub async fn show_profile(config: &Config) -> Result<Option<Profile>> {
    let manager = open_manager(config)?;

    match manager.read::<Profile>().await {
        Ok(profile) => {
            println!("\n{}", style("Profile").bold().cyan());
            println!("{}", "=".repeat(40));
            println!("Name: {}", style(&profile.name).bold());
            println!("Updated: {}", profile.updated_at.format("%Y-%m-%d %H:%M:%S UTC"));
            Ok(Some(profile))
        }
        Err(e) if is_not_found(&e.kind()) => {
            println!("No profile saved. Use 'save-profile' to create one.");
            Ok(None)
        }
        Err(e) => Err(e).context("Failed to read profile"),
    }
}

/// Delete the stored profile
pub async fn delete_profile(config: &Config) -> Result<bool> {
    let manager = open_manager(config)?;

    match manager.delete::<Profile>().await {
        Ok(()) => {
            println!("{} Profile deleted", style("✓").green().bold());
            Ok(true)
        }
        Err(e) if is_not_found(&e.kind()) => {
            println!("No profile to delete");
            Ok(false)
        }
        Err(e) => Err(e).context("Failed to delete profile"),
    }
}

/// Show where data lives and what is stored
pub async fn status(config: &Config, manager: &ConfigManager) -> Result<Status> {
    let namespace = config.store.namespace();
    let namespace_dir = namespace
        .resolve()
        .await
        .context("Failed to resolve shared namespace")?;

    let store = SharedStore::new(namespace, config.store.encoding);
    let profile_stored = store.exists::<Profile>().await;

    println!("\n{}", style("Tandem Status").bold().cyan());
    println!("{}", "=".repeat(40));
    println!("Config:    {}", manager.config_path().display());
    println!("Namespace: {}", config.store.group_identifier);
    println!("Directory: {}", namespace_dir.display());
    println!("Encoding:  {}", config.store.encoding);
    println!(
        "Companion: {}",
        if config.companion.enabled {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!(
        "Profile:   {}",
        if profile_stored {
            style("stored").green()
        } else {
            style("absent").dim()
        }
    );

    Ok(Status {
        namespace_dir,
        profile_stored,
    })
}

/// Run a phone and a watch over an in-memory link and sync profiles between them
pub async fn pair_demo(config: &Config, names: &[String]) -> Result<DemoReport> {
    let dir = tempfile::tempdir().context("Failed to create demo directory")?;
    let store = |id: &str| {
        Arc::new(SharedStore::new(
            SharedNamespace::new(id).with_base_directory(dir.path()),
            config.store.encoding,
        ))
    };

    let (phone_transport, watch_transport, _link) = LoopbackTransport::pair();
    let phone_channel: Arc<dyn CompanionChannel> = Arc::new(WearSession::new(phone_transport));
    let watch_channel: Arc<dyn CompanionChannel> = Arc::new(WearSession::new(watch_transport));

    let phone = SyncManager::new(
        store("group.tandem.phone"),
        Some(phone_channel),
        sync_config(config),
    )?;
    let watch = SyncManager::new(
        store("group.tandem.watch"),
        Some(watch_channel),
        sync_config(config),
    )?;
    let mut watch_events = watch.subscribe();

    println!("\n{}", style("Pairing Demo").bold().cyan());
    println!("{}", "=".repeat(40));

    let mut report = DemoReport::default();
    for name in names {
        let outcome = phone
            .save(&Profile::new(name.as_str()))
            .await
            .with_context(|| format!("Phone failed to save '{}'", name))?;
        println!("phone: saved '{}' ({:?})", name, outcome);
        if outcome.is_delivered() {
            report.delivered += 1;
        }
    }

    while report.received < report.delivered {
        let event = tokio::time::timeout(DEMO_RECEIVE_TIMEOUT, watch_events.next())
            .await
            .ok()
            .flatten();

        match event {
            Some(event) => {
                println!("watch: {}", describe_event(&event));
                if let SyncEvent::WatchDataReceived(payload) = event {
                    report.received += 1;
                    let profile: Profile = watch
                        .apply_inbound(&payload)
                        .await
                        .context("Watch failed to apply profile")?;
                    report.watch_profile = Some(profile);
                }
            }
            None => {
                log::warn!(
                    "Watch saw {} of {} payloads before giving up",
                    report.received,
                    report.delivered
                );
                break;
            }
        }
    }

    let phone_stats = phone.stats();
    let watch_stats = watch.stats();
    println!(
        "\nphone: {} saves, {} deliveries, {} errors",
        phone_stats.saves, phone_stats.deliveries, phone_stats.errors
    );
    println!(
        "watch: {} saves, {} payloads received, {} errors",
        watch_stats.saves, watch_stats.inbound, watch_stats.errors
    );

    Ok(report)
}

/// Builds engine settings from the config file
pub fn sync_config(config: &Config) -> SyncConfig {
    SyncConfig {
        event_capacity: config.engine.event_capacity,
        send_timeout: config.companion.send_timeout(),
        serialize_per_kind: config.engine.serialize_per_kind,
    }
}

/// Opens a sync manager over the configured store
///
/// This host has no paired device, so an enabled companion attaches a
/// session that never activates and saves stay local.
fn open_manager(config: &Config) -> Result<SyncManager> {
    let store = Arc::new(SharedStore::new(
        config.store.namespace(),
        config.store.encoding,
    ));

    let channel: Option<Arc<dyn CompanionChannel>> = if config.companion.enabled {
        Some(Arc::new(WearSession::new(UnsupportedTransport)))
    } else {
        None
    };

    SyncManager::new(store, channel, sync_config(config)).context("Failed to start sync manager")
}

fn is_not_found(kind: &SyncErrorKind) -> bool {
    matches!(kind, SyncErrorKind::StorageFailed(StoreErrorKind::NotFound))
}

fn log_events(events: &mut EventSubscription) {
    while let Some(event) = events.try_next() {
        log::debug!("{}", describe_event(&event));
    }
}

fn describe_event(event: &SyncEvent) -> String {
    match event {
        SyncEvent::DataSaved(id) => format!("{} saved", id),
        SyncEvent::DataDeleted(id) => format!("{} deleted", id),
        SyncEvent::WatchDataSent(id) => format!("{} sent to companion", id),
        SyncEvent::WatchDataReceived(payload) => {
            format!("received {} ({} bytes)", payload.tag, payload.body.len())
        }
        SyncEvent::Error(kind) => format!("error: {:?}", kind),
    }
}
