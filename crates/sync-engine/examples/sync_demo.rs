// crates/sync-engine/examples/sync_demo.rs
//! Demonstration of sync engine capabilities

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tandem_core::{Encoding, Syncable};
use tandem_store::{SharedNamespace, SharedStore};
use tandem_sync_engine::{SyncConfig, SyncEvent, SyncManager};
use tandem_wear_bridge::{CompanionChannel, LoopbackTransport, WearSession};

#[derive(Debug, Serialize, Deserialize)]
struct Profile {
    name: String,
}

impl Syncable for Profile {
    const SYNC_IDENTIFIER: &'static str = "profile";
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Tandem Sync Engine Demo");
    println!("=======================\n");

    let dir = tempfile::tempdir()?;
    let store = |id: &str| {
        Arc::new(SharedStore::new(
            SharedNamespace::new(id).with_base_directory(dir.path()),
            Encoding::Json,
        ))
    };

    let (phone_transport, watch_transport, link) = LoopbackTransport::pair();
    let phone_channel: Arc<dyn CompanionChannel> = Arc::new(WearSession::new(phone_transport));
    let watch_channel: Arc<dyn CompanionChannel> = Arc::new(WearSession::new(watch_transport));

    let phone = SyncManager::new(store("group.phone"), Some(phone_channel), SyncConfig::default())?;
    let watch = SyncManager::new(store("group.watch"), Some(watch_channel), SyncConfig::default())?;
    let mut watch_events = watch.subscribe();

    println!("1. Delivered save");
    println!("-----------------");
    let outcome = phone.save(&Profile { name: "Ada".into() }).await?;
    println!("Phone save: {:?}", outcome);

    if let Some(SyncEvent::WatchDataReceived(payload)) = watch_events.next().await {
        println!("Watch received {} bytes tagged {}", payload.body.len(), payload.tag);
        let profile: Profile = watch.apply_inbound(&payload).await?;
        println!("Watch stored {:?}", profile);
    }

    println!("\n2. Out of range");
    println!("---------------");
    link.disconnect();
    let outcome = phone.save(&Profile { name: "Grace".into() }).await?;
    println!("Phone save: {:?}", outcome);

    println!("\n3. Rejected delivery");
    println!("--------------------");
    link.reconnect();
    link.reject_deliveries(true);
    match phone.save(&Profile { name: "Hedy".into() }).await {
        Ok(outcome) => println!("Phone save: {:?}", outcome),
        Err(e) => println!("Phone save degraded ({}): {}", e.severity(), e),
    }
    let stored: Profile = phone.read().await?;
    println!("Phone still has {:?}", stored);

    let stats = phone.stats();
    println!(
        "\nPhone stats: {} saves, {} deliveries, {} errors",
        stats.saves, stats.deliveries, stats.errors
    );

    Ok(())
}
