//! Per-kind serialization of store operations

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async mutex per sync identifier, created on first use
#[derive(Default)]
pub(crate) struct KindLocks {
    locks: Mutex<HashMap<&'static str, Arc<AsyncMutex<()>>>>,
}

impl KindLocks {
    /// Waits until no other operation holds `kind`
    pub(crate) async fn acquire(&self, kind: &'static str) -> Option<OwnedMutexGuard<()>> {
        let lock = match self.locks.lock() {
            Ok(mut locks) => Arc::clone(locks.entry(kind).or_default()),
            Err(_) => {
                log::warn!("Kind lock table poisoned, {} runs unserialized", kind);
                return None;
            }
        };
        Some(lock.lock_owned().await)
    }
}
