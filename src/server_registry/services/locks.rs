//! Per-name mutual exclusion for writers inside one process.
//!
//! Repositories already serialize each write with its latest re-resolution;
//! these locks order the read-check-write of a status change within the
//! process and keep same-name writers from contending on storage locks.
//!
//! Each name maps to a weakly held async mutex. Slots disappear once no
//! task holds or awaits them, so the table only grows with contention.

use crate::server_registry::domain::ServerName;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Exclusive hold on one server name; released on drop.
#[derive(Debug)]
pub struct NameGuard {
    _guard: OwnedMutexGuard<()>,
}

/// Keyed async mutexes, one per server name.
#[derive(Debug, Default)]
pub struct NameLocks {
    slots: Mutex<HashMap<ServerName, Weak<AsyncMutex<()>>>>,
}

impl NameLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until `name` is free and holds it until the guard drops.
    ///
    /// Different names never contend.
    pub async fn acquire(&self, name: &ServerName) -> NameGuard {
        let slot = self.slot_for(name);
        NameGuard {
            _guard: slot.lock_owned().await,
        }
    }

    /// Returns how many names currently have a live slot.
    #[must_use]
    pub fn live_slots(&self) -> usize {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.values().filter(|slot| slot.strong_count() > 0).count()
    }

    fn slot_for(&self, name: &ServerName) -> Arc<AsyncMutex<()>> {
        // The table holds no invariant a panic could break, so poisoning is ignored.
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.retain(|_, slot| slot.strong_count() > 0);

        if let Some(existing) = slots.get(name).and_then(Weak::upgrade) {
            return existing;
        }

        let slot = Arc::new(AsyncMutex::new(()));
        slots.insert(name.clone(), Arc::downgrade(&slot));
        slot
    }
}
