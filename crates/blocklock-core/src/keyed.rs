//! Per-block async mutex.
//!
//! One `tokio::sync::Mutex` per block id that currently has a holder or a
//! waiter. The entry is removed by the last guard to leave, so the map only
//! ever holds contended keys.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use tokio::sync::OwnedMutexGuard;

use crate::identifiers::BlockId;

type Slots = Arc<Mutex<HashMap<BlockId, Arc<tokio::sync::Mutex<()>>>>>;

#[derive(Debug, Default)]
pub struct KeyedLocks {
    slots: Slots,
}

impl KeyedLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`.
    pub async fn acquire(&self, key: &BlockId) -> KeyGuard {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(key.clone()).or_default())
        };
        let guard = slot.lock_owned().await;
        KeyGuard {
            key: key.clone(),
            slots: Arc::clone(&self.slots),
            guard: Some(guard),
        }
    }

    /// Number of keys currently held or waited on.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exclusive access to one key; released on drop.
#[derive(Debug)]
pub struct KeyGuard {
    key: BlockId,
    slots: Slots,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyGuard {
    fn drop(&mut self) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        self.guard = None;
        // Only the map still references the mutex: nobody is waiting
        if slots
            .get(&self.key)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            slots.remove(&self.key);
        }
    }
}
