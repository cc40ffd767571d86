//! Lock change notifications for release rooms.
//!
//! Every persisted lock mutation is published once to the room of the block's
//! release (`release-{releaseId}`). [`Publisher`] is the transport seam; [`RoomHub`]
//! is the in-process implementation built on `tokio::sync::broadcast`, one
//! channel per room, created on first join.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::{
    identifiers::ReleaseId,
    views::{LockView, UnlockView},
    Result,
};

/// Default per-room buffer before slow subscribers start lagging.
pub const DEFAULT_ROOM_CAPACITY: usize = 256;

/// Name of the group of subscribers viewing one release.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomKey(String);

impl RoomKey {
    #[must_use]
    pub fn release(id: &ReleaseId) -> Self {
        Self(format!("release-{id}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A lock change as seen by room subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "payload")]
pub enum LockEvent {
    ContentBlockLocked(LockView),
    ContentBlockUnlocked(UnlockView),
}

impl LockEvent {
    /// Wire event name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ContentBlockLocked(_) => "ContentBlockLocked",
            Self::ContentBlockUnlocked(_) => "ContentBlockUnlocked",
        }
    }
}

/// Delivers lock events to a room.
///
/// Errors are reported to the caller, which logs and drops them: a failed
/// publish never undoes a persisted mutation.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, room: &RoomKey, event: LockEvent) -> Result<()>;
}

/// In-process room registry.
#[derive(Debug)]
pub struct RoomHub {
    capacity: usize,
    rooms: Mutex<HashMap<RoomKey, broadcast::Sender<Arc<LockEvent>>>>,
}

impl Default for RoomHub {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_ROOM_CAPACITY)
    }
}

impl RoomHub {
    /// `capacity` is clamped to at least 1.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            rooms: Mutex::new(HashMap::new()),
        }
    }

    /// Subscribe to the room of `release`.
    pub fn join(&self, release: &ReleaseId) -> RoomSubscription {
        let room = RoomKey::release(release);
        let mut rooms = self.rooms.lock().unwrap_or_else(PoisonError::into_inner);
        let receiver = rooms
            .entry(room.clone())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe();
        tracing::debug!(room = %room, "joined room");
        RoomSubscription { room, receiver }
    }

    /// Live subscribers of the room of `release`.
    pub fn subscriber_count(&self, release: &ReleaseId) -> usize {
        let rooms = self.rooms.lock().unwrap_or_else(PoisonError::into_inner);
        rooms
            .get(&RoomKey::release(release))
            .map_or(0, broadcast::Sender::receiver_count)
    }
}

#[async_trait]
impl Publisher for RoomHub {
    async fn publish(&self, room: &RoomKey, event: LockEvent) -> Result<()> {
        let mut rooms = self.rooms.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(sender) = rooms.get(room) else {
            tracing::trace!(room = %room, event = event.name(), "no subscribers");
            return Ok(());
        };

        let name = event.name();
        // A send error only means every receiver has gone away
        if sender.send(Arc::new(event)).is_err() {
            rooms.remove(room);
            tracing::trace!(room = %room, event = name, "room emptied, dropped");
        }
        Ok(())
    }
}

/// Receiving end of a room.
#[derive(Debug)]
pub struct RoomSubscription {
    room: RoomKey,
    receiver: broadcast::Receiver<Arc<LockEvent>>,
}

impl RoomSubscription {
    #[must_use]
    pub const fn room(&self) -> &RoomKey {
        &self.room
    }

    /// Next event, skipping over any dropped while this subscriber lagged.
    /// `None` once the room is gone.
    pub async fn recv(&mut self) -> Option<Arc<LockEvent>> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(room = %self.room, skipped, "subscriber lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<Arc<LockEvent>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(room = %self.room, skipped, "subscriber lagged, events dropped");
                }
                Err(
                    broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed,
                ) => return None,
            }
        }
    }
}
