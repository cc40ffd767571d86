//! Shared fixture for coordinator integration tests.

#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use async_trait::async_trait;
use blocklock_core::{
    BlockId, BlockRecord, BlockStore, CoordinatorSettings, Error, LockCoordinator, LockEvent,
    LockOwner, LockState, ManualClock, Publisher, ReleaseId, Result, RoomHub, RoomKey,
    RoomSubscription, SectionId, SqliteStore, UserId, WriteOutcome,
};
use chrono::{DateTime, Utc};

pub fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default()
}

pub fn block(id: &str) -> Result<BlockId> {
    Ok(BlockId::parse(id)?)
}

pub fn user(id: &str) -> Result<UserId> {
    Ok(UserId::parse(id)?)
}

pub fn release(id: &str) -> Result<ReleaseId> {
    Ok(ReleaseId::parse(id)?)
}

pub fn owner(id: &str, first: &str, last: &str) -> Result<LockOwner> {
    Ok(LockOwner {
        id: user(id)?,
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: format!("{id}@example.com"),
    })
}

/// Release `release-1` with section `section-1` holding `block-1` and
/// `block-2`; users `jane` and `rob`; `orphan` points at a missing section.
pub async fn seeded_store() -> Result<SqliteStore> {
    let store = SqliteStore::in_memory().await?;
    store.insert_user(&owner("jane", "Jane", "Doe")?).await?;
    store.insert_user(&owner("rob", "Rob", "Smith")?).await?;
    for n in 0..16 {
        store
            .insert_user(&owner(&format!("user-{n}"), "User", &n.to_string())?)
            .await?;
    }

    let release_id = release("release-1")?;
    let section_id = SectionId::parse("section-1")?;
    store.insert_release(&release_id, "Pupil absence").await?;
    store.insert_section(&section_id, &release_id, "Headlines").await?;
    store.insert_block(&block("block-1")?, &section_id).await?;
    store.insert_block(&block("block-2")?, &section_id).await?;
    store
        .insert_block(&block("orphan")?, &SectionId::parse("missing-section")?)
        .await?;
    Ok(store)
}

pub struct Fixture {
    pub store: SqliteStore,
    pub hub: Arc<RoomHub>,
    pub clock: Arc<ManualClock>,
    pub coordinator: Arc<LockCoordinator>,
    pub room: RoomSubscription,
}

impl Fixture {
    pub async fn new() -> Result<Self> {
        let store = seeded_store().await?;
        let hub = Arc::new(RoomHub::default());
        Self::with_publisher(store, Arc::clone(&hub), hub).await
    }

    pub async fn with_publisher(
        store: SqliteStore,
        hub: Arc<RoomHub>,
        publisher: Arc<dyn Publisher>,
    ) -> Result<Self> {
        let clock = Arc::new(ManualClock::new(t0()));
        let coordinator = Arc::new(
            LockCoordinator::new(Arc::new(store.clone()), Arc::new(store.clone()), publisher)
                .with_clock(clock.clone()),
        );
        let room = hub.join(&release("release-1")?);
        Ok(Self {
            store,
            hub,
            clock,
            coordinator,
            room,
        })
    }

    /// Everything published to `release-1` so far.
    pub fn drain_events(&mut self) -> Vec<LockEvent> {
        std::iter::from_fn(|| self.room.try_recv())
            .map(|event| (*event).clone())
            .collect()
    }

    pub async fn stored(&self, id: &str) -> Result<BlockRecord> {
        self.store
            .load(&block(id)?)
            .await?
            .ok_or_else(|| Error::not_found("content block", id))
    }
}

/// Publisher that always fails.
#[derive(Debug, Default)]
pub struct BrokenPublisher;

#[async_trait]
impl Publisher for BrokenPublisher {
    async fn publish(&self, room: &RoomKey, _event: LockEvent) -> Result<()> {
        Err(Error::IoError(format!("transport down for {room}")))
    }
}

/// Store that reports the first `stale_writes` writes as lost races.
pub struct FlakyStore {
    inner: SqliteStore,
    stale_writes: u32,
    attempts: AtomicU32,
}

impl FlakyStore {
    pub const fn new(inner: SqliteStore, stale_writes: u32) -> Self {
        Self {
            inner,
            stale_writes,
            attempts: AtomicU32::new(0),
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlockStore for FlakyStore {
    async fn load(&self, id: &BlockId) -> Result<Option<BlockRecord>> {
        self.inner.load(id).await
    }

    async fn write_lock(
        &self,
        id: &BlockId,
        expected_version: i64,
        lock: &LockState,
    ) -> Result<WriteOutcome> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.stale_writes {
            return Ok(WriteOutcome::Stale);
        }
        self.inner.write_lock(id, expected_version, lock).await
    }

    async fn release_blocks(&self, release: &ReleaseId) -> Result<Vec<BlockRecord>> {
        self.inner.release_blocks(release).await
    }
}

pub fn settings(backoff_ms: u64) -> CoordinatorSettings {
    CoordinatorSettings {
        retry_backoff: std::time::Duration::from_millis(backoff_ms),
    }
}
