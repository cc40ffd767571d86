//! Lock coordinator: lock, unlock, and the read-side queries.
//!
//! Each mutation runs under the per-block [`KeyedLocks`] guard, loads the
//! block, evaluates the decision table against the clock, and writes with a
//! compare-and-swap on the row version. A lost swap (another process got there
//! first, or the store was busy) backs off briefly, reloads and decides again
//! until a write lands or the decision needs none. Every lost swap means some
//! other writer made progress, so the loop terminates. The broadcast happens
//! after the write, still under the guard, so events for one block leave in
//! persistence order.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

use std::{sync::Arc, time::Duration};

use tracing::{debug, info, warn};

use crate::{
    broadcast::{LockEvent, Publisher, RoomKey},
    clock::{storage_precision, Clock, SystemClock},
    identifiers::{BlockId, ReleaseId, UserId},
    identity::IdentityResolver,
    keyed::KeyedLocks,
    lock_state::{decide_lock, decide_unlock, next_stamp, LockDecision, LockState, UnlockDecision},
    store::{BlockRecord, BlockStore, WriteOutcome},
    views::{lock_view, unlock_view, LockTarget, LockView, UnlockView},
    Error, Result,
};

/// Default pause after the first lost compare-and-swap, in milliseconds.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 5;

/// Backoff grows linearly with the attempt number up to this multiple.
const MAX_BACKOFF_STEPS: u32 = 10;

/// Coordinator tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorSettings {
    /// Pause after the first lost compare-and-swap
    pub retry_backoff: Duration,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            retry_backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
        }
    }
}

pub struct LockCoordinator {
    store: Arc<dyn BlockStore>,
    identities: Arc<dyn IdentityResolver>,
    publisher: Arc<dyn Publisher>,
    clock: Arc<dyn Clock>,
    keyed: KeyedLocks,
    settings: CoordinatorSettings,
}

impl std::fmt::Debug for LockCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockCoordinator")
            .field("clock", &self.clock)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl LockCoordinator {
    /// Coordinator on the system clock with default settings.
    pub fn new(
        store: Arc<dyn BlockStore>,
        identities: Arc<dyn IdentityResolver>,
        publisher: Arc<dyn Publisher>,
    ) -> Self {
        Self {
            store,
            identities,
            publisher,
            clock: Arc::new(SystemClock),
            keyed: KeyedLocks::new(),
            settings: CoordinatorSettings::default(),
        }
    }

    #[must_use]
    pub fn with_clock(self, clock: Arc<dyn Clock>) -> Self {
        Self { clock, ..self }
    }

    #[must_use]
    pub fn with_settings(self, settings: CoordinatorSettings) -> Self {
        Self { settings, ..self }
    }

    /// Take, refresh or (with `force`) steal the edit lock on `block`.
    ///
    /// If someone else holds a live lock and `force` is false, nothing changes
    /// and the holder's view is returned: contention is data, not an error.
    pub async fn lock(&self, block: &BlockId, requester: &UserId, force: bool) -> Result<LockView> {
        let acting = self
            .identities
            .resolve(requester)
            .await?
            .ok_or_else(|| Error::not_found("user", requester))?;

        let _guard = self.keyed.acquire(block).await;

        let mut attempt: u32 = 0;
        loop {
            attempt = attempt.saturating_add(1);
            let (record, target) = self.load_target(block).await?;
            let now = storage_precision(self.clock.now());
            let decision = decide_lock(&record.lock, requester, force, now);
            debug!(
                block = %block,
                user = %requester,
                force,
                attempt,
                decision = decision.as_str(),
                "lock decision"
            );

            if let (LockDecision::Defer, LockState::LockedBy { owner, since }) =
                (decision, &record.lock)
            {
                return Ok(lock_view(&target, owner, *since));
            }

            let stamp = next_stamp(&record.lock, now);
            let next = LockState::LockedBy {
                owner: acting.clone(),
                since: stamp,
            };
            match self.store.write_lock(block, record.version, &next).await? {
                WriteOutcome::Written { version } => {
                    info!(
                        block = %block,
                        user = %requester,
                        decision = decision.as_str(),
                        version,
                        "content block locked"
                    );
                    let view = lock_view(&target, &acting, stamp);
                    self.publish(&target.release_id, LockEvent::ContentBlockLocked(view.clone()))
                        .await;
                    return Ok(view);
                }
                WriteOutcome::Stale => {
                    debug!(block = %block, attempt, "lock write lost compare-and-swap, retrying");
                    self.back_off(attempt).await;
                }
            }
        }
    }

    /// Clear the edit lock on `block` on behalf of `actor`.
    ///
    /// Clearing an unlocked block succeeds without a write or a broadcast.
    /// A live lock held by someone else is a `Conflict` unless `force` is set.
    pub async fn unlock(&self, block: &BlockId, actor: &UserId, force: bool) -> Result<UnlockView> {
        let _guard = self.keyed.acquire(block).await;

        let mut attempt: u32 = 0;
        loop {
            attempt = attempt.saturating_add(1);
            let (record, target) = self.load_target(block).await?;
            let now = storage_precision(self.clock.now());
            let decision = decide_unlock(&record.lock, actor, force, now);
            debug!(
                block = %block,
                user = %actor,
                force,
                attempt,
                decision = decision.as_str(),
                "unlock decision"
            );

            match (decision, &record.lock) {
                (UnlockDecision::Reject, LockState::LockedBy { owner, .. }) => {
                    return Err(Error::conflict(block, owner.display_name()));
                }
                (d, _) if !d.persists() => return Ok(unlock_view(&target)),
                _ => {}
            }

            match self
                .store
                .write_lock(block, record.version, &LockState::Unlocked)
                .await?
            {
                WriteOutcome::Written { version } => {
                    info!(
                        block = %block,
                        user = %actor,
                        decision = decision.as_str(),
                        version,
                        "content block unlocked"
                    );
                    let view = unlock_view(&target);
                    self.publish(&target.release_id, LockEvent::ContentBlockUnlocked(view.clone()))
                        .await;
                    return Ok(view);
                }
                WriteOutcome::Stale => {
                    debug!(block = %block, attempt, "unlock write lost compare-and-swap, retrying");
                    self.back_off(attempt).await;
                }
            }
        }
    }

    /// The live lock on `block`, if any. Expired locks read as `None`.
    pub async fn status(&self, block: &BlockId) -> Result<Option<LockView>> {
        let (record, target) = self.load_target(block).await?;
        Ok(live_view(&record, &target, self.clock.now()))
    }

    /// Live locks across every block of `release`, ordered by block id.
    pub async fn release_locks(&self, release: &ReleaseId) -> Result<Vec<LockView>> {
        let now = self.clock.now();
        let records = self.store.release_blocks(release).await?;

        let mut views = Vec::new();
        for record in &records {
            let target = record.target()?;
            if let Some(view) = live_view(record, &target, now) {
                views.push(view);
            }
        }
        views.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(views)
    }

    async fn load_target(&self, block: &BlockId) -> Result<(BlockRecord, LockTarget)> {
        let record = self
            .store
            .load(block)
            .await?
            .ok_or_else(|| Error::not_found("content block", block))?;
        let target = record.target()?;
        Ok((record, target))
    }

    async fn publish(&self, release: &ReleaseId, event: LockEvent) {
        let room = RoomKey::release(release);
        let name = event.name();
        if let Err(e) = self.publisher.publish(&room, event).await {
            warn!(room = %room, event = name, error = %e, "broadcast failed, lock state kept");
        }
    }

    async fn back_off(&self, attempt: u32) {
        let pause = self
            .settings
            .retry_backoff
            .saturating_mul(attempt.min(MAX_BACKOFF_STEPS));
        tokio::time::sleep(pause).await;
    }
}

fn live_view(
    record: &BlockRecord,
    target: &LockTarget,
    now: chrono::DateTime<chrono::Utc>,
) -> Option<LockView> {
    let owner = record.lock.live_owner(now)?;
    let since = record.lock.since()?;
    Some(lock_view(target, owner, since))
}
