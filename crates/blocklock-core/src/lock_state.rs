//! Lock state and the pure decision tables for lock / unlock.
//!
//! A block is either `Unlocked` or `LockedBy` an owner since some instant.
//! Validity is never stored: a lock is live while `since + LOCK_DURATION >= now`
//! and is read as absent for acquisition once that has passed, even though the
//! fields stay in storage until the next write overwrites them.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::identifiers::UserId;

/// How long a lock stays valid after it was taken or refreshed, in minutes.
pub const LOCK_DURATION_MINUTES: i64 = 10;

/// Lock validity window.
#[must_use]
pub fn lock_duration() -> Duration {
    Duration::minutes(LOCK_DURATION_MINUTES)
}

/// Display identity of a user who holds (or wants) a lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockOwner {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl LockOwner {
    /// "First Last", or the user id when both names are blank.
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let name = name.trim();
        if name.is_empty() {
            self.id.to_string()
        } else {
            name.to_string()
        }
    }

    /// An owner id whose user row is gone; shown by id.
    #[must_use]
    pub const fn unresolved(id: UserId) -> Self {
        Self {
            id,
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
        }
    }
}

/// Persisted lock fields of one content block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockState {
    Unlocked,
    LockedBy {
        owner: LockOwner,
        since: DateTime<Utc>,
    },
}

impl LockState {
    /// Build from the nullable columns; a half-populated row reads as unlocked.
    #[must_use]
    pub fn from_fields(owner: Option<LockOwner>, since: Option<DateTime<Utc>>) -> Self {
        match (owner, since) {
            (Some(owner), Some(since)) => Self::LockedBy { owner, since },
            _ => Self::Unlocked,
        }
    }

    /// `since + LOCK_DURATION`, if locked at all.
    #[must_use]
    pub fn locked_until(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Unlocked => None,
            Self::LockedBy { since, .. } => Some(*since + lock_duration()),
        }
    }

    /// Whether the lock is still valid at `now`.
    #[must_use]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.locked_until().is_some_and(|until| until >= now)
    }

    /// Locked, but the window has passed.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.locked_until().is_some_and(|until| until < now)
    }

    /// The owner of a live lock.
    #[must_use]
    pub fn live_owner(&self, now: DateTime<Utc>) -> Option<&LockOwner> {
        match self {
            Self::LockedBy { owner, .. } if self.is_live(now) => Some(owner),
            _ => None,
        }
    }

    /// Lock start instant, live or not.
    #[must_use]
    pub const fn since(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Unlocked => None,
            Self::LockedBy { since, .. } => Some(*since),
        }
    }
}

/// Outcome of evaluating a lock request against stored state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockDecision {
    /// Nothing stored: take it
    Acquire,
    /// Stored lock has expired: take it over
    ReclaimExpired,
    /// Requester already holds it: restart the window
    Refresh,
    /// Someone else holds it and force was given
    Steal,
    /// Someone else holds it: report their lock, change nothing
    Defer,
}

impl LockDecision {
    /// Whether this decision writes to the store (and therefore broadcasts).
    #[must_use]
    pub const fn persists(self) -> bool {
        !matches!(self, Self::Defer)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Acquire => "acquire",
            Self::ReclaimExpired => "reclaim_expired",
            Self::Refresh => "refresh",
            Self::Steal => "steal",
            Self::Defer => "defer",
        }
    }
}

/// Decide what `lock(block, requester, force)` does given the stored state.
#[must_use]
pub fn decide_lock(
    state: &LockState,
    requester: &UserId,
    force: bool,
    now: DateTime<Utc>,
) -> LockDecision {
    match state {
        LockState::Unlocked => LockDecision::Acquire,
        LockState::LockedBy { .. } if state.is_expired(now) => LockDecision::ReclaimExpired,
        LockState::LockedBy { owner, .. } if &owner.id == requester => LockDecision::Refresh,
        LockState::LockedBy { .. } if force => LockDecision::Steal,
        LockState::LockedBy { .. } => LockDecision::Defer,
    }
}

/// Outcome of evaluating an unlock request against stored state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockDecision {
    /// Nothing stored: idempotent success, no write
    AlreadyUnlocked,
    /// Stored lock has expired: clear it
    ClearExpired,
    /// Actor owns the live lock: clear it
    Release,
    /// Someone else owns it and force was given: clear it
    ForceRelease,
    /// Someone else owns it: refuse
    Reject,
}

impl UnlockDecision {
    /// Whether this decision clears the stored fields (and therefore broadcasts).
    #[must_use]
    pub const fn persists(self) -> bool {
        matches!(self, Self::ClearExpired | Self::Release | Self::ForceRelease)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AlreadyUnlocked => "already_unlocked",
            Self::ClearExpired => "clear_expired",
            Self::Release => "release",
            Self::ForceRelease => "force_release",
            Self::Reject => "reject",
        }
    }
}

/// Decide what `unlock(block, actor, force)` does given the stored state.
#[must_use]
pub fn decide_unlock(
    state: &LockState,
    actor: &UserId,
    force: bool,
    now: DateTime<Utc>,
) -> UnlockDecision {
    match state {
        LockState::Unlocked => UnlockDecision::AlreadyUnlocked,
        LockState::LockedBy { .. } if state.is_expired(now) => UnlockDecision::ClearExpired,
        LockState::LockedBy { owner, .. } if &owner.id == actor => UnlockDecision::Release,
        LockState::LockedBy { .. } if force => UnlockDecision::ForceRelease,
        LockState::LockedBy { .. } => UnlockDecision::Reject,
    }
}

/// The `lockedAt` to write: `now`, bumped one microsecond past the stored
/// instant when the clock has not moved beyond it, so refreshes always advance.
#[must_use]
pub fn next_stamp(state: &LockState, now: DateTime<Utc>) -> DateTime<Utc> {
    match state.since() {
        Some(since) if now <= since => since + Duration::microseconds(1),
        _ => now,
    }
}
