//! Views returned to callers and broadcast to release rooms.
//!
//! Building a view is pure: no store access, no clock. `locked_until` is always
//! derived from `locked` here rather than read from anywhere.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    identifiers::{BlockId, ReleaseId, SectionId},
    lock_state::{lock_duration, LockOwner},
};

/// A content block that has a resolvable owning release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockTarget {
    pub block_id: BlockId,
    pub section_id: SectionId,
    pub release_id: ReleaseId,
}

/// Who holds the lock, as shown to collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockedByView {
    pub display_name: String,
    pub email: String,
}

/// Current lock on a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockView {
    pub id: BlockId,
    pub section_id: SectionId,
    pub release_id: ReleaseId,
    pub locked_by: LockedByView,
    pub locked: DateTime<Utc>,
    pub locked_until: DateTime<Utc>,
}

/// A block whose lock was cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockView {
    pub id: BlockId,
    pub section_id: SectionId,
    pub release_id: ReleaseId,
}

/// Shape the lock view for `owner` holding `target` since `locked`.
#[must_use]
pub fn lock_view(target: &LockTarget, owner: &LockOwner, locked: DateTime<Utc>) -> LockView {
    LockView {
        id: target.block_id.clone(),
        section_id: target.section_id.clone(),
        release_id: target.release_id.clone(),
        locked_by: LockedByView {
            display_name: owner.display_name(),
            email: owner.email.clone(),
        },
        locked,
        locked_until: locked + lock_duration(),
    }
}

/// Shape the unlock view for `target`.
#[must_use]
pub fn unlock_view(target: &LockTarget) -> UnlockView {
    UnlockView {
        id: target.block_id.clone(),
        section_id: target.section_id.clone(),
        release_id: target.release_id.clone(),
    }
}
