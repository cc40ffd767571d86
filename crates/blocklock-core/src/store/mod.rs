//! Lock record persistence boundary.
//!
//! The coordinator depends on [`BlockStore`], not on `SQLite`. A store must:
//!
//! - load a block with its lock fields, owning release and row version
//! - apply a lock-field update only if the row version is still the one read
//!   (compare-and-swap), reporting [`WriteOutcome::Stale`] otherwise
//!
//! Transient "busy" signals from the backend are also reported as `Stale` so the
//! coordinator retries them instead of surfacing them to callers.

mod sqlite;

use async_trait::async_trait;

pub use sqlite::{SqliteStore, SCHEMA};

use crate::{
    identifiers::{BlockId, ReleaseId, SectionId},
    lock_state::LockState,
    views::LockTarget,
    Error, Result,
};

/// A content block as loaded for lock evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRecord {
    pub id: BlockId,
    /// `None` when the containing section row is missing
    pub section_id: Option<SectionId>,
    /// `None` when the section or its release cannot be resolved
    pub release_id: Option<ReleaseId>,
    pub lock: LockState,
    /// Row version, bumped on every lock write
    pub version: i64,
}

impl BlockRecord {
    /// The block as a lock target, or `NotFound` if its release chain is broken.
    pub fn target(&self) -> Result<LockTarget> {
        let section_id = self
            .section_id
            .clone()
            .ok_or_else(|| Error::not_found("release section of content block", &self.id))?;
        let release_id = self
            .release_id
            .clone()
            .ok_or_else(|| Error::not_found("release of content block", &self.id))?;
        Ok(LockTarget {
            block_id: self.id.clone(),
            section_id,
            release_id,
        })
    }
}

/// Result of a conditional lock write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Applied; the row is now at `version`
    Written { version: i64 },
    /// Row changed since it was read (or the backend was busy); reload and retry
    Stale,
}

/// Persistence of per-block lock fields.
#[async_trait]
pub trait BlockStore: Send + Sync {
    /// Load a block by id. `Ok(None)` when no such block exists.
    async fn load(&self, id: &BlockId) -> Result<Option<BlockRecord>>;

    /// Replace the block's lock fields if its version is still `expected_version`.
    async fn write_lock(
        &self,
        id: &BlockId,
        expected_version: i64,
        lock: &LockState,
    ) -> Result<WriteOutcome>;

    /// All blocks of a release, ordered by block id.
    async fn release_blocks(&self, release: &ReleaseId) -> Result<Vec<BlockRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_requires_release_chain() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut record = BlockRecord {
            id: BlockId::parse("block-1")?,
            section_id: Some(SectionId::parse("section-1")?),
            release_id: None,
            lock: LockState::Unlocked,
            version: 0,
        };
        assert!(matches!(record.target(), Err(Error::NotFound { .. })));

        record.release_id = Some(ReleaseId::parse("release-1")?);
        let target = record.target()?;
        assert_eq!(target.release_id.as_str(), "release-1");

        record.section_id = None;
        assert!(matches!(record.target(), Err(Error::NotFound { .. })));
        Ok(())
    }
}
