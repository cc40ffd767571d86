//! User id to display identity.

use async_trait::async_trait;

use crate::{identifiers::UserId, lock_state::LockOwner, Result};

/// Resolves the acting user of a lock request.
///
/// Only the requester is resolved this way. The owner of an existing lock comes
/// back with the block itself and is never re-validated.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// `Ok(None)` when the user does not exist.
    async fn resolve(&self, id: &UserId) -> Result<Option<LockOwner>>;
}
