//! # Blocklock Core
//!
//! Exclusive edit locks for the content blocks of a release, with real-time
//! notification of every lock change to the release's collaborators.
//!
//! ## Model
//!
//! - A block is unlocked or locked by one user since an instant
//! - A lock is valid for ten minutes from that instant; expiry is lazy
//! - `lock` takes, refreshes or (forced) steals; contention returns the holder
//! - `unlock` clears; another user's live lock is a `Conflict` unless forced
//!
//! ## Laws (Compiler Enforced)
//!
//! - No `unwrap()` / `expect()` / `panic!()` outside tests
//! - No `unsafe` - safe Rust only

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]
#![forbid(unsafe_code)]

pub mod broadcast;
pub mod clock;
pub mod config;
pub mod coordinator;
mod error;
pub mod identifiers;
pub mod identity;
pub mod keyed;
pub mod lock_state;
pub mod store;
pub mod views;

pub use broadcast::{LockEvent, Publisher, RoomHub, RoomKey, RoomSubscription};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use coordinator::{CoordinatorSettings, LockCoordinator};
pub use error::{Error, Result};
pub use identifiers::{BlockId, IdentifierError, ReleaseId, SectionId, UserId};
pub use identity::IdentityResolver;
pub use lock_state::{LockOwner, LockState};
pub use store::{BlockRecord, BlockStore, SqliteStore, WriteOutcome};
pub use views::{LockView, LockedByView, UnlockView};
