//! Configuration type definitions

use serde::{Deserialize, Serialize};

/// Root configuration structure
///
/// Loaded from defaults → global → project → env vars → CLI flags
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// `SQLite` database file
    pub database: String,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
    pub coordinator: CoordinatorConfig,
    pub broadcast: BroadcastConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Pause after the first lost write, grown linearly on later ones
    pub retry_backoff_ms: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BroadcastConfig {
    pub room_capacity: usize,
}
