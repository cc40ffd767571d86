//! Default configuration values

use super::types::{BroadcastConfig, Config, CoordinatorConfig};
use crate::{broadcast::DEFAULT_ROOM_CAPACITY, coordinator::DEFAULT_RETRY_BACKOFF_MS};

/// Default database location, relative to the working directory.
pub const DEFAULT_DATABASE: &str = ".blocklock/blocklock.db";

pub const DEFAULT_LOG_LEVEL: &str = "info";

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DEFAULT_DATABASE.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            coordinator: CoordinatorConfig::default(),
            broadcast: BroadcastConfig::default(),
        }
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
        }
    }
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            room_capacity: DEFAULT_ROOM_CAPACITY,
        }
    }
}
