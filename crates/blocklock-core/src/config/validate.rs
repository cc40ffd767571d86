//! Configuration validation

use super::types::Config;
use std::time::Duration;

use crate::{coordinator::CoordinatorSettings, Error, Result};

const MAX_RETRY_BACKOFF_MS: u64 = 1000;

impl Config {
    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any values are out of range or empty
    pub fn validate(&self) -> Result<()> {
        if self.database.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "database cannot be empty - unset it or provide a file path".to_string(),
            ));
        }

        if self.log_level.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "log_level cannot be empty - use e.g. \"info\" or \"blocklock=debug\"".to_string(),
            ));
        }

        if !(1..=MAX_RETRY_BACKOFF_MS).contains(&self.coordinator.retry_backoff_ms) {
            return Err(Error::InvalidConfig(format!(
                "coordinator.retry_backoff_ms must be between 1 and {MAX_RETRY_BACKOFF_MS}"
            )));
        }

        if self.broadcast.room_capacity == 0 {
            return Err(Error::InvalidConfig(
                "broadcast.room_capacity must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Coordinator tuning derived from this config.
    #[must_use]
    pub const fn coordinator_settings(&self) -> CoordinatorSettings {
        CoordinatorSettings {
            retry_backoff: Duration::from_millis(self.coordinator.retry_backoff_ms),
        }
    }
}
