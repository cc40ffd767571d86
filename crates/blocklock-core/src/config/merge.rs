//! Configuration merging logic
//!
//! Later configs override earlier ones (defaults → global → project → env → CLI).
//! A layer value equal to the built-in default is treated as "not set" and
//! leaves the lower layer in place.

use super::{
    defaults::{DEFAULT_DATABASE, DEFAULT_LOG_LEVEL},
    types::{BroadcastConfig, Config, CoordinatorConfig},
};

impl Config {
    /// Merge another config into this one (other takes precedence)
    pub fn merge(self, other: Self) -> Self {
        Self {
            database: if other.database == DEFAULT_DATABASE {
                self.database
            } else {
                other.database
            },
            log_level: if other.log_level == DEFAULT_LOG_LEVEL {
                self.log_level
            } else {
                other.log_level
            },
            coordinator: self.coordinator.merge(other.coordinator),
            broadcast: self.broadcast.merge(other.broadcast),
        }
    }
}

impl CoordinatorConfig {
    fn merge(self, other: Self) -> Self {
        if other == Self::default() {
            self
        } else {
            other
        }
    }
}

impl BroadcastConfig {
    fn merge(self, other: Self) -> Self {
        if other == Self::default() {
            self
        } else {
            other
        }
    }
}
