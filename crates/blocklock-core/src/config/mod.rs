//! Configuration loading and management
//!
//! # Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Global config: `~/.config/blocklock/config.toml`
//! 3. Project config: `.blocklock/config.toml`
//! 4. Environment variables: `BLOCKLOCK_*`
//! 5. CLI flags (applied by the binary)
//!
//! # Example Config
//!
//! ```toml
//! database = ".blocklock/blocklock.db"
//! log_level = "debug"
//!
//! [coordinator]
//! retry_backoff_ms = 10
//!
//! [broadcast]
//! room_capacity = 1024
//! ```

mod defaults;
mod load;
mod merge;
mod types;
mod validate;

#[cfg(test)]
mod tests_loading;
#[cfg(test)]
mod tests_validation;

pub use load::{
    global_config_path, load_config, load_config_in, load_toml_file, project_config_path,
};
pub use types::{BroadcastConfig, Config, CoordinatorConfig};
