//! Configuration loading from files and environment
//!
//! All operations return new instances rather than mutating shared state.

use std::path::{Path, PathBuf};

use super::types::Config;
use crate::{Error, Result};

// ═══════════════════════════════════════════════════════════════════════════
// PUBLIC API
// ═══════════════════════════════════════════════════════════════════════════

/// Load configuration for the current directory.
///
/// # Errors
///
/// Returns error if:
/// - The current directory cannot be determined
/// - A config file is malformed TOML
/// - An environment override does not parse
/// - Config values fail validation
pub fn load_config() -> Result<Config> {
    let cwd = std::env::current_dir()
        .map_err(|e| Error::IoError(format!("Failed to get current directory: {e}")))?;
    load_config_in(&cwd)
}

/// Load configuration with `project_root` as the project directory.
///
/// # Errors
///
/// See [`load_config`].
pub fn load_config_in(project_root: &Path) -> Result<Config> {
    let config = Config::default();

    let config = match global_config_path() {
        Some(global_path) if global_path.is_file() => config.merge(load_toml_file(&global_path)?),
        _ => config,
    };

    let project_path = project_config_path(project_root);
    let config = if project_path.exists() {
        config.merge(load_toml_file(&project_path)?)
    } else {
        config
    };

    let config = config.apply_env_vars()?;
    config.validate()?;

    Ok(config)
}

// ═══════════════════════════════════════════════════════════════════════════
// PATH HELPERS
// ═══════════════════════════════════════════════════════════════════════════

/// Get path to global config file
pub fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "blocklock")
        .map(|proj_dirs| proj_dirs.config_dir().join("config.toml"))
}

/// Get path to the project config file under `project_root`
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".blocklock").join("config.toml")
}

/// Load a TOML file into a partial Config
///
/// # Errors
///
/// Returns error if:
/// - Path is a directory instead of a file
/// - File cannot be read
/// - TOML is malformed
pub fn load_toml_file(path: &Path) -> Result<Config> {
    if path.is_dir() {
        return Err(Error::IoError(format!(
            "Config path is a directory, not a file: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::IoError(format!("Failed to read config file {}: {e}", path.display()))
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::ParseError(format!(
            "Failed to parse config file {}: {e}",
            path.display()
        ))
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// ENVIRONMENT VARIABLE OVERRIDES
// ═══════════════════════════════════════════════════════════════════════════

impl Config {
    /// Apply `BLOCKLOCK_*` environment variable overrides
    ///
    /// # Errors
    ///
    /// Returns error if environment variable values are invalid
    pub fn apply_env_vars(self) -> Result<Self> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns error if a numeric value does not parse
    pub fn apply_env_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(value) = lookup("BLOCKLOCK_DATABASE") {
            self.database = value;
        }

        if let Some(value) = lookup("BLOCKLOCK_LOG_LEVEL") {
            self.log_level = value;
        }

        if let Some(value) = lookup("BLOCKLOCK_RETRY_BACKOFF_MS") {
            self.coordinator.retry_backoff_ms = value.trim().parse().map_err(|e| {
                Error::InvalidConfig(format!("Invalid BLOCKLOCK_RETRY_BACKOFF_MS value: {e}"))
            })?;
        }

        if let Some(value) = lookup("BLOCKLOCK_ROOM_CAPACITY") {
            self.broadcast.room_capacity = value.trim().parse().map_err(|e| {
                Error::InvalidConfig(format!("Invalid BLOCKLOCK_ROOM_CAPACITY value: {e}"))
            })?;
        }

        Ok(self)
    }
}
