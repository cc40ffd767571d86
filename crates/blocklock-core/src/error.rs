//! Error types for blocklock.
//!
//! Two domain outcomes are terminal and surfaced unchanged to callers:
//!
//! - **`NotFound`**: the block, its release chain, or the acting user does not exist
//! - **`Conflict`**: a live lock owned by someone else was targeted without force
//!
//! Everything else is infrastructure (database, configuration, parsing).
//! Contention on `lock` is never an error: it is reported as the current owner's view.

use thiserror::Error;

use crate::identifiers::IdentifierError;

/// Top-level error type for lock coordination.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Target entity does not exist
    #[error("{entity} '{id}' not found")]
    NotFound {
        /// Kind of entity that failed to resolve (block, release, user)
        entity: &'static str,
        /// The identifier that was looked up
        id: String,
    },

    /// Live lock held by another user, no force requested
    #[error("content block '{block}' is locked by '{holder}'")]
    Conflict {
        /// The contested block
        block: String,
        /// Current lock owner
        holder: String,
    },

    /// Input validation failed
    #[error("Validation error: {0}")]
    Validation(#[from] IdentifierError),

    /// Underlying store failure
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Stored data could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Configuration is invalid
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Filesystem failure
    #[error("IO error: {0}")]
    IoError(String),
}

impl Error {
    /// Create a not-found error for an entity.
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Create a conflict error naming the current holder.
    pub fn conflict(block: impl std::fmt::Display, holder: impl std::fmt::Display) -> Self {
        Self::Conflict {
            block: block.to_string(),
            holder: holder.to_string(),
        }
    }

    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Conflict { .. } => "CONFLICT",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::ParseError(_) => "PARSE_ERROR",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::IoError(_) => "IO_ERROR",
        }
    }

    /// Process exit code for the CLI.
    ///
    /// 1 = bad input or config, 2 = system, 3 = not found, 4 = conflict/database.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) | Self::InvalidConfig(_) | Self::ParseError(_) => 1,
            Self::IoError(_) => 2,
            Self::NotFound { .. } => 3,
            Self::Conflict { .. } | Self::DatabaseError(_) => 4,
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::ParseError(format!("Failed to parse config: {err}"))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
