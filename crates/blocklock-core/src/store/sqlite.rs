//! `SQLite` lock record store using `SQLx`.
//!
//! - Connection pooling, WAL journal, busy timeout
//! - Embedded schema, created idempotently by [`SqliteStore::init`]
//! - Lock writes are a single `UPDATE ... WHERE version = ?` statement, so a
//!   dropped future leaves either the old row or the new one, never a mix

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

use std::{path::Path, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

use super::{BlockRecord, BlockStore, WriteOutcome};
use crate::{
    identifiers::{BlockId, ReleaseId, SectionId, UserId},
    identity::IdentityResolver,
    lock_state::{LockOwner, LockState},
    Error, Result,
};

/// Database schema, executed once on init.
///
/// Sections and blocks carry no foreign keys: a block whose section or release
/// has gone away must still load, and is then rejected as a lock target.
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    email TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS releases (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS release_sections (
    id TEXT PRIMARY KEY,
    release_id TEXT NOT NULL,
    heading TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS content_blocks (
    id TEXT PRIMARY KEY,
    section_id TEXT NOT NULL,
    lock_owner_id TEXT,
    locked_at TEXT,
    version INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_release_sections_release ON release_sections(release_id);
CREATE INDEX IF NOT EXISTS idx_content_blocks_section ON content_blocks(section_id);
";

const SELECT_BLOCK: &str = "
SELECT b.id, s.id, r.id, b.lock_owner_id, b.locked_at, b.version,
       u.first_name, u.last_name, u.email
FROM content_blocks b
LEFT JOIN release_sections s ON s.id = b.section_id
LEFT JOIN releases r ON r.id = s.release_id
LEFT JOIN users u ON u.id = b.lock_owner_id";

type BlockRow = (
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    i64,
    Option<String>,
    Option<String>,
    Option<String>,
);

/// How long a connection waits on a locked database before reporting busy.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Lock record store and identity resolver backed by `SQLite`.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Wrap an existing pool. Call [`init`](Self::init) before use.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the database pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Open (creating if missing) a database file and initialize the schema.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    Error::IoError(format!("Failed to create parent directory: {e}"))
                })?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| Error::DatabaseError(format!("Failed to connect to database: {e}")))?;

        let store = Self::new(pool);
        store.init().await?;
        Ok(store)
    }

    /// Private in-memory database on a single pinned connection.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| Error::DatabaseError(format!("Failed to open in-memory database: {e}")))?;

        let store = Self::new(pool);
        store.init().await?;
        Ok(store)
    }

    /// Create tables and indexes if they do not exist.
    pub async fn init(&self) -> Result<()> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::DatabaseError(format!("Failed to initialize schema: {e}")))?;
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // SEEDING
    // ═══════════════════════════════════════════════════════════════════════

    /// Insert or update a user.
    pub async fn insert_user(&self, user: &LockOwner) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (id, first_name, last_name, email) VALUES (?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                email = excluded.email",
        )
        .bind(user.id.as_str())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Insert or update a release.
    pub async fn insert_release(&self, id: &ReleaseId, title: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO releases (id, title) VALUES (?, ?)
             ON CONFLICT(id) DO UPDATE SET title = excluded.title",
        )
        .bind(id.as_str())
        .bind(title)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Insert or update a release section.
    pub async fn insert_section(
        &self,
        id: &SectionId,
        release: &ReleaseId,
        heading: &str,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO release_sections (id, release_id, heading) VALUES (?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                release_id = excluded.release_id,
                heading = excluded.heading",
        )
        .bind(id.as_str())
        .bind(release.as_str())
        .bind(heading)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Insert a content block, or move an existing one. Lock fields are left alone.
    pub async fn insert_block(&self, id: &BlockId, section: &SectionId) -> Result<()> {
        sqlx::query(
            "INSERT INTO content_blocks (id, section_id) VALUES (?, ?)
             ON CONFLICT(id) DO UPDATE SET section_id = excluded.section_id",
        )
        .bind(id.as_str())
        .bind(section.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl BlockStore for SqliteStore {
    async fn load(&self, id: &BlockId) -> Result<Option<BlockRecord>> {
        let row: Option<BlockRow> = sqlx::query_as(&format!("{SELECT_BLOCK} WHERE b.id = ?"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(record_from_row).transpose()
    }

    async fn write_lock(
        &self,
        id: &BlockId,
        expected_version: i64,
        lock: &LockState,
    ) -> Result<WriteOutcome> {
        let (owner_id, locked_at) = match lock {
            LockState::Unlocked => (None, None),
            LockState::LockedBy { owner, since } => {
                (Some(owner.id.as_str()), Some(format_timestamp(*since)))
            }
        };

        let result = sqlx::query(
            "UPDATE content_blocks
             SET lock_owner_id = ?, locked_at = ?, version = version + 1
             WHERE id = ? AND version = ?",
        )
        .bind(owner_id)
        .bind(locked_at)
        .bind(id.as_str())
        .bind(expected_version)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) if done.rows_affected() == 1 => Ok(WriteOutcome::Written {
                version: expected_version + 1,
            }),
            Ok(_) => Ok(WriteOutcome::Stale),
            Err(e) if is_busy(&e) => {
                tracing::debug!(block = %id, error = %e, "store busy during lock write");
                Ok(WriteOutcome::Stale)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn release_blocks(&self, release: &ReleaseId) -> Result<Vec<BlockRecord>> {
        let rows: Vec<BlockRow> =
            sqlx::query_as(&format!("{SELECT_BLOCK} WHERE r.id = ? ORDER BY b.id ASC"))
                .bind(release.as_str())
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(record_from_row).collect()
    }
}

#[async_trait]
impl IdentityResolver for SqliteStore {
    async fn resolve(&self, id: &UserId) -> Result<Option<LockOwner>> {
        let row: Option<(String, String, String)> =
            sqlx::query_as("SELECT first_name, last_name, email FROM users WHERE id = ?")
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(first_name, last_name, email)| LockOwner {
            id: id.clone(),
            first_name,
            last_name,
            email,
        }))
    }
}

fn record_from_row(row: BlockRow) -> Result<BlockRecord> {
    let (id, section_id, release_id, owner_id, locked_at, version, first, last, email) = row;

    let owner = owner_id
        .map(UserId::parse)
        .transpose()?
        .map(|owner_id| match (first, last, email) {
            (Some(first_name), Some(last_name), Some(email)) => LockOwner {
                id: owner_id,
                first_name,
                last_name,
                email,
            },
            _ => LockOwner::unresolved(owner_id),
        });
    let since = locked_at.as_deref().map(parse_timestamp).transpose()?;

    Ok(BlockRecord {
        id: BlockId::parse(id)?,
        section_id: section_id.map(SectionId::parse).transpose()?,
        release_id: release_id.map(ReleaseId::parse).transpose()?,
        lock: LockState::from_fields(owner, since),
        version,
    })
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| Error::ParseError(format!("invalid locked_at '{raw}': {e}")))
}

/// `SQLITE_BUSY` / `SQLITE_LOCKED`, including their extended codes.
fn is_busy(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db
            .code()
            .and_then(|code| code.parse::<i32>().ok())
            .is_some_and(|code| matches!(code & 0xff, 5 | 6)),
        _ => false,
    }
}
