// crates/accolade-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Achievement Store
// Description: Durable ScoreStore and UnlockStore backed by SQLite WAL.
// Purpose: Persist score counters and unlock records across restarts.
// Dependencies: accolade-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This module implements [`ScoreStore`] and [`UnlockStore`] over a single
//! `SQLite` connection. Every read-modify-write runs inside one transaction
//! while the connection mutex is held, so increments, high scores, and level
//! upgrades are atomic across clones of the store.
//! Database contents are untrusted: out-of-range integers surface as
//! [`SqliteStoreError::Corrupt`] rather than being truncated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;

use accolade_core::AchievementId;
use accolade_core::EventName;
use accolade_core::OwnerId;
use accolade_core::ScoreStore;
use accolade_core::StoreError;
use accolade_core::UnlockRecord;
use accolade_core::UnlockStore;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` achievement store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Creates a config for `path` with default pragmas.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for serde.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Stored data is out of range.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid input or configuration.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => {
                Self::Store(format!("schema version mismatch: {message}"))
            }
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
        }
    }
}

/// Maps an engine error into a store error.
#[allow(clippy::needless_pass_by_value, reason = "Used as a map_err adapter.")]
fn db(err: rusqlite::Error) -> SqliteStoreError {
    SqliteStoreError::Db(err.to_string())
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed score counters and unlock records.
///
/// Clones share the same connection.
#[derive(Debug, Clone)]
pub struct SqliteAchievementStore {
    /// Store configuration.
    config: SqliteStoreConfig,
    /// Shared connection; every operation holds the lock for its duration.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteAchievementStore {
    /// Opens (or creates) the store at the configured path.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the path is rejected or the database
    /// cannot be opened or initialized.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(&config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            config,
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Returns the store configuration.
    #[must_use]
    pub const fn config(&self) -> &SqliteStoreConfig {
        &self.config
    }

    /// Locks the shared connection.
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite connection mutex poisoned".to_string()))
    }

    /// Increments a counter inside one transaction.
    fn increment_score(&self, event: &EventName) -> Result<u64, SqliteStoreError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(db)?;
        let next = read_score(&tx, event)?
            .checked_add(1)
            .ok_or_else(|| SqliteStoreError::Invalid(format!("score overflow for {event}")))?;
        write_score(&tx, event, next)?;
        tx.commit().map_err(db)?;
        Ok(next)
    }

    /// Raises a counter inside one transaction.
    fn raise_score(&self, event: &EventName, value: u64) -> Result<Option<u64>, SqliteStoreError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(db)?;
        if value <= read_score(&tx, event)? {
            return Ok(None);
        }
        write_score(&tx, event, value)?;
        tx.commit().map_err(db)?;
        Ok(Some(value))
    }

    /// Upgrades an unlock record inside one transaction.
    fn upgrade_unlock(
        &self,
        id: &AchievementId,
        level: u32,
        owners: &BTreeSet<OwnerId>,
    ) -> Result<bool, SqliteStoreError> {
        if level == 0 {
            return Err(SqliteStoreError::Invalid(format!("unlock level must be positive for {id}")));
        }
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(db)?;
        if read_level(&tx, id)? >= level {
            return Ok(false);
        }
        tx.execute(
            "INSERT INTO unlocks (achievement_id, level) VALUES (?1, ?2)
             ON CONFLICT(achievement_id) DO UPDATE SET level = excluded.level",
            params![id.as_str(), i64::from(level)],
        )
        .map_err(db)?;
        for owner in owners {
            tx.execute(
                "INSERT OR IGNORE INTO unlock_owners (achievement_id, owner_id) VALUES (?1, ?2)",
                params![id.as_str(), owner.as_str()],
            )
            .map_err(db)?;
        }
        tx.commit().map_err(db)?;
        Ok(true)
    }
}

impl ScoreStore for SqliteAchievementStore {
    fn score_of(&self, event: &EventName) -> Result<u64, StoreError> {
        let guard = self.lock()?;
        Ok(read_score(&guard, event)?)
    }

    fn increment(&self, event: &EventName) -> Result<u64, StoreError> {
        Ok(self.increment_score(event)?)
    }

    fn set_score(&self, event: &EventName, value: u64) -> Result<u64, StoreError> {
        let guard = self.lock()?;
        write_score(&guard, event, value)?;
        Ok(value)
    }

    fn set_high_score(&self, event: &EventName, value: u64) -> Result<Option<u64>, StoreError> {
        Ok(self.raise_score(event, value)?)
    }

    fn delete_all(&self) -> Result<(), StoreError> {
        let guard = self.lock()?;
        guard.execute("DELETE FROM scores", params![]).map_err(db)?;
        Ok(())
    }
}

impl UnlockStore for SqliteAchievementStore {
    fn level_of(&self, id: &AchievementId) -> Result<u32, StoreError> {
        let guard = self.lock()?;
        Ok(read_level(&guard, id)?)
    }

    fn unlock(
        &self,
        id: &AchievementId,
        level: u32,
        owners: &BTreeSet<OwnerId>,
    ) -> Result<bool, StoreError> {
        Ok(self.upgrade_unlock(id, level, owners)?)
    }

    fn all_by_owner(&self, owner: &OwnerId) -> Result<Vec<UnlockRecord>, StoreError> {
        let guard = self.lock()?;
        Ok(load_records(&guard, Some(owner))?)
    }

    fn all(&self) -> Result<Vec<UnlockRecord>, StoreError> {
        let guard = self.lock()?;
        Ok(load_records(&guard, None)?)
    }

    fn delete_all(&self) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(db)?;
        tx.execute_batch("DELETE FROM unlock_owners; DELETE FROM unlocks;").map_err(db)?;
        tx.commit().map_err(db)?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Row Access
// ============================================================================

/// Reads a counter, treating a missing row as 0.
fn read_score(connection: &Connection, event: &EventName) -> Result<u64, SqliteStoreError> {
    let value: Option<i64> = connection
        .query_row("SELECT value FROM scores WHERE event = ?1", params![event.as_str()], |row| {
            row.get(0)
        })
        .optional()
        .map_err(db)?;
    value.map_or(Ok(0), |value| {
        u64::try_from(value)
            .map_err(|_| SqliteStoreError::Corrupt(format!("negative score for {event}")))
    })
}

/// Writes a counter.
fn write_score(connection: &Connection, event: &EventName, value: u64) -> Result<(), SqliteStoreError> {
    let stored = i64::try_from(value).map_err(|_| {
        SqliteStoreError::Invalid(format!("score for {event} exceeds sqlite integer range"))
    })?;
    connection
        .execute(
            "INSERT INTO scores (event, value) VALUES (?1, ?2)
             ON CONFLICT(event) DO UPDATE SET value = excluded.value",
            params![event.as_str(), stored],
        )
        .map_err(db)?;
    Ok(())
}

/// Reads an unlocked level, treating a missing row as 0.
fn read_level(connection: &Connection, id: &AchievementId) -> Result<u32, SqliteStoreError> {
    let level: Option<i64> = connection
        .query_row(
            "SELECT level FROM unlocks WHERE achievement_id = ?1",
            params![id.as_str()],
            |row| row.get(0),
        )
        .optional()
        .map_err(db)?;
    level.map_or(Ok(0), |level| stored_level(id, level))
}

/// Validates a stored level.
fn stored_level(id: &AchievementId, level: i64) -> Result<u32, SqliteStoreError> {
    u32::try_from(level)
        .ok()
        .filter(|level| *level > 0)
        .ok_or_else(|| SqliteStoreError::Corrupt(format!("invalid stored level {level} for {id}")))
}

/// Loads unlock records ordered by identifier, optionally restricted to one owner.
fn load_records(
    connection: &Connection,
    owner: Option<&OwnerId>,
) -> Result<Vec<UnlockRecord>, SqliteStoreError> {
    let mut statement = connection
        .prepare(
            "SELECT u.achievement_id, u.level, o.owner_id
             FROM unlocks u
             LEFT JOIN unlock_owners o ON o.achievement_id = u.achievement_id
             WHERE ?1 IS NULL OR u.achievement_id IN (
                 SELECT achievement_id FROM unlock_owners WHERE owner_id = ?1
             )
             ORDER BY u.achievement_id, o.owner_id",
        )
        .map_err(db)?;
    let rows = statement
        .query_map(params![owner.map(OwnerId::as_str)], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?, row.get::<_, Option<String>>(2)?))
        })
        .map_err(db)?;
    let mut records: Vec<UnlockRecord> = Vec::new();
    for row in rows {
        let (id, level, owner) = row.map_err(db)?;
        let id = AchievementId::new(id);
        if records.last().is_none_or(|record| record.id != id) {
            let level = stored_level(&id, level)?;
            records.push(UnlockRecord {
                id,
                level,
                owners: BTreeSet::new(),
            });
        }
        if let (Some(owner), Some(record)) = (owner, records.last_mut()) {
            record.owners.insert(OwnerId::new(owner));
        }
    }
    Ok(records)
}

// ============================================================================
// SECTION: Connection Setup
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    if path.display().to_string().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with the configured pragmas.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags).map_err(db)?;
    connection.execute_batch("PRAGMA foreign_keys = ON;").map_err(db)?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(db)?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(db)?;
    connection.busy_timeout(Duration::from_millis(config.busy_timeout_ms)).map_err(db)?;
    Ok(connection)
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(db)?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(db)?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(db)?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(db)?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS scores (
                    event TEXT PRIMARY KEY NOT NULL,
                    value INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS unlocks (
                    achievement_id TEXT PRIMARY KEY NOT NULL,
                    level INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS unlock_owners (
                    achievement_id TEXT NOT NULL,
                    owner_id TEXT NOT NULL,
                    PRIMARY KEY (achievement_id, owner_id),
                    FOREIGN KEY (achievement_id)
                        REFERENCES unlocks(achievement_id) ON DELETE CASCADE
                );
                CREATE INDEX IF NOT EXISTS idx_unlock_owners_owner
                    ON unlock_owners (owner_id);",
            )
            .map_err(db)?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(db)?;
    Ok(())
}
