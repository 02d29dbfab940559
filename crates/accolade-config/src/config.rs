// crates/accolade-config/src/config.rs
// ============================================================================
// Module: Accolade Configuration
// Description: Configuration loading, validation, and engine wiring.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: accolade-core, accolade-providers, accolade-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Every section has defaults, so an empty file yields an in-memory engine in
//! UTC with no audit output and no localization. Invalid configuration fails
//! closed; nothing is partially applied.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use accolade_core::Catalog;
use accolade_core::EngineAuditSink;
use accolade_core::FileAuditSink;
use accolade_core::InMemoryScoreStore;
use accolade_core::InMemoryUnlockStore;
use accolade_core::Locale;
use accolade_core::NoopAuditSink;
use accolade_core::ScoreStore;
use accolade_core::StderrAuditSink;
use accolade_core::SystemClock;
use accolade_core::UnlockStore;
use accolade_providers::Engine;
use accolade_providers::build_engine;
use accolade_store_sqlite::DEFAULT_BUSY_TIMEOUT_MS;
use accolade_store_sqlite::SqliteAchievementStore;
use accolade_store_sqlite::SqliteStoreConfig;
use accolade_store_sqlite::SqliteStoreMode;
use accolade_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use thiserror::Error;
use time::UtcOffset;

use crate::bundle::TomlBundleSource;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "accolade.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "ACCOLADE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default directory holding message bundles.
const DEFAULT_BUNDLE_DIR: &str = "i18n";
/// Largest accepted UTC offset magnitude in minutes.
const MAX_UTC_OFFSET_MINUTES: i32 = 18 * 60;

// ============================================================================
// SECTION: Shared Handles
// ============================================================================

/// Score store handle chosen at runtime.
pub type SharedScoreStore = Arc<dyn ScoreStore + Send + Sync>;
/// Unlock store handle chosen at runtime.
pub type SharedUnlockStore = Arc<dyn UnlockStore + Send + Sync>;
/// Engine assembled from configuration.
pub type ConfiguredEngine<C> = Engine<C, SharedScoreStore, SharedUnlockStore>;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Accolade engine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccoladeConfig {
    /// Message bundle configuration.
    #[serde(default)]
    pub localization: LocalizationConfig,
    /// Score and unlock store configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Audit sink configuration.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Wall clock configuration.
    #[serde(default)]
    pub clock: ClockConfig,
}

impl AccoladeConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order: `path`, then [`CONFIG_ENV_VAR`], then
    /// `accolade.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.localization.validate()?;
        self.store.validate()?;
        self.audit.validate()?;
        self.clock.validate()?;
        Ok(())
    }

    /// Opens the configured stores.
    ///
    /// The `SQLite` backend serves both contracts from one database.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the store cannot be opened.
    pub fn open_stores(&self) -> Result<(SharedScoreStore, SharedUnlockStore), ConfigError> {
        match self.store.sqlite_config()? {
            None => {
                let scores: SharedScoreStore = Arc::new(InMemoryScoreStore::new());
                let unlocks: SharedUnlockStore = Arc::new(InMemoryUnlockStore::new());
                Ok((scores, unlocks))
            }
            Some(sqlite_config) => {
                let store = Arc::new(
                    SqliteAchievementStore::new(sqlite_config)
                        .map_err(|err| ConfigError::Io(format!("store init failed: {err}")))?,
                );
                let scores: SharedScoreStore = store.clone();
                let unlocks: SharedUnlockStore = store;
                Ok((scores, unlocks))
            }
        }
    }

    /// Builds the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the audit file cannot be opened.
    pub fn audit_sink(&self) -> Result<Arc<dyn EngineAuditSink>, ConfigError> {
        match self.audit.sink {
            AuditSinkKind::None => Ok(Arc::new(NoopAuditSink)),
            AuditSinkKind::Stderr => Ok(Arc::new(StderrAuditSink)),
            AuditSinkKind::File => {
                let path = self.audit.path.as_ref().ok_or_else(|| {
                    ConfigError::Invalid("file audit sink requires path".to_string())
                })?;
                let sink = FileAuditSink::new(path)
                    .map_err(|err| ConfigError::Io(format!("audit sink init failed: {err}")))?;
                Ok(Arc::new(sink))
            }
        }
    }

    /// Builds the system clock at the configured offset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the offset is out of range.
    pub fn clock(&self) -> Result<SystemClock, ConfigError> {
        Ok(SystemClock::with_offset(self.clock.offset()?))
    }

    /// Returns the bundle source rooted at the configured directory.
    #[must_use]
    pub fn bundle_source(&self) -> TomlBundleSource {
        TomlBundleSource::new(&self.localization.bundle_dir)
    }

    /// Assembles an engine over `catalog` from this configuration.
    ///
    /// When a base name is configured the bundle for the configured locale is
    /// loaded eagerly, so a missing bundle fails here.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a store, sink, or bundle cannot be set up.
    pub fn build_engine<C>(&self, catalog: C) -> Result<ConfiguredEngine<C>, ConfigError>
    where
        C: Catalog + Clone,
    {
        let (scores, unlocks) = self.open_stores()?;
        let engine = build_engine(catalog, scores, unlocks, Arc::new(self.clock()?))
            .with_audit_sink(self.audit_sink()?)
            .with_bundle_source(Arc::new(self.bundle_source()));
        engine
            .set_locale(self.localization.locale.clone())
            .map_err(|err| ConfigError::Invalid(format!("localization: {err}")))?;
        if let Some(base_name) = &self.localization.base_name {
            engine
                .set_internationalization_base_name(base_name.clone())
                .map_err(|err| ConfigError::Invalid(format!("localization: {err}")))?;
        }
        Ok(engine)
    }
}

// ============================================================================
// SECTION: Localization
// ============================================================================

/// Message bundle configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalizationConfig {
    /// Bundle base name; localization stays off when unset.
    #[serde(default)]
    pub base_name: Option<String>,
    /// Initial locale.
    #[serde(default)]
    pub locale: Locale,
    /// Directory holding `<base>_<locale>.toml` files.
    #[serde(default = "default_bundle_dir")]
    pub bundle_dir: PathBuf,
}

impl Default for LocalizationConfig {
    fn default() -> Self {
        Self {
            base_name: None,
            locale: Locale::default(),
            bundle_dir: default_bundle_dir(),
        }
    }
}

impl LocalizationConfig {
    /// Validates localization configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(base_name) = &self.base_name {
            validate_base_name(base_name)?;
        }
        validate_path_string("localization.bundle_dir", &self.bundle_dir.to_string_lossy())
    }
}

/// Returns the default bundle directory.
fn default_bundle_dir() -> PathBuf {
    PathBuf::from(DEFAULT_BUNDLE_DIR)
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    /// In-memory stores; progress is lost on exit.
    #[default]
    Memory,
    /// `SQLite`-backed durable store.
    Sqlite,
}

/// Score and unlock store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Store backend.
    #[serde(default)]
    pub kind: StoreKind,
    /// `SQLite` database path when using the sqlite backend.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_store_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::default(),
            path: None,
            busy_timeout_ms: default_store_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

impl StoreConfig {
    /// Validates store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.kind {
            StoreKind::Memory => {
                if self.path.is_some() {
                    return Err(ConfigError::Invalid("memory store must not set path".to_string()));
                }
                Ok(())
            }
            StoreKind::Sqlite => {
                let path = self
                    .path
                    .as_ref()
                    .ok_or_else(|| ConfigError::Invalid("sqlite store requires path".to_string()))?;
                validate_path_string("store.path", &path.to_string_lossy())?;
                if self.busy_timeout_ms == 0 {
                    return Err(ConfigError::Invalid(
                        "store busy_timeout_ms must be greater than zero".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Returns the `SQLite` settings, or `None` for the memory backend.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the sqlite backend has no path.
    pub fn sqlite_config(&self) -> Result<Option<SqliteStoreConfig>, ConfigError> {
        match self.kind {
            StoreKind::Memory => Ok(None),
            StoreKind::Sqlite => {
                let path = self
                    .path
                    .clone()
                    .ok_or_else(|| ConfigError::Invalid("sqlite store requires path".to_string()))?;
                Ok(Some(SqliteStoreConfig {
                    path,
                    busy_timeout_ms: self.busy_timeout_ms,
                    journal_mode: self.journal_mode,
                    sync_mode: self.sync_mode,
                }))
            }
        }
    }
}

/// Returns the default store busy timeout.
const fn default_store_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// Discard audit records.
    #[default]
    None,
    /// JSON lines on stderr.
    Stderr,
    /// JSON lines appended to a file.
    File,
}

/// Audit sink configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditConfig {
    /// Sink type.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Log file path when using the file sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::File, Some(path)) => {
                validate_path_string("audit.path", &path.to_string_lossy())
            }
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("file audit sink requires path".to_string()))
            }
            (AuditSinkKind::None | AuditSinkKind::Stderr, Some(_)) => {
                Err(ConfigError::Invalid("audit.path is only valid for the file sink".to_string()))
            }
            (AuditSinkKind::None | AuditSinkKind::Stderr, None) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Wall clock configuration.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ClockConfig {
    /// Offset from UTC applied to date and time-of-day checks.
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl ClockConfig {
    /// Validates clock configuration.
    fn validate(self) -> Result<(), ConfigError> {
        self.offset().map(|_| ())
    }

    /// Returns the configured UTC offset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the offset exceeds 18 hours either way.
    pub fn offset(self) -> Result<UtcOffset, ConfigError> {
        let out_of_range = || {
            ConfigError::Invalid(format!(
                "clock.utc_offset_minutes must be within +/-{MAX_UTC_OFFSET_MINUTES}"
            ))
        };
        if self.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(out_of_range());
        }
        let seconds = self.utc_offset_minutes.checked_mul(60).ok_or_else(out_of_range)?;
        UtcOffset::from_whole_seconds(seconds).map_err(|_| out_of_range())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration or opening resources.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the argument or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    if path.to_string_lossy().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a bundle base name; it becomes part of a file name.
fn validate_base_name(base_name: &str) -> Result<(), ConfigError> {
    if base_name.trim().is_empty() {
        return Err(ConfigError::Invalid("localization.base_name must be non-empty".to_string()));
    }
    if base_name.trim() != base_name {
        return Err(ConfigError::Invalid("localization.base_name must be trimmed".to_string()));
    }
    if base_name.len() > MAX_PATH_COMPONENT_LENGTH {
        return Err(ConfigError::Invalid("localization.base_name exceeds max length".to_string()));
    }
    if base_name.contains(['/', '\\']) || base_name.contains("..") {
        return Err(ConfigError::Invalid(
            "localization.base_name must not contain path separators".to_string(),
        ));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
