// crates/accolade-core/src/runtime/audit.rs
// ============================================================================
// Module: Engine Audit Logging
// Description: Structured audit records for controller state changes.
// Purpose: Emit JSON-line audit logs without hard dependencies.
// Dependencies: crate::core, serde, serde_json
// ============================================================================

//! ## Overview
//! The controller reports every state change as an [`EngineAuditEvent`].
//! Sinks serialize events as one JSON object per line. Recording never fails
//! the operation that produced the event.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::AchievementId;
use crate::core::EventName;
use crate::core::OwnerId;

// ============================================================================
// SECTION: Types
// ============================================================================

/// What changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineAuditKind {
    /// A score counter changed.
    ScoreChanged {
        /// Counter key.
        name: EventName,
        /// New value.
        value: u64,
    },
    /// An achievement reached a level.
    AchievementUnlocked {
        /// Achievement identifier.
        id: AchievementId,
        /// Level reached.
        level: u32,
        /// Owners credited.
        owners: Vec<OwnerId>,
    },
    /// All scores and unlocks were cleared.
    Reset,
    /// The active locale changed.
    LocaleChanged {
        /// New locale tag.
        locale: String,
    },
    /// A message bundle was loaded.
    BundleLoaded {
        /// Bundle base name.
        base_name: String,
        /// Locale the bundle was loaded for.
        locale: String,
    },
}

/// Audit record with a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineAuditEvent {
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Event payload.
    #[serde(flatten)]
    pub kind: EngineAuditKind,
}

impl EngineAuditEvent {
    /// Stamps `kind` with the current time.
    #[must_use]
    pub fn new(kind: EngineAuditKind) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            timestamp_ms,
            kind,
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Destination for engine audit events.
pub trait EngineAuditSink: Send + Sync {
    /// Records one event.
    fn record(&self, event: &EngineAuditEvent);
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditSink;

impl EngineAuditSink for NoopAuditSink {
    fn record(&self, _event: &EngineAuditEvent) {}
}

/// Sink that writes JSON lines to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrAuditSink;

impl EngineAuditSink for StderrAuditSink {
    fn record(&self, event: &EngineAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Sink that appends JSON lines to a file.
#[derive(Debug)]
pub struct FileAuditSink {
    /// Append-mode log file.
    file: Mutex<File>,
}

impl FileAuditSink {
    /// Opens `path` for appending, creating it when missing.
    ///
    /// # Errors
    ///
    /// Returns the I/O error when the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl EngineAuditSink for FileAuditSink {
    fn record(&self, event: &EngineAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}
