// crates/accolade-core/src/runtime/store.rs
// ============================================================================
// Module: Accolade In-Memory Stores
// Description: In-memory score counters and unlock records.
// Purpose: Provide deterministic store implementations without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Both stores keep their state in a `BTreeMap` behind one mutex, which makes
//! every read-modify-write atomic per store. Clones share state, so the
//! controller and the providers can hold the same store.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::core::AchievementId;
use crate::core::EventName;
use crate::core::OwnerId;
use crate::core::UnlockRecord;
use crate::interfaces::ScoreStore;
use crate::interfaces::StoreError;
use crate::interfaces::UnlockStore;

// ============================================================================
// SECTION: Score Store
// ============================================================================

/// In-memory score counters.
#[derive(Debug, Default, Clone)]
pub struct InMemoryScoreStore {
    /// Counters keyed by event name.
    scores: Arc<Mutex<BTreeMap<EventName, u64>>>,
}

impl InMemoryScoreStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the counter map.
    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<EventName, u64>>, StoreError> {
        self.scores.lock().map_err(|_| StoreError::Store("score store mutex poisoned".to_string()))
    }
}

impl ScoreStore for InMemoryScoreStore {
    fn score_of(&self, event: &EventName) -> Result<u64, StoreError> {
        Ok(self.lock()?.get(event).copied().unwrap_or(0))
    }

    fn increment(&self, event: &EventName) -> Result<u64, StoreError> {
        let mut guard = self.lock()?;
        let slot = guard.entry(event.clone()).or_insert(0);
        *slot = slot
            .checked_add(1)
            .ok_or_else(|| StoreError::Invalid(format!("score overflow for {event}")))?;
        Ok(*slot)
    }

    fn set_score(&self, event: &EventName, value: u64) -> Result<u64, StoreError> {
        self.lock()?.insert(event.clone(), value);
        Ok(value)
    }

    fn set_high_score(&self, event: &EventName, value: u64) -> Result<Option<u64>, StoreError> {
        let mut guard = self.lock()?;
        if value <= guard.get(event).copied().unwrap_or(0) {
            return Ok(None);
        }
        guard.insert(event.clone(), value);
        Ok(Some(value))
    }

    fn delete_all(&self) -> Result<(), StoreError> {
        self.lock()?.clear();
        Ok(())
    }
}

// ============================================================================
// SECTION: Unlock Store
// ============================================================================

/// Stored level and owners for one achievement.
#[derive(Debug, Clone, Default)]
struct UnlockEntry {
    /// Highest unlocked level.
    level: u32,
    /// Credited owners.
    owners: BTreeSet<OwnerId>,
}

/// In-memory unlock records.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUnlockStore {
    /// Records keyed by achievement identifier.
    unlocks: Arc<Mutex<BTreeMap<AchievementId, UnlockEntry>>>,
}

impl InMemoryUnlockStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the record map.
    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<AchievementId, UnlockEntry>>, StoreError> {
        self.unlocks.lock().map_err(|_| StoreError::Store("unlock store mutex poisoned".to_string()))
    }
}

/// Converts a map entry into a public record.
fn to_record(id: &AchievementId, entry: &UnlockEntry) -> UnlockRecord {
    UnlockRecord {
        id: id.clone(),
        level: entry.level,
        owners: entry.owners.clone(),
    }
}

impl UnlockStore for InMemoryUnlockStore {
    fn level_of(&self, id: &AchievementId) -> Result<u32, StoreError> {
        Ok(self.lock()?.get(id).map_or(0, |entry| entry.level))
    }

    fn unlock(
        &self,
        id: &AchievementId,
        level: u32,
        owners: &BTreeSet<OwnerId>,
    ) -> Result<bool, StoreError> {
        if level == 0 {
            return Err(StoreError::Invalid(format!("unlock level must be positive for {id}")));
        }
        let mut guard = self.lock()?;
        let entry = guard.entry(id.clone()).or_default();
        if entry.level >= level {
            return Ok(false);
        }
        entry.level = level;
        entry.owners.extend(owners.iter().cloned());
        Ok(true)
    }

    fn all_by_owner(&self, owner: &OwnerId) -> Result<Vec<UnlockRecord>, StoreError> {
        Ok(self
            .lock()?
            .iter()
            .filter(|(_, entry)| entry.owners.contains(owner))
            .map(|(id, entry)| to_record(id, entry))
            .collect())
    }

    fn all(&self) -> Result<Vec<UnlockRecord>, StoreError> {
        Ok(self.lock()?.iter().map(|(id, entry)| to_record(id, entry)).collect())
    }

    fn delete_all(&self) -> Result<(), StoreError> {
        self.lock()?.clear();
        Ok(())
    }
}
