// crates/accolade-core/src/core/records.rs
// ============================================================================
// Module: Unlock Records
// Description: Persisted unlock state per achievement.
// Purpose: Define the record exchanged with unlock stores.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! An unlock record holds the highest level reached and every owner credited
//! so far. Stores only ever raise the level.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::AchievementId;
use crate::core::identifiers::OwnerId;

// ============================================================================
// SECTION: Records
// ============================================================================

/// Stored unlock state for one achievement.
///
/// # Invariants
/// - `level >= 1`; locked achievements have no record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockRecord {
    /// Unlocked achievement.
    pub id: AchievementId,
    /// Highest level reached.
    pub level: u32,
    /// Owners credited across all levels.
    pub owners: BTreeSet<OwnerId>,
}
