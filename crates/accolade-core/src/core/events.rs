// crates/accolade-core/src/core/events.rs
// ============================================================================
// Module: Accolade Notifications and Requests
// Description: Unlock and score notifications plus trigger request payloads.
// Purpose: Define the values that flow between controller, providers, and bus.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Notifications are created per unlock or score change and handed to the
//! event bus; the engine does not retain them. Requests describe one inbound
//! trigger and results report what the trigger changed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::AchievementId;
use crate::core::identifiers::EventName;
use crate::core::identifiers::OwnerId;

// ============================================================================
// SECTION: Notifications
// ============================================================================

/// Kind tag carried by unlock notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AchievementEventType {
    /// An achievement reached a new level.
    Unlock,
}

/// Notification published when an achievement reaches a level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockedEvent {
    /// Unlocked achievement.
    pub id: AchievementId,
    /// Localized title, or the title key when no bundle resolves it.
    pub title: String,
    /// Localized description, or the text key when no bundle resolves it.
    pub text: String,
    /// Level reached.
    pub level: u32,
    /// Achievement category.
    pub category: String,
    /// Value that triggered the unlock, if any.
    pub trigger_value: Option<String>,
    /// Notification kind.
    pub event_type: AchievementEventType,
    /// Owners credited with the unlock.
    pub owners: BTreeSet<OwnerId>,
}

/// Notification published whenever a score counter changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreChangedEvent {
    /// Event name keying the counter.
    pub event: EventName,
    /// New counter value.
    pub value: u64,
}

// ============================================================================
// SECTION: Requests and Results
// ============================================================================

/// Inbound trigger for the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRequest {
    /// Event name.
    pub event: EventName,
    /// Explicit score; `None` increments the stored counter.
    #[serde(default)]
    pub score: Option<u64>,
    /// Owners credited with any resulting unlock.
    #[serde(default)]
    pub owners: BTreeSet<OwnerId>,
}

impl TriggerRequest {
    /// Creates a request that increments the counter for `event`.
    #[must_use]
    pub fn new(event: impl Into<EventName>) -> Self {
        Self {
            event: event.into(),
            score: None,
            owners: BTreeSet::new(),
        }
    }

    /// Sets an explicit score.
    #[must_use]
    pub const fn with_score(mut self, score: u64) -> Self {
        self.score = Some(score);
        self
    }

    /// Adds an owner.
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<OwnerId>) -> Self {
        self.owners.insert(owner.into());
        self
    }
}

/// Query passed to the unlock finder for one trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindRequest {
    /// Event name restricting the sweep.
    pub event: EventName,
    /// Comparison value forced on every matched achievement.
    pub score: Option<u64>,
    /// Owners tagged onto every result.
    pub owners: BTreeSet<OwnerId>,
}

/// Outcome of one processed trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerOutcome {
    /// Score notification published for the trigger.
    pub score: ScoreChangedEvent,
    /// Unlock notifications published for the trigger, in catalog order.
    pub unlocked: Vec<UnlockedEvent>,
}
