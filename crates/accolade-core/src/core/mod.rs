// crates/accolade-core/src/core/mod.rs
// ============================================================================
// Module: Accolade Core Types
// Description: Domain model for achievements, notifications, and records.
// Purpose: Group the value types shared by every engine component.
// Dependencies: crate::core::{achievement, clock, events, identifiers, records}
// ============================================================================

//! ## Overview
//! Value types only; behavior lives in `runtime` and in the provider crate.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod achievement;
pub mod clock;
pub mod events;
pub mod identifiers;
pub mod records;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use achievement::Achievement;
pub use achievement::AchievementDefinition;
pub use achievement::AchievementTrigger;
pub use achievement::AchievementType;
pub use achievement::DEFAULT_CATEGORY;
pub use achievement::DEFAULT_MAX_LEVEL;
pub use achievement::ScoreRange;
pub use achievement::TimeRange;
pub use achievement::UnknownAchievementType;
pub use clock::Clock;
pub use clock::FixedClock;
pub use clock::SystemClock;
pub use events::AchievementEventType;
pub use events::FindRequest;
pub use events::ScoreChangedEvent;
pub use events::TriggerOutcome;
pub use events::TriggerRequest;
pub use events::UnlockedEvent;
pub use identifiers::AchievementId;
pub use identifiers::EventName;
pub use identifiers::OwnerId;
pub use records::UnlockRecord;
