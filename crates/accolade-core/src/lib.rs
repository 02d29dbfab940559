// crates/accolade-core/src/lib.rs
// ============================================================================
// Module: Accolade Core
// Description: Achievement model, engine contracts, and controller.
// Purpose: Evaluate and record achievement unlocks from application triggers.
// Dependencies: accolade-relation, serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! Accolade turns a stream of application events into achievement unlocks.
//! Hosts build an [`InMemoryCatalog`], pick score and unlock stores, plug in
//! an [`UnlockFinder`] (normally `accolade_providers::UnlockFacade`), and
//! drive everything through one [`AchievementController`]. Notifications
//! reach subscribers through the controller's [`EventBus`].
//!
//! Security posture: catalog definitions and trigger inputs are untrusted;
//! expression size and nesting are bounded by `accolade-relation`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

#[cfg(test)]
mod tests;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use self::core::Achievement;
pub use self::core::AchievementDefinition;
pub use self::core::AchievementTrigger;
pub use self::core::AchievementType;
pub use self::core::DEFAULT_CATEGORY;
pub use self::core::DEFAULT_MAX_LEVEL;
pub use self::core::ScoreRange;
pub use self::core::TimeRange;
pub use self::core::UnknownAchievementType;
pub use self::core::Clock;
pub use self::core::FixedClock;
pub use self::core::SystemClock;
pub use self::core::AchievementEventType;
pub use self::core::FindRequest;
pub use self::core::ScoreChangedEvent;
pub use self::core::TriggerOutcome;
pub use self::core::TriggerRequest;
pub use self::core::UnlockedEvent;
pub use self::core::AchievementId;
pub use self::core::EventName;
pub use self::core::OwnerId;
pub use self::core::UnlockRecord;
pub use interfaces::AchievementTriggers;
pub use interfaces::BundleSource;
pub use interfaces::Catalog;
pub use interfaces::CatalogError;
pub use interfaces::LocalizationError;
pub use interfaces::ProviderError;
pub use interfaces::ScoreStore;
pub use interfaces::StoreError;
pub use interfaces::UnlockFinder;
pub use interfaces::UnlockStore;
pub use runtime::EngineAuditEvent;
pub use runtime::EngineAuditKind;
pub use runtime::EngineAuditSink;
pub use runtime::FileAuditSink;
pub use runtime::NoopAuditSink;
pub use runtime::StderrAuditSink;
pub use runtime::Locale;
pub use runtime::MessageBundle;
pub use runtime::StaticBundleSource;
pub use runtime::EventBus;
pub use runtime::HandlerWrapper;
pub use runtime::ScoreChangedHandler;
pub use runtime::UnlockedHandler;
pub use runtime::CatalogBuilder;
pub use runtime::InMemoryCatalog;
pub use runtime::TokenResolution;
pub use runtime::AchievementController;
pub use runtime::ControllerError;
pub use runtime::UnlockedEventFactory;
pub use runtime::InMemoryScoreStore;
pub use runtime::InMemoryUnlockStore;
