// crates/accolade-core/src/runtime/mod.rs
// ============================================================================
// Module: Accolade Runtime
// Description: Controller, event bus, stores, catalog, and localization.
// Purpose: Group the stateful engine components.
// Dependencies: crate::runtime::{audit, bundle, bus, catalog, controller, events, store}
// ============================================================================

//! ## Overview
//! In-memory implementations of the engine contracts plus the controller
//! that ties them together. Durable stores live in `accolade-store-sqlite`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod bundle;
pub mod bus;
pub mod catalog;
pub mod controller;
pub mod events;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::EngineAuditEvent;
pub use audit::EngineAuditKind;
pub use audit::EngineAuditSink;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use bundle::Locale;
pub use bundle::MessageBundle;
pub use bundle::StaticBundleSource;
pub use bus::EventBus;
pub use bus::HandlerWrapper;
pub use bus::ScoreChangedHandler;
pub use bus::UnlockedHandler;
pub use catalog::CatalogBuilder;
pub use catalog::InMemoryCatalog;
pub use catalog::TokenResolution;
pub use controller::AchievementController;
pub use controller::ControllerError;
pub use events::UnlockedEventFactory;
pub use store::InMemoryScoreStore;
pub use store::InMemoryUnlockStore;
