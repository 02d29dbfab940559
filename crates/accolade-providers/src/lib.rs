// crates/accolade-providers/src/lib.rs
// ============================================================================
// Module: Accolade Providers
// Description: Per-type unlock providers and the dispatch facade.
// Purpose: Decide which achievements are unlockable for the controller.
// Dependencies: accolade-core, accolade-relation, time
// ============================================================================

//! ## Overview
//! This crate ships one [`UnlockProvider`] per achievement type and the
//! [`UnlockFacade`] that routes each achievement to its provider. The facade
//! implements [`accolade_core::UnlockFinder`] for the controller and
//! [`accolade_relation::SatisfactionView`] for composite rules.
//! Invariants:
//! - Providers are read-only; only the controller records unlocks.
//! - Date and time conditions read the injected [`accolade_core::Clock`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod composite;
pub mod date;
pub mod engine;
pub mod facade;
pub mod provider;
pub mod score;
pub mod score_range;
pub mod single;
pub mod time_of_day;
pub mod time_range;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use composite::CompositeProvider;
pub use date::DateProvider;
pub use engine::Engine;
pub use engine::build_engine;
pub use facade::ProviderSet;
pub use facade::UnlockFacade;
pub use provider::ProviderContext;
pub use provider::Satisfaction;
pub use provider::UnlockProvider;
pub use score::ScoreProvider;
pub use score_range::ScoreRangeProvider;
pub use single::SingleProvider;
pub use time_of_day::TimeProvider;
pub use time_range::TimeRangeProvider;
