// crates/accolade-providers/src/engine.rs
// ============================================================================
// Module: Engine Assembly
// Description: Wires a controller to the provider facade.
// Purpose: Build a ready-to-use engine from a catalog, stores, and a clock.
// Dependencies: accolade-core
// ============================================================================

//! ## Overview
//! The controller and the facade share one catalog, one pair of stores, and
//! one event factory. Catalog and store handles are cloned, so they must be
//! cheap shared handles such as `Arc` or the in-memory stores.

use std::sync::Arc;

use accolade_core::AchievementController;
use accolade_core::Catalog;
use accolade_core::Clock;
use accolade_core::ScoreStore;
use accolade_core::UnlockStore;
use accolade_core::UnlockedEventFactory;

use crate::facade::UnlockFacade;

/// Controller driven by the provider facade.
pub type Engine<C, S, U> = AchievementController<UnlockFacade<C, S, U>, C, S, U>;

/// Builds an engine with a private bus and no audit output.
#[must_use]
pub fn build_engine<C, S, U>(catalog: C, scores: S, unlocks: U, clock: Arc<dyn Clock>) -> Engine<C, S, U>
where
    C: Catalog + Clone,
    S: ScoreStore + Clone,
    U: UnlockStore + Clone,
{
    let factory = Arc::new(UnlockedEventFactory::new());
    let facade =
        UnlockFacade::new(catalog.clone(), scores.clone(), unlocks.clone(), clock, Arc::clone(&factory));
    AchievementController::new(facade, catalog, scores, unlocks, factory)
}
