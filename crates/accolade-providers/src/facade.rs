// crates/accolade-providers/src/facade.rs
// ============================================================================
// Module: Unlock Facade
// Description: Routes achievements to their provider and sweeps the catalog.
// Purpose: Implement the engine's unlock finder and satisfaction view.
// Dependencies: accolade-core, accolade-relation
// ============================================================================

//! ## Overview
//! [`ProviderSet`] is the only place that maps an [`AchievementType`] to its
//! provider; the mapping is an exhaustive `match`, so adding a type without a
//! provider does not compile.
//!
//! [`UnlockFacade`] resolves the comparison value for each achievement (the
//! explicit score when given, otherwise the highest stored score among the
//! achievement's events) and asks the provider for a notification. It also
//! answers composite leaf queries: a dependency is satisfied when it is
//! already unlocked or its own condition holds at the leaf's value.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;

use accolade_core::Achievement;
use accolade_core::AchievementId;
use accolade_core::AchievementType;
use accolade_core::Catalog;
use accolade_core::Clock;
use accolade_core::FindRequest;
use accolade_core::OwnerId;
use accolade_core::ProviderError;
use accolade_core::ScoreStore;
use accolade_core::UnlockFinder;
use accolade_core::UnlockStore;
use accolade_core::UnlockedEvent;
use accolade_core::UnlockedEventFactory;
use accolade_relation::SatisfactionView;

use crate::composite::CompositeProvider;
use crate::date::DateProvider;
use crate::provider::ProviderContext;
use crate::provider::UnlockProvider;
use crate::score::ScoreProvider;
use crate::score_range::ScoreRangeProvider;
use crate::single::SingleProvider;
use crate::time_of_day::TimeProvider;
use crate::time_range::TimeRangeProvider;

// ============================================================================
// SECTION: Provider Set
// ============================================================================

/// One provider per achievement type.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProviderSet {
    /// Date provider.
    date: DateProvider,
    /// Time provider.
    time: TimeProvider,
    /// Time range provider.
    time_range: TimeRangeProvider,
    /// Single provider.
    single: SingleProvider,
    /// Score provider.
    score: ScoreProvider,
    /// Score range provider.
    score_range: ScoreRangeProvider,
    /// Composite provider.
    composite: CompositeProvider,
}

impl ProviderSet {
    /// Returns the provider for `kind`.
    #[must_use]
    pub fn get(&self, kind: AchievementType) -> &dyn UnlockProvider {
        match kind {
            AchievementType::Date => &self.date,
            AchievementType::Time => &self.time,
            AchievementType::TimeRange => &self.time_range,
            AchievementType::Single => &self.single,
            AchievementType::Score => &self.score,
            AchievementType::ScoreRange => &self.score_range,
            AchievementType::Composite => &self.composite,
        }
    }
}

// ============================================================================
// SECTION: Facade
// ============================================================================

/// Unlock finder dispatching to per-type providers.
///
/// # Invariants
/// - Results follow catalog declaration order.
/// - Results never include a level already unlocked.
pub struct UnlockFacade<C, S, U> {
    /// Achievement catalog.
    catalog: C,
    /// Score counters.
    scores: S,
    /// Unlock records.
    unlocks: U,
    /// Date and time source.
    clock: Arc<dyn Clock>,
    /// Builds notification payloads.
    factory: Arc<UnlockedEventFactory>,
    /// Per-type providers.
    providers: ProviderSet,
}

impl<C, S, U> UnlockFacade<C, S, U>
where
    C: Catalog,
    S: ScoreStore,
    U: UnlockStore,
{
    /// Creates a facade over shared catalog and stores.
    #[must_use]
    pub fn new(
        catalog: C,
        scores: S,
        unlocks: U,
        clock: Arc<dyn Clock>,
        factory: Arc<UnlockedEventFactory>,
    ) -> Self {
        Self {
            catalog,
            scores,
            unlocks,
            clock,
            factory,
            providers: ProviderSet::default(),
        }
    }

    /// Returns the event factory.
    #[must_use]
    pub const fn factory(&self) -> &Arc<UnlockedEventFactory> {
        &self.factory
    }

    /// Returns the value compared for `achievement`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Store`] when a stored score cannot be read.
    pub fn resolve_value(&self, achievement: &Achievement, value: Option<u64>) -> Result<u64, ProviderError> {
        if let Some(value) = value {
            return Ok(value);
        }
        let mut best = 0;
        for event in &achievement.events {
            best = best.max(self.scores.score_of(event)?);
        }
        Ok(best)
    }

    /// Builds the provider context for one request.
    fn context<'a>(&'a self, owners: &'a BTreeSet<OwnerId>) -> ProviderContext<'a> {
        ProviderContext {
            unlocks: &self.unlocks,
            clock: self.clock.as_ref(),
            factory: &self.factory,
            view: self,
            owners,
        }
    }

    /// Runs one achievement through its provider.
    fn check(
        &self,
        achievement: &Achievement,
        value: Option<u64>,
        owners: &BTreeSet<OwnerId>,
    ) -> Result<Option<UnlockedEvent>, ProviderError> {
        let value = self.resolve_value(achievement, value)?;
        self.providers.get(achievement.kind()).unlockable(achievement, value, &self.context(owners))
    }

    /// Looks up a catalog entry.
    fn achievement(&self, id: &AchievementId) -> Result<&Achievement, ProviderError> {
        self.catalog.get(id).ok_or_else(|| ProviderError::UnknownAchievement(id.to_string()))
    }
}

impl<C, S, U> UnlockFinder for UnlockFacade<C, S, U>
where
    C: Catalog,
    S: ScoreStore,
    U: UnlockStore,
{
    fn find_all(&self) -> Result<Vec<UnlockedEvent>, ProviderError> {
        let owners = BTreeSet::new();
        let mut found = Vec::new();
        for achievement in self.catalog.all() {
            found.extend(self.check(achievement, None, &owners)?);
        }
        Ok(found)
    }

    fn find_unlockables(&self, request: &FindRequest) -> Result<Vec<UnlockedEvent>, ProviderError> {
        let mut found = Vec::new();
        for achievement in self.catalog.by_event(&request.event) {
            found.extend(self.check(achievement, request.score, &request.owners)?);
        }
        Ok(found)
    }

    fn unlockable(
        &self,
        id: &AchievementId,
        value: Option<u64>,
    ) -> Result<Option<UnlockedEvent>, ProviderError> {
        let achievement = self.achievement(id)?;
        self.check(achievement, value, &BTreeSet::new())
    }
}

impl<C, S, U> SatisfactionView<AchievementId> for UnlockFacade<C, S, U>
where
    C: Catalog,
    S: ScoreStore,
    U: UnlockStore,
{
    type Error = ProviderError;

    fn is_satisfied(&self, target: &AchievementId, value: Option<u64>) -> Result<bool, ProviderError> {
        let achievement = self.achievement(target)?;
        if self.unlocks.is_unlocked(target)? {
            return Ok(true);
        }
        let value = self.resolve_value(achievement, value)?;
        let owners = BTreeSet::new();
        let satisfied =
            self.providers.get(achievement.kind()).satisfied(achievement, value, &self.context(&owners))?;
        Ok(satisfied.is_some())
    }
}
