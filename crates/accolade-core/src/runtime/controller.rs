// crates/accolade-core/src/runtime/controller.rs
// ============================================================================
// Module: Accolade Controller
// Description: Trigger orchestration, idempotent unlocking, and publication.
// Purpose: Drive every score mutation and unlock transition of the engine.
// Dependencies: crate::core, crate::interfaces, crate::runtime, thiserror
// ============================================================================

//! ## Overview
//! [`AchievementController`] is the single writer of engine state. A trigger
//! mutates the score store, publishes the new score, asks the unlock finder
//! which achievements listening to the event are satisfied, and records each
//! result through [`UnlockStore::unlock`]. Only results the store accepts are
//! published, so a level is announced at most once even when two triggers
//! race.
//!
//! Per achievement the controller walks `LOCKED (0) -> UNLOCKED(1..=max)`.
//! Levels never decrease except through [`AchievementController::reset`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use thiserror::Error;

use crate::core::Achievement;
use crate::core::AchievementId;
use crate::core::AchievementType;
use crate::core::EventName;
use crate::core::FindRequest;
use crate::core::OwnerId;
use crate::core::ScoreChangedEvent;
use crate::core::TriggerOutcome;
use crate::core::TriggerRequest;
use crate::core::UnlockRecord;
use crate::core::UnlockedEvent;
use crate::interfaces::AchievementTriggers;
use crate::interfaces::BundleSource;
use crate::interfaces::Catalog;
use crate::interfaces::LocalizationError;
use crate::interfaces::ProviderError;
use crate::interfaces::ScoreStore;
use crate::interfaces::StoreError;
use crate::interfaces::UnlockFinder;
use crate::interfaces::UnlockStore;
use crate::runtime::audit::EngineAuditEvent;
use crate::runtime::audit::EngineAuditKind;
use crate::runtime::audit::EngineAuditSink;
use crate::runtime::audit::NoopAuditSink;
use crate::runtime::bundle::Locale;
use crate::runtime::bundle::MessageBundle;
use crate::runtime::bus::EventBus;
use crate::runtime::events::UnlockedEventFactory;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Controller errors.
///
/// # Invariants
/// - Store and provider failures are wrapped unchanged.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Score or unlock store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Unlock finder failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// Bundle loading failed.
    #[error(transparent)]
    Localization(#[from] LocalizationError),
    /// No catalog entry has the identifier.
    #[error("unknown achievement: {0}")]
    UnknownAchievement(String),
}

// ============================================================================
// SECTION: Controller
// ============================================================================

/// Active localization settings.
#[derive(Debug, Default)]
struct LocalizationState {
    /// Bundle base name, when localization is enabled.
    base_name: Option<String>,
    /// Active locale.
    locale: Locale,
}

/// Achievement engine controller.
pub struct AchievementController<F, C, S, U> {
    /// Decides which achievements are unlockable.
    finder: F,
    /// Achievement catalog.
    catalog: C,
    /// Score counters.
    scores: S,
    /// Unlock records.
    unlocks: U,
    /// Builds notification payloads.
    factory: Arc<UnlockedEventFactory>,
    /// Notification subscribers.
    bus: Arc<EventBus>,
    /// Audit destination.
    audit: Arc<dyn EngineAuditSink>,
    /// Message bundle loader.
    bundles: Option<Arc<dyn BundleSource>>,
    /// Base name and locale.
    localization: Mutex<LocalizationState>,
}

impl<F, C, S, U> AchievementController<F, C, S, U>
where
    F: UnlockFinder,
    C: Catalog,
    S: ScoreStore,
    U: UnlockStore,
{
    /// Creates a controller with a private bus and no audit output.
    ///
    /// `factory` must be the same instance the finder uses so localized
    /// text stays consistent across both unlock paths.
    #[must_use]
    pub fn new(finder: F, catalog: C, scores: S, unlocks: U, factory: Arc<UnlockedEventFactory>) -> Self {
        Self {
            finder,
            catalog,
            scores,
            unlocks,
            factory,
            bus: Arc::new(EventBus::new()),
            audit: Arc::new(NoopAuditSink),
            bundles: None,
            localization: Mutex::new(LocalizationState::default()),
        }
    }

    /// Uses a shared event bus.
    #[must_use]
    pub fn with_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.bus = bus;
        self
    }

    /// Uses an audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn EngineAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Uses a message bundle source.
    #[must_use]
    pub fn with_bundle_source(mut self, bundles: Arc<dyn BundleSource>) -> Self {
        self.bundles = Some(bundles);
        self
    }

    /// Returns the event bus.
    #[must_use]
    pub const fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Returns the catalog.
    #[must_use]
    pub const fn catalog(&self) -> &C {
        &self.catalog
    }

    // ------------------------------------------------------------------------
    // Triggers
    // ------------------------------------------------------------------------

    /// Processes one trigger.
    ///
    /// Without an explicit score the counter is incremented; with one it is
    /// set. The score change is always published, before any unlock.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError`] when a store or provider fails.
    pub fn trigger_event(&self, request: TriggerRequest) -> Result<TriggerOutcome, ControllerError> {
        let TriggerRequest {
            event,
            score,
            owners,
        } = request;
        let value = match score {
            Some(score) => self.scores.set_score(&event, score)?,
            None => self.scores.increment(&event)?,
        };
        self.complete_trigger(event, value, owners)
    }

    /// Processes a trigger only when `score` beats the stored score.
    ///
    /// Returns `None`, without publishing anything, when the stored score is
    /// greater than or equal to `score`.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError`] when a store or provider fails.
    pub fn trigger_event_with_high_score(
        &self,
        event: impl Into<EventName>,
        score: u64,
        owners: BTreeSet<OwnerId>,
    ) -> Result<Option<TriggerOutcome>, ControllerError> {
        let event = event.into();
        match self.scores.set_high_score(&event, score)? {
            Some(value) => self.complete_trigger(event, value, owners).map(Some),
            None => Ok(None),
        }
    }

    /// Unlocks the next locked level of an achievement directly.
    ///
    /// Returns `None` when every level is already unlocked or a concurrent
    /// caller recorded the same level first.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::UnknownAchievement`] for an unknown id, or
    /// a store error.
    pub fn unlock(
        &self,
        id: &AchievementId,
        trigger_value: Option<String>,
        owners: BTreeSet<OwnerId>,
    ) -> Result<Option<UnlockedEvent>, ControllerError> {
        let achievement =
            self.catalog.get(id).ok_or_else(|| ControllerError::UnknownAchievement(id.to_string()))?;
        let current = self.unlocks.level_of(id)?;
        if current >= achievement.max_level {
            return Ok(None);
        }
        let event = self.factory.create_event(achievement, current + 1, trigger_value, owners);
        Ok(self.record(event)?)
    }

    /// Reconciles the whole catalog and unlocks everything satisfied.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError`] when a store or provider fails.
    pub fn check_and_unlock(&self) -> Result<Vec<UnlockedEvent>, ControllerError> {
        let found = self.finder.find_all()?;
        self.record_all(found)
    }

    /// Clears every unlock record and score counter.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Store`] when either store fails.
    pub fn reset(&self) -> Result<(), ControllerError> {
        self.unlocks.delete_all()?;
        self.scores.delete_all()?;
        self.audit.record(&EngineAuditEvent::new(EngineAuditKind::Reset));
        Ok(())
    }

    /// Publishes the new score and records what it unlocks.
    fn complete_trigger(
        &self,
        event: EventName,
        value: u64,
        owners: BTreeSet<OwnerId>,
    ) -> Result<TriggerOutcome, ControllerError> {
        let score = ScoreChangedEvent {
            event,
            value,
        };
        self.audit.record(&EngineAuditEvent::new(EngineAuditKind::ScoreChanged {
            name: score.event.clone(),
            value,
        }));
        self.bus.publish_score_changed(&score);
        let request = FindRequest {
            event: score.event.clone(),
            score: Some(value),
            owners,
        };
        let found = self.finder.find_unlockables(&request)?;
        let unlocked = self.record_all(found)?;
        Ok(TriggerOutcome {
            score,
            unlocked,
        })
    }

    /// Records every candidate the store accepts.
    fn record_all(&self, found: Vec<UnlockedEvent>) -> Result<Vec<UnlockedEvent>, ControllerError> {
        let mut unlocked = Vec::with_capacity(found.len());
        for event in found {
            if let Some(event) = self.record(event)? {
                unlocked.push(event);
            }
        }
        Ok(unlocked)
    }

    /// Records one unlock and publishes it when the level is new.
    fn record(&self, event: UnlockedEvent) -> Result<Option<UnlockedEvent>, StoreError> {
        if !self.unlocks.unlock(&event.id, event.level, &event.owners)? {
            return Ok(None);
        }
        self.audit.record(&EngineAuditEvent::new(EngineAuditKind::AchievementUnlocked {
            id: event.id.clone(),
            level: event.level,
            owners: event.owners.iter().cloned().collect(),
        }));
        self.bus.publish_unlocked(&event);
        Ok(Some(event))
    }

    // ------------------------------------------------------------------------
    // Localization
    // ------------------------------------------------------------------------

    /// Enables localized titles by loading `base_name` for the active locale.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Localization`] when no bundle source is
    /// configured or the bundle is missing. The previous bundle stays active.
    pub fn set_internationalization_base_name(
        &self,
        base_name: impl Into<String>,
    ) -> Result<(), ControllerError> {
        let base_name = base_name.into();
        let mut state = self.localization.lock().unwrap_or_else(PoisonError::into_inner);
        self.load_bundle(&base_name, &state.locale)?;
        state.base_name = Some(base_name);
        Ok(())
    }

    /// Switches the locale, reloading the bundle when one is configured.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Localization`] when the bundle for the new
    /// locale is missing. The previous locale stays active.
    pub fn set_locale(&self, locale: Locale) -> Result<(), ControllerError> {
        let mut state = self.localization.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(base_name) = &state.base_name {
            self.load_bundle(base_name, &locale)?;
        }
        self.audit.record(&EngineAuditEvent::new(EngineAuditKind::LocaleChanged {
            locale: locale.to_string(),
        }));
        state.locale = locale;
        Ok(())
    }

    /// Returns the active locale.
    #[must_use]
    pub fn locale(&self) -> Locale {
        self.localization.lock().unwrap_or_else(PoisonError::into_inner).locale.clone()
    }

    /// Returns the active message bundle.
    #[must_use]
    pub fn resource_bundle(&self) -> Option<Arc<MessageBundle>> {
        self.factory.bundle()
    }

    /// Loads a bundle and hands it to the event factory.
    fn load_bundle(&self, base_name: &str, locale: &Locale) -> Result<(), LocalizationError> {
        let source = self.bundles.as_ref().ok_or_else(|| LocalizationError::MissingBundle {
            base_name: base_name.to_string(),
            locale: locale.to_string(),
        })?;
        let bundle = source.load(base_name, locale)?;
        self.factory.set_bundle(Some(bundle));
        self.audit.record(&EngineAuditEvent::new(EngineAuditKind::BundleLoaded {
            base_name: base_name.to_string(),
            locale: locale.to_string(),
        }));
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Returns the achievement with the given identifier.
    #[must_use]
    pub fn get(&self, id: &AchievementId) -> Option<&Achievement> {
        self.catalog.get(id)
    }

    /// Returns the achievement when it has the given type.
    #[must_use]
    pub fn get_by_type(&self, kind: AchievementType, id: &AchievementId) -> Option<&Achievement> {
        self.catalog.get_by_type(kind, id)
    }

    /// Returns every achievement in declaration order.
    #[must_use]
    pub fn all(&self) -> &[Achievement] {
        self.catalog.all()
    }

    /// Groups achievements by trigger event.
    #[must_use]
    pub fn all_by_events(&self) -> BTreeMap<EventName, Vec<&Achievement>> {
        self.catalog.all_by_events()
    }

    /// Returns every unlock record.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Store`] when reading fails.
    pub fn all_unlocked(&self) -> Result<Vec<UnlockRecord>, ControllerError> {
        Ok(self.unlocks.all()?)
    }

    /// Returns the unlock records crediting `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Store`] when reading fails.
    pub fn all_by_owner(&self, owner: &OwnerId) -> Result<Vec<UnlockRecord>, ControllerError> {
        Ok(self.unlocks.all_by_owner(owner)?)
    }

    /// Returns true when any level is unlocked.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Store`] when reading fails.
    pub fn is_unlocked(&self, id: &AchievementId) -> Result<bool, ControllerError> {
        Ok(self.unlocks.is_unlocked(id)?)
    }

    /// Returns true when `level` or higher is unlocked.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Store`] when reading fails.
    pub fn is_unlocked_at(&self, id: &AchievementId, level: u32) -> Result<bool, ControllerError> {
        Ok(self.unlocks.is_unlocked_at(id, level)?)
    }

    /// Returns the stored score for `event`.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Store`] when reading fails.
    pub fn current_score(&self, event: &EventName) -> Result<u64, ControllerError> {
        Ok(self.scores.score_of(event)?)
    }
}

impl<F, C, S, U> AchievementTriggers for AchievementController<F, C, S, U>
where
    F: UnlockFinder,
    C: Catalog,
    S: ScoreStore,
    U: UnlockStore,
{
    type Error = ControllerError;

    fn trigger_event(&self, request: TriggerRequest) -> Result<TriggerOutcome, Self::Error> {
        Self::trigger_event(self, request)
    }

    fn unlock(
        &self,
        id: &AchievementId,
        trigger_value: Option<String>,
        owners: BTreeSet<OwnerId>,
    ) -> Result<Option<UnlockedEvent>, Self::Error> {
        Self::unlock(self, id, trigger_value, owners)
    }

    fn check_all(&self) -> Result<Vec<UnlockedEvent>, Self::Error> {
        self.check_and_unlock()
    }
}
