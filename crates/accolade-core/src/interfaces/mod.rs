// crates/accolade-core/src/interfaces/mod.rs
// ============================================================================
// Module: Accolade Interfaces
// Description: Contracts for catalogs, stores, unlock finders, and bundles.
// Purpose: Define the boundaries between the engine and its collaborators.
// Dependencies: crate::core, crate::runtime::bundle, thiserror
// ============================================================================

//! ## Overview
//! The engine reaches every collaborator through these traits: the
//! achievement catalog, the score and unlock stores, the unlock finder that
//! dispatches achievements to providers, and the message-bundle source used
//! for localized notification text. Store implementations must make
//! `increment`, `set_high_score`, and `unlock` atomic per key so concurrent
//! triggers cannot double-count or double-unlock.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use accolade_relation::RelationError;
use thiserror::Error;

use crate::core::Achievement;
use crate::core::AchievementId;
use crate::core::AchievementType;
use crate::core::EventName;
use crate::core::FindRequest;
use crate::core::OwnerId;
use crate::core::TriggerOutcome;
use crate::core::TriggerRequest;
use crate::core::UnknownAchievementType;
use crate::core::UnlockRecord;
use crate::core::UnlockedEvent;
use crate::runtime::bundle::Locale;
use crate::runtime::bundle::MessageBundle;

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Errors raised while building a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Type label matched no achievement type.
    #[error(transparent)]
    UnknownType(#[from] UnknownAchievementType),
    /// Two achievements share an identifier.
    #[error("duplicate achievement identifier: {0}")]
    DuplicateId(String),
    /// A trigger string or trigger value is invalid.
    #[error("invalid trigger for `{id}`: {message}")]
    InvalidTrigger {
        /// Offending achievement.
        id: String,
        /// Failure description.
        message: String,
    },
    /// A composite relation references an achievement not declared before it.
    #[error("`{id}` depends on unknown achievement `{dependency}`")]
    UnknownDependency {
        /// Composite achievement.
        id: String,
        /// Missing dependency.
        dependency: String,
    },
    /// A composite expression is malformed.
    #[error(transparent)]
    Expression(#[from] RelationError),
    /// Any other invalid definition field.
    #[error("invalid achievement `{id}`: {message}")]
    Invalid {
        /// Offending achievement.
        id: String,
        /// Failure description.
        message: String,
    },
}

/// Read-only achievement catalog.
///
/// Sequences are in declaration order.
pub trait Catalog {
    /// Returns the achievement with the given identifier.
    fn get(&self, id: &AchievementId) -> Option<&Achievement>;

    /// Returns the achievement with the given identifier when it has `kind`.
    fn get_by_type(&self, kind: AchievementType, id: &AchievementId) -> Option<&Achievement> {
        self.get(id).filter(|achievement| achievement.kind() == kind)
    }

    /// Returns every achievement.
    fn all(&self) -> &[Achievement];

    /// Returns the achievements listening to `event`.
    fn by_event(&self, event: &EventName) -> Vec<&Achievement> {
        self.all().iter().filter(|achievement| achievement.listens_to(event)).collect()
    }

    /// Groups achievements by every event they listen to.
    fn all_by_events(&self) -> BTreeMap<EventName, Vec<&Achievement>> {
        let mut grouped: BTreeMap<EventName, Vec<&Achievement>> = BTreeMap::new();
        for achievement in self.all() {
            for event in &achievement.events {
                grouped.entry(event.clone()).or_default().push(achievement);
            }
        }
        grouped
    }
}

impl<T: Catalog + ?Sized> Catalog for Arc<T> {
    fn get(&self, id: &AchievementId) -> Option<&Achievement> {
        self.as_ref().get(id)
    }

    fn get_by_type(&self, kind: AchievementType, id: &AchievementId) -> Option<&Achievement> {
        self.as_ref().get_by_type(kind, id)
    }

    fn all(&self) -> &[Achievement] {
        self.as_ref().all()
    }

    fn by_event(&self, event: &EventName) -> Vec<&Achievement> {
        self.as_ref().by_event(event)
    }

    fn all_by_events(&self) -> BTreeMap<EventName, Vec<&Achievement>> {
        self.as_ref().all_by_events()
    }
}

// ============================================================================
// SECTION: Stores
// ============================================================================

/// Score and unlock store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("achievement store io error: {0}")]
    Io(String),
    /// Stored data is corrupted.
    #[error("achievement store corruption: {0}")]
    Corrupt(String),
    /// Input or stored data is invalid.
    #[error("achievement store invalid data: {0}")]
    Invalid(String),
    /// Store reported an error.
    #[error("achievement store error: {0}")]
    Store(String),
}

/// Per-event score counters.
pub trait ScoreStore {
    /// Returns the stored score, or 0 when the counter does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when reading fails.
    fn score_of(&self, event: &EventName) -> Result<u64, StoreError>;

    /// Increments the counter by one and returns the new value.
    ///
    /// A missing counter starts at 1.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when writing fails.
    fn increment(&self, event: &EventName) -> Result<u64, StoreError>;

    /// Sets the counter and returns the new value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when writing fails.
    fn set_score(&self, event: &EventName, value: u64) -> Result<u64, StoreError>;

    /// Sets the counter only when `value` exceeds the stored score.
    ///
    /// Returns the new value, or `None` when the stored score was already
    /// greater than or equal to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when reading or writing fails.
    fn set_high_score(&self, event: &EventName, value: u64) -> Result<Option<u64>, StoreError>;

    /// Removes every counter.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when writing fails.
    fn delete_all(&self) -> Result<(), StoreError>;
}

impl<T: ScoreStore + ?Sized> ScoreStore for Arc<T> {
    fn score_of(&self, event: &EventName) -> Result<u64, StoreError> {
        self.as_ref().score_of(event)
    }

    fn increment(&self, event: &EventName) -> Result<u64, StoreError> {
        self.as_ref().increment(event)
    }

    fn set_score(&self, event: &EventName, value: u64) -> Result<u64, StoreError> {
        self.as_ref().set_score(event, value)
    }

    fn set_high_score(&self, event: &EventName, value: u64) -> Result<Option<u64>, StoreError> {
        self.as_ref().set_high_score(event, value)
    }

    fn delete_all(&self) -> Result<(), StoreError> {
        self.as_ref().delete_all()
    }
}

/// Per-achievement unlock records.
pub trait UnlockStore {
    /// Returns the highest unlocked level, or 0 when locked.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when reading fails.
    fn level_of(&self, id: &AchievementId) -> Result<u32, StoreError>;

    /// Returns true when any level is unlocked.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when reading fails.
    fn is_unlocked(&self, id: &AchievementId) -> Result<bool, StoreError> {
        Ok(self.level_of(id)? > 0)
    }

    /// Returns true when `level` or a higher level is unlocked.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when reading fails.
    fn is_unlocked_at(&self, id: &AchievementId, level: u32) -> Result<bool, StoreError> {
        Ok(self.level_of(id)? >= level)
    }

    /// Records `level` when it exceeds the stored level.
    ///
    /// The check and the write are one atomic step. Owners are merged into
    /// the record. Returns false, without touching the record, when `level`
    /// is already unlocked.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when reading or writing fails.
    fn unlock(
        &self,
        id: &AchievementId,
        level: u32,
        owners: &BTreeSet<OwnerId>,
    ) -> Result<bool, StoreError>;

    /// Returns the records crediting `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when reading fails.
    fn all_by_owner(&self, owner: &OwnerId) -> Result<Vec<UnlockRecord>, StoreError>;

    /// Returns every record ordered by achievement identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when reading fails.
    fn all(&self) -> Result<Vec<UnlockRecord>, StoreError>;

    /// Removes every record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when writing fails.
    fn delete_all(&self) -> Result<(), StoreError>;
}

impl<T: UnlockStore + ?Sized> UnlockStore for Arc<T> {
    fn level_of(&self, id: &AchievementId) -> Result<u32, StoreError> {
        self.as_ref().level_of(id)
    }

    fn is_unlocked(&self, id: &AchievementId) -> Result<bool, StoreError> {
        self.as_ref().is_unlocked(id)
    }

    fn is_unlocked_at(&self, id: &AchievementId, level: u32) -> Result<bool, StoreError> {
        self.as_ref().is_unlocked_at(id, level)
    }

    fn unlock(
        &self,
        id: &AchievementId,
        level: u32,
        owners: &BTreeSet<OwnerId>,
    ) -> Result<bool, StoreError> {
        self.as_ref().unlock(id, level, owners)
    }

    fn all_by_owner(&self, owner: &OwnerId) -> Result<Vec<UnlockRecord>, StoreError> {
        self.as_ref().all_by_owner(owner)
    }

    fn all(&self) -> Result<Vec<UnlockRecord>, StoreError> {
        self.as_ref().all()
    }

    fn delete_all(&self) -> Result<(), StoreError> {
        self.as_ref().delete_all()
    }
}

// ============================================================================
// SECTION: Unlock Finder
// ============================================================================

/// Unlock provider errors.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Store access failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A relation referenced an achievement missing from the catalog.
    #[error("unknown achievement: {0}")]
    UnknownAchievement(String),
}

/// Decides which achievements are unlockable right now.
///
/// Results never include a level that is already unlocked.
pub trait UnlockFinder {
    /// Sweeps every catalog achievement.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when a provider cannot read state.
    fn find_all(&self) -> Result<Vec<UnlockedEvent>, ProviderError>;

    /// Sweeps the achievements listening to `request.event`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when a provider cannot read state.
    fn find_unlockables(&self, request: &FindRequest) -> Result<Vec<UnlockedEvent>, ProviderError>;

    /// Checks one achievement, comparing against `value` when given.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the achievement is unknown or a provider
    /// cannot read state.
    fn unlockable(
        &self,
        id: &AchievementId,
        value: Option<u64>,
    ) -> Result<Option<UnlockedEvent>, ProviderError>;
}

impl<T: UnlockFinder + ?Sized> UnlockFinder for Arc<T> {
    fn find_all(&self) -> Result<Vec<UnlockedEvent>, ProviderError> {
        self.as_ref().find_all()
    }

    fn find_unlockables(&self, request: &FindRequest) -> Result<Vec<UnlockedEvent>, ProviderError> {
        self.as_ref().find_unlockables(request)
    }

    fn unlockable(
        &self,
        id: &AchievementId,
        value: Option<u64>,
    ) -> Result<Option<UnlockedEvent>, ProviderError> {
        self.as_ref().unlockable(id, value)
    }
}

// ============================================================================
// SECTION: Localization
// ============================================================================

/// Localization errors.
#[derive(Debug, Error)]
pub enum LocalizationError {
    /// No bundle exists for the base name and locale.
    #[error("missing message bundle `{base_name}` for locale `{locale}`")]
    MissingBundle {
        /// Bundle base name.
        base_name: String,
        /// Requested locale.
        locale: String,
    },
    /// The locale tag could not be parsed.
    #[error("invalid locale tag: {0}")]
    InvalidLocale(String),
    /// Bundle contents are invalid.
    #[error("invalid message bundle: {0}")]
    Invalid(String),
    /// Bundle could not be read.
    #[error("message bundle io error: {0}")]
    Io(String),
}

/// Loads message bundles by base name and locale.
pub trait BundleSource: Send + Sync {
    /// Loads the most specific bundle for `locale`.
    ///
    /// # Errors
    ///
    /// Returns [`LocalizationError::MissingBundle`] when no candidate exists.
    fn load(&self, base_name: &str, locale: &Locale) -> Result<MessageBundle, LocalizationError>;
}

impl<T: BundleSource + ?Sized> BundleSource for Arc<T> {
    fn load(&self, base_name: &str, locale: &Locale) -> Result<MessageBundle, LocalizationError> {
        self.as_ref().load(base_name, locale)
    }
}

// ============================================================================
// SECTION: Trigger Surface
// ============================================================================

/// Narrow capability for code that feeds triggers into the engine.
///
/// Hosts pass this to collaborators instead of a global controller reference.
pub trait AchievementTriggers {
    /// Error raised by the underlying engine.
    type Error;

    /// Processes one trigger.
    ///
    /// # Errors
    ///
    /// Returns the engine error when the trigger cannot be processed.
    fn trigger_event(&self, request: TriggerRequest) -> Result<TriggerOutcome, Self::Error>;

    /// Unlocks an achievement directly.
    ///
    /// # Errors
    ///
    /// Returns the engine error when the unlock cannot be recorded.
    fn unlock(
        &self,
        id: &AchievementId,
        trigger_value: Option<String>,
        owners: BTreeSet<OwnerId>,
    ) -> Result<Option<UnlockedEvent>, Self::Error>;

    /// Reconciles the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns the engine error when reconciliation fails.
    fn check_all(&self) -> Result<Vec<UnlockedEvent>, Self::Error>;
}
