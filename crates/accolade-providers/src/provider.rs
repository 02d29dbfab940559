// crates/accolade-providers/src/provider.rs
// ============================================================================
// Module: Unlock Provider Contract
// Description: Per-type unlock strategy trait and its evaluation context.
// Purpose: Give every achievement type one read-only unlock decision.
// Dependencies: accolade-core, accolade-relation
// ============================================================================

//! ## Overview
//! A provider answers two questions about one achievement: which level its
//! condition satisfies right now ([`UnlockProvider::satisfied`]), and whether
//! that level is still locked ([`UnlockProvider::unlockable`]). Providers
//! never write state; the controller records unlocks.
//!
//! Absence is the normal outcome. `Ok(None)` means "not yet", never an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use accolade_core::Achievement;
use accolade_core::AchievementId;
use accolade_core::AchievementType;
use accolade_core::Clock;
use accolade_core::OwnerId;
use accolade_core::ProviderError;
use accolade_core::UnlockStore;
use accolade_core::UnlockedEvent;
use accolade_core::UnlockedEventFactory;
use accolade_relation::SatisfactionView;

// ============================================================================
// SECTION: Context
// ============================================================================

/// Read-only view of engine state handed to providers.
pub struct ProviderContext<'a> {
    /// Unlock records.
    pub unlocks: &'a dyn UnlockStore,
    /// Source of the current date and time.
    pub clock: &'a dyn Clock,
    /// Builds notification payloads.
    pub factory: &'a UnlockedEventFactory,
    /// Answers dependency queries for composite achievements.
    pub view: &'a dyn SatisfactionView<AchievementId, Error = ProviderError>,
    /// Owners credited by the current request.
    pub owners: &'a BTreeSet<OwnerId>,
}

/// Level a condition currently satisfies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Satisfaction {
    /// Level reached, at least 1.
    pub level: u32,
    /// Value reported with the unlock.
    pub trigger_value: Option<String>,
}

impl Satisfaction {
    /// Level 1 with an optional trigger value.
    #[must_use]
    pub const fn first(trigger_value: Option<String>) -> Self {
        Self {
            level: 1,
            trigger_value,
        }
    }
}

// ============================================================================
// SECTION: Provider Trait
// ============================================================================

/// Unlock strategy for one achievement type.
pub trait UnlockProvider: Send + Sync {
    /// Achievement type served by this provider.
    fn kind(&self) -> AchievementType;

    /// Returns the level the condition satisfies at `value`, ignoring unlock
    /// records.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when dependent state cannot be read.
    fn satisfied(
        &self,
        achievement: &Achievement,
        value: u64,
        ctx: &ProviderContext<'_>,
    ) -> Result<Option<Satisfaction>, ProviderError>;

    /// Returns a notification when the satisfied level is still locked.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the unlock store cannot be read.
    fn unlockable(
        &self,
        achievement: &Achievement,
        value: u64,
        ctx: &ProviderContext<'_>,
    ) -> Result<Option<UnlockedEvent>, ProviderError> {
        let Some(satisfaction) = self.satisfied(achievement, value, ctx)? else {
            return Ok(None);
        };
        if ctx.unlocks.is_unlocked_at(&achievement.id, satisfaction.level)? {
            return Ok(None);
        }
        Ok(Some(ctx.factory.create_event(
            achievement,
            satisfaction.level,
            satisfaction.trigger_value,
            ctx.owners.clone(),
        )))
    }
}
