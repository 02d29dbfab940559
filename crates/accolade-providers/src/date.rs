// crates/accolade-providers/src/date.rs
// ============================================================================
// Module: Date Unlock Provider
// Description: Unlocks on configured calendar dates.
// Purpose: Compare the clock's current date against a date list.
// Dependencies: accolade-core
// ============================================================================

//! ## Overview
//! Any listed date equal to the clock's current date satisfies level 1. The
//! date is taken in the clock's own offset.

use accolade_core::Achievement;
use accolade_core::AchievementTrigger;
use accolade_core::AchievementType;
use accolade_core::ProviderError;

use crate::provider::ProviderContext;
use crate::provider::Satisfaction;
use crate::provider::UnlockProvider;

/// Calendar date provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateProvider;

impl UnlockProvider for DateProvider {
    fn kind(&self) -> AchievementType {
        AchievementType::Date
    }

    fn satisfied(
        &self,
        achievement: &Achievement,
        _value: u64,
        ctx: &ProviderContext<'_>,
    ) -> Result<Option<Satisfaction>, ProviderError> {
        let AchievementTrigger::Date(dates) = &achievement.trigger else {
            return Ok(None);
        };
        let today = ctx.clock.now().date();
        Ok(dates.contains(&today).then(|| Satisfaction::first(Some(today.to_string()))))
    }
}
