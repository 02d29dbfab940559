// crates/accolade-providers/src/time_of_day.rs
// ============================================================================
// Module: Time Unlock Provider
// Description: Unlocks once a time of day has passed.
// Purpose: Compare the clock's current time against one configured instant.
// Dependencies: accolade-core, time
// ============================================================================

//! ## Overview
//! The condition holds from the configured time until midnight, every day.
//! The reported trigger value is the current time as `HH:MM`.

use accolade_core::Achievement;
use accolade_core::AchievementTrigger;
use accolade_core::AchievementType;
use accolade_core::ProviderError;
use time::Time;

use crate::provider::ProviderContext;
use crate::provider::Satisfaction;
use crate::provider::UnlockProvider;

/// Time-of-day provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeProvider;

impl UnlockProvider for TimeProvider {
    fn kind(&self) -> AchievementType {
        AchievementType::Time
    }

    fn satisfied(
        &self,
        achievement: &Achievement,
        _value: u64,
        ctx: &ProviderContext<'_>,
    ) -> Result<Option<Satisfaction>, ProviderError> {
        let AchievementTrigger::Time(at) = &achievement.trigger else {
            return Ok(None);
        };
        let now = ctx.clock.now().time();
        Ok((now >= *at).then(|| Satisfaction::first(Some(clock_label(now)))))
    }
}

/// Renders a time as `HH:MM`.
pub(crate) fn clock_label(time: Time) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}
