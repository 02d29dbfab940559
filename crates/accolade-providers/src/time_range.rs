// crates/accolade-providers/src/time_range.rs
// ============================================================================
// Module: Time Range Unlock Provider
// Description: Unlocks inside time-of-day windows.
// Purpose: Check the clock's current time against ordered windows.
// Dependencies: accolade-core
// ============================================================================

//! ## Overview
//! Windows are checked in declaration order and the first match wins. A
//! window whose start is at or after its end wraps past midnight; see
//! [`accolade_core::TimeRange::contains`].

use accolade_core::Achievement;
use accolade_core::AchievementTrigger;
use accolade_core::AchievementType;
use accolade_core::ProviderError;

use crate::provider::ProviderContext;
use crate::provider::Satisfaction;
use crate::provider::UnlockProvider;
use crate::time_of_day::clock_label;

/// Time-window provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeRangeProvider;

impl UnlockProvider for TimeRangeProvider {
    fn kind(&self) -> AchievementType {
        AchievementType::TimeRange
    }

    fn satisfied(
        &self,
        achievement: &Achievement,
        _value: u64,
        ctx: &ProviderContext<'_>,
    ) -> Result<Option<Satisfaction>, ProviderError> {
        let AchievementTrigger::TimeRange(ranges) = &achievement.trigger else {
            return Ok(None);
        };
        let now = ctx.clock.now().time();
        Ok(ranges
            .iter()
            .find(|range| range.contains(now))
            .map(|_| Satisfaction::first(Some(clock_label(now)))))
    }
}
