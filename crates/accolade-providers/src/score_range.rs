// crates/accolade-providers/src/score_range.rs
// ============================================================================
// Module: Score Range Unlock Provider
// Description: Unlocks levels for scores inside inclusive ranges.
// Purpose: Map a score onto the first range that contains it.
// Dependencies: accolade-core
// ============================================================================

//! ## Overview
//! Range `i` (zero-based, declaration order) satisfies level `i + 1`.

use accolade_core::Achievement;
use accolade_core::AchievementTrigger;
use accolade_core::AchievementType;
use accolade_core::ProviderError;

use crate::provider::ProviderContext;
use crate::provider::Satisfaction;
use crate::provider::UnlockProvider;

/// Score range provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreRangeProvider;

impl UnlockProvider for ScoreRangeProvider {
    fn kind(&self) -> AchievementType {
        AchievementType::ScoreRange
    }

    fn satisfied(
        &self,
        achievement: &Achievement,
        value: u64,
        _ctx: &ProviderContext<'_>,
    ) -> Result<Option<Satisfaction>, ProviderError> {
        let AchievementTrigger::ScoreRange(ranges) = &achievement.trigger else {
            return Ok(None);
        };
        Ok(ranges
            .iter()
            .position(|range| range.contains(value))
            .and_then(|index| u32::try_from(index + 1).ok())
            .map(|level| Satisfaction {
                level,
                trigger_value: Some(value.to_string()),
            }))
    }
}
