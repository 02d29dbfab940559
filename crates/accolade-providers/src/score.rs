// crates/accolade-providers/src/score.rs
// ============================================================================
// Module: Score Unlock Provider
// Description: Unlocks levels at ascending score thresholds.
// Purpose: Map a score onto the highest threshold it reaches.
// Dependencies: accolade-core
// ============================================================================

//! ## Overview
//! Thresholds are strictly ascending, one per level. The satisfied level is
//! the number of thresholds at or below the value, so a single large jump
//! may skip intermediate levels.

use accolade_core::Achievement;
use accolade_core::AchievementTrigger;
use accolade_core::AchievementType;
use accolade_core::ProviderError;

use crate::provider::ProviderContext;
use crate::provider::Satisfaction;
use crate::provider::UnlockProvider;

/// Score threshold provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreProvider;

impl UnlockProvider for ScoreProvider {
    fn kind(&self) -> AchievementType {
        AchievementType::Score
    }

    fn satisfied(
        &self,
        achievement: &Achievement,
        value: u64,
        _ctx: &ProviderContext<'_>,
    ) -> Result<Option<Satisfaction>, ProviderError> {
        let AchievementTrigger::Score(thresholds) = &achievement.trigger else {
            return Ok(None);
        };
        let reached = thresholds.partition_point(|threshold| *threshold <= value);
        Ok(u32::try_from(reached).ok().filter(|level| *level > 0).map(|level| Satisfaction {
            level,
            trigger_value: Some(value.to_string()),
        }))
    }
}
