// crates/accolade-providers/src/single.rs
// ============================================================================
// Module: Single Unlock Provider
// Description: Unlocks on the first occurrence of a listened event.
// Purpose: Treat any positive score as satisfied.
// Dependencies: accolade-core
// ============================================================================

//! ## Overview
//! Satisfied once the compared value is at least 1.

use accolade_core::Achievement;
use accolade_core::AchievementType;
use accolade_core::ProviderError;

use crate::provider::ProviderContext;
use crate::provider::Satisfaction;
use crate::provider::UnlockProvider;

/// First-occurrence provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleProvider;

impl UnlockProvider for SingleProvider {
    fn kind(&self) -> AchievementType {
        AchievementType::Single
    }

    fn satisfied(
        &self,
        _achievement: &Achievement,
        value: u64,
        _ctx: &ProviderContext<'_>,
    ) -> Result<Option<Satisfaction>, ProviderError> {
        Ok((value >= 1).then_some(Satisfaction::first(None)))
    }
}
