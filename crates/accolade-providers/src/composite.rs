// crates/accolade-providers/src/composite.rs
// ============================================================================
// Module: Composite Unlock Provider
// Description: Unlocks when a relation over other achievements holds.
// Purpose: Evaluate composite rules through the satisfaction view.
// Dependencies: accolade-core
// ============================================================================

//! ## Overview
//! The rule is evaluated against the context's satisfaction view, which may
//! recurse into other composites. Catalog construction keeps relations
//! acyclic, so recursion terminates. No trigger value is reported.

use accolade_core::Achievement;
use accolade_core::AchievementTrigger;
use accolade_core::AchievementType;
use accolade_core::ProviderError;

use crate::provider::ProviderContext;
use crate::provider::Satisfaction;
use crate::provider::UnlockProvider;

/// Relation provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompositeProvider;

impl UnlockProvider for CompositeProvider {
    fn kind(&self) -> AchievementType {
        AchievementType::Composite
    }

    fn satisfied(
        &self,
        achievement: &Achievement,
        _value: u64,
        ctx: &ProviderContext<'_>,
    ) -> Result<Option<Satisfaction>, ProviderError> {
        let AchievementTrigger::Composite(relation) = &achievement.trigger else {
            return Ok(None);
        };
        Ok(relation.evaluate(ctx.view)?.then_some(Satisfaction::first(None)))
    }
}
