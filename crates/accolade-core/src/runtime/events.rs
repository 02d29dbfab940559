// crates/accolade-core/src/runtime/events.rs
// ============================================================================
// Module: Unlock Event Factory
// Description: Builds unlock notifications with localized text.
// Purpose: Keep title and description resolution in one swappable place.
// Dependencies: crate::core, crate::runtime::bundle
// ============================================================================

//! ## Overview
//! Providers and the controller build every [`UnlockedEvent`] through one
//! shared [`UnlockedEventFactory`]. Swapping the factory's bundle on a locale
//! change makes every later notification carry the new text. Keys without a
//! message fall back to the key itself.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;

use crate::core::Achievement;
use crate::core::AchievementEventType;
use crate::core::OwnerId;
use crate::core::UnlockedEvent;
use crate::runtime::bundle::MessageBundle;

// ============================================================================
// SECTION: Factory
// ============================================================================

/// Builds unlock notifications from catalog entries.
#[derive(Debug, Default)]
pub struct UnlockedEventFactory {
    /// Active bundle, if localization is configured.
    bundle: RwLock<Option<Arc<MessageBundle>>>,
}

impl UnlockedEventFactory {
    /// Creates a factory without a bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a factory using `bundle`.
    #[must_use]
    pub fn with_bundle(bundle: MessageBundle) -> Self {
        Self {
            bundle: RwLock::new(Some(Arc::new(bundle))),
        }
    }

    /// Replaces the active bundle.
    pub fn set_bundle(&self, bundle: Option<MessageBundle>) {
        *self.bundle.write().unwrap_or_else(PoisonError::into_inner) = bundle.map(Arc::new);
    }

    /// Returns the active bundle.
    #[must_use]
    pub fn bundle(&self) -> Option<Arc<MessageBundle>> {
        self.bundle.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Builds the notification for `achievement` reaching `level`.
    #[must_use]
    pub fn create_event(
        &self,
        achievement: &Achievement,
        level: u32,
        trigger_value: Option<String>,
        owners: BTreeSet<OwnerId>,
    ) -> UnlockedEvent {
        let bundle = self.bundle();
        let resolve = |key: String| {
            bundle.as_deref().and_then(|bundle| bundle.get(&key)).map_or(key, str::to_string)
        };
        UnlockedEvent {
            id: achievement.id.clone(),
            title: resolve(achievement.title_key()),
            text: resolve(achievement.text_key()),
            level,
            category: achievement.category.clone(),
            trigger_value,
            event_type: AchievementEventType::Unlock,
            owners,
        }
    }
}
