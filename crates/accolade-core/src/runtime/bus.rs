// crates/accolade-core/src/runtime/bus.rs
// ============================================================================
// Module: Accolade Event Bus
// Description: In-process publish/subscribe for unlock and score notifications.
// Purpose: Decouple notification consumers from the controller.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The bus keeps two insertion-ordered subscriber lists, one per channel.
//! Publication is synchronous: it snapshots the list at call time and invokes
//! each handler in subscription order on the caller's thread, so a slow
//! handler stalls the publishing operation.
//!
//! Handlers are stored as [`HandlerWrapper`]s whose equality is the identity
//! of the wrapped `Arc`. Unsubscribing with the original `Arc` therefore
//! removes the matching wrapper even when the handler was coerced to a trait
//! object on the way in.
//!
//! The bus is an owned value; hosts share it through `Arc` instead of a
//! process-wide global.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;

use crate::core::ScoreChangedEvent;
use crate::core::UnlockedEvent;

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Receives unlock notifications.
pub trait UnlockedHandler: Send + Sync {
    /// Handles one notification.
    fn on_unlocked(&self, event: &UnlockedEvent);
}

impl<F> UnlockedHandler for F
where
    F: Fn(&UnlockedEvent) + Send + Sync,
{
    fn on_unlocked(&self, event: &UnlockedEvent) {
        (self)(event);
    }
}

/// Receives score notifications.
pub trait ScoreChangedHandler: Send + Sync {
    /// Handles one notification.
    fn on_score_changed(&self, event: &ScoreChangedEvent);
}

impl<F> ScoreChangedHandler for F
where
    F: Fn(&ScoreChangedEvent) + Send + Sync,
{
    fn on_score_changed(&self, event: &ScoreChangedEvent) {
        (self)(event);
    }
}

/// Subscriber entry compared by handler identity.
pub struct HandlerWrapper<H: ?Sized> {
    /// Wrapped handler.
    handler: Arc<H>,
}

impl<H: ?Sized> HandlerWrapper<H> {
    /// Wraps a handler.
    #[must_use]
    pub const fn new(handler: Arc<H>) -> Self {
        Self {
            handler,
        }
    }

    /// Returns the wrapped handler.
    #[must_use]
    pub const fn handler(&self) -> &Arc<H> {
        &self.handler
    }

    /// Returns true when this wrapper holds the same allocation as `other`.
    #[must_use]
    pub fn wraps<O: ?Sized>(&self, other: &Arc<O>) -> bool {
        Arc::as_ptr(&self.handler).cast::<()>() == Arc::as_ptr(other).cast::<()>()
    }
}

impl<H: ?Sized> Clone for HandlerWrapper<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<H: ?Sized> PartialEq for HandlerWrapper<H> {
    fn eq(&self, other: &Self) -> bool {
        self.wraps(&other.handler)
    }
}

impl<H: ?Sized> Eq for HandlerWrapper<H> {}

impl<H: ?Sized> fmt::Debug for HandlerWrapper<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerWrapper")
            .field("handler", &Arc::as_ptr(&self.handler).cast::<()>())
            .finish()
    }
}

// ============================================================================
// SECTION: Event Bus
// ============================================================================

/// Subscriber list for one channel.
type Subscribers<H> = RwLock<Vec<HandlerWrapper<H>>>;

/// In-process notification bus.
#[derive(Default)]
pub struct EventBus {
    /// Unlock channel subscribers.
    unlocked: Subscribers<dyn UnlockedHandler>,
    /// Score channel subscribers.
    score_changed: Subscribers<dyn ScoreChangedHandler>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("unlocked", &self.unlocked_subscribers())
            .field("score_changed", &self.score_changed_subscribers())
            .finish()
    }
}

impl EventBus {
    /// Creates a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to unlock notifications.
    pub fn subscribe_unlocked<H>(&self, handler: Arc<H>)
    where
        H: UnlockedHandler + 'static,
    {
        let handler: Arc<dyn UnlockedHandler> = handler;
        push(&self.unlocked, HandlerWrapper::new(handler));
    }

    /// Removes the first subscription of `handler`; returns whether one existed.
    pub fn unsubscribe_unlocked<H: ?Sized>(&self, handler: &Arc<H>) -> bool {
        remove(&self.unlocked, handler)
    }

    /// Subscribes to score notifications.
    pub fn subscribe_score_changed<H>(&self, handler: Arc<H>)
    where
        H: ScoreChangedHandler + 'static,
    {
        let handler: Arc<dyn ScoreChangedHandler> = handler;
        push(&self.score_changed, HandlerWrapper::new(handler));
    }

    /// Removes the first subscription of `handler`; returns whether one existed.
    pub fn unsubscribe_score_changed<H: ?Sized>(&self, handler: &Arc<H>) -> bool {
        remove(&self.score_changed, handler)
    }

    /// Delivers `event` to every unlock subscriber; returns how many ran.
    pub fn publish_unlocked(&self, event: &UnlockedEvent) -> usize {
        let subscribers = snapshot(&self.unlocked);
        for subscriber in &subscribers {
            subscriber.handler().on_unlocked(event);
        }
        subscribers.len()
    }

    /// Delivers `event` to every score subscriber; returns how many ran.
    pub fn publish_score_changed(&self, event: &ScoreChangedEvent) -> usize {
        let subscribers = snapshot(&self.score_changed);
        for subscriber in &subscribers {
            subscriber.handler().on_score_changed(event);
        }
        subscribers.len()
    }

    /// Returns the number of unlock subscribers.
    #[must_use]
    pub fn unlocked_subscribers(&self) -> usize {
        self.unlocked.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns the number of score subscribers.
    #[must_use]
    pub fn score_changed_subscribers(&self) -> usize {
        self.score_changed.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Removes every subscriber from both channels.
    pub fn clear(&self) {
        self.unlocked.write().unwrap_or_else(PoisonError::into_inner).clear();
        self.score_changed.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

/// Appends a subscriber.
fn push<H: ?Sized>(list: &Subscribers<H>, wrapper: HandlerWrapper<H>) {
    list.write().unwrap_or_else(PoisonError::into_inner).push(wrapper);
}

/// Removes the first subscriber wrapping `handler`.
fn remove<H: ?Sized, O: ?Sized>(list: &Subscribers<H>, handler: &Arc<O>) -> bool {
    let mut guard = list.write().unwrap_or_else(PoisonError::into_inner);
    match guard.iter().position(|wrapper| wrapper.wraps(handler)) {
        Some(index) => {
            guard.remove(index);
            true
        }
        None => false,
    }
}

/// Copies the subscriber list so handlers run outside the lock.
fn snapshot<H: ?Sized>(list: &Subscribers<H>) -> Vec<HandlerWrapper<H>> {
    list.read().unwrap_or_else(PoisonError::into_inner).clone()
}
