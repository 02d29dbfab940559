// crates/accolade-core/src/core/clock.rs
// ============================================================================
// Module: Accolade Clock
// Description: Wall-clock abstraction for date and time providers.
// Purpose: Let hosts and tests control the current date and time of day.
// Dependencies: time
// ============================================================================

//! ## Overview
//! Date and time achievements compare against [`Clock::now`]. Production
//! hosts use [`SystemClock`] with a configured UTC offset; tests use
//! [`FixedClock`] and move it explicitly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use time::Duration;
use time::OffsetDateTime;
use time::UtcOffset;

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Source of the current date and time.
pub trait Clock: Send + Sync {
    /// Returns the current instant in the clock's offset.
    fn now(&self) -> OffsetDateTime;
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> OffsetDateTime {
        self.as_ref().now()
    }
}

/// Wall clock reporting time at a fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemClock {
    /// Offset applied to the UTC wall clock.
    offset: UtcOffset,
}

impl SystemClock {
    /// Creates a UTC wall clock.
    #[must_use]
    pub const fn utc() -> Self {
        Self {
            offset: UtcOffset::UTC,
        }
    }

    /// Creates a wall clock at the given offset.
    #[must_use]
    pub const fn with_offset(offset: UtcOffset) -> Self {
        Self {
            offset,
        }
    }

    /// Returns the configured offset.
    #[must_use]
    pub const fn offset(&self) -> UtcOffset {
        self.offset
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::utc()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.offset)
    }
}

/// Manually driven clock.
///
/// Clones share the same instant.
#[derive(Debug, Clone)]
pub struct FixedClock {
    /// Current instant.
    now: Arc<Mutex<OffsetDateTime>>,
}

impl FixedClock {
    /// Creates a clock frozen at `now`.
    #[must_use]
    pub fn new(now: OffsetDateTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: OffsetDateTime) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        let mut guard = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = guard.saturating_add(delta);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
