// crates/accolade-core/src/core/achievement.rs
// ============================================================================
// Module: Achievement Model
// Description: Catalog entries, achievement types, and trigger configuration.
// Purpose: Describe what an achievement listens to and when it unlocks.
// Dependencies: accolade-relation, serde, thiserror, time
// ============================================================================

//! ## Overview
//! An [`Achievement`] is immutable once a catalog is built. Its
//! [`AchievementTrigger`] is a closed enum whose variant fixes the
//! [`AchievementType`], so a date achievement can never carry a score
//! threshold. [`AchievementDefinition`] is the raw, string-typed form read
//! from catalog files before the catalog builder parses it.
//!
//! ## Levels
//! - Score and score-range achievements have one level per threshold or range.
//! - Every other type unlocks level 1 through its provider; manual unlocks may
//!   advance up to `max_level`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use accolade_relation::Relation;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use time::Date;
use time::Time;

use crate::core::identifiers::AchievementId;
use crate::core::identifiers::EventName;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Category assigned when a definition does not name one.
pub const DEFAULT_CATEGORY: &str = "default";
/// Maximum level assigned when neither the definition nor the trigger sets one.
pub const DEFAULT_MAX_LEVEL: u32 = 1;

// ============================================================================
// SECTION: Achievement Type
// ============================================================================

/// Declared kind of an achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AchievementType {
    /// Unlocks on specific calendar dates.
    Date,
    /// Unlocks once a time of day has passed.
    Time,
    /// Unlocks inside time-of-day windows.
    TimeRange,
    /// Unlocks on the first occurrence of an event.
    Single,
    /// Unlocks at ascending score thresholds.
    Score,
    /// Unlocks when a score falls inside inclusive ranges.
    ScoreRange,
    /// Unlocks when a relation over other achievements holds.
    Composite,
}

impl AchievementType {
    /// Every type in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Date,
        Self::Time,
        Self::TimeRange,
        Self::Single,
        Self::Score,
        Self::ScoreRange,
        Self::Composite,
    ];

    /// Returns the canonical label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Time => "time",
            Self::TimeRange => "timeRange",
            Self::Single => "single",
            Self::Score => "score",
            Self::ScoreRange => "scoreRange",
            Self::Composite => "composite",
        }
    }

    /// Parses a type label.
    ///
    /// Matching ignores ASCII case and underscores, so `timeRange`,
    /// `TIME_RANGE`, and `timerange` are the same label.
    ///
    /// # Errors
    /// Returns [`UnknownAchievementType`] for any other label.
    pub fn parse(label: &str) -> Result<Self, UnknownAchievementType> {
        let normalized: String =
            label.trim().chars().filter(|ch| *ch != '_').map(|ch| ch.to_ascii_lowercase()).collect();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| UnknownAchievementType(label.to_string()))
    }
}

impl fmt::Display for AchievementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AchievementType {
    type Err = UnknownAchievementType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Type label that matches no [`AchievementType`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown achievement type: {0}")]
pub struct UnknownAchievementType(pub String);

// ============================================================================
// SECTION: Trigger Values
// ============================================================================

/// Time-of-day window.
///
/// # Invariants
/// - When `start` precedes `end` the window is `[start, end)`.
/// - Otherwise the window wraps past midnight and covers every time outside
///   `[end, start)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    /// Window start.
    pub start: Time,
    /// Window end.
    pub end: Time,
}

impl TimeRange {
    /// Creates a time range.
    #[must_use]
    pub const fn new(start: Time, end: Time) -> Self {
        Self {
            start,
            end,
        }
    }

    /// Returns true when the window wraps past midnight.
    #[must_use]
    pub fn wraps(&self) -> bool {
        self.start >= self.end
    }

    /// Returns true when `now` falls inside the window.
    #[must_use]
    pub fn contains(&self, now: Time) -> bool {
        if self.wraps() {
            !(self.end <= now && now < self.start)
        } else {
            self.start <= now && now < self.end
        }
    }
}

/// Inclusive score range.
///
/// # Invariants
/// - `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreRange {
    /// Lowest matching score.
    min: u64,
    /// Highest matching score.
    max: u64,
}

impl ScoreRange {
    /// Creates a range, returning `None` when `min > max`.
    #[must_use]
    pub const fn new(min: u64, max: u64) -> Option<Self> {
        if min > max {
            None
        } else {
            Some(Self {
                min,
                max,
            })
        }
    }

    /// Returns the lower bound.
    #[must_use]
    pub const fn min(&self) -> u64 {
        self.min
    }

    /// Returns the upper bound.
    #[must_use]
    pub const fn max(&self) -> u64 {
        self.max
    }

    /// Returns true when `value` lies inside the range.
    #[must_use]
    pub const fn contains(&self, value: u64) -> bool {
        self.min <= value && value <= self.max
    }
}

// ============================================================================
// SECTION: Trigger Configuration
// ============================================================================

/// Type-specific unlock configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AchievementTrigger {
    /// Any of the listed dates unlocks.
    Date(Vec<Date>),
    /// Unlocks once this time of day has passed.
    Time(Time),
    /// Windows checked in declaration order.
    TimeRange(Vec<TimeRange>),
    /// First occurrence of a listened event unlocks.
    Single,
    /// Strictly ascending thresholds, one per level.
    Score(Vec<u64>),
    /// Inclusive ranges, one per level.
    ScoreRange(Vec<ScoreRange>),
    /// Boolean rule over other achievements.
    Composite(Relation<AchievementId>),
}

impl AchievementTrigger {
    /// Returns the achievement type implied by the trigger.
    #[must_use]
    pub const fn kind(&self) -> AchievementType {
        match self {
            Self::Date(_) => AchievementType::Date,
            Self::Time(_) => AchievementType::Time,
            Self::TimeRange(_) => AchievementType::TimeRange,
            Self::Single => AchievementType::Single,
            Self::Score(_) => AchievementType::Score,
            Self::ScoreRange(_) => AchievementType::ScoreRange,
            Self::Composite(_) => AchievementType::Composite,
        }
    }

    /// Returns the number of levels the trigger defines, when it defines any.
    #[must_use]
    pub fn level_count(&self) -> Option<u32> {
        let count = match self {
            Self::Score(thresholds) => thresholds.len(),
            Self::ScoreRange(ranges) => ranges.len(),
            _ => return None,
        };
        u32::try_from(count).ok()
    }

    /// Checks the trigger's structural invariants.
    ///
    /// # Errors
    /// Returns a description of the first violated invariant.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Date(dates) if dates.is_empty() => Err("date trigger lists no dates".to_string()),
            Self::TimeRange(ranges) if ranges.is_empty() => {
                Err("time range trigger lists no ranges".to_string())
            }
            Self::Score(thresholds) => {
                if thresholds.is_empty() {
                    return Err("score trigger lists no thresholds".to_string());
                }
                if thresholds.windows(2).any(|pair| pair[0] >= pair[1]) {
                    return Err("score thresholds must be strictly ascending".to_string());
                }
                Ok(())
            }
            Self::ScoreRange(ranges) if ranges.is_empty() => {
                Err("score range trigger lists no ranges".to_string())
            }
            _ => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Achievement
// ============================================================================

/// Immutable catalog entry.
///
/// # Invariants
/// - `max_level >= 1`.
/// - For score types `max_level` equals the trigger's level count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Achievement {
    /// Stable identifier.
    pub id: AchievementId,
    /// Category label.
    pub category: String,
    /// Highest reachable level.
    pub max_level: u32,
    /// Events this achievement listens to.
    pub events: BTreeSet<EventName>,
    /// Type-specific unlock configuration.
    pub trigger: AchievementTrigger,
}

impl Achievement {
    /// Creates an achievement in the default category with no events.
    #[must_use]
    pub fn new(id: impl Into<AchievementId>, trigger: AchievementTrigger) -> Self {
        let max_level = trigger.level_count().unwrap_or(DEFAULT_MAX_LEVEL).max(1);
        Self {
            id: id.into(),
            category: DEFAULT_CATEGORY.to_string(),
            max_level,
            events: BTreeSet::new(),
            trigger,
        }
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the maximum level.
    #[must_use]
    pub const fn with_max_level(mut self, max_level: u32) -> Self {
        self.max_level = max_level;
        self
    }

    /// Adds a listened event.
    #[must_use]
    pub fn with_event(mut self, event: impl Into<EventName>) -> Self {
        self.events.insert(event.into());
        self
    }

    /// Returns the declared type.
    #[must_use]
    pub const fn kind(&self) -> AchievementType {
        self.trigger.kind()
    }

    /// Returns true when the achievement listens to `event`.
    #[must_use]
    pub fn listens_to(&self, event: &EventName) -> bool {
        self.events.contains(event)
    }

    /// Returns the localization key of the title.
    #[must_use]
    pub fn title_key(&self) -> String {
        format!("{}.title", self.id)
    }

    /// Returns the localization key of the description.
    #[must_use]
    pub fn text_key(&self) -> String {
        format!("{}.text", self.id)
    }
}

// ============================================================================
// SECTION: Definitions
// ============================================================================

/// Raw catalog entry as read from configuration.
///
/// Trigger strings depend on `kind`:
/// - `date`: `YYYY-MM-DD`
/// - `time`: `HH:MM` or `HH:MM:SS`
/// - `timeRange`: `HH:MM-HH:MM`
/// - `score`: an integer per level
/// - `scoreRange`: `min-max` per level
/// - `composite`: one relation expression
/// - `single`: none
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AchievementDefinition {
    /// Stable identifier.
    pub id: String,
    /// Type label.
    #[serde(rename = "type")]
    pub kind: String,
    /// Category label.
    #[serde(default)]
    pub category: Option<String>,
    /// Maximum level override.
    #[serde(default)]
    pub max_level: Option<u32>,
    /// Listened event names.
    #[serde(default)]
    pub events: Vec<String>,
    /// Trigger strings.
    #[serde(default)]
    pub triggers: Vec<String>,
}
