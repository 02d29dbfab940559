// crates/accolade-core/src/tests.rs
// ============================================================================
// Module: Core Unit Tests
// Description: Model-level checks for types, ranges, and triggers.
// Purpose: Pin down value semantics shared by every engine component.
// Dependencies: crate::core, time
// ============================================================================

//! ## Overview
//! Unit tests for the achievement model.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use time::macros::time;

use crate::Achievement;
use crate::AchievementTrigger;
use crate::AchievementType;
use crate::DEFAULT_CATEGORY;
use crate::EventName;
use crate::ScoreRange;
use crate::TimeRange;

#[test]
fn type_labels_round_trip() {
    for kind in AchievementType::ALL {
        assert_eq!(AchievementType::parse(kind.as_str()).unwrap(), kind);
    }
}

#[test]
fn type_labels_ignore_case_and_underscores() {
    assert_eq!(AchievementType::parse("TIME_RANGE").unwrap(), AchievementType::TimeRange);
    assert_eq!(AchievementType::parse("scorerange").unwrap(), AchievementType::ScoreRange);
    assert_eq!(AchievementType::parse(" Composite ").unwrap(), AchievementType::Composite);
}

#[test]
fn unknown_type_label_is_rejected() {
    let err = AchievementType::parse("streak").unwrap_err();
    assert_eq!(err.0, "streak");
    assert!(err.to_string().contains("streak"));
}

#[test]
fn plain_time_range_is_half_open() {
    let range = TimeRange::new(time!(9:00), time!(17:00));
    assert!(!range.wraps());
    assert!(range.contains(time!(9:00)));
    assert!(range.contains(time!(16:59)));
    assert!(!range.contains(time!(17:00)));
    assert!(!range.contains(time!(8:59)));
}

#[test]
fn wrapping_time_range_covers_midnight() {
    let range = TimeRange::new(time!(22:00), time!(2:00));
    assert!(range.wraps());
    assert!(range.contains(time!(23:00)));
    assert!(range.contains(time!(0:30)));
    assert!(range.contains(time!(22:00)));
    assert!(!range.contains(time!(2:00)));
    assert!(!range.contains(time!(10:00)));
}

#[test]
fn score_range_is_inclusive() {
    let range = ScoreRange::new(10, 20).unwrap();
    assert!(range.contains(10));
    assert!(range.contains(20));
    assert!(!range.contains(21));
    assert!(ScoreRange::new(5, 4).is_none());
}

#[test]
fn score_thresholds_must_ascend() {
    assert!(AchievementTrigger::Score(vec![1, 5, 10]).validate().is_ok());
    assert!(AchievementTrigger::Score(vec![5, 5]).validate().is_err());
    assert!(AchievementTrigger::Score(Vec::new()).validate().is_err());
    assert!(AchievementTrigger::Date(Vec::new()).validate().is_err());
    assert!(AchievementTrigger::Single.validate().is_ok());
}

#[test]
fn score_achievement_levels_follow_thresholds() {
    let achievement = Achievement::new("clicks", AchievementTrigger::Score(vec![1, 10, 100]))
        .with_event("click");
    assert_eq!(achievement.max_level, 3);
    assert_eq!(achievement.category, DEFAULT_CATEGORY);
    assert!(achievement.listens_to(&EventName::new("click")));
    assert!(!achievement.listens_to(&EventName::new("scroll")));
}

#[test]
fn message_keys_derive_from_id() {
    let achievement = Achievement::new("first_login", AchievementTrigger::Single);
    assert_eq!(achievement.max_level, 1);
    assert_eq!(achievement.title_key(), "first_login.title");
    assert_eq!(achievement.text_key(), "first_login.text");
}
