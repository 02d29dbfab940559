// crates/accolade-core/tests/stores.rs
// ============================================================================
// Test Module: In-Memory Stores
// Coverage: Score counters, high scores, idempotent unlocks, concurrency.
// ============================================================================
//! ## Overview
//! Integration tests for the in-memory score and unlock stores.

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

mod support;

use std::collections::BTreeSet;
use std::thread;

use accolade_core::AchievementId;
use accolade_core::EventName;
use accolade_core::InMemoryScoreStore;
use accolade_core::InMemoryUnlockStore;
use accolade_core::OwnerId;
use accolade_core::ScoreStore;
use accolade_core::StoreError;
use accolade_core::UnlockStore;
use support::TestResult;
use support::ensure;

/// Builds an owner set.
fn owners(names: &[&str]) -> BTreeSet<OwnerId> {
    names.iter().map(|name| OwnerId::new(*name)).collect()
}

// ========================================================================
// Scores
// ========================================================================

#[test]
fn missing_counter_reads_zero_and_increments_from_one() -> TestResult {
    let store = InMemoryScoreStore::new();
    let click = EventName::new("click");
    ensure(store.score_of(&click)? == 0, "missing counter is zero")?;
    ensure(store.increment(&click)? == 1, "first increment")?;
    ensure(store.increment(&click)? == 2, "second increment")?;
    ensure(store.set_score(&click, 40)? == 40, "set returns value")?;
    ensure(store.score_of(&click)? == 40, "set persisted")?;
    Ok(())
}

#[test]
fn high_score_only_moves_up() -> TestResult {
    let store = InMemoryScoreStore::new();
    let best = EventName::new("best_lap");
    ensure(store.set_high_score(&best, 0)?.is_none(), "zero does not beat missing")?;
    ensure(store.set_high_score(&best, 50)? == Some(50), "first high score")?;
    ensure(store.set_high_score(&best, 50)?.is_none(), "equal is a no-op")?;
    ensure(store.set_high_score(&best, 20)?.is_none(), "lower is a no-op")?;
    ensure(store.score_of(&best)? == 50, "stored score kept")?;
    Ok(())
}

#[test]
fn increment_overflow_is_reported() -> TestResult {
    let store = InMemoryScoreStore::new();
    let event = EventName::new("spin");
    store.set_score(&event, u64::MAX)?;
    ensure(matches!(store.increment(&event), Err(StoreError::Invalid(_))), "overflow rejected")?;
    ensure(store.score_of(&event)? == u64::MAX, "value untouched")?;
    Ok(())
}

#[test]
fn concurrent_increments_are_not_lost() -> TestResult {
    let store = InMemoryScoreStore::new();
    let event = EventName::new("tap");
    thread::scope(|scope| {
        for _ in 0 .. 8 {
            scope.spawn(|| {
                for _ in 0 .. 100 {
                    store.increment(&event).unwrap();
                }
            });
        }
    });
    ensure(store.score_of(&event)? == 800, "every increment counted")
}

// ========================================================================
// Unlocks
// ========================================================================

#[test]
fn unlock_is_idempotent_per_level() -> TestResult {
    let store = InMemoryUnlockStore::new();
    let id = AchievementId::new("clicker");
    ensure(!store.is_unlocked(&id)?, "locked at start")?;
    ensure(store.unlock(&id, 1, &owners(&["ana"]))?, "level 1 recorded")?;
    ensure(!store.unlock(&id, 1, &owners(&["ben"]))?, "level 1 again ignored")?;
    ensure(store.level_of(&id)? == 1, "level kept")?;
    ensure(store.all_by_owner(&OwnerId::new("ben"))?.is_empty(), "rejected unlock credits nobody")?;

    ensure(store.unlock(&id, 3, &owners(&["ben"]))?, "skip ahead allowed")?;
    ensure(!store.unlock(&id, 2, &BTreeSet::new())?, "lower level ignored")?;
    ensure(store.is_unlocked_at(&id, 2)?, "level 2 implied")?;
    ensure(!store.is_unlocked_at(&id, 4)?, "level 4 locked")?;

    let records = store.all()?;
    ensure(records.len() == 1, "one record")?;
    ensure(records[0].owners == owners(&["ana", "ben"]), "owners merged")?;
    Ok(())
}

#[test]
fn level_zero_is_invalid() {
    let store = InMemoryUnlockStore::new();
    let result = store.unlock(&AchievementId::new("x"), 0, &BTreeSet::new());
    assert!(matches!(result, Err(StoreError::Invalid(_))));
}

#[test]
fn records_filter_by_owner_in_id_order() -> TestResult {
    let store = InMemoryUnlockStore::new();
    store.unlock(&AchievementId::new("zeta"), 1, &owners(&["ana"]))?;
    store.unlock(&AchievementId::new("alpha"), 1, &owners(&["ana", "ben"]))?;
    store.unlock(&AchievementId::new("mid"), 1, &BTreeSet::new())?;

    let ana: Vec<String> =
        store.all_by_owner(&OwnerId::new("ana"))?.into_iter().map(|record| record.id.to_string()).collect();
    ensure(ana == ["alpha", "zeta"], "ana's records ordered by id")?;
    ensure(store.all()?.len() == 3, "every record listed")?;

    store.delete_all()?;
    ensure(store.all()?.is_empty(), "cleared")?;
    Ok(())
}

#[test]
fn racing_unlocks_record_one_winner() -> TestResult {
    let store = InMemoryUnlockStore::new();
    let id = AchievementId::new("race");
    let winners = thread::scope(|scope| {
        let handles: Vec<_> = (0 .. 16)
            .map(|_| scope.spawn(|| store.unlock(&id, 1, &BTreeSet::new()).unwrap()))
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).filter(|won| *won).count()
    });
    ensure(winners == 1, "exactly one caller recorded the level")
}

#[test]
fn clones_share_state() -> TestResult {
    let scores = InMemoryScoreStore::new();
    let view = scores.clone();
    scores.increment(&EventName::new("a"))?;
    ensure(view.score_of(&EventName::new("a"))? == 1, "clone sees the write")
}
