// crates/accolade-store-sqlite/tests/sqlite_store_unit.rs
// ============================================================================
// Module: SQLite Store Unit Tests
// Description: Targeted tests for the SQLite achievement store.
// Purpose: Validate path safety, schema versioning, counter and unlock
//          semantics, persistence, and concurrency.
// ============================================================================

//! ## Overview
//! Unit-level tests for `SQLite` store invariants:
//! - Path safety checks (length/component/directory rejection)
//! - Schema version validation
//! - Counter and high score semantics
//! - Monotonic unlock levels with merged owners
//! - Persistence across reopen and concurrent increments

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
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;
use std::thread;

use accolade_core::AchievementId;
use accolade_core::EventName;
use accolade_core::OwnerId;
use accolade_core::ScoreStore;
use accolade_core::StoreError;
use accolade_core::UnlockStore;
use accolade_store_sqlite::SqliteAchievementStore;
use accolade_store_sqlite::SqliteStoreConfig;
use accolade_store_sqlite::SqliteStoreError;
use accolade_store_sqlite::SqliteStoreMode;
use accolade_store_sqlite::SqliteSyncMode;
use rusqlite::Connection;
use rusqlite::params;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn config_for_path(path: PathBuf) -> SqliteStoreConfig {
    SqliteStoreConfig {
        path,
        busy_timeout_ms: 1_000,
        journal_mode: SqliteStoreMode::Wal,
        sync_mode: SqliteSyncMode::Full,
    }
}

fn store_for(path: &Path) -> SqliteAchievementStore {
    SqliteAchievementStore::new(config_for_path(path.to_path_buf())).expect("store init")
}

fn owners(names: &[&str]) -> BTreeSet<OwnerId> {
    names.iter().map(|name| OwnerId::new(*name)).collect()
}

// ============================================================================
// SECTION: Path Validation
// ============================================================================

#[test]
fn sqlite_store_rejects_directory_path() {
    let temp = TempDir::new().unwrap();
    let Err(err) = SqliteAchievementStore::new(config_for_path(temp.path().to_path_buf())) else {
        panic!("expected invalid directory path to fail");
    };
    assert!(matches!(err, SqliteStoreError::Invalid(_)));
}

#[test]
fn sqlite_store_rejects_empty_path() {
    let Err(err) = SqliteAchievementStore::new(config_for_path(PathBuf::new())) else {
        panic!("expected empty path to fail");
    };
    assert!(matches!(err, SqliteStoreError::Invalid(_)));
}

#[test]
fn sqlite_store_rejects_overlong_component() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("a".repeat(256));
    let Err(err) = SqliteAchievementStore::new(config_for_path(path)) else {
        panic!("expected overlong component to fail");
    };
    assert!(matches!(err, SqliteStoreError::Invalid(_)));
}

#[test]
fn sqlite_store_rejects_overlong_total_path() {
    let temp = TempDir::new().unwrap();
    let mut path = temp.path().to_path_buf();
    for _ in 0 .. 20 {
        path.push("b".repeat(250));
    }
    let Err(err) = SqliteAchievementStore::new(config_for_path(path)) else {
        panic!("expected overlong path to fail");
    };
    assert!(matches!(err, SqliteStoreError::Invalid(_)));
}

#[test]
fn sqlite_store_creates_missing_parent_directories() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("deeper").join("accolade.db");
    let _store = store_for(&path);
    assert!(path.exists());
}

// ============================================================================
// SECTION: Schema Versioning
// ============================================================================

#[test]
fn sqlite_store_rejects_unknown_schema_version() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store.db");
    drop(store_for(&path));
    let connection = Connection::open(&path).unwrap();
    connection.execute("UPDATE store_meta SET version = ?1", params![99_i64]).unwrap();
    drop(connection);

    let Err(err) = SqliteAchievementStore::new(config_for_path(path)) else {
        panic!("expected schema version mismatch");
    };
    assert!(matches!(err, SqliteStoreError::VersionMismatch(_)));
}

#[test]
fn sqlite_store_reopens_existing_schema() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store.db");
    let click = EventName::new("click");
    {
        let store = store_for(&path);
        store.set_score(&click, 12).unwrap();
        store.unlock(&AchievementId::new("clicker"), 2, &owners(&["ana"])).unwrap();
    }

    let store = store_for(&path);
    assert_eq!(store.score_of(&click).unwrap(), 12);
    assert_eq!(store.level_of(&AchievementId::new("clicker")).unwrap(), 2);
    assert_eq!(store.all_by_owner(&OwnerId::new("ana")).unwrap().len(), 1);
}

#[test]
fn sqlite_store_reports_negative_scores_as_corrupt() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store.db");
    let store = store_for(&path);
    let connection = Connection::open(&path).unwrap();
    connection
        .execute("INSERT INTO scores (event, value) VALUES (?1, ?2)", params!["click", -4_i64])
        .unwrap();

    let err = store.score_of(&EventName::new("click")).unwrap_err();
    assert!(matches!(err, StoreError::Corrupt(_)));
}

// ============================================================================
// SECTION: Scores
// ============================================================================

#[test]
fn sqlite_store_counts_from_one() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("store.db"));
    let click = EventName::new("click");
    assert_eq!(store.score_of(&click).unwrap(), 0);
    assert_eq!(store.increment(&click).unwrap(), 1);
    assert_eq!(store.increment(&click).unwrap(), 2);
    assert_eq!(store.set_score(&click, 40).unwrap(), 40);
    assert_eq!(store.increment(&click).unwrap(), 41);
}

#[test]
fn sqlite_store_high_score_only_moves_up() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("store.db"));
    let lap = EventName::new("lap");
    assert_eq!(store.set_high_score(&lap, 30).unwrap(), Some(30));
    assert_eq!(store.set_high_score(&lap, 30).unwrap(), None);
    assert_eq!(store.set_high_score(&lap, 10).unwrap(), None);
    assert_eq!(store.score_of(&lap).unwrap(), 30);
    assert_eq!(store.set_high_score(&lap, 31).unwrap(), Some(31));
}

#[test]
fn sqlite_store_rejects_scores_beyond_integer_range() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("store.db"));
    let err = store.set_score(&EventName::new("click"), u64::MAX).unwrap_err();
    assert!(matches!(err, StoreError::Invalid(_)));
}

#[test]
fn sqlite_store_delete_all_clears_scores_only() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("store.db"));
    let click = EventName::new("click");
    let clicker = AchievementId::new("clicker");
    store.increment(&click).unwrap();
    store.unlock(&clicker, 1, &BTreeSet::new()).unwrap();

    ScoreStore::delete_all(&store).unwrap();
    assert_eq!(store.score_of(&click).unwrap(), 0);
    assert_eq!(store.level_of(&clicker).unwrap(), 1);
}

// ============================================================================
// SECTION: Unlocks
// ============================================================================

#[test]
fn sqlite_store_unlock_is_monotonic_and_merges_owners() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("store.db"));
    let clicker = AchievementId::new("clicker");

    assert!(store.unlock(&clicker, 1, &owners(&["ana"])).unwrap());
    assert!(!store.unlock(&clicker, 1, &owners(&["bo"])).unwrap());
    assert!(store.unlock(&clicker, 3, &owners(&["bo"])).unwrap());
    assert!(!store.unlock(&clicker, 2, &owners(&["cy"])).unwrap());

    let records = store.all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].level, 3);
    assert_eq!(records[0].owners, owners(&["ana", "bo"]));
    assert!(store.is_unlocked_at(&clicker, 2).unwrap());
    assert!(!store.is_unlocked_at(&clicker, 4).unwrap());
}

#[test]
fn sqlite_store_rejects_level_zero() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("store.db"));
    let err = store.unlock(&AchievementId::new("clicker"), 0, &BTreeSet::new()).unwrap_err();
    assert!(matches!(err, StoreError::Invalid(_)));
}

#[test]
fn sqlite_store_lists_records_in_identifier_order() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("store.db"));
    store.unlock(&AchievementId::new("zeta"), 1, &owners(&["ana"])).unwrap();
    store.unlock(&AchievementId::new("alpha"), 1, &BTreeSet::new()).unwrap();
    store.unlock(&AchievementId::new("mid"), 2, &owners(&["ana", "bo"])).unwrap();

    let ids: Vec<String> =
        store.all().unwrap().into_iter().map(|record| record.id.as_str().to_string()).collect();
    assert_eq!(ids, ["alpha", "mid", "zeta"]);

    let for_ana = store.all_by_owner(&OwnerId::new("ana")).unwrap();
    let ids: Vec<&str> = for_ana.iter().map(|record| record.id.as_str()).collect();
    assert_eq!(ids, ["mid", "zeta"]);
    assert_eq!(for_ana[0].owners, owners(&["ana", "bo"]));
    assert!(store.all_by_owner(&OwnerId::new("nobody")).unwrap().is_empty());
}

#[test]
fn sqlite_store_delete_all_clears_unlocks_and_owners() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store.db");
    let store = store_for(&path);
    store.unlock(&AchievementId::new("clicker"), 1, &owners(&["ana"])).unwrap();

    UnlockStore::delete_all(&store).unwrap();
    assert!(store.all().unwrap().is_empty());
    let connection = Connection::open(&path).unwrap();
    let remaining: i64 =
        connection.query_row("SELECT COUNT(1) FROM unlock_owners", params![], |row| row.get(0)).unwrap();
    assert_eq!(remaining, 0);
}

// ============================================================================
// SECTION: Concurrency
// ============================================================================

#[test]
fn sqlite_store_concurrent_increments_are_not_lost() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("store.db"));
    let click = EventName::new("click");

    thread::scope(|scope| {
        for _ in 0 .. 4 {
            let store = store.clone();
            let click = click.clone();
            scope.spawn(move || {
                for _ in 0 .. 25 {
                    store.increment(&click).unwrap();
                }
            });
        }
    });

    assert_eq!(store.score_of(&click).unwrap(), 100);
}

#[test]
fn sqlite_store_concurrent_unlocks_report_one_winner() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("store.db"));
    let clicker = AchievementId::new("clicker");

    let winners: usize = thread::scope(|scope| {
        let handles: Vec<_> = (0 .. 8)
            .map(|_| {
                let store = store.clone();
                let clicker = clicker.clone();
                scope.spawn(move || store.unlock(&clicker, 1, &BTreeSet::new()).unwrap())
            })
            .collect();
        handles.into_iter().map(|handle| usize::from(handle.join().unwrap())).sum()
    });

    assert_eq!(winners, 1);
}
