// crates/accolade-store-sqlite/src/lib.rs
// ============================================================================
// Module: Accolade SQLite Store
// Description: SQLite-backed score counters and unlock records.
// Purpose: Persist achievement progress across process restarts.
// Dependencies: accolade-core, rusqlite
// ============================================================================

//! ## Overview
//! [`SqliteAchievementStore`] implements both `ScoreStore` and `UnlockStore`
//! over one `SQLite` database.

pub mod store;

pub use store::DEFAULT_BUSY_TIMEOUT_MS;
pub use store::SqliteAchievementStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
