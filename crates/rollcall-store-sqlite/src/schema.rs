//! SQL schema for the Rollcall SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! layout so later migrations can be gated on it.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per collection; each write replaces the whole document.
CREATE TABLE IF NOT EXISTS snapshots (
    key       TEXT PRIMARY KEY,
    document  TEXT NOT NULL,   -- JSON array, opaque to the store
    saved_at  TEXT NOT NULL    -- RFC 3339 UTC of the last write
);

PRAGMA user_version = 1;
";
