//! v001 -- Initial schema creation.
//!
//! Creates the three core tables: `snapshots`, `raw_snapshots`, and
//! `users`.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Snapshots (one row per saved light-sheet version)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS snapshots (
    id          TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    user        TEXT NOT NULL,
    update_time TEXT NOT NULL,              -- YYYY-MM-DD-HH:MM:SS
    players     TEXT NOT NULL,              -- JSON document: [[frame, ...], ...]

    UNIQUE (user, update_time)
);

CREATE INDEX IF NOT EXISTS idx_snapshots_user_time
    ON snapshots(user, update_time DESC);

-- ----------------------------------------------------------------
-- Raw snapshots (edit-session saves, payload opaque)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS raw_snapshots (
    id          TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    user        TEXT NOT NULL,
    update_time TEXT NOT NULL,
    raw_data    TEXT NOT NULL,

    UNIQUE (user, update_time)
);

CREATE INDEX IF NOT EXISTS idx_raw_snapshots_user_time
    ON raw_snapshots(user, update_time DESC);

-- ----------------------------------------------------------------
-- Users
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    username TEXT PRIMARY KEY NOT NULL,
    password TEXT NOT NULL,
    disabled INTEGER NOT NULL DEFAULT 0     -- boolean 0/1
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
