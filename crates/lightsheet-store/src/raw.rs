//! Raw-snapshot collection: schema-light edit-session saves.
//!
//! Rows live in a table separate from `snapshots` and the two are never
//! reconciled. `LATEST` resolves against this table, not the snapshot
//! table (the system this replaces resolved it against the wrong
//! collection; see DESIGN.md).

use rusqlite::params;
use uuid::Uuid;

use lightsheet_shared::{RawSnapshot, VersionQuery};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::snapshots::{map_insert_error, map_not_found};

impl Database {
    /// Insert a new raw save. Same never-overwrite contract as
    /// [`Database::insert_snapshot`].
    pub fn insert_raw(&self, raw: &RawSnapshot) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO raw_snapshots (id, user, update_time, raw_data)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    Uuid::new_v4().to_string(),
                    raw.user,
                    raw.update_time,
                    raw.raw_data,
                ],
            )
            .map_err(|e| map_insert_error(e, &raw.user, &raw.update_time))?;
        Ok(())
    }

    /// Fetch one raw save, by exact `update_time` or the latest one.
    pub fn get_raw(&self, user: &str, version: &VersionQuery) -> Result<RawSnapshot> {
        let result = match version {
            VersionQuery::Latest => self.conn().query_row(
                "SELECT user, update_time, raw_data FROM raw_snapshots
                 WHERE user = ?1
                 ORDER BY update_time DESC
                 LIMIT 1",
                params![user],
                row_to_raw,
            ),
            VersionQuery::At(ts) => self.conn().query_row(
                "SELECT user, update_time, raw_data FROM raw_snapshots
                 WHERE user = ?1 AND update_time = ?2",
                params![user, ts],
                row_to_raw,
            ),
        };
        result.map_err(map_not_found)
    }

    /// Number of stored raw saves for one user. Counted independently of
    /// the snapshot table.
    pub fn count_raw(&self, user: &str) -> Result<usize> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM raw_snapshots WHERE user = ?1",
            params![user],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// The minimum `update_time` among a user's raw saves, if any.
    pub fn oldest_raw_version(&self, user: &str) -> Result<Option<String>> {
        let result = self.conn().query_row(
            "SELECT update_time FROM raw_snapshots
             WHERE user = ?1
             ORDER BY update_time ASC
             LIMIT 1",
            params![user],
            |row| row.get(0),
        );
        match result {
            Ok(ts) => Ok(Some(ts)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::Sqlite(e)),
        }
    }

    /// Delete one raw save. Returns whether a row was removed.
    pub fn delete_raw(&self, user: &str, update_time: &str) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM raw_snapshots WHERE user = ?1 AND update_time = ?2",
            params![user, update_time],
        )?;
        Ok(affected > 0)
    }
}

fn row_to_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawSnapshot> {
    Ok(RawSnapshot {
        user: row.get(0)?,
        update_time: row.get(1)?,
        raw_data: row.get(2)?,
    })
}
