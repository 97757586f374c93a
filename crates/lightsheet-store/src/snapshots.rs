//! Snapshot collection: versioned saves of full light shows.
//!
//! A snapshot row is keyed by `(user, update_time)`; the nested player
//! payload is one JSON document column. `update_time` stamps are
//! fixed-width, so `ORDER BY update_time` string ordering is
//! chronological ordering.

use rusqlite::params;
use uuid::Uuid;

use lightsheet_shared::{Snapshot, VersionEntry, VersionQuery};

use crate::database::Database;
use crate::error::{Result, StoreError};

impl Database {
    /// Insert a new snapshot. Never overwrites; a second insert with the
    /// same `(user, update_time)` fails with
    /// [`StoreError::DuplicateVersion`].
    pub fn insert_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        let players = serde_json::to_string(&snapshot.players)?;
        self.conn()
            .execute(
                "INSERT INTO snapshots (id, user, update_time, players)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    Uuid::new_v4().to_string(),
                    snapshot.user,
                    snapshot.update_time,
                    players,
                ],
            )
            .map_err(|e| map_insert_error(e, &snapshot.user, &snapshot.update_time))?;
        Ok(())
    }

    /// Fetch one snapshot: exact `(user, update_time)` match, or the row
    /// with the maximum `update_time` for [`VersionQuery::Latest`].
    pub fn get_snapshot(&self, user: &str, version: &VersionQuery) -> Result<Snapshot> {
        let result = match version {
            VersionQuery::Latest => self.conn().query_row(
                "SELECT user, update_time, players FROM snapshots
                 WHERE user = ?1
                 ORDER BY update_time DESC
                 LIMIT 1",
                params![user],
                row_to_snapshot,
            ),
            VersionQuery::At(ts) => self.conn().query_row(
                "SELECT user, update_time, players FROM snapshots
                 WHERE user = ?1 AND update_time = ?2",
                params![user, ts],
                row_to_snapshot,
            ),
        };
        result.map_err(map_not_found)
    }

    /// Projection-only listing of `(user, update_time)` pairs, for one
    /// user or for everyone. Never loads player payloads; ordering is up
    /// to the caller.
    pub fn list_versions(&self, user: Option<&str>) -> Result<Vec<VersionEntry>> {
        let mut entries = Vec::new();
        match user {
            Some(user) => {
                let mut stmt = self.conn().prepare(
                    "SELECT user, update_time FROM snapshots WHERE user = ?1",
                )?;
                let rows = stmt.query_map(params![user], row_to_entry)?;
                for row in rows {
                    entries.push(row?);
                }
            }
            None => {
                let mut stmt = self
                    .conn()
                    .prepare("SELECT user, update_time FROM snapshots")?;
                let rows = stmt.query_map([], row_to_entry)?;
                for row in rows {
                    entries.push(row?);
                }
            }
        }
        Ok(entries)
    }

    /// Number of stored snapshots for one user.
    pub fn count_snapshots(&self, user: &str) -> Result<usize> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM snapshots WHERE user = ?1",
            params![user],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// The minimum `update_time` among a user's snapshots, if any.
    pub fn oldest_snapshot_version(&self, user: &str) -> Result<Option<String>> {
        let result = self.conn().query_row(
            "SELECT update_time FROM snapshots
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

    /// Delete one snapshot version. Returns whether a row was removed.
    pub fn delete_snapshot(&self, user: &str, update_time: &str) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM snapshots WHERE user = ?1 AND update_time = ?2",
            params![user, update_time],
        )?;
        Ok(affected > 0)
    }
}

fn row_to_snapshot(row: &rusqlite::Row<'_>) -> rusqlite::Result<Snapshot> {
    let user: String = row.get(0)?;
    let update_time: String = row.get(1)?;
    let players_json: String = row.get(2)?;

    let players = serde_json::from_str(&players_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Snapshot {
        user,
        update_time,
        players,
    })
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<VersionEntry> {
    Ok(VersionEntry {
        user: row.get(0)?,
        update_time: row.get(1)?,
    })
}

pub(crate) fn map_not_found(e: rusqlite::Error) -> StoreError {
    match e {
        rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
        other => StoreError::Sqlite(other),
    }
}

pub(crate) fn map_insert_error(e: rusqlite::Error, user: &str, update_time: &str) -> StoreError {
    match e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            StoreError::DuplicateVersion {
                user: user.to_string(),
                update_time: update_time.to_string(),
            }
        }
        other => StoreError::Sqlite(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightsheet_shared::{PlayerFrame, PlayerTrack};

    fn test_db() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("test.db")).unwrap();
        (db, dir)
    }

    fn frame(time: i64) -> PlayerFrame {
        PlayerFrame {
            time,
            head: 0xFF0000FF,
            shoulder: 0x00FF00FF,
            chest: 0x0000FFFF,
            front: 1,
            skirt: 2,
            leg: 3,
            shoes: 4,
            weap_1: 5,
            weap_2: 6,
        }
    }

    fn snapshot(user: &str, update_time: &str, frames: usize) -> Snapshot {
        Snapshot {
            user: user.to_string(),
            update_time: update_time.to_string(),
            players: vec![PlayerTrack {
                frames: (0..frames as i64).map(frame).collect(),
            }],
        }
    }

    #[test]
    fn round_trip() {
        let (db, _dir) = test_db();
        let snap = snapshot("alice", "2024-01-01-00:00:00", 3);

        db.insert_snapshot(&snap).unwrap();
        let fetched = db
            .get_snapshot("alice", &VersionQuery::At("2024-01-01-00:00:00".into()))
            .unwrap();
        assert_eq!(fetched, snap);
    }

    #[test]
    fn latest_is_max_update_time() {
        let (db, _dir) = test_db();
        db.insert_snapshot(&snapshot("alice", "2024-01-01-00:00:00", 1))
            .unwrap();
        db.insert_snapshot(&snapshot("alice", "2024-01-03-00:00:00", 1))
            .unwrap();
        db.insert_snapshot(&snapshot("alice", "2024-01-02-00:00:00", 1))
            .unwrap();

        let latest = db.get_snapshot("alice", &VersionQuery::Latest).unwrap();
        assert_eq!(latest.update_time, "2024-01-03-00:00:00");

        let explicit = db
            .get_snapshot("alice", &VersionQuery::At("2024-01-03-00:00:00".into()))
            .unwrap();
        assert_eq!(latest, explicit);
    }

    #[test]
    fn latest_scoped_per_user() {
        let (db, _dir) = test_db();
        db.insert_snapshot(&snapshot("alice", "2024-01-01-00:00:00", 1))
            .unwrap();
        db.insert_snapshot(&snapshot("bob", "2024-06-01-00:00:00", 1))
            .unwrap();

        let latest = db.get_snapshot("alice", &VersionQuery::Latest).unwrap();
        assert_eq!(latest.user, "alice");
        assert_eq!(latest.update_time, "2024-01-01-00:00:00");
    }

    #[test]
    fn missing_user_is_not_found() {
        let (db, _dir) = test_db();
        let err = db.get_snapshot("ghost", &VersionQuery::Latest).unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[test]
    fn duplicate_version_rejected() {
        let (db, _dir) = test_db();
        db.insert_snapshot(&snapshot("alice", "2024-01-01-00:00:00", 1))
            .unwrap();
        let err = db
            .insert_snapshot(&snapshot("alice", "2024-01-01-00:00:00", 2))
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateVersion { .. }));
    }

    #[test]
    fn same_version_allowed_across_users() {
        let (db, _dir) = test_db();
        db.insert_snapshot(&snapshot("alice", "2024-01-01-00:00:00", 1))
            .unwrap();
        db.insert_snapshot(&snapshot("bob", "2024-01-01-00:00:00", 1))
            .unwrap();
    }

    #[test]
    fn list_versions_is_projection_only() {
        let (db, _dir) = test_db();
        db.insert_snapshot(&snapshot("alice", "2024-01-01-00:00:00", 5))
            .unwrap();
        db.insert_snapshot(&snapshot("bob", "2024-01-02-00:00:00", 5))
            .unwrap();

        let all = db.list_versions(None).unwrap();
        assert_eq!(all.len(), 2);

        let alice_only = db.list_versions(Some("alice")).unwrap();
        assert_eq!(alice_only.len(), 1);
        assert_eq!(alice_only[0].user, "alice");
    }

    #[test]
    fn oldest_and_delete() {
        let (db, _dir) = test_db();
        assert_eq!(db.oldest_snapshot_version("alice").unwrap(), None);

        db.insert_snapshot(&snapshot("alice", "2024-01-02-00:00:00", 1))
            .unwrap();
        db.insert_snapshot(&snapshot("alice", "2024-01-01-00:00:00", 1))
            .unwrap();

        assert_eq!(
            db.oldest_snapshot_version("alice").unwrap().as_deref(),
            Some("2024-01-01-00:00:00")
        );

        assert!(db.delete_snapshot("alice", "2024-01-01-00:00:00").unwrap());
        assert!(!db.delete_snapshot("alice", "2024-01-01-00:00:00").unwrap());
        assert_eq!(db.count_snapshots("alice").unwrap(), 1);
    }
}
