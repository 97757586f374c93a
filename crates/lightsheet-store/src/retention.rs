//! Retention-by-count policy.
//!
//! Each user keeps at most [`RETENTION_CAP`] snapshots before the oldest
//! becomes an eviction candidate. The cap is a soft housekeeping limit:
//! the count/evict/insert sequence is not transacted, so concurrent
//! uploads from one user may briefly exceed it (accepted). Snapshots and
//! raw saves are capped independently.
//!
//! [`RETENTION_CAP`]: lightsheet_shared::constants::RETENTION_CAP

use lightsheet_shared::constants::RETENTION_CAP;

use crate::database::Database;
use crate::error::Result;

/// Per-user cap on retained versions.
#[derive(Debug, Clone, Copy)]
pub struct RetentionPolicy {
    pub cap: usize,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self { cap: RETENTION_CAP }
    }
}

impl RetentionPolicy {
    /// Given the current count and the oldest stored version, return the
    /// version that should be evicted before the next insert, if any.
    pub fn eviction_candidate(
        &self,
        count: usize,
        oldest: Option<String>,
    ) -> Option<String> {
        if count >= self.cap {
            oldest
        } else {
            None
        }
    }
}

impl Database {
    /// Eviction candidate among a user's snapshots under `policy`.
    pub fn snapshot_eviction_candidate(
        &self,
        user: &str,
        policy: RetentionPolicy,
    ) -> Result<Option<String>> {
        let count = self.count_snapshots(user)?;
        let oldest = self.oldest_snapshot_version(user)?;
        Ok(policy.eviction_candidate(count, oldest))
    }

    /// Eviction candidate among a user's raw saves under `policy`.
    pub fn raw_eviction_candidate(
        &self,
        user: &str,
        policy: RetentionPolicy,
    ) -> Result<Option<String>> {
        let count = self.count_raw(user)?;
        let oldest = self.oldest_raw_version(user)?;
        Ok(policy.eviction_candidate(count, oldest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightsheet_shared::{RawSnapshot, Snapshot};

    fn test_db() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("test.db")).unwrap();
        (db, dir)
    }

    fn insert_snapshot(db: &Database, user: &str, day: u32) {
        db.insert_snapshot(&Snapshot {
            user: user.to_string(),
            update_time: format!("2024-01-{day:02}-00:00:00"),
            players: vec![],
        })
        .unwrap();
    }

    #[test]
    fn no_candidate_below_cap() {
        let policy = RetentionPolicy::default();
        assert_eq!(policy.eviction_candidate(4, Some("x".into())), None);
        assert_eq!(policy.eviction_candidate(0, None), None);
    }

    #[test]
    fn candidate_is_oldest_at_cap() {
        let (db, _dir) = test_db();
        // Insert newest-first so the oldest row is not the first inserted.
        for day in (1..=5).rev() {
            insert_snapshot(&db, "alice", day);
        }

        let candidate = db
            .snapshot_eviction_candidate("alice", RetentionPolicy::default())
            .unwrap();
        assert_eq!(candidate.as_deref(), Some("2024-01-01-00:00:00"));
    }

    #[test]
    fn snapshot_and_raw_caps_are_independent() {
        let (db, _dir) = test_db();
        for day in 1..=5 {
            insert_snapshot(&db, "alice", day);
        }

        // Five snapshots do not make raw saves eligible for eviction.
        let raw_candidate = db
            .raw_eviction_candidate("alice", RetentionPolicy::default())
            .unwrap();
        assert_eq!(raw_candidate, None);

        db.insert_raw(&RawSnapshot {
            user: "alice".to_string(),
            update_time: "2024-02-01-00:00:00".to_string(),
            raw_data: "x".to_string(),
        })
        .unwrap();
        assert_eq!(
            db.raw_eviction_candidate("alice", RetentionPolicy::default())
                .unwrap(),
            None
        );
    }

    #[test]
    fn candidate_scoped_per_user() {
        let (db, _dir) = test_db();
        for day in 1..=5 {
            insert_snapshot(&db, "alice", day);
        }
        insert_snapshot(&db, "bob", 1);

        assert!(db
            .snapshot_eviction_candidate("alice", RetentionPolicy::default())
            .unwrap()
            .is_some());
        assert_eq!(
            db.snapshot_eviction_candidate("bob", RetentionPolicy::default())
                .unwrap(),
            None
        );
    }
}
