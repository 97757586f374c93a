//! Orderings for the timelist index views.
//!
//! Both orderings are defined as compositions of stable sorts. The
//! all-users view in particular must stay a two-pass composition (time
//! pass, then user pass) rather than a single two-key comparator, because
//! the frontend menu layout depends on exactly that result.

use crate::types::VersionEntry;

/// Order the all-users index: stable sort by `update_time` descending,
/// then a second stable sort by `user` ascending on top. Net effect:
/// grouped by user ascending, each user's entries newest-first.
pub fn sort_all_index(mut entries: Vec<VersionEntry>) -> Vec<VersionEntry> {
    entries.sort_by(|a, b| b.update_time.cmp(&a.update_time));
    entries.sort_by(|a, b| a.user.cmp(&b.user));
    entries
}

/// Order a per-user index: rows for `user` first, then other rows, each
/// partition newest-first.
pub fn sort_user_index(mut entries: Vec<VersionEntry>, user: &str) -> Vec<VersionEntry> {
    entries.sort_by(|a, b| {
        (a.user != user)
            .cmp(&(b.user != user))
            .then_with(|| b.update_time.cmp(&a.update_time))
    });
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(user: &str, update_time: &str) -> VersionEntry {
        VersionEntry {
            user: user.to_string(),
            update_time: update_time.to_string(),
        }
    }

    #[test]
    fn all_index_groups_by_user_newest_first() {
        let entries = vec![
            entry("bob", "2024-01-01-12:00:00"),
            entry("alice", "2024-01-01-00:00:00"),
            entry("alice", "2024-01-02-00:00:00"),
            entry("bob", "2024-01-03-00:00:00"),
        ];
        let sorted = sort_all_index(entries);
        assert_eq!(
            sorted,
            vec![
                entry("alice", "2024-01-02-00:00:00"),
                entry("alice", "2024-01-01-00:00:00"),
                entry("bob", "2024-01-03-00:00:00"),
                entry("bob", "2024-01-01-12:00:00"),
            ]
        );
    }

    #[test]
    fn user_index_partitions_then_descends() {
        let entries = vec![
            entry("alice", "2024-01-01-00:00:00"),
            entry("bob", "2024-01-01-06:00:00"),
            entry("alice", "2024-01-01-12:00:00"),
        ];
        let sorted = sort_user_index(entries, "alice");
        assert_eq!(
            sorted,
            vec![
                entry("alice", "2024-01-01-12:00:00"),
                entry("alice", "2024-01-01-00:00:00"),
                entry("bob", "2024-01-01-06:00:00"),
            ]
        );
    }

    #[test]
    fn user_index_on_filtered_rows_is_time_descending() {
        // The store already filters to one user; the partition key is
        // then constant and only recency ordering remains.
        let entries = vec![
            entry("alice", "2024-01-01-00:00:00"),
            entry("alice", "2024-01-02-00:00:00"),
        ];
        let sorted = sort_user_index(entries, "alice");
        assert_eq!(sorted[0].update_time, "2024-01-02-00:00:00");
        assert_eq!(sorted[1].update_time, "2024-01-01-00:00:00");
    }
}
