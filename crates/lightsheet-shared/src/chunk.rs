//! Chunked reading of player tracks.
//!
//! Lets a client fetch one player's time series in fixed-size pages
//! without transferring the whole snapshot. Chunking is stateless and
//! idempotent: identical arguments against an unmodified snapshot always
//! yield identical output.

use std::ops::Range;

use thiserror::Error;

use crate::constants::{CHUNK_SIZE, TEST_CHUNK_SIZE};
use crate::types::{PlayerFrame, Snapshot};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkError {
    /// `player_index` is outside `0..snapshot.players.len()`.
    #[error("invalid player index: {0}")]
    InvalidPlayer(usize),
}

/// Return page `chunk_index` (of [`CHUNK_SIZE`] frames) of one player's
/// track.
///
/// Once `chunk_index * CHUNK_SIZE` passes the end of the track the result
/// is the empty slice, not an error — that is the terminal condition a
/// paginating client uses to stop requesting further chunks.
pub fn read_chunk(
    snapshot: &Snapshot,
    player_index: usize,
    chunk_index: usize,
) -> Result<&[PlayerFrame], ChunkError> {
    let track = snapshot
        .players
        .get(player_index)
        .ok_or(ChunkError::InvalidPlayer(player_index))?;

    let start = chunk_index.saturating_mul(CHUNK_SIZE).min(track.frames.len());
    let end = start.saturating_add(CHUNK_SIZE).min(track.frames.len());
    Ok(&track.frames[start..end])
}

/// Index range for page `chunk_index` of a generated sequence of
/// `total_count` items, paged by [`TEST_CHUNK_SIZE`].
///
/// Unrelated to snapshot chunking: no player dimension, no persistence.
pub fn test_chunk_range(total_count: usize, chunk_index: usize) -> Range<usize> {
    let start = chunk_index.saturating_mul(TEST_CHUNK_SIZE).min(total_count);
    let end = start.saturating_add(TEST_CHUNK_SIZE).min(total_count);
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PlayerTrack;

    fn frame(time: i64) -> PlayerFrame {
        PlayerFrame {
            time,
            head: 0,
            shoulder: 0,
            chest: 0,
            front: 0,
            skirt: 0,
            leg: 0,
            shoes: 0,
            weap_1: 0,
            weap_2: 0,
        }
    }

    fn snapshot_with(players: usize, frames_each: usize) -> Snapshot {
        Snapshot {
            user: "alice".to_string(),
            update_time: "2024-01-01-00:00:00".to_string(),
            players: (0..players)
                .map(|_| PlayerTrack {
                    frames: (0..frames_each as i64).map(frame).collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn partial_last_chunk_then_empty() {
        // 2 players x 15 frames: chunk 1 is frames 10..15, chunk 2 empty.
        let snap = snapshot_with(2, 15);

        let page = read_chunk(&snap, 0, 1).unwrap();
        assert_eq!(page.len(), 5);
        assert_eq!(page[0].time, 10);
        assert_eq!(page[4].time, 14);

        assert!(read_chunk(&snap, 0, 2).unwrap().is_empty());
    }

    #[test]
    fn full_first_chunk() {
        let snap = snapshot_with(1, 15);
        let page = read_chunk(&snap, 0, 0).unwrap();
        assert_eq!(page.len(), CHUNK_SIZE);
        assert_eq!(page[0].time, 0);
    }

    #[test]
    fn idempotent() {
        let snap = snapshot_with(2, 25);
        let first = read_chunk(&snap, 1, 1).unwrap().to_vec();
        let second = read_chunk(&snap, 1, 1).unwrap().to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn out_of_range_player_is_structured_error() {
        let snap = snapshot_with(2, 5);
        assert_eq!(read_chunk(&snap, 2, 0), Err(ChunkError::InvalidPlayer(2)));
    }

    #[test]
    fn far_past_end_is_empty_for_any_valid_player() {
        let snap = snapshot_with(3, 7);
        for p in 0..3 {
            assert!(read_chunk(&snap, p, usize::MAX / CHUNK_SIZE).unwrap().is_empty());
        }
    }

    #[test]
    fn test_chunk_range_clamps() {
        assert_eq!(test_chunk_range(250, 0), 0..100);
        assert_eq!(test_chunk_range(250, 2), 200..250);
        assert_eq!(test_chunk_range(250, 3), 250..250);
    }
}
