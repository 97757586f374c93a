//! Synthetic light-list generators for firmware testing.
//!
//! Two flavors: a deterministic pattern (a pure function of `cnt`, so
//! firmware runs are reproducible byte-for-byte) and a random one with
//! an optional seed. Generated frames are standalone test payloads with
//! string-encoded channel values; they never touch the store.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use lightsheet_shared::constants::{GENERATOR_MAX_COUNT, GENERATOR_MIN_COUNT};
use lightsheet_shared::test_chunk_range;

use crate::error::ServerError;

/// One generated test frame. Channel values are decimal strings, the
/// format the firmware test harness consumes.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GeneratedFrame {
    pub time: String,
    pub head: String,
    pub shoulder: String,
    pub chest: String,
    pub arm_waist: String,
    pub leg1: String,
    pub leg2: String,
    pub shoes: String,
}

/// 0xRRGGBBFF palette indexed by two-bit slices of the frame number.
const COLORS: [i64; 8] = [
    0x0000_00FF, // black
    0xFF00_00FF, // red
    0x00FF_00FF, // green
    0x0000_FFFF, // blue
    0xFFFF_00FF, // yellow
    0x00FF_FFFF, // cyan
    0xFF00_FFFF, // purple
    0xFFFF_FFFF, // white
];

/// Upper bound (exclusive) on generated `time` ticks.
const TIME_RANGE: usize = 1500;

/// Check the `cnt` query parameter against the accepted range.
pub fn validate_count(cnt: usize) -> Result<(), ServerError> {
    if !(GENERATOR_MIN_COUNT..=GENERATOR_MAX_COUNT).contains(&cnt) {
        return Err(ServerError::Validation(format!(
            "cnt must be between {GENERATOR_MIN_COUNT} and {GENERATOR_MAX_COUNT}"
        )));
    }
    Ok(())
}

fn pattern_frame(i: usize) -> GeneratedFrame {
    let channel = |shift: usize| (COLORS[(i >> shift) & 3] - 250).to_string();
    GeneratedFrame {
        time: i.to_string(),
        head: channel(8),
        shoulder: channel(6),
        chest: channel(4),
        arm_waist: channel(2),
        leg1: channel(12),
        leg2: channel(10),
        shoes: channel(0),
    }
}

/// Deterministic test pattern: frame `i` picks each channel's color by a
/// two-bit slice of `i`. Repeated calls with the same `cnt` produce
/// identical output.
pub fn test_lightlist(cnt: usize) -> Vec<GeneratedFrame> {
    (0..cnt).map(pattern_frame).collect()
}

/// One page of the deterministic pattern (see
/// [`lightsheet_shared::test_chunk_range`] for the paging rule).
pub fn test_lightlist_chunk(cnt: usize, chunk_index: usize) -> Vec<GeneratedFrame> {
    test_chunk_range(cnt, chunk_index).map(pattern_frame).collect()
}

/// Random light list: `cnt` distinct ticks sampled from `[0, 1500)` in
/// ascending order, channels uniform over non-negative i32. A seed makes
/// the output reproducible.
pub fn rand_lightlist(cnt: usize, seed: Option<u64>) -> Vec<GeneratedFrame> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut times = rand::seq::index::sample(&mut rng, TIME_RANGE, cnt).into_vec();
    times.sort_unstable();

    times
        .into_iter()
        .map(|t| {
            let mut channel = || rng.gen_range(0..=i32::MAX as i64).to_string();
            GeneratedFrame {
                time: t.to_string(),
                head: channel(),
                shoulder: channel(),
                chest: channel(),
                arm_waist: channel(),
                leg1: channel(),
                leg2: channel(),
                shoes: channel(),
            }
        })
        .collect()
}
