//! Shared constants for the lightsheet system.

/// Sentinel version string meaning "the most recently saved snapshot".
pub const LATEST: &str = "LATEST";

/// Soft cap on retained snapshots per user before the oldest becomes an
/// eviction candidate. Applies independently to snapshots and raw saves.
pub const RETENTION_CAP: usize = 5;

/// Number of frames per page when reading a player track in chunks.
pub const CHUNK_SIZE: usize = 10;

/// Number of items per page for the synthetic test-data endpoint.
pub const TEST_CHUNK_SIZE: usize = 100;

/// Inclusive bounds on the `cnt` parameter accepted by the generators.
pub const GENERATOR_MIN_COUNT: usize = 1;
pub const GENERATOR_MAX_COUNT: usize = 1500;

/// Strftime pattern for `update_time` stamps. Fixed-width and zero-padded
/// so lexicographic order equals chronological order.
pub const UPDATE_TIME_FORMAT: &str = "%Y-%m-%d-%H:%M:%S";
