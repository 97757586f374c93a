//! # lightsheet-shared
//!
//! Domain types and pure logic shared between the lightsheet store and
//! server: the versioned light-sheet data model (snapshots of per-player
//! frame sequences), the chunked reader used to page through a player's
//! track, and the index-view orderings used by the timelist endpoints.

pub mod chunk;
pub mod constants;
pub mod index;
pub mod types;

pub use chunk::{read_chunk, test_chunk_range, ChunkError};
pub use index::{sort_all_index, sort_user_index};
pub use types::*;
