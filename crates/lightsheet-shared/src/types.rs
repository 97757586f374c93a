//! Domain model for versioned light-sheet data.
//!
//! Every struct derives `Serialize` and `Deserialize` so the same types
//! serve as wire shapes on the HTTP API and as the JSON document column
//! in the store.

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::constants::{LATEST, UPDATE_TIME_FORMAT};

/// One time sample of one player's body-light state.
///
/// All channels carry packed color codes that are opaque to this system.
/// Every field is required; a frame missing a channel fails
/// deserialization before it can reach the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerFrame {
    /// Integer tick within the show timeline.
    pub time: i64,
    pub head: i64,
    pub shoulder: i64,
    pub chest: i64,
    pub front: i64,
    pub skirt: i64,
    pub leg: i64,
    pub shoes: i64,
    pub weap_1: i64,
    pub weap_2: i64,
}

/// One player's full frame sequence within a snapshot.
///
/// Insertion order is chronological order; the store never re-sorts it.
/// Serializes transparently as a bare frame array, matching the
/// `"players": [[frame, ...], ...]` upload shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct PlayerTrack {
    pub frames: Vec<PlayerFrame>,
}

/// An immutable record of one save of a user's full light show.
///
/// `update_time` doubles as the version identifier; it is unique per user
/// (second precision, enforced by the store).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    pub user: String,
    pub update_time: String,
    pub players: Vec<PlayerTrack>,
}

/// Schema-light sibling of [`Snapshot`] used for edit-session persistence.
/// `raw_data` is an opaque serialized payload, never parsed server-side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawSnapshot {
    pub user: String,
    pub update_time: String,
    pub raw_data: String,
}

/// Projection row for index/menu views. Never carries player payloads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionEntry {
    pub user: String,
    pub update_time: String,
}

/// A resolved, authenticated user identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    #[serde(default)]
    pub disabled: bool,
}

/// A version lookup: either an exact `update_time` or the latest save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionQuery {
    Latest,
    At(String),
}

impl VersionQuery {
    /// Parse a path segment that is either a literal timestamp or the
    /// sentinel `LATEST`.
    pub fn parse(segment: &str) -> Self {
        if segment == LATEST {
            VersionQuery::Latest
        } else {
            VersionQuery::At(segment.to_string())
        }
    }
}

impl std::fmt::Display for VersionQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VersionQuery::Latest => f.write_str(LATEST),
            VersionQuery::At(ts) => f.write_str(ts),
        }
    }
}

/// Current wall-clock time formatted as an `update_time` stamp.
pub fn current_update_time() -> String {
    Local::now().format(UPDATE_TIME_FORMAT).to_string()
}
