//! # lightsheet-store
//!
//! SQLite-backed version store for light-sheet data.
//!
//! The crate exposes a synchronous [`Database`] handle that wraps a
//! `rusqlite::Connection` and provides typed helpers for every
//! collection: versioned snapshots, raw edit-session saves, and user
//! records. The nested per-player payload is persisted as a JSON
//! document column, so the store behaves as a small document store
//! partitioned by user.

pub mod database;
pub mod migrations;
pub mod models;
pub mod raw;
pub mod retention;
pub mod snapshots;
pub mod users;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use models::UserRecord;
pub use retention::RetentionPolicy;
