use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A query expected exactly one row but found none.
    #[error("Record not found")]
    NotFound,

    /// Insert collided with an existing (user, update_time) version.
    #[error("Version already exists for user '{user}' at {update_time}")]
    DuplicateVersion { user: String, update_time: String },

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),

    /// Player payload could not be encoded/decoded as JSON.
    #[error("Payload encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
