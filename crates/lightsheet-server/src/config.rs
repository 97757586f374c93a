//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8000`
    pub http_addr: SocketAddr,

    /// Explicit SQLite database path. When unset the platform data
    /// directory is used.
    /// Env: `DB_PATH`
    pub db_path: Option<PathBuf>,

    /// Filesystem root for uploaded music, one subdirectory per user.
    /// Inside a container this is typically `/music`.
    /// Env: `MUSIC_FILE_PATH`
    /// Default: `./music_file`
    pub music_path: PathBuf,

    /// Whether the retention policy actually deletes the eviction
    /// candidate. When `false` (the default, matching the behavior of
    /// the system this replaces) the candidate is only identified and
    /// logged.
    /// Env: `RETENTION_ENFORCE` (true/false)
    pub retention_enforce: bool,

    /// Maximum request body size in bytes (covers music uploads).
    /// Env: `MAX_UPLOAD_SIZE`
    /// Default: 50 MiB
    pub max_upload_size: usize,

    /// Optional user created at startup if missing, for bootstrapping a
    /// fresh deployment.
    /// Env: `DEFAULT_USER` + `DEFAULT_PASSWORD`
    pub bootstrap_user: Option<(String, String)>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], 8000).into(),
            db_path: None,
            music_path: PathBuf::from("./music_file"),
            retention_enforce: false,
            max_upload_size: 50 * 1024 * 1024, // 50 MiB
            bootstrap_user: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(
                    value = %addr,
                    "Invalid HTTP_ADDR, using default"
                );
            }
        }

        if let Ok(path) = std::env::var("DB_PATH") {
            config.db_path = Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var("MUSIC_FILE_PATH") {
            config.music_path = PathBuf::from(path);
        }

        if let Ok(val) = std::env::var("RETENTION_ENFORCE") {
            config.retention_enforce = val == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("MAX_UPLOAD_SIZE") {
            if let Ok(n) = val.parse::<usize>() {
                config.max_upload_size = n;
            } else {
                tracing::warn!(value = %val, "Invalid MAX_UPLOAD_SIZE, using default");
            }
        }

        if let (Ok(user), Ok(password)) = (
            std::env::var("DEFAULT_USER"),
            std::env::var("DEFAULT_PASSWORD"),
        ) {
            if !user.is_empty() {
                config.bootstrap_user = Some((user, password));
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr, ([0, 0, 0, 0], 8000).into());
        assert_eq!(config.music_path, PathBuf::from("./music_file"));
        assert!(!config.retention_enforce);
        assert!(config.bootstrap_user.is_none());
    }
}
