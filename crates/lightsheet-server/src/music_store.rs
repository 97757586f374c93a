//! Per-user music file storage.
//!
//! Files live under `<root>/<username>/<filename>`. Usernames and
//! filenames arrive from the outside, so every path is validated against
//! traversal before it touches the filesystem. Writes are not atomic
//! against concurrent reads of the same filename; a reader racing an
//! upload may observe a partial file (accepted, see DESIGN.md).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use crate::error::ServerError;

/// Verify that a resolved path stays within the expected base directory.
/// Prevents path traversal attacks.
fn ensure_within(base: &Path, target: &Path) -> Result<PathBuf, ServerError> {
    // Canonicalize base; target may not exist yet so normalize manually
    let canonical_base = base.canonicalize().unwrap_or_else(|_| base.to_path_buf());
    let mut resolved = canonical_base.clone();
    for component in target
        .strip_prefix(&canonical_base)
        .unwrap_or(target)
        .components()
    {
        match component {
            std::path::Component::Normal(c) => resolved.push(c),
            std::path::Component::ParentDir => {
                return Err(ServerError::Validation(
                    "Path traversal detected".to_string(),
                ));
            }
            _ => {} // RootDir, CurDir, Prefix — skip
        }
    }
    if !resolved.starts_with(&canonical_base) {
        return Err(ServerError::Validation(
            "Path traversal detected".to_string(),
        ));
    }
    Ok(resolved)
}

#[derive(Debug, Clone)]
pub struct MusicStore {
    base_path: PathBuf,
}

impl MusicStore {
    pub async fn new(base_path: PathBuf) -> Result<Self, ServerError> {
        fs::create_dir_all(&base_path).await.map_err(|e| {
            ServerError::Internal(format!(
                "Failed to create music directory '{}': {}",
                base_path.display(),
                e
            ))
        })?;

        info!(path = %base_path.display(), "Music store initialized");

        Ok(Self { base_path })
    }

    /// Store one uploaded file under the user's namespace, creating the
    /// per-user directory on first upload.
    pub async fn save(
        &self,
        username: &str,
        filename: &str,
        data: &[u8],
    ) -> Result<PathBuf, ServerError> {
        if filename.is_empty() {
            return Err(ServerError::Validation("Empty filename".to_string()));
        }

        let path = self.safe_subpath(username, filename)?;
        let user_dir = self.base_path.join(username);
        fs::create_dir_all(&user_dir).await.map_err(|e| {
            ServerError::Internal(format!("Failed to create user directory: {e}"))
        })?;

        fs::write(&path, data).await.map_err(|e| {
            ServerError::Internal(format!("Failed to write '{filename}': {e}"))
        })?;

        debug!(user = username, file = filename, size = data.len(), "Stored music file");
        Ok(path)
    }

    /// List one user's files (regular files only).
    pub async fn list(&self, username: &str) -> Result<Vec<String>, ServerError> {
        let user_dir = self.safe_subpath(username, "")?;
        if !user_dir.is_dir() {
            return Err(ServerError::NotFound(format!(
                "no music found for user: '{username}'"
            )));
        }
        Self::files_in(&user_dir).await
    }

    /// List every user's files, keyed by username.
    pub async fn list_all(&self) -> Result<BTreeMap<String, Vec<String>>, ServerError> {
        let mut lists = BTreeMap::new();
        let mut entries = fs::read_dir(&self.base_path).await.map_err(|e| {
            ServerError::Internal(format!("Failed to list music root: {e}"))
        })?;

        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            ServerError::Internal(format!("Failed to read directory entry: {e}"))
        })? {
            if !entry.path().is_dir() {
                continue;
            }
            if let Some(username) = entry.file_name().to_str() {
                let files = Self::files_in(&entry.path()).await?;
                lists.insert(username.to_string(), files);
            }
        }

        Ok(lists)
    }

    /// Read one file's bytes.
    pub async fn read(&self, username: &str, filename: &str) -> Result<Vec<u8>, ServerError> {
        let path = self.safe_subpath(username, filename)?;

        if !path.is_file() {
            return Err(ServerError::NotFound(format!(
                "file not found: {username}/{filename}"
            )));
        }

        let data = fs::read(&path).await.map_err(|e| {
            ServerError::Internal(format!("Failed to read '{filename}': {e}"))
        })?;

        debug!(user = username, file = filename, size = data.len(), "Serving music file");
        Ok(data)
    }

    async fn files_in(dir: &Path) -> Result<Vec<String>, ServerError> {
        let mut files = Vec::new();
        let mut entries = fs::read_dir(dir)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to list files: {e}")))?;

        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            ServerError::Internal(format!("Failed to read directory entry: {e}"))
        })? {
            if entry.path().is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    files.push(name.to_string());
                }
            }
        }

        files.sort();
        Ok(files)
    }

    /// Build a safe path under one user's namespace.
    fn safe_subpath(&self, username: &str, filename: &str) -> Result<PathBuf, ServerError> {
        // Reject any path separator or traversal characters in inputs
        if username.is_empty()
            || username.contains('/')
            || username.contains('\\')
            || username.contains("..")
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains("..")
        {
            return Err(ServerError::Validation(
                "Path traversal detected".to_string(),
            ));
        }
        let target = self.base_path.join(username).join(filename);
        ensure_within(&self.base_path, &target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_store() -> (MusicStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = MusicStore::new(dir.path().to_path_buf()).await.unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn save_list_read_round_trip() {
        let (store, _dir) = test_store().await;

        store.save("alice", "intro.mp3", b"mp3-bytes").await.unwrap();
        store.save("alice", "finale.mp3", b"more-bytes").await.unwrap();

        let files = store.list("alice").await.unwrap();
        assert_eq!(files, vec!["finale.mp3", "intro.mp3"]);

        let data = store.read("alice", "intro.mp3").await.unwrap();
        assert_eq!(data, b"mp3-bytes");
    }

    #[tokio::test]
    async fn list_all_groups_by_user() {
        let (store, _dir) = test_store().await;

        store.save("alice", "a.mp3", b"a").await.unwrap();
        store.save("bob", "b.mp3", b"b").await.unwrap();

        let lists = store.list_all().await.unwrap();
        assert_eq!(lists.len(), 2);
        assert_eq!(lists["alice"], vec!["a.mp3"]);
        assert_eq!(lists["bob"], vec!["b.mp3"]);
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let (store, _dir) = test_store().await;
        store.save("alice", "a.mp3", b"a").await.unwrap();

        assert!(matches!(
            store.read("alice", "missing.mp3").await.unwrap_err(),
            ServerError::NotFound(_)
        ));
        assert!(matches!(
            store.list("nobody").await.unwrap_err(),
            ServerError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn traversal_rejected() {
        let (store, _dir) = test_store().await;

        assert!(store.save("../etc", "pw", b"x").await.is_err());
        assert!(store.save("alice", "../../pw", b"x").await.is_err());
        assert!(store.read("alice", "..\\pw").await.is_err());
    }

    #[tokio::test]
    async fn overwrite_replaces_content() {
        let (store, _dir) = test_store().await;

        store.save("alice", "a.mp3", b"v1").await.unwrap();
        store.save("alice", "a.mp3", b"v2").await.unwrap();
        assert_eq!(store.read("alice", "a.mp3").await.unwrap(), b"v2");
    }
}
