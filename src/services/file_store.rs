use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};

/// Prefixes that mark files in the upload directory as leftovers: staged
/// uploads that were never renamed, and records written without an owner.
pub const STALE_PREFIXES: [&str; 2] = ["temp-", "undefined-"];

/// Binary uploads and their extracted-text sidecars, side by side in one
/// flat directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ensure_dir(&self) -> AppResult<()> {
        if !self.dir.exists() {
            std::fs::create_dir_all(&self.dir)?;
            info!(dir = %self.dir.display(), "Created upload directory");
        }
        Ok(())
    }

    pub fn stored_file_name(user_id: &str, script_id: &str, original_name: &str) -> String {
        format!("{}-{}-{}", user_id, script_id, original_name)
    }

    pub fn text_file_name(script_id: &str) -> String {
        format!("{}.txt", script_id)
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Writes upload bytes under a `temp-` name. The owner and script id are
    /// not known yet, so the canonical name comes later via [`persist`].
    ///
    /// [`persist`]: FileStore::persist
    pub fn stage(&self, data: &[u8]) -> AppResult<NamedTempFile> {
        let prefix = format!("temp-{}-", chrono::Utc::now().timestamp_millis());
        let mut temp = Builder::new()
            .prefix(&prefix)
            .tempfile_in(&self.dir)?;
        temp.write_all(data)?;
        temp.flush()?;
        debug!(path = %temp.path().display(), bytes = data.len(), "Staged upload");
        Ok(temp)
    }

    pub fn persist(&self, staged: NamedTempFile, file_name: &str) -> AppResult<PathBuf> {
        let path = self.path_for(file_name);
        staged.persist(&path)?;
        Ok(path)
    }

    pub async fn write_text(&self, script_id: &str, text: &str) -> AppResult<PathBuf> {
        let path = self.path_for(&Self::text_file_name(script_id));
        tokio::fs::write(&path, text).await?;
        Ok(path)
    }

    pub async fn read_text(&self, path: &Path) -> AppResult<Option<String>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Returns `false` if the file was already gone.
    pub async fn remove(&self, path: &Path) -> AppResult<bool> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }

    pub async fn stale_files(&self) -> AppResult<Vec<String>> {
        let mut stale = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(stale),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if STALE_PREFIXES.iter().any(|prefix| name.starts_with(prefix)) {
                stale.push(name);
            }
        }
        stale.sort();
        Ok(stale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_naming() {
        assert_eq!(
            FileStore::stored_file_name("alice", "abc", "draft.pdf"),
            "alice-abc-draft.pdf"
        );
        assert_eq!(FileStore::text_file_name("abc"), "abc.txt");
    }

    #[test]
    fn test_dropped_stage_leaves_nothing() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        let staged = store.stage(b"draft").unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("temp-"));
        assert!(path.exists());

        drop(staged);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_persist_and_remove() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        let staged = store.stage(b"INT. HOUSE - DAY").unwrap();
        let path = store.persist(staged, "alice-1-scene.txt").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"INT. HOUSE - DAY");

        assert!(store.remove(&path).await.unwrap());
        assert!(!store.remove(&path).await.unwrap());
    }

    #[tokio::test]
    async fn test_read_missing_text() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        let text = store.read_text(&dir.path().join("nope.txt")).await.unwrap();
        assert!(text.is_none());
    }

    #[tokio::test]
    async fn test_stale_files() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        std::fs::write(dir.path().join("temp-1-a.pdf"), b"x").unwrap();
        std::fs::write(dir.path().join("undefined-1-b.pdf"), b"x").unwrap();
        std::fs::write(dir.path().join("alice-1-c.pdf"), b"x").unwrap();

        let stale = store.stale_files().await.unwrap();
        assert_eq!(stale, vec!["temp-1-a.pdf", "undefined-1-b.pdf"]);
    }
}
