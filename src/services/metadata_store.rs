use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::UploadedScript;

/// One JSON document per upload, named `{scriptId}.json`.
///
/// Listing scans the whole directory on every call; fine for a handful of
/// users, not for real load.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    dir: PathBuf,
}

impl MetadataStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ensure_dir(&self) -> AppResult<()> {
        if !self.dir.exists() {
            std::fs::create_dir_all(&self.dir)?;
            info!(dir = %self.dir.display(), "Created metadata directory");
        }
        Ok(())
    }

    pub fn file_name(script_id: &str) -> String {
        format!("{}.json", script_id)
    }

    fn path_for(&self, script_id: &str) -> PathBuf {
        self.dir.join(Self::file_name(script_id))
    }

    pub async fn save(&self, script: &UploadedScript) -> AppResult<()> {
        let json = serde_json::to_vec_pretty(script)?;
        tokio::fs::write(self.path_for(&script.script_id), json).await?;
        debug!(script_id = %script.script_id, "Metadata saved");
        Ok(())
    }

    /// Missing, unreadable and malformed records all come back as `None`.
    pub async fn load(&self, script_id: &str) -> Option<UploadedScript> {
        // Ids arrive from URLs; only UUIDs can name a record.
        if Uuid::parse_str(script_id).is_err() {
            debug!(script_id = %script_id, "Rejecting non-UUID script id");
            return None;
        }
        self.load_path(&self.path_for(script_id)).await
    }

    async fn load_path(&self, path: &Path) -> Option<UploadedScript> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read metadata");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(script) => Some(script),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to parse metadata");
                None
            }
        }
    }

    pub async fn list_all(&self) -> AppResult<Vec<UploadedScript>> {
        let mut scripts = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(scripts),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(script) = self.load_path(&path).await {
                scripts.push(script);
            }
        }
        Ok(scripts)
    }

    /// Records owned by `user_id`, newest first.
    pub async fn list_by_owner(&self, user_id: &str) -> AppResult<Vec<UploadedScript>> {
        let mut scripts: Vec<UploadedScript> = self
            .list_all()
            .await?
            .into_iter()
            .filter(|script| script.is_owned_by(user_id))
            .collect();
        scripts.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(scripts)
    }

    /// Returns `false` if the record was already gone.
    pub async fn delete(&self, script_id: &str) -> AppResult<bool> {
        match tokio::fs::remove_file(self.path_for(script_id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScriptFormat;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    fn record(user_id: &str, minutes_ago: i64) -> UploadedScript {
        let script_id = Uuid::new_v4().to_string();
        UploadedScript {
            file_name: format!("{}-{}-draft.txt", user_id, script_id),
            text_file_name: format!("{}.txt", script_id),
            file_path: PathBuf::from("/tmp/draft.txt"),
            text_file_path: PathBuf::from(format!("/tmp/{}.txt", script_id)),
            script_id,
            user_id: user_id.to_string(),
            original_name: "draft.txt".to_string(),
            uploaded_at: Utc::now() - Duration::minutes(minutes_ago),
            size: 5,
            file_type: ScriptFormat::Txt,
            extracted_length: 5,
            has_text_extraction: true,
        }
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = MetadataStore::new(dir.path());
        let script = record("alice", 0);

        store.save(&script).await.unwrap();
        let loaded = store.load(&script.script_id).await.unwrap();
        assert_eq!(loaded, script);
    }

    #[tokio::test]
    async fn test_load_missing_and_malformed() {
        let dir = TempDir::new().unwrap();
        let store = MetadataStore::new(dir.path());

        let missing = Uuid::new_v4().to_string();
        assert!(store.load(&missing).await.is_none());

        let broken = Uuid::new_v4().to_string();
        std::fs::write(dir.path().join(format!("{}.json", broken)), b"{not json").unwrap();
        assert!(store.load(&broken).await.is_none());

        assert!(store.load("../etc/passwd").await.is_none());
    }

    #[tokio::test]
    async fn test_list_by_owner_sorted_newest_first() {
        let dir = TempDir::new().unwrap();
        let store = MetadataStore::new(dir.path());

        let oldest = record("alice", 30);
        let newest = record("alice", 1);
        let middle = record("alice", 10);
        let other = record("bob", 0);
        for script in [&oldest, &newest, &middle, &other] {
            store.save(script).await.unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let listed = store.list_by_owner("alice").await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|s| s.script_id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                newest.script_id.as_str(),
                middle.script_id.as_str(),
                oldest.script_id.as_str()
            ]
        );
    }

    #[tokio::test]
    async fn test_delete() {
        let dir = TempDir::new().unwrap();
        let store = MetadataStore::new(dir.path());
        let script = record("alice", 0);
        store.save(&script).await.unwrap();

        assert!(store.delete(&script.script_id).await.unwrap());
        assert!(!store.delete(&script.script_id).await.unwrap());
        assert!(store.load(&script.script_id).await.is_none());
    }

    #[tokio::test]
    async fn test_list_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = MetadataStore::new(dir.path().join("absent"));
        assert!(store.list_all().await.unwrap().is_empty());
    }
}
