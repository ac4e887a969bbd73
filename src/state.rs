use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::services::{FileStore, MetadataStore, TextExtractor};

/// Shared handles passed to every handler. All durable state lives on disk.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub files: FileStore,
    pub metadata: MetadataStore,
    pub extractor: TextExtractor,
}

impl AppState {
    /// Creates the storage directories if needed and pins them to absolute
    /// paths so recorded file paths stay valid regardless of later `cwd`.
    pub fn new(config: Config) -> AppResult<Self> {
        FileStore::new(&config.upload_dir).ensure_dir()?;
        MetadataStore::new(&config.metadata_dir).ensure_dir()?;

        let files = FileStore::new(absolute(&config.upload_dir)?);
        let metadata = MetadataStore::new(absolute(&config.metadata_dir)?);

        info!(
            upload_dir = %files.dir().display(),
            metadata_dir = %metadata.dir().display(),
            "Storage ready"
        );

        Ok(Self {
            extractor: TextExtractor::new(config.pdftotext_path.clone()),
            config: Arc::new(config),
            files,
            metadata,
        })
    }
}

fn absolute(dir: &Path) -> AppResult<PathBuf> {
    dir.canonicalize().map_err(|e| {
        AppError::config(format!("Cannot resolve directory {}: {}", dir.display(), e))
    })
}
