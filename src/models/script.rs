use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Screenplay formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptFormat {
    Pdf,
    Docx,
    Txt,
    Fountain,
    Fdx,
}

impl ScriptFormat {
    pub const ALL: [ScriptFormat; 5] = [
        ScriptFormat::Pdf,
        ScriptFormat::Docx,
        ScriptFormat::Txt,
        ScriptFormat::Fountain,
        ScriptFormat::Fdx,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            ScriptFormat::Pdf => "pdf",
            ScriptFormat::Docx => "docx",
            ScriptFormat::Txt => "txt",
            ScriptFormat::Fountain => "fountain",
            ScriptFormat::Fdx => "fdx",
        }
    }

    /// Case-insensitive lookup of an extension given without the dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        Self::ALL.into_iter().find(|format| format.extension() == ext)
    }

    pub fn from_file_name(name: &str) -> AppResult<Self> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");

        Self::from_extension(ext).ok_or_else(|| AppError::UnsupportedFileType {
            extension: if ext.is_empty() {
                "(none)".to_string()
            } else {
                format!(".{}", ext.to_ascii_lowercase())
            },
        })
    }
}

impl fmt::Display for ScriptFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Metadata record persisted as `{scriptId}.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedScript {
    pub script_id: String,
    pub user_id: String,
    pub original_name: String,
    pub file_name: String,
    pub text_file_name: String,
    pub file_path: PathBuf,
    pub text_file_path: PathBuf,
    pub uploaded_at: DateTime<Utc>,
    pub size: u64,
    pub file_type: ScriptFormat,
    pub extracted_length: usize,
    pub has_text_extraction: bool,
}

impl UploadedScript {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}
