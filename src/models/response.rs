use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ScriptFormat, UploadedScript};

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub data: UploadData,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadData {
    pub script_id: String,
    pub original_file: OriginalFileInfo,
    pub text_file: TextFileInfo,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginalFileInfo {
    pub filename: String,
    pub original_name: String,
    pub path: String,
    pub size: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextFileInfo {
    pub filename: String,
    pub path: String,
    pub extracted_length: usize,
}

impl UploadResponse {
    pub fn new(script: &UploadedScript) -> Self {
        Self {
            success: true,
            message: "File uploaded and converted successfully".to_string(),
            data: UploadData {
                script_id: script.script_id.clone(),
                original_file: OriginalFileInfo {
                    filename: script.file_name.clone(),
                    original_name: script.original_name.clone(),
                    path: public_path(&script.file_name),
                    size: script.size,
                },
                text_file: TextFileInfo {
                    filename: script.text_file_name.clone(),
                    path: public_path(&script.text_file_name),
                    extracted_length: script.extracted_length,
                },
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileListResponse {
    pub success: bool,
    pub count: usize,
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub id: String,
    pub script_id: String,
    pub file_name: String,
    pub original_name: String,
    pub file_path: PathBuf,
    pub text_file_path: PathBuf,
    pub uploaded_at: DateTime<Utc>,
    pub size: u64,
    pub file_type: ScriptFormat,
    pub has_text_extraction: bool,
    pub extracted_length: usize,
    pub file_exists: bool,
    pub text_file_exists: bool,
}

impl FileEntry {
    pub fn from_script(script: UploadedScript) -> Self {
        let file_exists = script.file_path.exists();
        let text_file_exists = script.text_file_path.exists();
        Self {
            id: script.script_id.clone(),
            script_id: script.script_id,
            file_name: script.file_name,
            original_name: script.original_name,
            file_path: script.file_path,
            text_file_path: script.text_file_path,
            uploaded_at: script.uploaded_at,
            size: script.size,
            file_type: script.file_type,
            has_text_extraction: script.has_text_extraction,
            extracted_length: script.extracted_length,
            file_exists,
            text_file_exists,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextResponse {
    pub success: bool,
    pub script_id: String,
    pub original_name: String,
    pub filename: String,
    pub content: String,
    pub length: usize,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
    pub script_id: String,
    pub deleted_files: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub success: bool,
    pub message: String,
    pub deleted_count: usize,
    pub deleted_files: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub services: ServiceStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub pdftotext: bool,
}

/// URL under which the static mount serves a stored file.
pub fn public_path(file_name: &str) -> String {
    format!("/uploads/{}", file_name)
}
