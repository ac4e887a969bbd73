use axum::{
    extract::{Path, State},
    response::Json,
};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{DeleteResponse, FileEntry, FileListResponse, TextResponse, UploadedScript};
use crate::services::MetadataStore;
use crate::state::AppState;

/// Loads a record and checks it belongs to `user_id`.
async fn owned_script(state: &AppState, user_id: &str, script_id: &str) -> AppResult<UploadedScript> {
    let script = state
        .metadata
        .load(script_id)
        .await
        .ok_or(AppError::ScriptNotFound)?;

    if !script.is_owned_by(user_id) {
        warn!(
            user_id = %user_id,
            script_id = %script_id,
            "Ownership check failed"
        );
        return Err(AppError::Forbidden);
    }
    Ok(script)
}

/// `GET /files/:userId`
pub async fn list_files_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<FileListResponse>> {
    let files: Vec<FileEntry> = state
        .metadata
        .list_by_owner(&user_id)
        .await?
        .into_iter()
        .map(FileEntry::from_script)
        .collect();

    info!(user_id = %user_id, count = files.len(), "Listed files");

    Ok(Json(FileListResponse {
        success: true,
        count: files.len(),
        files,
    }))
}

/// `GET /text/:userId/:scriptId`
pub async fn get_text_handler(
    State(state): State<AppState>,
    Path((user_id, script_id)): Path<(String, String)>,
) -> AppResult<Json<TextResponse>> {
    let script = owned_script(&state, &user_id, &script_id).await?;

    let content = state
        .files
        .read_text(&script.text_file_path)
        .await?
        .ok_or(AppError::TextFileNotFound)?;

    Ok(Json(TextResponse {
        success: true,
        length: content.chars().count(),
        content,
        script_id: script.script_id,
        original_name: script.original_name,
        filename: script.text_file_name,
        uploaded_at: script.uploaded_at,
    }))
}

/// `DELETE /files/:userId/:scriptId`
pub async fn delete_file_handler(
    State(state): State<AppState>,
    Path((user_id, script_id)): Path<(String, String)>,
) -> AppResult<Json<DeleteResponse>> {
    let script = owned_script(&state, &user_id, &script_id).await?;
    let mut deleted_files = Vec::new();

    if state.files.remove(&script.file_path).await? {
        deleted_files.push(script.file_name.clone());
    }
    if state.files.remove(&script.text_file_path).await? {
        deleted_files.push(script.text_file_name.clone());
    }
    if state.metadata.delete(&script.script_id).await? {
        deleted_files.push(MetadataStore::file_name(&script.script_id));
    }

    info!(
        user_id = %user_id,
        script_id = %script.script_id,
        deleted = ?deleted_files,
        "Deleted script"
    );

    Ok(Json(DeleteResponse {
        success: true,
        message: "Files deleted successfully".to_string(),
        script_id: script.script_id,
        deleted_files,
    }))
}

/// `GET /metadata/:scriptId`, raw record for debugging.
pub async fn get_metadata_handler(
    State(state): State<AppState>,
    Path(script_id): Path<String>,
) -> AppResult<Json<UploadedScript>> {
    state
        .metadata
        .load(&script_id)
        .await
        .map(Json)
        .ok_or(AppError::ScriptNotFound)
}
