use std::collections::HashSet;

use axum::{extract::State, response::Json};
use tracing::{debug, info};

use crate::error::AppResult;
use crate::models::CleanupResponse;
use crate::services::MetadataStore;
use crate::state::AppState;

/// `DELETE /cleanup`: drop leftover temp/ownerless uploads and metadata
/// records whose files are gone.
pub async fn cleanup_handler(State(state): State<AppState>) -> AppResult<Json<CleanupResponse>> {
    let mut deleted_files = Vec::new();
    let records = state.metadata.list_all().await?;
    // Owners may legitimately carry a reserved prefix; a record makes a file live.
    let referenced: HashSet<&str> = records
        .iter()
        .map(|script| script.file_name.as_str())
        .collect();

    for name in state.files.stale_files().await? {
        if referenced.contains(name.as_str()) {
            debug!(file = %name, "Skipping stale-looking file owned by a record");
            continue;
        }
        if state.files.remove(&state.files.path_for(&name)).await? {
            info!(file = %name, "Deleted malformed file");
            deleted_files.push(name);
        }
    }

    for script in &records {
        let file_exists = script.file_path.exists();
        let text_exists = script.text_file_path.exists();
        if file_exists && text_exists {
            continue;
        }

        // The record is the only link to its files; remove the survivor too.
        if file_exists && state.files.remove(&script.file_path).await? {
            deleted_files.push(script.file_name.clone());
        }
        if text_exists && state.files.remove(&script.text_file_path).await? {
            deleted_files.push(script.text_file_name.clone());
        }
        if state.metadata.delete(&script.script_id).await? {
            info!(script_id = %script.script_id, "Deleted orphaned metadata");
            deleted_files.push(MetadataStore::file_name(&script.script_id));
        }
    }

    let deleted_count = deleted_files.len();
    info!(deleted_count, "Cleanup finished");

    Ok(Json(CleanupResponse {
        success: true,
        message: format!("Cleaned up {} malformed files", deleted_count),
        deleted_count,
        deleted_files,
    }))
}
