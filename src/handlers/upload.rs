use axum::{
    extract::{multipart::MultipartError, Extension, Multipart, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::RequestId;
use crate::models::{
    is_valid_user_id, sanitize_file_name, ScriptFormat, StagedFile, UploadForm, UploadResponse,
    UploadedScript,
};
use crate::services::FileStore;
use crate::state::AppState;

/// `POST /upload`: store a screenplay, extract its text, record metadata.
pub async fn upload_handler(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let start = Instant::now();

    info!(request_id = %request_id, "Starting upload request");

    let form = read_upload_form(&state, &mut multipart).await?;

    let user_id = form
        .user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or(AppError::MissingUserId)?;
    let staged = form.file.ok_or(AppError::MissingFile)?;

    if !is_valid_user_id(&user_id) {
        return Err(AppError::validation("User ID must not contain path separators"));
    }

    let script_id = Uuid::new_v4().to_string();
    let file_name = FileStore::stored_file_name(&user_id, &script_id, &staged.original_name);
    let text_file_name = FileStore::text_file_name(&script_id);

    let file_path = state.files.persist(staged.temp, &file_name)?;

    info!(
        request_id = %request_id,
        script_id = %script_id,
        user_id = %user_id,
        file_type = %staged.format,
        size = staged.size,
        "Processing file: {}",
        file_name
    );

    let mut script = UploadedScript {
        script_id,
        user_id,
        original_name: staged.original_name,
        file_name,
        text_file_path: state.files.path_for(&text_file_name),
        text_file_name,
        file_path,
        uploaded_at: Utc::now(),
        size: staged.size,
        file_type: staged.format,
        extracted_length: 0,
        has_text_extraction: false,
    };

    if let Err(e) = extract_and_record(&state, &mut script).await {
        error!(
            request_id = %request_id,
            script_id = %script.script_id,
            error = %e,
            "Upload processing failed"
        );
        if let Err(cleanup_err) = state.files.remove(&script.file_path).await {
            warn!(error = %cleanup_err, "Failed to remove stored upload after error");
        }
        return Err(e);
    }

    info!(
        request_id = %request_id,
        script_id = %script.script_id,
        extracted_length = script.extracted_length,
        total_time_ms = start.elapsed().as_millis() as u64,
        "File processed successfully"
    );

    Ok(Json(UploadResponse::new(&script)))
}

/// Extract → sidecar → metadata, in that order. Earlier artifacts are left
/// in place if a later step fails.
async fn extract_and_record(state: &AppState, script: &mut UploadedScript) -> AppResult<()> {
    let extraction = state
        .extractor
        .extract(&script.file_path, script.file_type)
        .await?;

    script.text_file_path = state
        .files
        .write_text(&script.script_id, &extraction.text)
        .await?;
    script.extracted_length = extraction.char_count();
    // Set even when extraction degraded to placeholder text.
    script.has_text_extraction = true;

    state.metadata.save(script).await?;
    Ok(())
}

async fn read_upload_form(state: &AppState, multipart: &mut Multipart) -> AppResult<UploadForm> {
    let limit_bytes = state.config.max_file_size_bytes();
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| multipart_error(state, e))? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "userId" => {
                let value = field.text().await.map_err(|e| multipart_error(state, e))?;
                form.user_id = Some(value);
            }
            "file" => {
                if form.file.is_some() {
                    return Err(AppError::invalid_upload("Only one file may be uploaded"));
                }

                let original_name = sanitize_file_name(field.file_name().unwrap_or(""));
                // Filter stage: reject before any bytes touch the disk.
                let format = ScriptFormat::from_file_name(&original_name)?;

                let data = field.bytes().await.map_err(|e| multipart_error(state, e))?;
                if data.len() > limit_bytes {
                    warn!(
                        file_size = data.len(),
                        max_size = limit_bytes,
                        "File size exceeds limit"
                    );
                    return Err(AppError::FileTooLarge {
                        limit: state.config.max_file_size_mb,
                    });
                }

                let temp = state.files.stage(&data)?;
                debug!(
                    file_name = %original_name,
                    file_type = %format,
                    size = data.len(),
                    "File extracted from multipart form"
                );

                form.file = Some(StagedFile {
                    original_name,
                    format,
                    size: data.len() as u64,
                    temp,
                });
            }
            other => {
                debug!(field = %other, "Ignoring unexpected multipart field");
            }
        }
    }

    Ok(form)
}

fn multipart_error(state: &AppState, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::FileTooLarge {
            limit: state.config.max_file_size_mb,
        }
    } else {
        AppError::invalid_upload(format!("Failed to read multipart field: {}", err.body_text()))
    }
}
