use tempfile::NamedTempFile;

use crate::models::ScriptFormat;

/// An uploaded file that passed the type filter and sits in a `temp-` file
/// inside the upload directory. Dropping it removes the temp file.
#[derive(Debug)]
pub struct StagedFile {
    pub original_name: String,
    pub format: ScriptFormat,
    pub size: u64,
    pub temp: NamedTempFile,
}

/// Fields collected from a `POST /upload` multipart body.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub user_id: Option<String>,
    pub file: Option<StagedFile>,
}

/// Keeps only the final path component of a client-supplied file name.
pub fn sanitize_file_name(name: &str) -> String {
    name.rsplit(['/', '\\'])
        .next()
        .unwrap_or(name)
        .trim()
        .to_string()
}

/// User ids end up in stored file names, so they may not act as paths.
pub fn is_valid_user_id(user_id: &str) -> bool {
    !user_id.is_empty()
        && user_id != "."
        && user_id != ".."
        && !user_id.contains(['/', '\\', '\0'])
}
