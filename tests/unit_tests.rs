//! Unit tests for individual components

use std::path::PathBuf;

use axum::http::StatusCode;
use chrono::Utc;
use scriptcraft::{
    config::{Config, LogFormat},
    error::AppError,
    models::{
        is_valid_user_id, sanitize_file_name, FileEntry, ScriptFormat, UploadResponse,
        UploadedScript,
    },
};

fn sample_script() -> UploadedScript {
    UploadedScript {
        script_id: "6f1c2f8e-1f4e-4c55-9d8a-6b8e0c1d2e3f".to_string(),
        user_id: "alice".to_string(),
        original_name: "pilot.fountain".to_string(),
        file_name: "alice-6f1c2f8e-1f4e-4c55-9d8a-6b8e0c1d2e3f-pilot.fountain".to_string(),
        text_file_name: "6f1c2f8e-1f4e-4c55-9d8a-6b8e0c1d2e3f.txt".to_string(),
        file_path: PathBuf::from("/srv/uploads/does-not-exist.fountain"),
        text_file_path: PathBuf::from("/srv/uploads/does-not-exist.txt"),
        uploaded_at: Utc::now(),
        size: 2048,
        file_type: ScriptFormat::Fountain,
        extracted_length: 1999,
        has_text_extraction: true,
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.server_port, 5000);
    assert_eq!(config.max_file_size_mb, 50);
    assert_eq!(config.max_file_size_bytes(), 50 * 1024 * 1024);
    assert_eq!(config.upload_dir, PathBuf::from("uploads"));
    assert_eq!(config.metadata_dir, PathBuf::from("metadata"));
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation_rejects_zero_values() {
    let config = Config {
        max_file_size_mb: 0,
        ..Config::default()
    };
    assert!(config.validate().is_err());

    let config = Config {
        server_port: 0,
        ..Config::default()
    };
    assert!(config.validate().is_err());

    let config = Config {
        upload_dir: PathBuf::new(),
        ..Config::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_rejects_overflowing_size_limit() {
    let config = Config {
        max_file_size_mb: usize::MAX,
        ..Config::default()
    };
    assert!(config.validate().is_err());
    assert_eq!(config.body_limit_bytes(), usize::MAX);

    let config = Config::default();
    assert_eq!(config.body_limit_bytes(), 51 * 1024 * 1024);
}

#[test]
fn test_log_format_parsing() {
    assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
    assert_eq!("PRETTY".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
    assert!("xml".parse::<LogFormat>().is_err());
}

#[test]
fn test_error_codes() {
    assert_eq!(AppError::MissingUserId.error_code(), "MISSING_USER_ID");
    assert_eq!(AppError::MissingFile.error_code(), "MISSING_FILE");
    assert_eq!(AppError::Forbidden.error_code(), "FORBIDDEN");
    assert_eq!(AppError::FileTooLarge { limit: 50 }.error_code(), "FILE_TOO_LARGE");
    assert_eq!(AppError::validation("test").error_code(), "VALIDATION_ERROR");
}

#[test]
fn test_error_status_codes() {
    assert_eq!(AppError::MissingUserId.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        AppError::UnsupportedFileType { extension: ".exe".to_string() }.status_code(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(AppError::FileTooLarge { limit: 50 }.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(AppError::ScriptNotFound.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(AppError::TextFileNotFound.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(AppError::internal("boom").status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_internal_error_message_is_passed_through() {
    assert_eq!(AppError::internal("disk full").to_string(), "disk full");
    assert_eq!(AppError::MissingUserId.to_string(), "User ID is required");
    assert_eq!(AppError::MissingFile.to_string(), "No file uploaded");
}

#[test]
fn test_error_conversions() {
    let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let app_error: AppError = io_error.into();
    match app_error {
        AppError::Internal { message } => assert!(message.contains("IO error")),
        _ => panic!("Expected Internal error"),
    }

    let anyhow_error = anyhow::anyhow!("Test error");
    let app_error: AppError = anyhow_error.into();
    match app_error {
        AppError::Internal { message } => assert!(message.contains("Test error")),
        _ => panic!("Expected Internal error"),
    }
}

#[test]
fn test_script_format_from_file_name() {
    assert_eq!(ScriptFormat::from_file_name("draft.PDF").unwrap(), ScriptFormat::Pdf);
    assert_eq!(ScriptFormat::from_file_name("draft.docx").unwrap(), ScriptFormat::Docx);
    assert_eq!(ScriptFormat::from_file_name("notes.Txt").unwrap(), ScriptFormat::Txt);
    assert_eq!(
        ScriptFormat::from_file_name("my.pilot.fountain").unwrap(),
        ScriptFormat::Fountain
    );
    assert_eq!(ScriptFormat::from_file_name("draft.fdx").unwrap(), ScriptFormat::Fdx);

    match ScriptFormat::from_file_name("virus.exe") {
        Err(AppError::UnsupportedFileType { extension }) => assert_eq!(extension, ".exe"),
        other => panic!("Expected UnsupportedFileType, got {:?}", other),
    }
    assert!(ScriptFormat::from_file_name("README").is_err());
    assert!(ScriptFormat::from_file_name("archive.pdf.zip").is_err());
}

#[test]
fn test_sanitize_file_name() {
    assert_eq!(sanitize_file_name("draft.pdf"), "draft.pdf");
    assert_eq!(sanitize_file_name("../../etc/draft.pdf"), "draft.pdf");
    assert_eq!(sanitize_file_name("C:\\Users\\me\\draft.pdf"), "draft.pdf");
}

#[test]
fn test_user_id_validation() {
    assert!(is_valid_user_id("firebase-uid-123"));
    assert!(!is_valid_user_id(""));
    assert!(!is_valid_user_id(".."));
    assert!(!is_valid_user_id("alice/../bob"));
}

#[test]
fn test_metadata_serializes_camel_case() {
    let json = serde_json::to_value(sample_script()).unwrap();
    assert_eq!(json["scriptId"], "6f1c2f8e-1f4e-4c55-9d8a-6b8e0c1d2e3f");
    assert_eq!(json["userId"], "alice");
    assert_eq!(json["fileType"], "fountain");
    assert_eq!(json["hasTextExtraction"], true);
    assert_eq!(json["extractedLength"], 1999);
    assert!(json["uploadedAt"].as_str().unwrap().ends_with('Z'));
}

#[test]
fn test_upload_response_creation() {
    let script = sample_script();
    let response = UploadResponse::new(&script);

    assert!(response.success);
    assert_eq!(response.data.script_id, script.script_id);
    assert_eq!(response.data.original_file.original_name, "pilot.fountain");
    assert_eq!(
        response.data.original_file.path,
        format!("/uploads/{}", script.file_name)
    );
    assert_eq!(response.data.text_file.filename, script.text_file_name);
    assert_eq!(response.data.text_file.extracted_length, 1999);
}

#[test]
fn test_file_entry_reports_missing_files() {
    let entry = FileEntry::from_script(sample_script());
    assert_eq!(entry.id, entry.script_id);
    assert!(!entry.file_exists);
    assert!(!entry.text_file_exists);
}
