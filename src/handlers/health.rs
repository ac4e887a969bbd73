use axum::{extract::State, response::Json};
use chrono::Utc;
use tracing::info;

use crate::models::{HealthResponse, ServiceStatus};
use crate::state::AppState;

/// Health check endpoint. Always 200; a missing `pdftotext` only degrades
/// PDF extraction.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let pdftotext = state.extractor.pdftotext_available().await;

    info!(pdftotext_available = pdftotext, "Health check completed");

    Json(HealthResponse {
        success: true,
        message: "Server is running".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services: ServiceStatus { pdftotext },
    })
}
