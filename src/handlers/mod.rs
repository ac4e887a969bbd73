pub mod files;
pub mod health;
pub mod maintenance;
pub mod upload;

pub use files::*;
pub use health::*;
pub use maintenance::*;
pub use upload::*;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::middleware::logging_middleware;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.body_limit_bytes();
    let uploads = ServeDir::new(state.files.dir());

    Router::new()
        .route("/health", get(health_handler))
        .route("/upload", post(upload_handler))
        .route("/files/:user_id", get(list_files_handler))
        .route("/files/:user_id/:script_id", delete(delete_file_handler))
        .route("/text/:user_id/:script_id", get(get_text_handler))
        .route("/metadata/:script_id", get(get_metadata_handler))
        .route("/cleanup", delete(cleanup_handler))
        .nest_service("/uploads", uploads)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(body_limit))
                .layer(axum::middleware::from_fn(logging_middleware)),
        )
        .with_state(state)
}
