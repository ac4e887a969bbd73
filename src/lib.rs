//! ScriptCraft upload service
//!
//! Accepts screenplay uploads (PDF, DOCX, TXT, Fountain, FDX), extracts
//! their plain text into a sidecar file and keeps one JSON metadata record
//! per upload on local disk.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use handlers::create_router;
pub use state::AppState;
