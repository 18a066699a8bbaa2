use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::files::handlers::list_files;
use crate::features::files::services::FileService;

/// Create routes for the files feature
pub fn routes(file_service: Arc<FileService>) -> Router {
    Router::new()
        .route("/api/files", get(list_files))
        .with_state(file_service)
}
