use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::files::handlers::{list_files, upload_file};
use crate::features::files::services::FileService;

/// Create routes for the files feature
///
/// Uploads are unbounded unless `max_upload_size` is set.
pub fn routes(file_service: Arc<FileService>, max_upload_size: Option<usize>) -> Router {
    let body_limit = match max_upload_size {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(),
    };

    Router::new()
        .route("/upload", post(upload_file).layer(body_limit))
        .route("/files", get(list_files))
        .with_state(file_service)
}
