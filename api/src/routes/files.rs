//! Markdown file discovery.

use crate::response::ApiResponse;
use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::get};
use std::path::PathBuf;
use util::{config, markdown, state::AppState};

pub fn files_routes() -> Router<AppState> {
    Router::new().route("/", get(get_files))
}

/// GET /api/files
///
/// Recursively lists the markdown files under the configured content root,
/// as paths relative to that root. Dependency and VCS directories are
/// skipped, and unreadable subdirectories are ignored.
///
/// # Responses
/// - `200 OK` — Array of relative paths.
///
/// ```json
/// {
///   "success": true,
///   "data": ["README.md", "docs/setup.md"],
///   "message": "Markdown files retrieved successfully"
/// }
/// ```
async fn get_files() -> impl IntoResponse {
    let root = PathBuf::from(config::content_root());
    let files = markdown::list_markdown_files(&root);

    (
        StatusCode::OK,
        Json(ApiResponse::success(
            files,
            "Markdown files retrieved successfully",
        )),
    )
}
