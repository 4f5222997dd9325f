//! Markdown rendering endpoint.

use crate::response::ApiResponse;
use axum::{
    Json, Router,
    extract::Query,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use std::path::PathBuf;
use util::{
    config,
    markdown::{self, MarkdownError, RenderedMarkdown},
    state::AppState,
};

pub fn markdown_routes() -> Router<AppState> {
    Router::new().route("/", get(get_markdown))
}

#[derive(Debug, Deserialize)]
pub struct MarkdownQuery {
    pub file: Option<String>,
}

/// GET /api/markdown?file=docs/setup.md
///
/// Reads one markdown file relative to the configured content root and
/// returns the raw source alongside sanitized HTML.
///
/// # Query Parameters
/// - `file`: Path of the markdown file, relative to the content root.
///
/// # Responses
/// - `200 OK` — `{ content, html, file }`.
/// - `400 BAD REQUEST` — Missing `file` parameter.
/// - `403 FORBIDDEN` — Path escapes the content root, or is not a `.md` file.
/// - `404 NOT FOUND` — File does not exist.
/// - `500 INTERNAL SERVER ERROR` — Read failure.
async fn get_markdown(Query(params): Query<MarkdownQuery>) -> impl IntoResponse {
    let Some(file) = params.file else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error("File parameter is required")),
        )
            .into_response();
    };

    let root = PathBuf::from(config::content_root());

    match markdown::read_rendered(&root, &file) {
        Ok(rendered) => (
            StatusCode::OK,
            Json(ApiResponse::<RenderedMarkdown>::success(
                rendered,
                "Markdown rendered successfully",
            )),
        )
            .into_response(),
        Err(err) => {
            let status = match err {
                MarkdownError::OutsideRoot | MarkdownError::NotMarkdown => StatusCode::FORBIDDEN,
                MarkdownError::NotFound => StatusCode::NOT_FOUND,
                MarkdownError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            if status == StatusCode::INTERNAL_SERVER_ERROR {
                tracing::error!("Error rendering {file}: {err}");
            }
            (status, Json(ApiResponse::<()>::error(err.to_string()))).into_response()
        }
    }
}
