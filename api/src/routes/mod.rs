//! HTTP route entry point for `/api/...`.
//!
//! Route groups include:
//! - `/health` → Health check endpoint
//! - `/tasks` → Task list CRUD
//! - `/files` → Markdown file discovery
//! - `/markdown` → Markdown rendering
//! - `/tests` → Developer test-results dashboard

use crate::routes::{
    files::files_routes, health::health_routes, markdown::markdown_routes, tasks::tasks_routes,
    test_runner::test_runner_routes,
};
use axum::Router;
use util::state::AppState;

pub mod files;
pub mod health;
pub mod markdown;
pub mod tasks;
pub mod test_runner;

/// Builds the complete application router for all HTTP endpoints.
///
/// The returned router has all core API routes mounted under their respective
/// base paths, with `AppState` already applied.
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/health", health_routes())
        .nest("/tasks", tasks_routes())
        .nest("/files", files_routes())
        .nest("/markdown", markdown_routes())
        .nest("/tests", test_runner_routes())
        .with_state(app_state)
}
