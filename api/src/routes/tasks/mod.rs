use axum::Router;
use axum::routing::{delete, get, patch, post};
use util::state::AppState;

pub mod common;
pub mod delete;
pub mod get;
pub mod patch;
pub mod post;

use delete::delete_task;
use get::get_tasks;
use patch::edit_task;
use post::create_task;

pub fn tasks_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_tasks))
        .route("/", post(create_task))
        .route("/{task_id}", patch(edit_task))
        .route("/{task_id}", delete(delete_task))
}
