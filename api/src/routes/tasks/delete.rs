//! Delete task handler.

use crate::response::ApiResponse;
use axum::{Json, extract::Path, extract::State, http::StatusCode, response::IntoResponse};
use db::models::task::Model as TaskModel;
use util::state::AppState;

/// DELETE /api/tasks/{task_id}
///
/// # Responses
/// - `200 OK` — The task was deleted.
/// - `404 NOT FOUND` — No task with that id.
/// - `500 INTERNAL SERVER ERROR` — Database error.
pub async fn delete_task(
    State(app_state): State<AppState>,
    Path(task_id): Path<i64>,
) -> impl IntoResponse {
    let db = app_state.db();

    match TaskModel::delete(db, task_id).await {
        Ok(true) => (
            StatusCode::OK,
            Json(ApiResponse::success((), "Task deleted successfully")),
        )
            .into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error("Task not found")),
        )
            .into_response(),
        Err(err) => {
            tracing::error!("Error deleting task {task_id}: {err:?}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error("Failed to delete task")),
            )
                .into_response()
        }
    }
}
