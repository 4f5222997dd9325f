//! Edit task handler.

use crate::response::ApiResponse;
use crate::routes::tasks::common::UpdateTaskRequest;
use axum::{Json, extract::Path, extract::State, http::StatusCode, response::IntoResponse};
use db::models::task::Model as TaskModel;
use util::state::AppState;

/// PATCH /api/tasks/{task_id}
///
/// Applies a partial update to a task. Only the fields present in the body
/// are changed; `updated_at` is always refreshed.
///
/// # Request Body
/// ```json
/// {
///   "title": "Write better docs",
///   "completed": true
/// }
/// ```
///
/// # Responses
/// - `200 OK` — Returns the updated task.
/// - `400 BAD REQUEST` — `title` is present but blank.
/// - `404 NOT FOUND` — No task with that id.
/// - `500 INTERNAL SERVER ERROR` — Database error.
pub async fn edit_task(
    State(app_state): State<AppState>,
    Path(task_id): Path<i64>,
    Json(req): Json<UpdateTaskRequest>,
) -> impl IntoResponse {
    if let Some(ref title) = req.title {
        if title.trim().is_empty() {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<()>::error("Title cannot be empty")),
            )
                .into_response();
        }
    }

    let db = app_state.db();
    let result = TaskModel::edit(
        db,
        task_id,
        req.title.as_deref(),
        req.completed,
        req.priority,
    )
    .await;

    match result {
        Ok(Some(task)) => (
            StatusCode::OK,
            Json(ApiResponse::success(task, "Task updated successfully")),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error("Task not found")),
        )
            .into_response(),
        Err(err) => {
            tracing::error!("Error updating task {task_id}: {err:?}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error("Failed to update task")),
            )
                .into_response()
        }
    }
}
