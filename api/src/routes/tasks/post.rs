//! Create task handler.

use crate::response::ApiResponse;
use crate::routes::tasks::common::CreateTaskRequest;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use db::models::task::Model as TaskModel;
use util::state::AppState;

/// POST /api/tasks
///
/// Creates a new task.
///
/// # Request Body
/// ```json
/// {
///   "title": "Write docs",
///   "completed": false,
///   "priority": "high"
/// }
/// ```
///
/// `completed` defaults to `false` and `priority` to `"medium"` when omitted.
///
/// # Responses
/// - `201 CREATED` — Returns the created task.
/// - `400 BAD REQUEST` — `title` is missing or blank.
/// - `422 UNPROCESSABLE ENTITY` — Malformed JSON body.
/// - `500 INTERNAL SERVER ERROR` — Database error.
pub async fn create_task(
    State(app_state): State<AppState>,
    Json(req): Json<CreateTaskRequest>,
) -> impl IntoResponse {
    if req.title.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error("Title is required")),
        )
            .into_response();
    }

    let db = app_state.db();
    let completed = req.completed.unwrap_or(false);
    let priority = req.priority.unwrap_or_default();

    match TaskModel::create(db, &req.title, completed, priority).await {
        Ok(task) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(task, "Task created successfully")),
        )
            .into_response(),
        Err(err) => {
            tracing::error!("Error creating task: {err:?}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error("Failed to create task")),
            )
                .into_response()
        }
    }
}
