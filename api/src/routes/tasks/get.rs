//! Get tasks handler.
//!
//! Provides an endpoint to retrieve the task list, newest first, with
//! optional filtering by completion state and priority.

use crate::response::ApiResponse;
use crate::routes::tasks::common::TaskListResponse;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use db::models::task::{Column as TaskColumn, Entity as TaskEntity, TaskPriority};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder};
use serde::Deserialize;
use util::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FilterReq {
    pub completed: Option<String>,
    pub priority: Option<String>,
}

/// GET /api/tasks
///
/// Retrieves all tasks ordered by `created_at DESC`.
///
/// # Query Parameters
///
/// - `completed`: (Optional) Filter by completion state. Accepts `true` or `false`.
/// - `priority`: (Optional) Filter by priority. Accepts `low`, `medium` or `high`.
///
/// # Returns
///
/// - `200 OK`: The task list and its `count`.
/// - `400 BAD REQUEST`: Invalid `completed` or `priority` value.
/// - `500 INTERNAL SERVER ERROR`: Database query failed.
///
/// # Example Response
///
/// ```json
/// {
///   "success": true,
///   "data": {
///     "tasks": [
///       {
///         "id": 1,
///         "title": "Write docs",
///         "completed": false,
///         "priority": "medium",
///         "created_at": "2025-08-16T12:00:00Z",
///         "updated_at": "2025-08-16T12:00:00Z"
///       }
///     ],
///     "count": 1
///   },
///   "message": "Tasks retrieved successfully"
/// }
/// ```
pub async fn get_tasks(
    State(app_state): State<AppState>,
    Query(params): Query<FilterReq>,
) -> impl IntoResponse {
    let db = app_state.db();

    let mut condition = Condition::all();

    if let Some(ref completed) = params.completed {
        match completed.parse::<bool>() {
            Ok(completed) => {
                condition = condition.add(TaskColumn::Completed.eq(completed));
            }
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ApiResponse::<TaskListResponse>::error(
                        "Invalid completed value",
                    )),
                )
                    .into_response();
            }
        }
    }

    if let Some(ref priority) = params.priority {
        let priority = match priority.as_str() {
            "low" => TaskPriority::Low,
            "medium" => TaskPriority::Medium,
            "high" => TaskPriority::High,
            _ => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ApiResponse::<TaskListResponse>::error(
                        "Invalid priority value",
                    )),
                )
                    .into_response();
            }
        };
        condition = condition.add(TaskColumn::Priority.eq(priority));
    }

    let result = TaskEntity::find()
        .filter(condition)
        .order_by_desc(TaskColumn::CreatedAt)
        .all(db)
        .await;

    match result {
        Ok(tasks) => {
            let count = tasks.len();
            (
                StatusCode::OK,
                Json(ApiResponse::success(
                    TaskListResponse { tasks, count },
                    "Tasks retrieved successfully",
                )),
            )
                .into_response()
        }
        Err(err) => {
            tracing::error!("Error fetching tasks: {err:?}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<TaskListResponse>::error(
                    "Failed to retrieve tasks",
                )),
            )
                .into_response()
        }
    }
}
