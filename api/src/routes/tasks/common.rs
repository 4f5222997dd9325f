//! # Task Request/Response DTOs
//!
//! Payload types shared by the handlers under the `/tasks` route group.

use db::models::task::{Model as TaskModel, TaskPriority};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub completed: Option<bool>,
    pub priority: Option<TaskPriority>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<TaskPriority>,
}

#[derive(Debug, Default, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<TaskModel>,
    pub count: usize,
}
