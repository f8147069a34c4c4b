//! Task record and request payloads.
//!
//! `Task` is the immutable shape returned by the task endpoints. Dates travel
//! as ISO-8601 strings and all date-only comparisons elsewhere in the crate
//! use the first ten characters of those strings.

use serde::{Deserialize, Serialize};

use crate::fields::{TaskPriority, TaskStatus};

/// A unit of work belonging to a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub task_id: i64,
    pub project_id: i64,
    pub title: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(default)]
    pub assigned_user_ids: Vec<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl Task {
    /// First assignee, treated as the primary one by convention.
    pub fn primary_assignee(&self) -> Option<i64> {
        self.assigned_user_ids.first().copied()
    }
}

/// Date portion (first ten characters) of an ISO-8601 date or date-time string.
pub fn date_part(s: &str) -> &str {
    s.get(..10).unwrap_or(s)
}

/// Payload for `POST /api/v1/tasks`.
///
/// Status and priority are plain strings here; the create endpoint accepts
/// the wire spellings rather than requiring the enum serialization.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCreateRequest {
    pub project_id: i64,
    pub title: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub status: String,
    pub priority: String,
    pub assigned_user_ids: Vec<i64>,
}

/// Payload for `PUT /api/v1/tasks/{taskId}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdateRequest {
    pub title: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
}

/// Payload for the assign/unassign endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAssignRequest {
    pub user_id: i64,
}

/// Payload for `PUT /api/v1/tasks/{taskId}/status`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusUpdateRequest {
    pub status: TaskStatus,
}
