//! Enumerations shared across the task management API surface.
//!
//! These mirror the wire values the TaskMaster backend exchanges for task
//! status and priority. Both enums double as CLI argument values.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Task lifecycle status as exchanged with the backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[serde(alias = "TODO", alias = "To Do")]
    ToDo,
    #[serde(alias = "In Progress")]
    InProgress,
    #[serde(alias = "Done")]
    Done,
    #[serde(alias = "Cancelled")]
    Canceled,
}

/// Task priority tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    #[serde(alias = "Low")]
    Low,
    #[serde(alias = "Medium")]
    Medium,
    #[serde(alias = "High")]
    High,
}

impl TaskStatus {
    /// The exact spelling the REST API uses in bodies and path segments.
    pub fn wire_label(self) -> &'static str {
        match self {
            TaskStatus::ToDo => "TO_DO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
            TaskStatus::Canceled => "CANCELED",
        }
    }
}

impl TaskPriority {
    /// The exact spelling the REST API uses in bodies and path segments.
    pub fn wire_label(self) -> &'static str {
        match self {
            TaskPriority::Low => "LOW",
            TaskPriority::Medium => "MEDIUM",
            TaskPriority::High => "HIGH",
        }
    }
}

/// Format a task status for display.
pub fn format_status(s: TaskStatus) -> &'static str {
    match s {
        TaskStatus::ToDo => "To Do",
        TaskStatus::InProgress => "In Progress",
        TaskStatus::Done => "Done",
        TaskStatus::Canceled => "Canceled",
    }
}

/// Format a priority for display.
pub fn format_priority(p: TaskPriority) -> &'static str {
    match p {
        TaskPriority::Low => "Low",
        TaskPriority::Medium => "Medium",
        TaskPriority::High => "High",
    }
}
