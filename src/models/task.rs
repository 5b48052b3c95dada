//! Task entity and its status state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{validate_optional_text, validate_required_text, ValidationError};

pub const TASK_TITLE_MAX: usize = 150;
pub const TASK_DESCRIPTION_MAX: usize = 150;

/// Task status enumeration.
///
/// Only `Pending` and `InProgress` are eligible for the automatic transition
/// to `Overdue`. `Overdue`, `Completed` and `Cancelled` are terminal with
/// respect to automation; `InReview` is likewise never touched by the scan
/// but remains user-mutable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task has not been started yet
    Pending,
    /// Task is actively being worked on
    InProgress,
    /// Due date passed while the task was still actionable
    Overdue,
    /// Work finished, awaiting review
    InReview,
    /// Task finished successfully
    Completed,
    /// Task was abandoned
    Cancelled,
}

impl TaskStatus {
    /// Statuses the overdue scan may transition away from.
    pub const AUTOMATABLE: [TaskStatus; 2] = [TaskStatus::Pending, TaskStatus::InProgress];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Overdue => "overdue",
            TaskStatus::InReview => "in_review",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    /// Parse the persisted text form. Any other string is a data error.
    pub fn parse(s: &str) -> Option<TaskStatus> {
        match s {
            "pending" => Some(TaskStatus::Pending),
            "in_progress" => Some(TaskStatus::InProgress),
            "overdue" => Some(TaskStatus::Overdue),
            "in_review" => Some(TaskStatus::InReview),
            "completed" => Some(TaskStatus::Completed),
            "cancelled" => Some(TaskStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task row.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: i64,
    pub project_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub created_by: i64,
    pub assigned_to: Option<i64>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Request to create a task.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskCreate {
    pub project_id: i64,
    pub title: String,
    pub description: Option<String>,
    /// Defaults to `pending` when omitted
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<i64>,
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskCreate {
    /// Validate fields and return the normalized (trimmed) title.
    pub fn validated_title(&self) -> Result<String, ValidationError> {
        let title = validate_required_text(&self.title, "Task title", TASK_TITLE_MAX)?;
        validate_optional_text(
            self.description.as_deref(),
            "Task description",
            TASK_DESCRIPTION_MAX,
        )?;
        Ok(title)
    }
}

/// Request to update a task. Omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<i64>,
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskUpdate {
    /// Validate fields and return the normalized title, if one was supplied.
    pub fn validated_title(&self) -> Result<Option<String>, ValidationError> {
        validate_optional_text(
            self.description.as_deref(),
            "Task description",
            TASK_DESCRIPTION_MAX,
        )?;
        self.title
            .as_deref()
            .map(|t| validate_required_text(t, "Task title", TASK_TITLE_MAX))
            .transpose()
    }
}

/// Task response enriched with human-readable related fields.
#[derive(Debug, Clone, Serialize)]
pub struct TaskResponse {
    pub id: i64,
    pub project_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub created_by: i64,
    pub assigned_to: Option<i64>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub project_name: String,
    pub assigned_to_email: Option<String>,
    pub created_by_email: String,
}
