//! Task management handlers.
//!
//! Reads of a single task apply the overdue check inline, so a client
//! always sees the current status even between scheduler runs.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use tracing::info;

use super::auth::CurrentUser;
use super::error::ApiError;
use super::routes::AppState;
use crate::models::{Page, Pagination, TaskCreate, TaskResponse, TaskStatus, TaskUpdate};
use crate::store::NewTask;

/// `GET /api/tasks`
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Query(page): Query<Pagination>,
) -> Result<Json<Page<TaskResponse>>, ApiError> {
    let limit = page.limit();
    let (items, total) = state.db.list_task_responses(page.skip, limit).await?;
    Ok(Json(Page::new(items, total, page.skip, limit)))
}

/// `GET /api/tasks/{id}`
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = state
        .db
        .get_task(id)
        .await?
        .ok_or(ApiError::NotFound("Task"))?;
    let task = state.db.check_task_overdue(task, Utc::now()).await?;
    let response = state
        .db
        .get_task_response(task.id)
        .await?
        .ok_or(ApiError::NotFound("Task"))?;
    Ok(Json(response))
}

/// `POST /api/tasks`
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<TaskCreate>,
) -> Result<impl IntoResponse, ApiError> {
    let title = req.validated_title()?;

    if state.db.get_project(req.project_id).await?.is_none() {
        return Err(ApiError::BadRequest("Project does not exist".to_string()));
    }
    if let Some(assignee) = req.assigned_to {
        if state.db.get_user(assignee).await?.is_none() {
            return Err(ApiError::BadRequest(
                "Assigned user does not exist".to_string(),
            ));
        }
    }

    let task = state
        .db
        .create_task(NewTask {
            project_id: req.project_id,
            title,
            description: req.description,
            status: req.status.unwrap_or(TaskStatus::Pending),
            created_by: current.0.id,
            assigned_to: req.assigned_to,
            due_date: req.due_date,
        })
        .await?;
    info!(task_id = task.id, project_id = task.project_id, "task created");

    let response = state
        .db
        .get_task_response(task.id)
        .await?
        .ok_or(ApiError::NotFound("Task"))?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// `PUT /api/tasks/{id}`
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<TaskUpdate>,
) -> Result<Json<TaskResponse>, ApiError> {
    let mut task = state
        .db
        .get_task(id)
        .await?
        .ok_or(ApiError::NotFound("Task"))?;

    if let Some(title) = req.validated_title()? {
        task.title = title;
    }
    if let Some(description) = req.description {
        task.description = Some(description);
    }
    if let Some(status) = req.status {
        task.status = status;
    }
    if let Some(assignee) = req.assigned_to {
        if state.db.get_user(assignee).await?.is_none() {
            return Err(ApiError::BadRequest(
                "Assigned user does not exist".to_string(),
            ));
        }
        task.assigned_to = Some(assignee);
    }
    if let Some(due_date) = req.due_date {
        task.due_date = Some(due_date);
    }

    let task = state.db.update_task(task).await?;
    let response = state
        .db
        .get_task_response(task.id)
        .await?
        .ok_or(ApiError::NotFound("Task"))?;
    Ok(Json(response))
}

/// `DELETE /api/tasks/{id}`
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !state.db.delete_task(id).await? {
        return Err(ApiError::NotFound("Task"));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/tasks/project/{project_id}`
pub async fn list_project_tasks(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<i64>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    if state.db.get_project(project_id).await?.is_none() {
        return Err(ApiError::NotFound("Project"));
    }
    Ok(Json(state.db.list_tasks_by_project(project_id).await?))
}

/// `GET /api/tasks/user/{user_id}` - tasks assigned to the user.
pub async fn list_user_tasks(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    if state.db.get_user(user_id).await?.is_none() {
        return Err(ApiError::NotFound("User"));
    }
    Ok(Json(state.db.list_tasks_by_assignee(user_id).await?))
}
