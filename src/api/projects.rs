//! Project management handlers.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;

use super::auth::CurrentUser;
use super::error::ApiError;
use super::routes::AppState;
use crate::models::{Project, ProjectCreate, ProjectStatus, ProjectUpdate};
use crate::store::NewProject;

/// `GET /api/projects`
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Project>>, ApiError> {
    Ok(Json(state.db.list_projects().await?))
}

/// `GET /api/projects/{id}`
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Project>, ApiError> {
    let project = state
        .db
        .get_project(id)
        .await?
        .ok_or(ApiError::NotFound("Project"))?;
    Ok(Json(project))
}

/// `POST /api/projects`
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<ProjectCreate>,
) -> Result<impl IntoResponse, ApiError> {
    let name = req.validated_name()?;
    let project = state
        .db
        .create_project(NewProject {
            name,
            status: req.status.unwrap_or(ProjectStatus::Prospect),
            budget: req.budget,
            start_date: req.start_date,
            notes: req.notes,
            created_by: current.0.id,
        })
        .await?;
    info!(project_id = project.id, "project created");
    Ok((StatusCode::CREATED, Json(project)))
}

/// `PUT /api/projects/{id}`
pub async fn update_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<ProjectUpdate>,
) -> Result<Json<Project>, ApiError> {
    let mut project = state
        .db
        .get_project(id)
        .await?
        .ok_or(ApiError::NotFound("Project"))?;

    if let Some(name) = req.validated_name()? {
        project.name = name;
    }
    if let Some(status) = req.status {
        project.status = status;
    }
    if let Some(budget) = req.budget {
        project.budget = Some(budget);
    }
    if let Some(start_date) = req.start_date {
        project.start_date = Some(start_date);
    }
    if let Some(notes) = req.notes {
        project.notes = Some(notes);
    }

    let project = state.db.update_project(project).await?;
    Ok(Json(project))
}

/// `DELETE /api/projects/{id}`
///
/// Tasks and memberships of the project are removed by cascade.
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !state.db.delete_project(id).await? {
        return Err(ApiError::NotFound("Project"));
    }
    Ok(StatusCode::NO_CONTENT)
}
