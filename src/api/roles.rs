//! Role management handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use super::error::ApiError;
use super::routes::AppState;
use crate::models::{Role, RoleCreate, RoleUpdate};

/// `GET /api/roles`
pub async fn list_roles(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Role>>, ApiError> {
    Ok(Json(state.db.list_roles().await?))
}

/// `GET /api/roles/{id}`
pub async fn get_role(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Role>, ApiError> {
    let role = state
        .db
        .get_role(id)
        .await?
        .ok_or(ApiError::NotFound("Role"))?;
    Ok(Json(role))
}

/// `POST /api/roles`
pub async fn create_role(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RoleCreate>,
) -> Result<impl IntoResponse, ApiError> {
    let name = req.validated_name()?;
    if state.db.find_role_by_name(name.clone()).await?.is_some() {
        return Err(ApiError::BadRequest("Role name already exists".to_string()));
    }
    let role = state.db.create_role(name, req.description).await?;
    Ok((StatusCode::CREATED, Json(role)))
}

/// `PUT /api/roles/{id}`
pub async fn update_role(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<RoleUpdate>,
) -> Result<Json<Role>, ApiError> {
    let mut role = state
        .db
        .get_role(id)
        .await?
        .ok_or(ApiError::NotFound("Role"))?;

    if let Some(name) = req.validated_name()? {
        // Renames must not collide with another role (case-insensitive).
        if let Some(existing) = state.db.find_role_by_name(name.clone()).await? {
            if existing.id != id {
                return Err(ApiError::BadRequest("Role name already exists".to_string()));
            }
        }
        role.name = name;
    }
    if let Some(description) = req.description {
        role.description = Some(description);
    }

    let role = state.db.update_role(role).await?;
    Ok(Json(role))
}

/// `DELETE /api/roles/{id}`
pub async fn delete_role(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !state.db.delete_role(id).await? {
        return Err(ApiError::NotFound("Role"));
    }
    Ok(StatusCode::NO_CONTENT)
}
