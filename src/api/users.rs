//! User management handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;

use super::error::ApiError;
use super::routes::AppState;
use crate::models::{
    validate_email, validate_required_text, UserCreate, UserResponse, UserUpdate, USER_NAME_MAX,
};
use crate::security;

/// `GET /api/users`
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.db.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// `GET /api/users/{id}`
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .db
        .get_user(id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(Json(UserResponse::from(user)))
}

/// `POST /api/users`
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UserCreate>,
) -> Result<impl IntoResponse, ApiError> {
    let (name, email) = req.validated()?;
    if state.db.find_user_by_email(email.clone()).await?.is_some() {
        return Err(ApiError::BadRequest("Email already registered".to_string()));
    }
    let password_hash = security::hash_password(&req.password);
    let user = state.db.create_user(name, email, password_hash).await?;
    info!(user_id = user.id, "user created");
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// `PUT /api/users/{id}`
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UserUpdate>,
) -> Result<Json<UserResponse>, ApiError> {
    let mut user = state
        .db
        .get_user(id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    if let Some(name) = req.name {
        user.name = validate_required_text(&name, "Name", USER_NAME_MAX)?;
    }
    if let Some(email) = req.email {
        let email = validate_email(&email)?;
        if email != user.email {
            if state.db.find_user_by_email(email.clone()).await?.is_some() {
                return Err(ApiError::BadRequest("Email already registered".to_string()));
            }
            user.email = email;
        }
    }
    if let Some(active) = req.active {
        user.active = active;
    }

    let user = state.db.update_user(user).await?;
    Ok(Json(UserResponse::from(user)))
}

/// `DELETE /api/users/{id}`
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !state.db.delete_user(id).await? {
        return Err(ApiError::NotFound("User"));
    }
    Ok(StatusCode::NO_CONTENT)
}
