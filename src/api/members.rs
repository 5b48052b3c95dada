//! Project membership handlers.

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
use crate::models::{ProjectMemberCreate, ProjectMemberResponse, ProjectMemberUpdate};

/// `GET /api/project-members`
pub async fn list_members(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ProjectMemberResponse>>, ApiError> {
    Ok(Json(state.db.list_members().await?))
}

/// `GET /api/project-members/{id}`
pub async fn get_member(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ProjectMemberResponse>, ApiError> {
    let member = state
        .db
        .get_member_response(id)
        .await?
        .ok_or(ApiError::NotFound("Membership"))?;
    Ok(Json(member))
}

/// `POST /api/project-members`
pub async fn create_member(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<ProjectMemberCreate>,
) -> Result<impl IntoResponse, ApiError> {
    if state.db.get_project(req.project_id).await?.is_none() {
        return Err(ApiError::BadRequest("Project does not exist".to_string()));
    }
    if state.db.get_user(req.user_id).await?.is_none() {
        return Err(ApiError::BadRequest("User does not exist".to_string()));
    }
    if state.db.get_role(req.role_id).await?.is_none() {
        return Err(ApiError::BadRequest("Role does not exist".to_string()));
    }
    if state
        .db
        .find_member(req.project_id, req.user_id)
        .await?
        .is_some()
    {
        return Err(ApiError::BadRequest(
            "User is already a member of this project".to_string(),
        ));
    }

    let member = state
        .db
        .create_member(req.project_id, req.user_id, req.role_id, current.0.id)
        .await?;
    info!(
        member_id = member.id,
        project_id = member.project_id,
        user_id = member.user_id,
        "project member added"
    );

    let response = state
        .db
        .get_member_response(member.id)
        .await?
        .ok_or(ApiError::NotFound("Membership"))?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// `PUT /api/project-members/{id}`
pub async fn update_member(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<ProjectMemberUpdate>,
) -> Result<Json<ProjectMemberResponse>, ApiError> {
    if state.db.get_member(id).await?.is_none() {
        return Err(ApiError::NotFound("Membership"));
    }
    if state.db.get_role(req.role_id).await?.is_none() {
        return Err(ApiError::BadRequest("Role does not exist".to_string()));
    }
    state.db.update_member_role(id, req.role_id).await?;
    let response = state
        .db
        .get_member_response(id)
        .await?
        .ok_or(ApiError::NotFound("Membership"))?;
    Ok(Json(response))
}

/// `DELETE /api/project-members/{id}`
pub async fn delete_member(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !state.db.delete_member(id).await? {
        return Err(ApiError::NotFound("Membership"));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/project-members/project/{project_id}`
pub async fn list_project_members(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<i64>,
) -> Result<Json<Vec<ProjectMemberResponse>>, ApiError> {
    if state.db.get_project(project_id).await?.is_none() {
        return Err(ApiError::NotFound("Project"));
    }
    Ok(Json(state.db.list_members_by_project(project_id).await?))
}

/// `GET /api/project-members/user/{user_id}` - the user's memberships.
pub async fn list_user_members(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<ProjectMemberResponse>>, ApiError> {
    if state.db.get_user(user_id).await?.is_none() {
        return Err(ApiError::NotFound("User"));
    }
    Ok(Json(state.db.list_members_by_user(user_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::ProjectStatus;
    use crate::store::{Database, NewProject};
    use std::path::PathBuf;

    async fn test_state() -> (Arc<AppState>, Database) {
        let db = Database::open_in_memory().await.unwrap();
        let config = Config::for_tests(PathBuf::from(":memory:"));
        (Arc::new(AppState::new(config, db.clone())), db)
    }

    async fn seed_member(db: &Database) -> (i64, i64) {
        let user = db
            .create_user("Ada".into(), "ada@example.com".into(), "h".into())
            .await
            .unwrap();
        let project = db
            .create_project(NewProject {
                name: "CRM".into(),
                status: ProjectStatus::Active,
                budget: None,
                start_date: None,
                notes: None,
                created_by: user.id,
            })
            .await
            .unwrap();
        let role = db.create_role("Developer".into(), None).await.unwrap();
        let member = db
            .create_member(project.id, user.id, role.id, user.id)
            .await
            .unwrap();
        (member.id, role.id)
    }

    #[tokio::test]
    async fn test_update_missing_membership_is_not_found() {
        // Existence is checked before the role, so a missing membership is a
        // 404 even when the role id is also bogus.
        let (state, _db) = test_state().await;
        let req = ProjectMemberUpdate { role_id: 999 };
        let result = update_member(State(state), Path(42), Json(req)).await;
        assert!(matches!(result, Err(ApiError::NotFound("Membership"))));
    }

    #[tokio::test]
    async fn test_update_unknown_role_is_bad_request() {
        let (state, db) = test_state().await;
        let (member_id, _) = seed_member(&db).await;
        let req = ProjectMemberUpdate { role_id: 999 };
        let result = update_member(State(state), Path(member_id), Json(req)).await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_update_changes_role() {
        let (state, db) = test_state().await;
        let (member_id, _) = seed_member(&db).await;
        let designer = db.create_role("Designer".into(), None).await.unwrap();

        let req = ProjectMemberUpdate {
            role_id: designer.id,
        };
        let updated = update_member(State(state), Path(member_id), Json(req))
            .await
            .unwrap();
        assert_eq!(updated.0.role_name, "Designer");

        let stored = db.get_member(member_id).await.unwrap().unwrap();
        assert_eq!(stored.role_id, designer.id);
    }
}
