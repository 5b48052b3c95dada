//! Project membership: links a user to a project with a role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A project member row. (project_id, user_id) pairs are unique.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectMember {
    pub id: i64,
    pub project_id: i64,
    pub user_id: i64,
    pub role_id: i64,
    pub added_by: i64,
    pub created_at: DateTime<Utc>,
}

/// Request to add a user to a project.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectMemberCreate {
    pub project_id: i64,
    pub user_id: i64,
    pub role_id: i64,
}

/// Request to change a member's role.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectMemberUpdate {
    pub role_id: i64,
}

/// Membership response enriched with display names.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectMemberResponse {
    pub id: i64,
    pub project_id: i64,
    pub user_id: i64,
    pub role_id: i64,
    pub added_by: i64,
    pub created_at: DateTime<Utc>,
    pub user_name: String,
    pub role_name: String,
    pub added_by_name: String,
}
