//! Project membership queries.
//!
//! Responses are enriched with display names via LEFT JOIN so a deleted
//! related row degrades to a placeholder instead of failing the request.

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use super::{parse_ts, ts, Database, StoreError};
use crate::models::{ProjectMember, ProjectMemberResponse};

fn map_member(row: &Row<'_>) -> rusqlite::Result<ProjectMember> {
    Ok(ProjectMember {
        id: row.get(0)?,
        project_id: row.get(1)?,
        user_id: row.get(2)?,
        role_id: row.get(3)?,
        added_by: row.get(4)?,
        created_at: parse_ts(5, row.get(5)?)?,
    })
}

fn map_member_response(row: &Row<'_>) -> rusqlite::Result<ProjectMemberResponse> {
    Ok(ProjectMemberResponse {
        id: row.get(0)?,
        project_id: row.get(1)?,
        user_id: row.get(2)?,
        role_id: row.get(3)?,
        added_by: row.get(4)?,
        created_at: parse_ts(5, row.get(5)?)?,
        user_name: row.get(6)?,
        role_name: row.get(7)?,
        added_by_name: row.get(8)?,
    })
}

const MEMBER_RESPONSE_QUERY: &str = "
    SELECT m.id, m.project_id, m.user_id, m.role_id, m.added_by, m.created_at,
           COALESCE(u.name, 'Unknown User') AS user_name,
           COALESCE(r.name, 'Unknown Role') AS role_name,
           COALESCE(a.name, 'Unknown User') AS added_by_name
    FROM project_members m
    LEFT JOIN users u ON u.id = m.user_id
    LEFT JOIN roles r ON r.id = m.role_id
    LEFT JOIN users a ON a.id = m.added_by";

impl Database {
    pub async fn create_member(
        &self,
        project_id: i64,
        user_id: i64,
        role_id: i64,
        added_by: i64,
    ) -> Result<ProjectMember, StoreError> {
        self.call(move |conn| {
            conn.execute(
                "INSERT INTO project_members (project_id, user_id, role_id, added_by, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![project_id, user_id, role_id, added_by, ts(Utc::now())],
            )?;
            let id = conn.last_insert_rowid();
            let member = conn.query_row(
                "SELECT id, project_id, user_id, role_id, added_by, created_at
                 FROM project_members WHERE id = ?1",
                params![id],
                map_member,
            )?;
            Ok(member)
        })
        .await
    }

    pub async fn get_member(&self, id: i64) -> Result<Option<ProjectMember>, StoreError> {
        self.call(move |conn| {
            conn.query_row(
                "SELECT id, project_id, user_id, role_id, added_by, created_at
                 FROM project_members WHERE id = ?1",
                params![id],
                map_member,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    pub async fn get_member_response(
        &self,
        id: i64,
    ) -> Result<Option<ProjectMemberResponse>, StoreError> {
        self.call(move |conn| {
            conn.query_row(
                &format!("{MEMBER_RESPONSE_QUERY} WHERE m.id = ?1"),
                params![id],
                map_member_response,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    pub async fn find_member(
        &self,
        project_id: i64,
        user_id: i64,
    ) -> Result<Option<ProjectMember>, StoreError> {
        self.call(move |conn| {
            conn.query_row(
                "SELECT id, project_id, user_id, role_id, added_by, created_at
                 FROM project_members WHERE project_id = ?1 AND user_id = ?2",
                params![project_id, user_id],
                map_member,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    pub async fn list_members(&self) -> Result<Vec<ProjectMemberResponse>, StoreError> {
        self.call(|conn| {
            let mut stmt =
                conn.prepare(&format!("{MEMBER_RESPONSE_QUERY} ORDER BY m.created_at DESC"))?;
            let members = stmt
                .query_map([], map_member_response)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(members)
        })
        .await
    }

    pub async fn list_members_by_project(
        &self,
        project_id: i64,
    ) -> Result<Vec<ProjectMemberResponse>, StoreError> {
        self.call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{MEMBER_RESPONSE_QUERY} WHERE m.project_id = ?1 ORDER BY m.created_at DESC"
            ))?;
            let members = stmt
                .query_map(params![project_id], map_member_response)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(members)
        })
        .await
    }

    pub async fn list_members_by_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<ProjectMemberResponse>, StoreError> {
        self.call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{MEMBER_RESPONSE_QUERY} WHERE m.user_id = ?1 ORDER BY m.created_at DESC"
            ))?;
            let members = stmt
                .query_map(params![user_id], map_member_response)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(members)
        })
        .await
    }

    pub async fn update_member_role(&self, id: i64, role_id: i64) -> Result<bool, StoreError> {
        self.call(move |conn| {
            let n = conn.execute(
                "UPDATE project_members SET role_id = ?1 WHERE id = ?2",
                params![role_id, id],
            )?;
            Ok(n > 0)
        })
        .await
    }

    pub async fn delete_member(&self, id: i64) -> Result<bool, StoreError> {
        self.call(move |conn| {
            let n = conn.execute("DELETE FROM project_members WHERE id = ?1", params![id])?;
            Ok(n > 0)
        })
        .await
    }
}
