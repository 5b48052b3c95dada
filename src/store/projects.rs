//! Project queries.

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use super::{parse_opt_ts, parse_ts, ts, Database, StoreError};
use crate::models::{Project, ProjectStatus};

fn map_project(row: &Row<'_>) -> rusqlite::Result<Project> {
    let status_raw: String = row.get(2)?;
    let status = ProjectStatus::parse(&status_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown project status: {status_raw}").into(),
        )
    })?;
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        status,
        budget: row.get(3)?,
        start_date: parse_opt_ts(4, row.get(4)?)?,
        notes: row.get(5)?,
        created_by: row.get(6)?,
        created_at: parse_ts(7, row.get(7)?)?,
        updated_at: parse_ts(8, row.get(8)?)?,
    })
}

const PROJECT_COLUMNS: &str =
    "id, name, status, budget, start_date, notes, created_by, created_at, updated_at";

/// Validated fields for a new project row.
pub struct NewProject {
    pub name: String,
    pub status: ProjectStatus,
    pub budget: Option<f64>,
    pub start_date: Option<chrono::DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_by: i64,
}

impl Database {
    pub async fn create_project(&self, new: NewProject) -> Result<Project, StoreError> {
        self.call(move |conn| {
            let now = ts(Utc::now());
            conn.execute(
                "INSERT INTO projects (name, status, budget, start_date, notes, created_by,
                                       created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
                params![
                    new.name,
                    new.status.as_str(),
                    new.budget,
                    new.start_date.map(ts),
                    new.notes,
                    new.created_by,
                    now
                ],
            )?;
            let id = conn.last_insert_rowid();
            let project = conn.query_row(
                &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"),
                params![id],
                map_project,
            )?;
            Ok(project)
        })
        .await
    }

    pub async fn get_project(&self, id: i64) -> Result<Option<Project>, StoreError> {
        self.call(move |conn| {
            conn.query_row(
                &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"),
                params![id],
                map_project,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        self.call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY updated_at DESC"
            ))?;
            let projects = stmt
                .query_map([], map_project)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(projects)
        })
        .await
    }

    /// Persist all mutable fields of a project; bumps `updated_at`.
    pub async fn update_project(&self, project: Project) -> Result<Project, StoreError> {
        self.call(move |conn| {
            let now = Utc::now();
            conn.execute(
                "UPDATE projects SET name = ?1, status = ?2, budget = ?3, start_date = ?4,
                        notes = ?5, updated_at = ?6
                 WHERE id = ?7",
                params![
                    project.name,
                    project.status.as_str(),
                    project.budget,
                    project.start_date.map(ts),
                    project.notes,
                    ts(now),
                    project.id
                ],
            )?;
            Ok(Project {
                updated_at: now,
                ..project
            })
        })
        .await
    }

    pub async fn delete_project(&self, id: i64) -> Result<bool, StoreError> {
        self.call(move |conn| {
            let n = conn.execute("DELETE FROM projects WHERE id = ?1", params![id])?;
            Ok(n > 0)
        })
        .await
    }
}
