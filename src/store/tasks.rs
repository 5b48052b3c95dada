//! Task queries.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::{parse_opt_ts, parse_task_status, parse_ts, ts, Database, StoreError};
use crate::automation;
use crate::models::{Task, TaskResponse, TaskStatus};

fn map_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        project_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        status: parse_task_status(4, row.get(4)?)?,
        created_by: row.get(5)?,
        assigned_to: row.get(6)?,
        due_date: parse_opt_ts(7, row.get(7)?)?,
        created_at: parse_ts(8, row.get(8)?)?,
    })
}

fn map_task_response(row: &Row<'_>) -> rusqlite::Result<TaskResponse> {
    Ok(TaskResponse {
        id: row.get(0)?,
        project_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        status: parse_task_status(4, row.get(4)?)?,
        created_by: row.get(5)?,
        assigned_to: row.get(6)?,
        due_date: parse_opt_ts(7, row.get(7)?)?,
        created_at: parse_ts(8, row.get(8)?)?,
        project_name: row.get(9)?,
        assigned_to_email: row.get(10)?,
        created_by_email: row.get(11)?,
    })
}

const TASK_COLUMNS: &str =
    "id, project_id, title, description, status, created_by, assigned_to, due_date, created_at";

const TASK_RESPONSE_QUERY: &str = "
    SELECT t.id, t.project_id, t.title, t.description, t.status, t.created_by,
           t.assigned_to, t.due_date, t.created_at,
           COALESCE(p.name, 'Unknown Project') AS project_name,
           a.email AS assigned_to_email,
           COALESCE(c.email, 'Unknown User') AS created_by_email
    FROM tasks t
    LEFT JOIN projects p ON p.id = t.project_id
    LEFT JOIN users a ON a.id = t.assigned_to
    LEFT JOIN users c ON c.id = t.created_by";

/// Validated fields for a new task row.
pub struct NewTask {
    pub project_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub created_by: i64,
    pub assigned_to: Option<i64>,
    pub due_date: Option<DateTime<Utc>>,
}

impl Database {
    pub async fn create_task(&self, new: NewTask) -> Result<Task, StoreError> {
        self.call(move |conn| {
            conn.execute(
                "INSERT INTO tasks (project_id, title, description, status, created_by,
                                    assigned_to, due_date, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    new.project_id,
                    new.title,
                    new.description,
                    new.status.as_str(),
                    new.created_by,
                    new.assigned_to,
                    new.due_date.map(ts),
                    ts(Utc::now())
                ],
            )?;
            let id = conn.last_insert_rowid();
            let task = conn.query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                map_task,
            )?;
            Ok(task)
        })
        .await
    }

    pub async fn get_task(&self, id: i64) -> Result<Option<Task>, StoreError> {
        self.call(move |conn| {
            conn.query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                map_task,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    /// A single task with enriched related fields.
    pub async fn get_task_response(&self, id: i64) -> Result<Option<TaskResponse>, StoreError> {
        self.call(move |conn| {
            conn.query_row(
                &format!("{TASK_RESPONSE_QUERY} WHERE t.id = ?1"),
                params![id],
                map_task_response,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    /// Newest-first page of tasks plus the total row count.
    pub async fn list_task_responses(
        &self,
        skip: usize,
        limit: usize,
    ) -> Result<(Vec<TaskResponse>, usize), StoreError> {
        self.call(move |conn| {
            let total: i64 = conn.query_row("SELECT COUNT(*) FROM tasks", [], |r| r.get(0))?;
            let mut stmt = conn.prepare(&format!(
                "{TASK_RESPONSE_QUERY} ORDER BY t.created_at DESC LIMIT ?1 OFFSET ?2"
            ))?;
            let tasks = stmt
                .query_map(params![limit as i64, skip as i64], map_task_response)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok((tasks, total as usize))
        })
        .await
    }

    pub async fn list_tasks_by_project(
        &self,
        project_id: i64,
    ) -> Result<Vec<TaskResponse>, StoreError> {
        self.call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{TASK_RESPONSE_QUERY} WHERE t.project_id = ?1 ORDER BY t.created_at DESC"
            ))?;
            let tasks = stmt
                .query_map(params![project_id], map_task_response)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(tasks)
        })
        .await
    }

    pub async fn list_tasks_by_assignee(
        &self,
        user_id: i64,
    ) -> Result<Vec<TaskResponse>, StoreError> {
        self.call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{TASK_RESPONSE_QUERY} WHERE t.assigned_to = ?1 ORDER BY t.created_at DESC"
            ))?;
            let tasks = stmt
                .query_map(params![user_id], map_task_response)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(tasks)
        })
        .await
    }

    /// Persist all mutable fields of a task.
    pub async fn update_task(&self, task: Task) -> Result<Task, StoreError> {
        self.call(move |conn| {
            conn.execute(
                "UPDATE tasks SET project_id = ?1, title = ?2, description = ?3, status = ?4,
                        assigned_to = ?5, due_date = ?6
                 WHERE id = ?7",
                params![
                    task.project_id,
                    task.title,
                    task.description,
                    task.status.as_str(),
                    task.assigned_to,
                    task.due_date.map(ts),
                    task.id
                ],
            )?;
            Ok(task)
        })
        .await
    }

    pub async fn delete_task(&self, id: i64) -> Result<bool, StoreError> {
        self.call(move |conn| {
            let n = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
            Ok(n > 0)
        })
        .await
    }

    /// Run the bulk overdue scan at `now`. Returns the number of updated rows.
    pub async fn mark_overdue_tasks(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        self.call(move |conn| {
            automation::update_overdue_tasks(conn, now).map_err(StoreError::from)
        })
        .await
    }

    /// Apply the single-task overdue check and return the (possibly updated)
    /// task.
    pub async fn check_task_overdue(
        &self,
        mut task: Task,
        now: DateTime<Utc>,
    ) -> Result<Task, StoreError> {
        self.call(move |conn| {
            automation::mark_task_overdue_if_needed(conn, &mut task, now)?;
            Ok(task)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProjectStatus;
    use crate::store::projects::NewProject;
    use chrono::Duration;

    async fn seed(db: &Database) -> (i64, i64) {
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
        (project.id, user.id)
    }

    fn new_task(project_id: i64, user_id: i64, title: &str) -> NewTask {
        NewTask {
            project_id,
            title: title.to_string(),
            description: None,
            status: TaskStatus::Pending,
            created_by: user_id,
            assigned_to: None,
            due_date: None,
        }
    }

    #[tokio::test]
    async fn test_task_enrichment() {
        let db = Database::open_in_memory().await.unwrap();
        let (project_id, user_id) = seed(&db).await;

        let mut new = new_task(project_id, user_id, "Ship the importer");
        new.assigned_to = Some(user_id);
        let task = db.create_task(new).await.unwrap();

        let response = db.get_task_response(task.id).await.unwrap().unwrap();
        assert_eq!(response.project_name, "CRM");
        assert_eq!(response.created_by_email, "ada@example.com");
        assert_eq!(response.assigned_to_email.as_deref(), Some("ada@example.com"));
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let db = Database::open_in_memory().await.unwrap();
        let (project_id, user_id) = seed(&db).await;
        for i in 0..5 {
            db.create_task(new_task(project_id, user_id, &format!("Task {i}")))
                .await
                .unwrap();
        }

        let (page, total) = db.list_task_responses(0, 2).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(page.len(), 2);

        let (rest, _) = db.list_task_responses(4, 10).await.unwrap();
        assert_eq!(rest.len(), 1);
    }

    #[tokio::test]
    async fn test_mark_overdue_through_handle() {
        let db = Database::open_in_memory().await.unwrap();
        let (project_id, user_id) = seed(&db).await;
        let now = Utc::now();

        let mut new = new_task(project_id, user_id, "Late already");
        new.due_date = Some(now - Duration::hours(1));
        let task = db.create_task(new).await.unwrap();

        assert_eq!(db.mark_overdue_tasks(now).await.unwrap(), 1);
        let task = db.get_task(task.id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Overdue);
    }

    #[tokio::test]
    async fn test_check_task_overdue_on_read() {
        let db = Database::open_in_memory().await.unwrap();
        let (project_id, user_id) = seed(&db).await;
        let now = Utc::now();

        let mut new = new_task(project_id, user_id, "Late already");
        new.due_date = Some(now - Duration::minutes(1));
        let task = db.create_task(new).await.unwrap();

        let checked = db.check_task_overdue(task, now).await.unwrap();
        assert_eq!(checked.status, TaskStatus::Overdue);
        let persisted = db.get_task(checked.id).await.unwrap().unwrap();
        assert_eq!(persisted.status, TaskStatus::Overdue);
    }
}
