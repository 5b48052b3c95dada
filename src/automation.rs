//! Automatic task status updates.
//!
//! A task whose due date has passed while it was still actionable is flipped
//! to `overdue`. Only `pending` and `in_progress` tasks qualify; `in_review`,
//! `completed`, `cancelled`, and already-`overdue` tasks are never touched by
//! the bulk scan.
//!
//! `now` is always passed in by the caller rather than read from the clock
//! here, so the rules can be exercised against fixed timestamps.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{Task, TaskStatus};
use crate::store::ts;

/// Flip every qualifying task to `overdue` in one unit of work.
///
/// Qualifying means: a due date is set, it is before `now`, and the status is
/// `pending` or `in_progress`. Returns the number of rows changed; zero
/// matches means zero writes. Running the scan again with the same `now` and
/// no intervening changes updates nothing, since matched rows leave the
/// eligible status set.
pub fn update_overdue_tasks(conn: &Connection, now: DateTime<Utc>) -> rusqlite::Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let updated = tx.execute(
        "UPDATE tasks SET status = 'overdue'
         WHERE due_date IS NOT NULL
           AND due_date < ?1
           AND status IN ('pending', 'in_progress')",
        params![ts(now)],
    )?;
    tx.commit()?;
    Ok(updated)
}

/// Count tasks the next scan would update, without writing.
pub fn count_overdue_candidates(conn: &Connection, now: DateTime<Utc>) -> rusqlite::Result<usize> {
    conn.query_row(
        "SELECT COUNT(*) FROM tasks
         WHERE due_date IS NOT NULL
           AND due_date < ?1
           AND status IN ('pending', 'in_progress')",
        params![ts(now)],
        |row| row.get::<_, i64>(0),
    )
    .map(|n| n as usize)
}

/// Single-task variant for ad hoc checks outside the periodic scan.
///
/// If the task's due date has passed and it is not already in a state the
/// automation treats as settled (`completed`, `cancelled`, `overdue`), it is
/// persisted as `overdue` immediately and the in-memory copy is updated to
/// match. Returns whether the task changed.
pub fn mark_task_overdue_if_needed(
    conn: &Connection,
    task: &mut Task,
    now: DateTime<Utc>,
) -> rusqlite::Result<bool> {
    let Some(due_date) = task.due_date else {
        return Ok(false);
    };

    if matches!(
        task.status,
        TaskStatus::Completed | TaskStatus::Cancelled | TaskStatus::Overdue
    ) {
        return Ok(false);
    }

    if due_date >= now {
        return Ok(false);
    }

    conn.execute(
        "UPDATE tasks SET status = 'overdue' WHERE id = ?1",
        params![task.id],
    )?;
    task.status = TaskStatus::Overdue;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::apply_schema;
    use chrono::Duration;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO users (id, name, email, password_hash, active, created_at, updated_at)
             VALUES (1, 'Ada', 'ada@example.com', 'h', 1, '2025-01-01T00:00:00Z', '2025-01-01T00:00:00Z');
             INSERT INTO projects (id, name, status, created_by, created_at, updated_at)
             VALUES (1, 'CRM', 'active', 1, '2025-01-01T00:00:00Z', '2025-01-01T00:00:00Z');",
        )
        .unwrap();
        conn
    }

    fn insert_task(
        conn: &Connection,
        id: i64,
        status: TaskStatus,
        due_date: Option<DateTime<Utc>>,
    ) {
        conn.execute(
            "INSERT INTO tasks (id, project_id, title, status, created_by, due_date, created_at)
             VALUES (?1, 1, ?2, ?3, 1, ?4, ?5)",
            params![
                id,
                format!("Task {id}"),
                status.as_str(),
                due_date.map(ts),
                ts(Utc::now())
            ],
        )
        .unwrap();
    }

    fn status_of(conn: &Connection, id: i64) -> TaskStatus {
        let raw: String = conn
            .query_row("SELECT status FROM tasks WHERE id = ?1", params![id], |r| {
                r.get(0)
            })
            .unwrap();
        TaskStatus::parse(&raw).unwrap()
    }

    fn load_task(conn: &Connection, id: i64) -> Task {
        conn.query_row(
            "SELECT id, project_id, title, description, status, created_by, assigned_to,
                    due_date, created_at
             FROM tasks WHERE id = ?1",
            params![id],
            |row| {
                let status_raw: String = row.get(4)?;
                let due_raw: Option<String> = row.get(7)?;
                let created_raw: String = row.get(8)?;
                Ok(Task {
                    id: row.get(0)?,
                    project_id: row.get(1)?,
                    title: row.get(2)?,
                    description: row.get(3)?,
                    status: TaskStatus::parse(&status_raw).unwrap(),
                    created_by: row.get(5)?,
                    assigned_to: row.get(6)?,
                    due_date: due_raw
                        .map(|s| DateTime::parse_from_rfc3339(&s).unwrap().with_timezone(&Utc)),
                    created_at: DateTime::parse_from_rfc3339(&created_raw)
                        .unwrap()
                        .with_timezone(&Utc),
                })
            },
        )
        .unwrap()
    }

    #[test]
    fn test_past_due_actionable_tasks_become_overdue() {
        let conn = test_conn();
        let now = Utc::now();
        insert_task(&conn, 1, TaskStatus::Pending, Some(now - Duration::hours(1)));
        insert_task(
            &conn,
            2,
            TaskStatus::InProgress,
            Some(now - Duration::days(3)),
        );

        assert_eq!(update_overdue_tasks(&conn, now).unwrap(), 2);
        assert_eq!(status_of(&conn, 1), TaskStatus::Overdue);
        assert_eq!(status_of(&conn, 2), TaskStatus::Overdue);
    }

    #[test]
    fn test_scan_leaves_other_fields_untouched() {
        let conn = test_conn();
        let now = Utc::now();
        insert_task(&conn, 1, TaskStatus::Pending, Some(now - Duration::hours(1)));
        let before = load_task(&conn, 1);

        update_overdue_tasks(&conn, now).unwrap();

        let after = load_task(&conn, 1);
        assert_eq!(after.status, TaskStatus::Overdue);
        assert_eq!(after.title, before.title);
        assert_eq!(after.project_id, before.project_id);
        assert_eq!(after.due_date, before.due_date);
        assert_eq!(after.created_at, before.created_at);
    }

    #[test]
    fn test_excluded_statuses_never_touched() {
        let conn = test_conn();
        let now = Utc::now();
        let past = Some(now - Duration::days(1));
        insert_task(&conn, 1, TaskStatus::InReview, past);
        insert_task(&conn, 2, TaskStatus::Completed, past);
        insert_task(&conn, 3, TaskStatus::Cancelled, past);
        insert_task(&conn, 4, TaskStatus::Overdue, past);

        assert_eq!(update_overdue_tasks(&conn, now).unwrap(), 0);
        assert_eq!(status_of(&conn, 1), TaskStatus::InReview);
        assert_eq!(status_of(&conn, 2), TaskStatus::Completed);
        assert_eq!(status_of(&conn, 3), TaskStatus::Cancelled);
        assert_eq!(status_of(&conn, 4), TaskStatus::Overdue);
    }

    #[test]
    fn test_scan_matches_automatable_status_set() {
        // The scan flips exactly the statuses in TaskStatus::AUTOMATABLE.
        let conn = test_conn();
        let now = Utc::now();
        let all = [
            TaskStatus::Pending,
            TaskStatus::InProgress,
            TaskStatus::Overdue,
            TaskStatus::InReview,
            TaskStatus::Completed,
            TaskStatus::Cancelled,
        ];
        for (i, status) in all.iter().enumerate() {
            insert_task(&conn, i as i64 + 1, *status, Some(now - Duration::hours(1)));
        }

        let updated = update_overdue_tasks(&conn, now).unwrap();
        assert_eq!(updated, TaskStatus::AUTOMATABLE.len());
        for (i, status) in all.iter().enumerate() {
            let expected = if TaskStatus::AUTOMATABLE.contains(status) {
                TaskStatus::Overdue
            } else {
                *status
            };
            assert_eq!(status_of(&conn, i as i64 + 1), expected);
        }
    }

    #[test]
    fn test_null_due_date_never_touched() {
        let conn = test_conn();
        let now = Utc::now();
        insert_task(&conn, 1, TaskStatus::Pending, None);
        insert_task(&conn, 2, TaskStatus::InProgress, None);

        assert_eq!(update_overdue_tasks(&conn, now).unwrap(), 0);
        assert_eq!(status_of(&conn, 1), TaskStatus::Pending);
    }

    #[test]
    fn test_future_due_date_not_touched() {
        let conn = test_conn();
        let now = Utc::now();
        insert_task(&conn, 1, TaskStatus::Pending, Some(now + Duration::hours(1)));

        assert_eq!(update_overdue_tasks(&conn, now).unwrap(), 0);
        assert_eq!(status_of(&conn, 1), TaskStatus::Pending);
    }

    #[test]
    fn test_scan_is_idempotent() {
        let conn = test_conn();
        let now = Utc::now();
        insert_task(&conn, 1, TaskStatus::Pending, Some(now - Duration::hours(2)));

        assert_eq!(update_overdue_tasks(&conn, now).unwrap(), 1);
        assert_eq!(update_overdue_tasks(&conn, now).unwrap(), 0);
    }

    #[test]
    fn test_mixed_scenario_counts_only_changed_rows() {
        // Task A: pending, due yesterday. Task B: in_progress, due tomorrow.
        // Task C: completed, due yesterday. Only A changes.
        let conn = test_conn();
        let now = Utc::now();
        insert_task(&conn, 1, TaskStatus::Pending, Some(now - Duration::days(1)));
        insert_task(
            &conn,
            2,
            TaskStatus::InProgress,
            Some(now + Duration::days(1)),
        );
        insert_task(&conn, 3, TaskStatus::Completed, Some(now - Duration::days(1)));

        assert_eq!(update_overdue_tasks(&conn, now).unwrap(), 1);
        assert_eq!(status_of(&conn, 1), TaskStatus::Overdue);
        assert_eq!(status_of(&conn, 2), TaskStatus::InProgress);
        assert_eq!(status_of(&conn, 3), TaskStatus::Completed);
    }

    #[test]
    fn test_candidate_count_matches_scan() {
        let conn = test_conn();
        let now = Utc::now();
        insert_task(&conn, 1, TaskStatus::Pending, Some(now - Duration::hours(1)));
        insert_task(&conn, 2, TaskStatus::InProgress, Some(now - Duration::hours(1)));
        insert_task(&conn, 3, TaskStatus::Completed, Some(now - Duration::hours(1)));

        assert_eq!(count_overdue_candidates(&conn, now).unwrap(), 2);
        assert_eq!(update_overdue_tasks(&conn, now).unwrap(), 2);
        assert_eq!(count_overdue_candidates(&conn, now).unwrap(), 0);
    }

    #[test]
    fn test_single_task_variant_marks_past_due() {
        let conn = test_conn();
        let now = Utc::now();
        insert_task(&conn, 1, TaskStatus::Pending, Some(now - Duration::hours(1)));
        let mut task = load_task(&conn, 1);

        assert!(mark_task_overdue_if_needed(&conn, &mut task, now).unwrap());
        assert_eq!(task.status, TaskStatus::Overdue);
        assert_eq!(status_of(&conn, 1), TaskStatus::Overdue);
    }

    #[test]
    fn test_single_task_variant_skips_settled_statuses() {
        let conn = test_conn();
        let now = Utc::now();
        let past = Some(now - Duration::hours(1));
        insert_task(&conn, 1, TaskStatus::Completed, past);
        insert_task(&conn, 2, TaskStatus::Cancelled, past);
        insert_task(&conn, 3, TaskStatus::Overdue, past);

        for id in 1..=3 {
            let mut task = load_task(&conn, id);
            let before = task.status;
            assert!(!mark_task_overdue_if_needed(&conn, &mut task, now).unwrap());
            assert_eq!(task.status, before);
        }
    }

    #[test]
    fn test_single_task_variant_skips_no_due_date_and_future() {
        let conn = test_conn();
        let now = Utc::now();
        insert_task(&conn, 1, TaskStatus::Pending, None);
        insert_task(&conn, 2, TaskStatus::Pending, Some(now + Duration::hours(1)));

        let mut no_due = load_task(&conn, 1);
        assert!(!mark_task_overdue_if_needed(&conn, &mut no_due, now).unwrap());

        let mut future = load_task(&conn, 2);
        assert!(!mark_task_overdue_if_needed(&conn, &mut future, now).unwrap());
        assert_eq!(future.status, TaskStatus::Pending);
    }

    #[test]
    fn test_variants_agree_on_actionable_tasks() {
        // Any task the bulk scan would flip is flipped by the single-task
        // variant as well, and vice versa for pending/in_progress rows.
        let conn = test_conn();
        let now = Utc::now();
        insert_task(&conn, 1, TaskStatus::InProgress, Some(now - Duration::minutes(5)));

        let mut task = load_task(&conn, 1);
        assert_eq!(count_overdue_candidates(&conn, now).unwrap(), 1);
        assert!(mark_task_overdue_if_needed(&conn, &mut task, now).unwrap());
        assert_eq!(count_overdue_candidates(&conn, now).unwrap(), 0);
        assert_eq!(update_overdue_tasks(&conn, now).unwrap(), 0);
    }
}
