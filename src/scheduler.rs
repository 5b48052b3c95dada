//! Background scheduler for the overdue task scan.
//!
//! A single loop runs the scan, then sleeps for the configured interval
//! (or a shorter retry interval after a failure). Stopping cancels the
//! sleep and waits for an in-flight scan to finish.

use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::store::Database;

struct LoopHandle {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct TaskScheduler {
    db: Database,
    interval: Duration,
    retry_interval: Duration,
    inner: Mutex<Option<LoopHandle>>,
}

impl TaskScheduler {
    pub fn new(db: Database, config: &Config) -> Self {
        Self {
            db,
            interval: config.scan_interval,
            retry_interval: config.scan_retry_interval,
            inner: Mutex::new(None),
        }
    }

    /// Spawn the scan loop. Calling this while the loop is already running
    /// logs a warning and does nothing.
    pub async fn start(&self) {
        let mut inner = self.inner.lock().await;
        if inner.is_some() {
            warn!("task scheduler already running");
            return;
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_loop(
            self.db.clone(),
            self.interval,
            self.retry_interval,
            cancel.clone(),
        ));
        *inner = Some(LoopHandle { cancel, handle });
        info!(interval_secs = self.interval.as_secs(), "task scheduler started");
    }

    /// Stop the scan loop and wait for it to exit. Idempotent.
    pub async fn stop(&self) {
        let Some(LoopHandle { cancel, handle }) = self.inner.lock().await.take() else {
            return;
        };
        cancel.cancel();
        if let Err(e) = handle.await {
            error!("task scheduler loop panicked: {e}");
        }
        info!("task scheduler stopped");
    }

    pub async fn is_running(&self) -> bool {
        self.inner.lock().await.is_some()
    }
}

async fn run_loop(
    db: Database,
    interval: Duration,
    retry_interval: Duration,
    cancel: CancellationToken,
) {
    loop {
        let wait = match db.mark_overdue_tasks(Utc::now()).await {
            Ok(0) => {
                debug!("overdue scan found nothing to update");
                interval
            }
            Ok(count) => {
                info!(count, "marked tasks overdue");
                interval
            }
            Err(e) => {
                error!("overdue scan failed: {e}");
                retry_interval
            }
        };

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(wait) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskStatus;
    use crate::store::{apply_schema, NewProject, NewTask, StoreError};
    use chrono::Duration as ChronoDuration;
    use std::path::PathBuf;

    fn test_config(interval_ms: u64, retry_ms: u64) -> Config {
        let mut config = Config::for_tests(PathBuf::from(":memory:"));
        config.scan_interval = Duration::from_millis(interval_ms);
        config.scan_retry_interval = Duration::from_millis(retry_ms);
        config
    }

    async fn seed_overdue_task(db: &Database) -> i64 {
        let user = db
            .create_user("Ada".into(), "ada@example.com".into(), "h".into())
            .await
            .unwrap();
        let project = db
            .create_project(NewProject {
                name: "CRM".into(),
                status: crate::models::ProjectStatus::Active,
                budget: None,
                start_date: None,
                notes: None,
                created_by: user.id,
            })
            .await
            .unwrap();
        let task = db
            .create_task(NewTask {
                project_id: project.id,
                title: "Late".into(),
                description: None,
                status: TaskStatus::Pending,
                created_by: user.id,
                assigned_to: None,
                due_date: Some(Utc::now() - ChronoDuration::hours(1)),
            })
            .await
            .unwrap();
        task.id
    }

    #[tokio::test]
    async fn test_scan_runs_and_stops() {
        let db = Database::open_in_memory().await.unwrap();
        let task_id = seed_overdue_task(&db).await;

        let scheduler = TaskScheduler::new(db.clone(), &test_config(25, 25));
        scheduler.start().await;
        assert!(scheduler.is_running().await);

        tokio::time::sleep(Duration::from_millis(60)).await;
        scheduler.stop().await;
        assert!(!scheduler.is_running().await);

        let task = db.get_task(task_id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Overdue);
    }

    #[tokio::test]
    async fn test_double_start_is_noop() {
        let db = Database::open_in_memory().await.unwrap();
        let scheduler = TaskScheduler::new(db, &test_config(25, 25));

        scheduler.start().await;
        scheduler.start().await;
        assert!(scheduler.is_running().await);

        scheduler.stop().await;
        scheduler.stop().await;
        assert!(!scheduler.is_running().await);
    }

    #[tokio::test]
    async fn test_scan_error_is_contained() {
        let db = Database::open_in_memory().await.unwrap();

        // Break the store, let the loop fail a few times, then repair it.
        db.call(|conn| {
            conn.execute_batch("DROP TABLE tasks")
                .map_err(StoreError::from)
        })
        .await
        .unwrap();

        let scheduler = TaskScheduler::new(db.clone(), &test_config(25, 10));
        scheduler.start().await;
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(scheduler.is_running().await);

        db.call(|conn| apply_schema(conn).map_err(StoreError::from))
            .await
            .unwrap();
        let task_id = seed_overdue_task(&db).await;

        tokio::time::sleep(Duration::from_millis(60)).await;
        scheduler.stop().await;

        let task = db.get_task(task_id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Overdue);
    }
}
