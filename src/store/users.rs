//! User queries.

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use super::{parse_ts, ts, Database, StoreError};
use crate::models::User;

fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        active: row.get::<_, i64>(4)? != 0,
        created_at: parse_ts(5, row.get(5)?)?,
        updated_at: parse_ts(6, row.get(6)?)?,
    })
}

const USER_COLUMNS: &str = "id, name, email, password_hash, active, created_at, updated_at";

impl Database {
    pub async fn create_user(
        &self,
        name: String,
        email: String,
        password_hash: String,
    ) -> Result<User, StoreError> {
        self.call(move |conn| {
            let now = ts(Utc::now());
            conn.execute(
                "INSERT INTO users (name, email, password_hash, active, created_at, updated_at)
                 VALUES (?1, ?2, ?3, 1, ?4, ?4)",
                params![name, email, password_hash, now],
            )?;
            let id = conn.last_insert_rowid();
            let user = conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                map_user,
            )?;
            Ok(user)
        })
        .await
    }

    pub async fn get_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        self.call(move |conn| {
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                map_user,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    pub async fn find_user_by_email(&self, email: String) -> Result<Option<User>, StoreError> {
        self.call(move |conn| {
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                params![email],
                map_user,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    pub async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        self.call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users ORDER BY updated_at DESC"
            ))?;
            let users = stmt
                .query_map([], map_user)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(users)
        })
        .await
    }

    /// Persist all mutable fields of a user; bumps `updated_at`.
    pub async fn update_user(&self, user: User) -> Result<User, StoreError> {
        self.call(move |conn| {
            let now = Utc::now();
            conn.execute(
                "UPDATE users SET name = ?1, email = ?2, password_hash = ?3, active = ?4,
                        updated_at = ?5
                 WHERE id = ?6",
                params![
                    user.name,
                    user.email,
                    user.password_hash,
                    user.active as i64,
                    ts(now),
                    user.id
                ],
            )?;
            Ok(User {
                updated_at: now,
                ..user
            })
        })
        .await
    }

    /// Returns false when no such user exists.
    pub async fn delete_user(&self, id: i64) -> Result<bool, StoreError> {
        self.call(move |conn| {
            let n = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
            Ok(n > 0)
        })
        .await
    }
}
