//! Role queries. Role names are unique case-insensitively (COLLATE NOCASE).

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, StoreError};
use crate::models::Role;

fn map_role(row: &Row<'_>) -> rusqlite::Result<Role> {
    Ok(Role {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
    })
}

impl Database {
    pub async fn create_role(
        &self,
        name: String,
        description: Option<String>,
    ) -> Result<Role, StoreError> {
        self.call(move |conn| {
            conn.execute(
                "INSERT INTO roles (name, description) VALUES (?1, ?2)",
                params![name, description],
            )?;
            let id = conn.last_insert_rowid();
            let role = conn.query_row(
                "SELECT id, name, description FROM roles WHERE id = ?1",
                params![id],
                map_role,
            )?;
            Ok(role)
        })
        .await
    }

    pub async fn get_role(&self, id: i64) -> Result<Option<Role>, StoreError> {
        self.call(move |conn| {
            conn.query_row(
                "SELECT id, name, description FROM roles WHERE id = ?1",
                params![id],
                map_role,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    pub async fn find_role_by_name(&self, name: String) -> Result<Option<Role>, StoreError> {
        self.call(move |conn| {
            conn.query_row(
                "SELECT id, name, description FROM roles WHERE name = ?1 COLLATE NOCASE",
                params![name],
                map_role,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    pub async fn list_roles(&self) -> Result<Vec<Role>, StoreError> {
        self.call(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, description FROM roles ORDER BY name")?;
            let roles = stmt
                .query_map([], map_role)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(roles)
        })
        .await
    }

    pub async fn update_role(&self, role: Role) -> Result<Role, StoreError> {
        self.call(move |conn| {
            conn.execute(
                "UPDATE roles SET name = ?1, description = ?2 WHERE id = ?3",
                params![role.name, role.description, role.id],
            )?;
            Ok(role)
        })
        .await
    }

    pub async fn delete_role(&self, id: i64) -> Result<bool, StoreError> {
        self.call(move |conn| {
            let n = conn.execute("DELETE FROM roles WHERE id = ?1", params![id])?;
            Ok(n > 0)
        })
        .await
    }
}
