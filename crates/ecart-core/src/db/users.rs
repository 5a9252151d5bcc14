//! User operations

use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Role, User};
use crate::store::UserStore;

impl Database {
    fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
        let role_str: String = row.get(2)?;
        let created_at_str: String = row.get(3)?;
        Ok(User {
            id: row.get(0)?,
            username: row.get(1)?,
            role: role_str.parse().unwrap_or_default(),
            created_at: parse_datetime(&created_at_str),
        })
    }
}

impl UserStore for Database {
    fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id, username, role, created_at FROM users ORDER BY username")?;

        let users = stmt
            .query_map([], Self::row_to_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(users)
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                "SELECT id, username, role, created_at FROM users WHERE username = ?",
                params![username],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    fn create_user(&self, username: &str, role: Role) -> Result<i64> {
        if username.trim().is_empty() {
            return Err(Error::InvalidData("Username is required".to_string()));
        }
        if self.get_user_by_username(username)?.is_some() {
            return Err(Error::InvalidData(format!(
                "Username already exists: {}",
                username
            )));
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO users (username, role) VALUES (?, ?)",
            params![username, role.as_str()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn set_user_role(&self, id: i64, role: Role) -> Result<bool> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE users SET role = ? WHERE id = ?",
            params![role.as_str(), id],
        )?;
        Ok(updated > 0)
    }

    fn delete_user(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM users WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }
}
