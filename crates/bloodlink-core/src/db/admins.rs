//! Admin account database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{map_unique, Database, DbResult};
use crate::models::{Admin, NewAdmin};

fn row_to_admin(row: &Row<'_>) -> rusqlite::Result<Admin> {
    Ok(Admin {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        email: row.get(3)?,
        role: row.get(4)?,
        created_at: row.get(5)?,
    })
}

impl Database {
    /// Insert a new admin account. Returns the assigned id.
    pub fn insert_admin(&self, admin: &NewAdmin) -> DbResult<i64> {
        self.conn
            .execute(
                "INSERT INTO admins (username, password_hash, email, role) VALUES (?1, ?2, ?3, ?4)",
                params![admin.username, admin.password_hash, admin.email, admin.role],
            )
            .map_err(|e| map_unique(e, "username"))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Look up an admin for login.
    pub fn get_admin_by_username(&self, username: &str) -> DbResult<Option<Admin>> {
        self.conn
            .query_row(
                "SELECT id, username, password_hash, email, role, created_at
                 FROM admins WHERE username = ?",
                [username],
                row_to_admin,
            )
            .optional()
            .map_err(Into::into)
    }

    /// All admin accounts (for the super-admin listing).
    pub fn list_admins(&self) -> DbResult<Vec<Admin>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, username, password_hash, email, role, created_at
             FROM admins ORDER BY id",
        )?;
        let rows = stmt.query_map([], row_to_admin)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn count_admins(&self) -> DbResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM admins", [], |row| row.get(0))
            .map_err(Into::into)
    }
}
