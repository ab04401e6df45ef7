use rusqlite::{params, Connection, OptionalExtension, Row};

use super::domain::User;
use crate::auth::Role;
use crate::ids::UserId;
use crate::store::StoreError;

const COLUMNS: &str = "id, email, password_hash, full_name, role, login_portal, is_active, \
                       is_verified, created_at, updated_at";

/// Row access for the `users` table.
pub struct UserRepository<'c> {
    conn: &'c Connection,
}

impl<'c> UserRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, user: &User) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO users (id, email, password_hash, full_name, role, login_portal, \
             is_active, is_verified, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                user.id,
                user.email,
                user.password_hash,
                user.full_name,
                user.role,
                user.login_portal,
                user.is_active,
                user.is_verified,
                user.created_at,
                user.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Persist every mutable column of an existing row.
    pub fn update(&self, user: &User) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE users SET email = ?2, password_hash = ?3, full_name = ?4, \
             is_active = ?5, is_verified = ?6, updated_at = ?7 WHERE id = ?1",
            params![
                user.id,
                user.email,
                user.password_hash,
                user.full_name,
                user.is_active,
                user.is_verified,
                user.updated_at,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::Sqlite(rusqlite::Error::QueryReturnedNoRows));
        }
        Ok(())
    }

    pub fn fetch(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE id = ?1");
        Ok(self.conn.query_row(&sql, [id], map_row).optional()?)
    }

    pub fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE email = ?1 COLLATE NOCASE");
        Ok(self.conn.query_row(&sql, [email], map_row).optional()?)
    }

    pub fn email_in_use(&self, email: &str, except: Option<&UserId>) -> Result<bool, StoreError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM users WHERE email = ?1 COLLATE NOCASE \
             AND (?2 IS NULL OR id != ?2)",
            params![email, except],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn list(&self, role: Option<Role>, skip: u32, limit: u32) -> Result<Vec<User>, StoreError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM users WHERE (?1 IS NULL OR role = ?1) \
             ORDER BY created_at, email LIMIT ?2 OFFSET ?3"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![role, limit, skip], map_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn count_by_role(&self, role: Role) -> Result<u64, StoreError> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM users WHERE role = ?1", [role], |row| {
                    row.get(0)
                })?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// Removes the row; dependent profiles, postings and applications go with it
    /// through `ON DELETE CASCADE`.
    pub fn delete(&self, id: &UserId) -> Result<bool, StoreError> {
        let removed = self.conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
        Ok(removed > 0)
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        full_name: row.get(3)?,
        role: row.get(4)?,
        login_portal: row.get(5)?,
        is_active: row.get(6)?,
        is_verified: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}
