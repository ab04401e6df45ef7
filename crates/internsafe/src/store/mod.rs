//! SQLite-backed persistence.
//!
//! A single connection is shared behind a mutex; every mutation runs inside a
//! `BEGIN IMMEDIATE` transaction so multi-statement operations (an
//! application insert plus its counter bump, cascade deletes) commit or roll
//! back as one unit.

mod schema;

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("database error: {0}")]
    Sqlite(#[source] rusqlite::Error),
    #[error("failed to prepare database location: {0}")]
    Io(#[from] std::io::Error),
    #[error("database connection poisoned by an earlier panic")]
    Poisoned,
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(failure, _)
                if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                Self::Conflict
            }
            _ => Self::Sqlite(err),
        }
    }
}

/// Handle to the marketplace database.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(Duration::from_secs(5))?;
        schema::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run read-only queries against the shared connection.
    pub fn read<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Connection) -> Result<T, E>,
        E: From<StoreError>,
    {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        f(&conn)
    }

    /// Run `f` inside an immediate transaction; commits only when `f` succeeds.
    pub fn write<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let mut tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StoreError::from)?;
        let value = f(&mut tx)?;
        tx.commit().map_err(StoreError::from)?;
        Ok(value)
    }
}

/// Stores a closed enum as its snake_case label.
macro_rules! text_column {
    ($($ty:ty),+ $(,)?) => {$(
        impl rusqlite::types::ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
                Ok(rusqlite::types::ToSqlOutput::from(self.label()))
            }
        }

        impl rusqlite::types::FromSql for $ty {
            fn column_result(
                value: rusqlite::types::ValueRef<'_>,
            ) -> rusqlite::types::FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse::<$ty>()
                    .map_err(|err| rusqlite::types::FromSqlError::Other(Box::new(err)))
            }
        }
    )+};
}

pub(crate) use text_column;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_rolls_back_when_closure_fails() {
        let db = Database::open_in_memory().expect("database opens");
        let result: Result<(), StoreError> = db.write(|tx| {
            tx.execute(
                "INSERT INTO users (id, email, password_hash, full_name, role, login_portal, \
                 is_active, is_verified, created_at, updated_at) \
                 VALUES ('u1', 'a@example.com', 'x', 'A', 'student', 'student', 1, 0, \
                 '2025-01-01T00:00:00Z', '2025-01-01T00:00:00Z')",
                [],
            )?;
            Err(StoreError::Poisoned)
        });
        assert!(result.is_err());

        let count: i64 = db
            .read(|conn| {
                conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
                    .map_err(StoreError::from)
            })
            .expect("count query");
        assert_eq!(count, 0);
    }

    #[test]
    fn unique_violations_map_to_conflict() {
        let db = Database::open_in_memory().expect("database opens");
        let insert = "INSERT INTO users (id, email, password_hash, full_name, role, login_portal, \
                      is_active, is_verified, created_at, updated_at) \
                      VALUES (?1, ?2, 'x', 'A', 'student', 'student', 1, 0, \
                      '2025-01-01T00:00:00Z', '2025-01-01T00:00:00Z')";
        db.write(|tx| {
            tx.execute(insert, ["u1", "dup@example.com"])?;
            Ok::<_, StoreError>(())
        })
        .expect("first insert");

        let second = db.write(|tx| {
            tx.execute(insert, ["u2", "DUP@example.com"])?;
            Ok::<_, StoreError>(())
        });
        assert!(matches!(second, Err(StoreError::Conflict)));
    }

    #[test]
    fn open_creates_parent_directories() {
        let dir = std::env::temp_dir().join(format!("internsafe-{}", uuid::Uuid::new_v4()));
        let path = dir.join("nested").join("market.db");
        Database::open(&path).expect("database opens on disk");
        assert!(path.exists());
        let _ = std::fs::remove_dir_all(dir);
    }
}
