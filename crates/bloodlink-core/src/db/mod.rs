//! Database layer for the BloodLink registry.

mod schema;
mod accounts;
mod admins;
mod donations;
mod donors;
mod notifications;
mod requests;

pub use schema::*;
#[allow(unused_imports)]
pub use accounts::*;
#[allow(unused_imports)]
pub use donations::*;
#[allow(unused_imports)]
pub use donors::*;
#[allow(unused_imports)]
pub use notifications::*;
#[allow(unused_imports)]
pub use requests::*;

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("{0} already exists")]
    Duplicate(&'static str),
}

pub type DbResult<T> = Result<T, DbError>;

/// Page of a list query. Pages are 1-based.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Page {
    pub fn offset(&self) -> u32 {
        (self.page - 1) * self.limit
    }
}

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// Map a unique-constraint failure on insert to [`DbError::Duplicate`].
pub(crate) fn map_unique(err: rusqlite::Error, what: &'static str) -> DbError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            DbError::Duplicate(what)
        }
        _ => DbError::Sqlite(err),
    }
}
