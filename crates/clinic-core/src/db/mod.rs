//! Database layer for the clinic.

mod schema;
mod query;
mod specialties;
mod doctors;
mod patients;
mod medications;
mod visits;
mod treatments;
mod prescriptions;
mod lab_reports;
mod details;

pub use schema::*;
pub use query::*;

use rusqlite::{ffi, Connection, ErrorCode};
use std::path::Path;
use thiserror::Error;

use crate::models::ValidationError;

const UNIQUE_PREFIX: &str = "UNIQUE constraint failed: ";

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl DbError {
    /// A SQLite constraint (unique, check, foreign key, trigger) rejected the write.
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            DbError::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => {
                err.code == ErrorCode::ConstraintViolation
            }
            DbError::Constraint(_) => true,
            _ => false,
        }
    }

    /// A unique or primary key constraint rejected the write.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            DbError::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.extended_code,
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY
            ),
            _ => false,
        }
    }

    /// The `table.column` list SQLite reported for a unique violation.
    pub fn unique_violation_target(&self) -> Option<&str> {
        if !self.is_unique_violation() {
            return None;
        }
        match self {
            DbError::Sqlite(rusqlite::Error::SqliteFailure(_, Some(message))) => {
                message.strip_prefix(UNIQUE_PREFIX)
            }
            _ => None,
        }
    }

    /// Rejected record rather than a broken store.
    pub fn is_record_error(&self) -> bool {
        self.is_constraint_violation() || matches!(self, DbError::Validation(_))
    }
}

pub type DbResult<T> = Result<T, DbError>;

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
        tracing::debug!("clinic schema initialized");
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Row count of a table owned by this schema.
    fn count_table(&self, table: &'static str) -> DbResult<usize> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// All ids of a table, ascending.
    fn ids_of(&self, table: &'static str) -> DbResult<Vec<i64>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT id FROM {} ORDER BY id", table))?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Delete every row of a table, returning how many went.
    fn clear_table(&self, table: &'static str) -> DbResult<usize> {
        let removed = self.conn.execute(&format!("DELETE FROM {}", table), [])?;
        tracing::debug!(table, removed, "table cleared");
        Ok(removed)
    }
}
