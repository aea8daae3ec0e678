//! SQLite store bootstrap.
//!
//! # Responsibility
//! - Open an existing note database with the requested access mode.
//! - Verify the tables and columns the store adapter depends on.
//! - Create an empty compatible database for tests and fixtures.
//!
//! # Invariants
//! - Core never mutates the schema of a database it did not create.
//! - A connection is handed out only after the schema check passed.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod open;
pub mod schema;

pub use open::{create_db, open_db, open_db_in_memory, AccessMode};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Database file does not exist.
    DatabaseNotFound(PathBuf),
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::DatabaseNotFound(path) => {
                write!(f, "database not found: {}", path.display())
            }
            Self::MissingRequiredTable(table) => {
                write!(f, "note database requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "note database requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::DatabaseNotFound(_) => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
