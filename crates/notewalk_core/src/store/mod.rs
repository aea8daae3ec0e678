//! External note store boundary.
//!
//! # Responsibility
//! - Define the read/search/write capabilities core needs from a note store.
//! - Isolate SQL details from tree building, export and edit orchestration.
//!
//! # Invariants
//! - Store implementations return notes with tags and attachment references
//!   populated.
//! - Search results keep the store's ranking; callers never re-rank.
//! - `update_note_body` is the only write path and touches exactly one note.

use crate::db::DbError;
use crate::model::{EntityId, Folder, Note};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::MemoryNoteStore;
pub use sqlite::SqliteNoteStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by store implementations.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target note does not exist.
    NotFound(EntityId),
    /// Full-text query was rejected by the store's query parser.
    InvalidQuery { query: String, message: String },
    /// The store refused a write (read-only connection, simulated failure).
    WriteRejected(String),
    /// Persisted data cannot be converted to the read model.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::InvalidQuery { query, message } => {
                write!(f, "invalid full-text query `{query}`: {message}")
            }
            Self::WriteRejected(message) => write!(f, "store rejected write: {message}"),
            Self::InvalidData(message) => write!(f, "invalid store data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Capabilities core requires from the external note store.
pub trait NoteStore {
    /// Enumerates every folder.
    fn list_folders(&self) -> StoreResult<Vec<Folder>>;
    /// Enumerates every note.
    fn list_notes(&self) -> StoreResult<Vec<Note>>;
    /// Loads one note by exact id.
    fn get_note(&self, id: &EntityId) -> StoreResult<Option<Note>>;
    /// Runs a full-text query and returns ranked notes, at most `limit`.
    fn search_notes(&self, match_expr: &str, limit: u32) -> StoreResult<Vec<Note>>;
    /// Replaces one note body and stamps its update time (epoch ms).
    fn update_note_body(&self, id: &EntityId, body: &str, updated_time: i64) -> StoreResult<()>;
    /// Reads attachment bytes; `Ok(None)` when the store holds no data for it.
    fn read_attachment(&self, handle: &EntityId) -> StoreResult<Option<Vec<u8>>>;
}
