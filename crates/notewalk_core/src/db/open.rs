//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas required by core behavior.
//! - Run the schema check (or schema creation) before returning.
//!
//! # Invariants
//! - `AccessMode::ReadOnly` connections reject every write at the SQLite level.

use super::schema::{create_compat_schema, ensure_store_ready};
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::{Duration, Instant};

/// How an existing database file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Browse/export only. Edits can never reach the file.
    ReadOnly,
    /// Edit commits are allowed.
    ReadWrite,
}

impl AccessMode {
    pub fn from_write_enabled(write_enabled: bool) -> Self {
        if write_enabled {
            Self::ReadWrite
        } else {
            Self::ReadOnly
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::ReadOnly => "read_only",
            Self::ReadWrite => "read_write",
        }
    }

    fn flags(self) -> OpenFlags {
        let base = OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        match self {
            Self::ReadOnly => base | OpenFlags::SQLITE_OPEN_READ_ONLY,
            Self::ReadWrite => base | OpenFlags::SQLITE_OPEN_READ_WRITE,
        }
    }
}

/// Opens an existing note database and verifies its schema.
///
/// # Errors
/// - `DbError::DatabaseNotFound` when `path` does not exist.
/// - `DbError::MissingRequiredTable` / `MissingRequiredColumn` when the file
///   is not a compatible note database.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>, mode: AccessMode) -> DbResult<Connection> {
    let path = path.as_ref();
    let started_at = Instant::now();
    info!(
        "event=db_open module=db status=start mode={}",
        mode.as_str()
    );

    if !path.exists() {
        error!(
            "event=db_open module=db status=error mode={} error_code=db_not_found",
            mode.as_str()
        );
        return Err(DbError::DatabaseNotFound(path.to_path_buf()));
    }

    let result = Connection::open_with_flags(path, mode.flags())
        .map_err(DbError::from)
        .and_then(|conn| {
            configure_connection(&conn)?;
            ensure_store_ready(&conn)?;
            Ok(conn)
        });

    match &result {
        Ok(_) => info!(
            "event=db_open module=db status=ok mode={} duration_ms={}",
            mode.as_str(),
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
            mode.as_str(),
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

/// Creates (or reuses) a database file with the compatible schema.
///
/// Existing tables are left untouched.
pub fn create_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_create module=db status=start mode=file");

    let conn = Connection::open(path)?;
    configure_connection(&conn)?;
    create_compat_schema(&conn)?;
    ensure_store_ready(&conn)?;

    info!(
        "event=db_create module=db status=ok mode=file duration_ms={}",
        started_at.elapsed().as_millis()
    );
    Ok(conn)
}

/// Opens an in-memory database with the compatible schema.
pub fn open_db_in_memory() -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_create module=db status=start mode=memory");

    let conn = Connection::open_in_memory()?;
    configure_connection(&conn)?;
    create_compat_schema(&conn)?;
    ensure_store_ready(&conn)?;

    info!(
        "event=db_create module=db status=ok mode=memory duration_ms={}",
        started_at.elapsed().as_millis()
    );
    Ok(conn)
}

fn configure_connection(conn: &Connection) -> DbResult<()> {
    conn.busy_timeout(Duration::from_secs(5))?;
    Ok(())
}
