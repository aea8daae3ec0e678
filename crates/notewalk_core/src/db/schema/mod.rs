//! Compatible schema creation and verification.
//!
//! # Responsibility
//! - Describe the tables/columns the SQLite store adapter reads and writes.
//! - Create that subset for fresh databases.
//!
//! # Invariants
//! - `ensure_store_ready` only reads `sqlite_master` and `PRAGMA table_info`.
//! - `resources.data` is optional: databases that keep blobs on disk still
//!   pass the check.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

const COMPAT_SCHEMA_SQL: &str = include_str!("compat.sql");

/// Tables and the columns core depends on in each.
const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    (
        "folders",
        &["id", "title", "parent_id", "created_time", "updated_time"],
    ),
    (
        "notes",
        &[
            "id",
            "parent_id",
            "title",
            "body",
            "created_time",
            "updated_time",
            "user_updated_time",
        ],
    ),
    ("tags", &["id", "title"]),
    ("note_tags", &["note_id", "tag_id"]),
    ("resources", &["id", "title", "mime", "filename"]),
    ("note_resources", &["note_id", "resource_id"]),
    ("notes_fts", &[]),
];

/// Creates every table, the FTS index and its sync triggers if absent.
pub fn create_compat_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(COMPAT_SCHEMA_SQL)?;
    Ok(())
}

/// Verifies the connection exposes every table/column the store needs.
pub fn ensure_store_ready(conn: &Connection) -> DbResult<()> {
    for &(table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(DbError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(DbError::MissingRequiredColumn { table, column });
            }
        }
    }
    Ok(())
}

pub fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub fn table_has_column(conn: &Connection, table: &str, column: &str) -> DbResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
