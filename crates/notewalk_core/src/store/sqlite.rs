//! SQLite-backed note store over a Joplin-compatible database.
//!
//! # Invariants
//! - An empty `parent_id` is stored for root folders and mapped to `None`.
//! - Tag and attachment lists are ordered by title.
//! - FTS syntax failures surface as `StoreError::InvalidQuery` with the
//!   SQLite message unchanged.

use super::{NoteStore, StoreError, StoreResult};
use crate::db::schema::{ensure_store_ready, table_has_column};
use crate::model::{Attachment, EntityId, Folder, Note};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;

const NOTE_COLUMNS: &str = "n.id AS id,
    n.parent_id AS parent_id,
    n.title AS title,
    n.body AS body,
    n.created_time AS created_time,
    n.updated_time AS updated_time";

/// Store adapter borrowing a verified connection.
pub struct SqliteNoteStore<'conn> {
    conn: &'conn Connection,
    has_resource_blobs: bool,
}

impl<'conn> SqliteNoteStore<'conn> {
    /// Creates a store from a connection that passes the schema check.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_store_ready(conn)?;
        let has_resource_blobs = table_has_column(conn, "resources", "data")?;
        Ok(Self {
            conn,
            has_resource_blobs,
        })
    }

    /// Inserts one folder. Used to seed databases created by `create_db`.
    pub fn insert_folder(&self, folder: &Folder) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO folders (id, title, parent_id, created_time, updated_time)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                folder.id.as_str(),
                folder.title,
                folder.parent_id.as_ref().map_or("", |id| id.as_str()),
                folder.created_time,
                folder.updated_time,
            ],
        )?;
        Ok(())
    }

    /// Inserts one note with its tag links and attachment references.
    ///
    /// Tags are matched by title and created when absent.
    pub fn insert_note(&self, note: &Note) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO notes (id, parent_id, title, body, created_time, updated_time, user_updated_time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6);",
            params![
                note.id.as_str(),
                note.folder_id.as_ref().map_or("", |id| id.as_str()),
                note.title,
                note.body,
                note.created_time,
                note.updated_time,
            ],
        )?;

        for tag in &note.tags {
            let existing: Option<String> = self
                .conn
                .query_row("SELECT id FROM tags WHERE title = ?1;", [tag], |row| {
                    row.get(0)
                })
                .optional()?;
            let tag_id = match existing {
                Some(tag_id) => tag_id,
                None => {
                    let tag_id = EntityId::generate();
                    self.conn.execute(
                        "INSERT INTO tags (id, title) VALUES (?1, ?2);",
                        params![tag_id.as_str(), tag],
                    )?;
                    tag_id.to_string()
                }
            };
            self.conn.execute(
                "INSERT INTO note_tags (id, note_id, tag_id) VALUES (?1, ?2, ?3);",
                params![EntityId::generate().as_str(), note.id.as_str(), tag_id],
            )?;
        }

        for attachment in &note.attachments {
            self.conn.execute(
                "INSERT OR IGNORE INTO resources (id, title, mime, filename)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    attachment.handle.as_str(),
                    attachment.title,
                    attachment.mime,
                    attachment.filename,
                ],
            )?;
            self.conn.execute(
                "INSERT INTO note_resources (note_id, resource_id) VALUES (?1, ?2);",
                params![note.id.as_str(), attachment.handle.as_str()],
            )?;
        }
        Ok(())
    }

    /// Stores blob data for an attachment inserted by [`Self::insert_note`].
    pub fn insert_attachment_data(&self, handle: &EntityId, data: &[u8]) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE resources SET data = ?2 WHERE id = ?1;",
            params![handle.as_str(), data],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(handle.clone()));
        }
        Ok(())
    }

    fn load_tags(&self, note_id: Option<&EntityId>) -> StoreResult<HashMap<String, Vec<String>>> {
        let mut tags: HashMap<String, Vec<String>> = HashMap::new();
        let base = "SELECT nt.note_id, t.title
             FROM note_tags nt
             INNER JOIN tags t ON t.id = nt.tag_id";
        let mut stmt;
        let mut rows = match note_id {
            Some(note_id) => {
                stmt = self
                    .conn
                    .prepare(&format!("{base} WHERE nt.note_id = ?1 ORDER BY t.title ASC;"))?;
                stmt.query([note_id.as_str()])?
            }
            None => {
                stmt = self
                    .conn
                    .prepare(&format!("{base} ORDER BY t.title ASC;"))?;
                stmt.query([])?
            }
        };
        while let Some(row) = rows.next()? {
            let owner: String = row.get(0)?;
            let title: String = row.get(1)?;
            tags.entry(owner).or_default().push(title);
        }
        Ok(tags)
    }

    fn load_attachments(
        &self,
        note_id: Option<&EntityId>,
    ) -> StoreResult<HashMap<String, Vec<Attachment>>> {
        let mut attachments: HashMap<String, Vec<Attachment>> = HashMap::new();
        let base = "SELECT nr.note_id, r.id, r.title, r.mime, r.filename
             FROM note_resources nr
             INNER JOIN resources r ON r.id = nr.resource_id";
        let mut stmt;
        let mut rows = match note_id {
            Some(note_id) => {
                stmt = self.conn.prepare(&format!(
                    "{base} WHERE nr.note_id = ?1 ORDER BY r.title ASC, r.id ASC;"
                ))?;
                stmt.query([note_id.as_str()])?
            }
            None => {
                stmt = self
                    .conn
                    .prepare(&format!("{base} ORDER BY r.title ASC, r.id ASC;"))?;
                stmt.query([])?
            }
        };
        while let Some(row) = rows.next()? {
            let owner: String = row.get(0)?;
            let handle: String = row.get(1)?;
            attachments.entry(owner).or_default().push(Attachment {
                handle: EntityId::new(handle),
                title: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                mime: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                filename: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            });
        }
        Ok(attachments)
    }

    fn attach_details(&self, mut note: Note) -> StoreResult<Note> {
        let id = note.id.clone();
        note.tags = self.load_tags(Some(&id))?.remove(id.as_str()).unwrap_or_default();
        note.attachments = self
            .load_attachments(Some(&id))?
            .remove(id.as_str())
            .unwrap_or_default();
        Ok(note)
    }
}

impl NoteStore for SqliteNoteStore<'_> {
    fn list_folders(&self) -> StoreResult<Vec<Folder>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, parent_id, created_time, updated_time
             FROM folders
             ORDER BY title ASC, id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut folders = Vec::new();
        while let Some(row) = rows.next()? {
            folders.push(parse_folder_row(row)?);
        }
        Ok(folders)
    }

    fn list_notes(&self) -> StoreResult<Vec<Note>> {
        let mut tags = self.load_tags(None)?;
        let mut attachments = self.load_attachments(None)?;

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes n ORDER BY n.title ASC, n.id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            let mut note = parse_note_row(row)?;
            note.tags = tags.remove(note.id.as_str()).unwrap_or_default();
            note.attachments = attachments.remove(note.id.as_str()).unwrap_or_default();
            notes.push(note);
        }
        Ok(notes)
    }

    fn get_note(&self, id: &EntityId) -> StoreResult<Option<Note>> {
        let note = self
            .conn
            .query_row(
                &format!("SELECT {NOTE_COLUMNS} FROM notes n WHERE n.id = ?1;"),
                [id.as_str()],
                |row| Ok(parse_note_row(row)),
            )
            .optional()?
            .transpose()?;
        note.map(|note| self.attach_details(note)).transpose()
    }

    fn search_notes(&self, match_expr: &str, limit: u32) -> StoreResult<Vec<Note>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {NOTE_COLUMNS}
             FROM notes_fts
             INNER JOIN notes n ON n.rowid = notes_fts.rowid
             WHERE notes_fts MATCH ?1
             LIMIT ?2;"
        ))?;
        let mut rows = stmt
            .query(params![match_expr, i64::from(limit)])
            .map_err(|err| map_query_error(err, match_expr))?;

        let mut hits = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|err| map_query_error(err, match_expr))?
        {
            hits.push(parse_note_row(row)?);
        }

        hits.into_iter()
            .map(|note| self.attach_details(note))
            .collect()
    }

    fn update_note_body(&self, id: &EntityId, body: &str, updated_time: i64) -> StoreResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE notes
                 SET body = ?2,
                     updated_time = ?3,
                     user_updated_time = ?3
                 WHERE id = ?1;",
                params![id.as_str(), body, updated_time],
            )
            .map_err(map_write_error)?;
        if changed == 0 {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }

    fn read_attachment(&self, handle: &EntityId) -> StoreResult<Option<Vec<u8>>> {
        if !self.has_resource_blobs {
            return Ok(None);
        }
        let data: Option<Option<Vec<u8>>> = self
            .conn
            .query_row(
                "SELECT data FROM resources WHERE id = ?1;",
                [handle.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(data.flatten().filter(|bytes| !bytes.is_empty()))
    }
}

fn parse_folder_row(row: &Row<'_>) -> StoreResult<Folder> {
    let id: String = row.get("id")?;
    if id.is_empty() {
        return Err(StoreError::InvalidData(
            "empty id in folders.id".to_string(),
        ));
    }
    Ok(Folder {
        id: EntityId::new(id),
        title: row.get::<_, Option<String>>("title")?.unwrap_or_default(),
        parent_id: parse_parent(row.get("parent_id")?),
        created_time: row.get::<_, Option<i64>>("created_time")?.unwrap_or(0),
        updated_time: row.get::<_, Option<i64>>("updated_time")?.unwrap_or(0),
    })
}

fn parse_note_row(row: &Row<'_>) -> StoreResult<Note> {
    let id: String = row.get("id")?;
    if id.is_empty() {
        return Err(StoreError::InvalidData("empty id in notes.id".to_string()));
    }
    Ok(Note {
        id: EntityId::new(id),
        title: row.get::<_, Option<String>>("title")?.unwrap_or_default(),
        body: row.get::<_, Option<String>>("body")?.unwrap_or_default(),
        folder_id: parse_parent(row.get("parent_id")?),
        created_time: row.get::<_, Option<i64>>("created_time")?.unwrap_or(0),
        updated_time: row.get::<_, Option<i64>>("updated_time")?.unwrap_or(0),
        tags: Vec::new(),
        attachments: Vec::new(),
    })
}

fn parse_parent(value: Option<String>) -> Option<EntityId> {
    value.filter(|id| !id.is_empty()).map(EntityId::new)
}

fn map_query_error(err: rusqlite::Error, query: &str) -> StoreError {
    if is_match_syntax_error(&err) {
        return StoreError::InvalidQuery {
            query: query.to_string(),
            message: err.to_string(),
        };
    }
    StoreError::from(err)
}

fn is_match_syntax_error(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(_, Some(message)) => {
            let msg = message.to_lowercase();
            (msg.contains("fts5") && msg.contains("syntax"))
                || msg.contains("malformed match expression")
                || msg.contains("unterminated")
                || msg.contains("no such column")
        }
        _ => false,
    }
}

fn map_write_error(err: rusqlite::Error) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == rusqlite::ErrorCode::ReadOnly =>
        {
            StoreError::WriteRejected("database is opened read-only".to_string())
        }
        _ => StoreError::from(err),
    }
}
