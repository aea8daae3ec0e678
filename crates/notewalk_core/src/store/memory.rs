use super::{NoteStore, StoreError, StoreResult};
use crate::model::{EntityId, Folder, Note};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

/// In-memory note store.
///
/// Uses `RefCell` for interior mutability since sessions are
/// single-threaded; this keeps every `NoteStore` method on `&self`.
/// Search is a case-insensitive "every term appears" match in store order,
/// with unbalanced double quotes rejected as an invalid query.
#[derive(Default)]
pub struct MemoryNoteStore {
    folders: RefCell<Vec<Folder>>,
    notes: RefCell<Vec<Note>>,
    blobs: RefCell<HashMap<EntityId, Vec<u8>>>,
    unreadable: RefCell<HashSet<EntityId>>,
    simulate_write_error: Cell<bool>,
    writes: Cell<usize>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(folders: Vec<Folder>, notes: Vec<Note>) -> Self {
        let store = Self::new();
        store.folders.replace(folders);
        store.notes.replace(notes);
        store
    }

    pub fn insert_folder(&self, folder: Folder) {
        self.folders.borrow_mut().push(folder);
    }

    pub fn insert_note(&self, note: Note) {
        self.notes.borrow_mut().push(note);
    }

    pub fn insert_attachment_data(&self, handle: impl Into<EntityId>, data: impl Into<Vec<u8>>) {
        self.blobs.borrow_mut().insert(handle.into(), data.into());
    }

    /// Makes `read_attachment` fail for `handle`.
    pub fn mark_attachment_unreadable(&self, handle: impl Into<EntityId>) {
        self.unreadable.borrow_mut().insert(handle.into());
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    /// Number of successful body updates.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl NoteStore for MemoryNoteStore {
    fn list_folders(&self) -> StoreResult<Vec<Folder>> {
        Ok(self.folders.borrow().clone())
    }

    fn list_notes(&self) -> StoreResult<Vec<Note>> {
        Ok(self.notes.borrow().clone())
    }

    fn get_note(&self, id: &EntityId) -> StoreResult<Option<Note>> {
        Ok(self.notes.borrow().iter().find(|note| &note.id == id).cloned())
    }

    fn search_notes(&self, match_expr: &str, limit: u32) -> StoreResult<Vec<Note>> {
        if match_expr.matches('"').count() % 2 != 0 {
            return Err(StoreError::InvalidQuery {
                query: match_expr.to_string(),
                message: "unterminated string".to_string(),
            });
        }

        let terms = match_expr
            .split_whitespace()
            .map(|term| term.trim_matches('"').to_lowercase())
            .filter(|term| !term.is_empty() && term != "and")
            .collect::<Vec<_>>();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(self
            .notes
            .borrow()
            .iter()
            .filter(|note| {
                let haystack = format!("{}\n{}", note.title, note.body).to_lowercase();
                terms.iter().all(|term| haystack.contains(term.as_str()))
            })
            .take(limit)
            .cloned()
            .collect())
    }

    fn update_note_body(&self, id: &EntityId, body: &str, updated_time: i64) -> StoreResult<()> {
        if self.simulate_write_error.get() {
            return Err(StoreError::WriteRejected("simulated write error".to_string()));
        }
        let mut notes = self.notes.borrow_mut();
        let note = notes
            .iter_mut()
            .find(|note| &note.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        note.body = body.to_string();
        note.updated_time = updated_time;
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn read_attachment(&self, handle: &EntityId) -> StoreResult<Option<Vec<u8>>> {
        if self.unreadable.borrow().contains(handle) {
            return Err(StoreError::InvalidData(format!(
                "attachment {handle} cannot be read"
            )));
        }
        Ok(self.blobs.borrow().get(handle).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryNoteStore;
    use crate::model::{EntityId, Note};
    use crate::store::{NoteStore, StoreError};

    fn store_with(body: &str) -> MemoryNoteStore {
        let store = MemoryNoteStore::new();
        store.insert_note(Note::new("n1", "f1", "Title", body));
        store
    }

    #[test]
    fn search_requires_every_term() {
        let store = store_with("alpha beta gamma");
        assert_eq!(store.search_notes("alpha gamma", 10).unwrap().len(), 1);
        assert!(store.search_notes("alpha delta", 10).unwrap().is_empty());
    }

    #[test]
    fn unbalanced_quote_is_invalid_query() {
        let store = store_with("alpha");
        let err = store.search_notes("\"alpha", 10).unwrap_err();
        assert!(matches!(err, StoreError::InvalidQuery { .. }));
    }

    #[test]
    fn simulated_write_error_leaves_note_untouched() {
        let store = store_with("original");
        store.set_simulate_write_error(true);
        let id = EntityId::new("n1");
        assert!(store.update_note_body(&id, "changed", 5).is_err());
        assert_eq!(store.get_note(&id).unwrap().unwrap().body, "original");
        assert_eq!(store.write_count(), 0);
    }
}
