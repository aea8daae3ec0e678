use super::{EditError, EditResult, Editor};
use crate::model::Note;
use crate::render::{parse_body, render_note, ExportFormat, RenderOptions};
use crate::store::NoteStore;
use chrono::Utc;
use log::{info, warn};
use std::fs;
use std::io::Write;

const SCRATCH_OPTIONS: RenderOptions = RenderOptions {
    format: ExportFormat::Markdown,
    include_metadata: false,
};

/// Result of one edit round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Unchanged,
    /// Body changed but write mode is off; nothing was persisted.
    DiscardedReadOnly,
    /// Body committed with this update time (epoch ms).
    Saved { updated_time: i64 },
}

pub struct EditController<'a, S: NoteStore + ?Sized, E: Editor + ?Sized> {
    store: &'a S,
    editor: &'a E,
}

impl<'a, S: NoteStore + ?Sized, E: Editor + ?Sized> EditController<'a, S, E> {
    pub fn new(store: &'a S, editor: &'a E) -> Self {
        Self { store, editor }
    }

    /// Opens `note` in the editor and commits a changed body when
    /// `write_enabled`.
    ///
    /// The scratch file holds `# <title>`, a blank line, then the body.
    /// If that exact heading is removed or changed, the whole file becomes
    /// the body. One trailing newline is dropped either way.
    pub fn edit(&self, note: &Note, write_enabled: bool) -> EditResult<EditOutcome> {
        let mut scratch = tempfile::Builder::new()
            .prefix("notewalk-")
            .suffix(".md")
            .tempfile()?;
        scratch.write_all(render_note(note, &SCRATCH_OPTIONS, &[]).as_bytes())?;
        scratch.flush()?;

        info!(
            "event=edit_note module=edit status=start note_id={} write_enabled={write_enabled}",
            note.id
        );
        if let Err(err) = self.editor.edit_file(scratch.path()) {
            warn!(
                "event=edit_note module=edit status=error reason=editor_unavailable note_id={}",
                note.id
            );
            return Err(err);
        }

        let edited = fs::read_to_string(scratch.path())?;
        let body = parse_body(&edited, note, &SCRATCH_OPTIONS)
            .unwrap_or_else(|| edited.strip_suffix('\n').unwrap_or(&edited).to_string());

        if body == note.body {
            info!(
                "event=edit_note module=edit status=ok outcome=unchanged note_id={}",
                note.id
            );
            return Ok(EditOutcome::Unchanged);
        }
        if !write_enabled {
            info!(
                "event=edit_note module=edit status=ok outcome=discarded_read_only note_id={}",
                note.id
            );
            return Ok(EditOutcome::DiscardedReadOnly);
        }

        let updated_time = Utc::now().timestamp_millis();
        self.store
            .update_note_body(&note.id, &body, updated_time)
            .map_err(|err| {
                warn!(
                    "event=edit_note module=edit status=error reason=store_write note_id={} error={err}",
                    note.id
                );
                EditError::StoreWriteFailed(err)
            })?;

        info!(
            "event=edit_note module=edit status=ok outcome=saved note_id={} bytes={}",
            note.id,
            body.len()
        );
        Ok(EditOutcome::Saved { updated_time })
    }
}

#[cfg(test)]
mod tests {
    use super::{EditController, EditOutcome};
    use crate::edit::{EditError, EditResult};
    use crate::model::{EntityId, Note};
    use crate::store::{MemoryNoteStore, NoteStore};
    use std::path::Path;

    fn store() -> MemoryNoteStore {
        let store = MemoryNoteStore::new();
        store.insert_note(Note::new("n1", "f1", "Title", "original"));
        store
    }

    fn note(store: &MemoryNoteStore) -> Note {
        store.get_note(&EntityId::new("n1")).unwrap().unwrap()
    }

    #[test]
    fn scratch_file_shows_heading_and_body() {
        let store = store();
        let seen = std::cell::RefCell::new(String::new());
        let editor = |path: &Path| -> EditResult<()> {
            seen.replace(std::fs::read_to_string(path).unwrap());
            Ok(())
        };

        let outcome = EditController::new(&store, &editor)
            .edit(&note(&store), true)
            .unwrap();
        assert_eq!(outcome, EditOutcome::Unchanged);
        assert_eq!(seen.into_inner(), "# Title\n\noriginal\n");
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn removed_heading_keeps_whole_file_as_body() {
        let store = store();
        let editor = |path: &Path| -> EditResult<()> {
            std::fs::write(path, "just text\n").unwrap();
            Ok(())
        };

        let outcome = EditController::new(&store, &editor)
            .edit(&note(&store), true)
            .unwrap();
        assert!(matches!(outcome, EditOutcome::Saved { .. }));
        assert_eq!(note(&store).body, "just text");
    }

    #[test]
    fn editor_failure_never_touches_store() {
        let store = store();
        let editor = |_: &Path| -> EditResult<()> {
            Err(EditError::EditorUnavailable {
                command: "vim".to_string(),
                message: "not installed".to_string(),
            })
        };

        let err = EditController::new(&store, &editor)
            .edit(&note(&store), true)
            .unwrap_err();
        assert!(matches!(err, EditError::EditorUnavailable { .. }));
        assert_eq!(store.write_count(), 0);
    }
}
