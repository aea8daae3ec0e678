use notewalk_core::edit::EditResult;
use notewalk_core::{
    create_db, CoreError, EditController, EditError, EditOutcome, EntityId, Folder,
    MemoryNoteStore, Note, NoteStore, Session, SqliteNoteStore,
};
use std::cell::Cell;
use std::fs;
use std::path::Path;

/// Editor double that replaces the body and counts launches.
struct ScriptedEditor {
    new_body: Option<&'static str>,
    launches: Cell<usize>,
}

impl ScriptedEditor {
    fn writing(new_body: &'static str) -> Self {
        Self {
            new_body: Some(new_body),
            launches: Cell::new(0),
        }
    }

    fn untouched() -> Self {
        Self {
            new_body: None,
            launches: Cell::new(0),
        }
    }
}

impl notewalk_core::Editor for ScriptedEditor {
    fn edit_file(&self, path: &Path) -> EditResult<()> {
        self.launches.set(self.launches.get() + 1);
        if let Some(body) = self.new_body {
            let current = fs::read_to_string(path).unwrap();
            let (heading, _) = current.split_once("\n\n").unwrap();
            fs::write(path, format!("{heading}\n\n{body}\n")).unwrap();
        }
        Ok(())
    }
}

fn memory_store() -> MemoryNoteStore {
    MemoryNoteStore::with_contents(
        vec![Folder::new("f", "Inbox")],
        vec![Note::new("n1", "f", "Draft", "original body")],
    )
}

fn note(store: &dyn NoteStore) -> Note {
    store.get_note(&EntityId::new("n1")).unwrap().unwrap()
}

#[test]
fn changed_body_in_read_only_mode_is_discarded() {
    let store = memory_store();
    let editor = ScriptedEditor::writing("edited");

    let outcome = EditController::new(&store, &editor)
        .edit(&note(&store), false)
        .unwrap();

    assert_eq!(outcome, EditOutcome::DiscardedReadOnly);
    assert_eq!(note(&store).body, "original body");
    assert_eq!(store.write_count(), 0);
}

#[test]
fn unchanged_body_never_writes() {
    let store = memory_store();
    let editor = ScriptedEditor::untouched();

    let outcome = EditController::new(&store, &editor)
        .edit(&note(&store), true)
        .unwrap();

    assert_eq!(outcome, EditOutcome::Unchanged);
    assert_eq!(editor.launches.get(), 1);
    assert_eq!(store.write_count(), 0);
}

#[test]
fn write_failure_leaves_store_untouched() {
    let store = memory_store();
    store.set_simulate_write_error(true);
    let editor = ScriptedEditor::writing("edited");
    let before = note(&store);

    let err = EditController::new(&store, &editor)
        .edit(&before, true)
        .unwrap_err();

    assert!(matches!(err, EditError::StoreWriteFailed(_)));
    assert_eq!(note(&store), before);
}

#[test]
fn saved_edit_updates_sqlite_body_and_time() {
    let dir = tempfile::tempdir().unwrap();
    let conn = create_db(dir.path().join("database.sqlite")).unwrap();
    let store = SqliteNoteStore::try_new(&conn).unwrap();
    store.insert_folder(&Folder::new("f", "Inbox")).unwrap();
    let mut seeded = Note::new("n1", "f", "Draft", "original body");
    seeded.updated_time = 1;
    store.insert_note(&seeded).unwrap();

    let editor = ScriptedEditor::writing("line one\n\nline two");
    let outcome = EditController::new(&store, &editor)
        .edit(&note(&store), true)
        .unwrap();

    let EditOutcome::Saved { updated_time } = outcome else {
        panic!("unexpected outcome: {outcome:?}");
    };
    let reloaded = note(&store);
    assert_eq!(reloaded.body, "line one\n\nline two");
    assert_eq!(reloaded.updated_time, updated_time);
    assert!(updated_time > 1);
}

#[test]
fn session_edit_refreshes_snapshot() {
    let store = memory_store();
    let mut session = Session::open(&store).unwrap();
    let editor = ScriptedEditor::writing("fresh");

    let outcome = session.edit("n1", &editor, true).unwrap();
    assert!(matches!(outcome, EditOutcome::Saved { .. }));
    assert_eq!(session.find_note("n1").unwrap().body, "fresh");
}

#[test]
fn missing_editor_surfaces_as_unavailable() {
    let store = memory_store();
    let mut session = Session::open(&store).unwrap();
    let editor = notewalk_core::ExternalEditor::new("notewalk-missing-editor-binary");

    let err = session.edit("n1", &editor, true).unwrap_err();
    assert!(matches!(err, CoreError::EditorUnavailable { .. }));
    assert_eq!(store.write_count(), 0);
}

/// Saves `contents` as the whole scratch file, then returns what was stored.
fn stored_body_after_writing(contents: &'static str) -> String {
    let store = memory_store();
    let editor = move |path: &Path| -> EditResult<()> {
        fs::write(path, contents).unwrap();
        Ok(())
    };

    EditController::new(&store, &editor)
        .edit(&note(&store), true)
        .unwrap();
    note(&store).body
}

#[test]
fn removed_heading_keeps_every_paragraph() {
    assert_eq!(
        stored_body_after_writing("para one\n\npara two\n"),
        "para one\n\npara two"
    );
}

#[test]
fn renamed_heading_is_kept_as_body_text() {
    assert_eq!(
        stored_body_after_writing("# Renamed\n\nbody\n"),
        "# Renamed\n\nbody"
    );
}

#[test]
fn missing_trailing_newline_still_strips_heading() {
    assert_eq!(stored_body_after_writing("# Draft\n\nnew body"), "new body");
}

#[test]
fn emptied_body_is_saved_as_empty() {
    assert_eq!(stored_body_after_writing("# Draft\n\n"), "");
    assert_eq!(stored_body_after_writing("# Draft\n"), "");
}

#[test]
fn body_paragraphs_survive_with_heading_intact() {
    assert_eq!(
        stored_body_after_writing("# Draft\n\nfirst\n\nsecond\n\n\nthird\n"),
        "first\n\nsecond\n\n\nthird"
    );
}
