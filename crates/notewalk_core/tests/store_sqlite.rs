use notewalk_core::{
    open_db_in_memory, Attachment, EntityId, Folder, Note, NoteStore, SqliteNoteStore, StoreError,
};

fn attachment(handle: &str, title: &str, filename: &str, mime: &str) -> Attachment {
    Attachment {
        handle: EntityId::new(handle),
        title: title.to_string(),
        filename: filename.to_string(),
        mime: mime.to_string(),
    }
}

#[test]
fn root_folders_have_no_parent() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteNoteStore::try_new(&conn).unwrap();
    store.insert_folder(&Folder::new("a", "A")).unwrap();
    store
        .insert_folder(&Folder::new("b", "B").with_parent("a"))
        .unwrap();

    let mut folders = store.list_folders().unwrap();
    folders.sort_by(|left, right| left.id.cmp(&right.id));
    assert_eq!(folders[0].parent_id, None);
    assert_eq!(folders[1].parent_id, Some(EntityId::new("a")));
}

#[test]
fn notes_carry_sorted_tags_and_attachments() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteNoteStore::try_new(&conn).unwrap();
    store.insert_folder(&Folder::new("f", "F")).unwrap();

    let mut note = Note::new("n1", "f", "Trip", "pack");
    note.tags = vec!["travel".to_string(), "alpha".to_string()];
    note.attachments = vec![
        attachment("r2", "zeta", "z.pdf", "application/pdf"),
        attachment("r1", "map", "map.png", "image/png"),
    ];
    store.insert_note(&note).unwrap();

    let loaded = store.get_note(&EntityId::new("n1")).unwrap().unwrap();
    assert_eq!(loaded.tags, vec!["alpha", "travel"]);
    let titles = loaded
        .attachments
        .iter()
        .map(|attachment| attachment.title.as_str())
        .collect::<Vec<_>>();
    assert_eq!(titles, vec!["map", "zeta"]);

    let listed = store.list_notes().unwrap();
    assert_eq!(listed[0].tags, loaded.tags);
}

#[test]
fn tags_are_shared_between_notes() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteNoteStore::try_new(&conn).unwrap();
    for id in ["n1", "n2"] {
        let mut note = Note::new(id, "f", id, "");
        note.tags = vec!["work".to_string()];
        store.insert_note(&note).unwrap();
    }

    let tag_rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM tags;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(tag_rows, 1);
}

#[test]
fn attachment_data_is_optional() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteNoteStore::try_new(&conn).unwrap();
    let mut note = Note::new("n1", "f", "T", "");
    note.attachments = vec![
        attachment("r1", "with data", "a.bin", ""),
        attachment("r2", "without", "b.bin", ""),
    ];
    store.insert_note(&note).unwrap();
    store
        .insert_attachment_data(&EntityId::new("r1"), b"bytes")
        .unwrap();

    assert_eq!(
        store.read_attachment(&EntityId::new("r1")).unwrap().as_deref(),
        Some(&b"bytes"[..])
    );
    assert_eq!(store.read_attachment(&EntityId::new("r2")).unwrap(), None);
    assert_eq!(store.read_attachment(&EntityId::new("zz")).unwrap(), None);
}

#[test]
fn update_sets_body_and_times() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteNoteStore::try_new(&conn).unwrap();
    store
        .insert_note(&Note::new("n1", "f", "T", "old"))
        .unwrap();

    store
        .update_note_body(&EntityId::new("n1"), "new", 1_700_000_000_000)
        .unwrap();

    let (body, updated, user_updated): (String, i64, i64) = conn
        .query_row(
            "SELECT body, updated_time, user_updated_time FROM notes WHERE id = 'n1';",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!(body, "new");
    assert_eq!(updated, 1_700_000_000_000);
    assert_eq!(user_updated, 1_700_000_000_000);
}

#[test]
fn update_of_unknown_note_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteNoteStore::try_new(&conn).unwrap();
    let err = store
        .update_note_body(&EntityId::new("ghost"), "x", 1)
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}
