use notewalk_core::db::schema::table_exists;
use notewalk_core::{
    create_db, open_db, open_db_in_memory, AccessMode, DbError, EntityId, Folder, Note, NoteStore,
    SqliteNoteStore, StoreError,
};
use rusqlite::Connection;

#[test]
fn in_memory_db_has_every_store_table() {
    let conn = open_db_in_memory().unwrap();
    for table in [
        "folders",
        "notes",
        "tags",
        "note_tags",
        "resources",
        "note_resources",
        "notes_fts",
    ] {
        assert!(table_exists(&conn, table).unwrap(), "missing {table}");
    }
}

#[test]
fn missing_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.sqlite");
    let err = open_db(&path, AccessMode::ReadOnly).unwrap_err();
    assert!(matches!(err, DbError::DatabaseNotFound(found) if found == path));
}

#[test]
fn foreign_database_fails_schema_check() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("other.sqlite");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("CREATE TABLE folders (id TEXT PRIMARY KEY);")
        .unwrap();
    drop(conn);

    let err = open_db(&path, AccessMode::ReadOnly).unwrap_err();
    assert!(matches!(err, DbError::MissingRequiredColumn { table: "folders", .. }));
}

#[test]
fn created_db_reopens_read_only_and_rejects_writes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("database.sqlite");
    {
        let conn = create_db(&path).unwrap();
        let store = SqliteNoteStore::try_new(&conn).unwrap();
        store.insert_folder(&Folder::new("f1", "Inbox")).unwrap();
        store
            .insert_note(&Note::new("n1", "f1", "Hello", "body"))
            .unwrap();
    }

    let conn = open_db(&path, AccessMode::ReadOnly).unwrap();
    let store = SqliteNoteStore::try_new(&conn).unwrap();
    assert_eq!(store.list_notes().unwrap().len(), 1);

    let err = store
        .update_note_body(&EntityId::new("n1"), "changed", 1)
        .unwrap_err();
    assert!(matches!(err, StoreError::WriteRejected(_)));
    let note = store.get_note(&EntityId::new("n1")).unwrap().unwrap();
    assert_eq!(note.body, "body");
}
