//! Navigation, resolution and export engine for Joplin note databases.
//! This crate is the single source of truth for the browsing and export
//! invariants; the CLI only parses input and prints results.

pub mod config;
pub mod cursor;
pub mod db;
pub mod edit;
pub mod error;
pub mod export;
pub mod logging;
pub mod model;
pub mod render;
pub mod resolve;
pub mod search;
pub mod session;
pub mod store;
pub mod tree;

pub use config::{AppConfig, ConfigError};
pub use cursor::{CursorError, NavCursor};
pub use db::{create_db, open_db, open_db_in_memory, AccessMode, DbError, DbResult};
pub use edit::{EditController, EditError, EditOutcome, Editor, ExternalEditor};
pub use error::{CoreError, CoreResult};
pub use export::{
    ExportError, ExportFailure, ExportFs, ExportReport, ExportTarget, Exporter, LocalFs, MemoryFs,
};
pub use logging::{
    default_log_dir, default_log_level, init_logging, logging_status, LogLevel, LoggingError,
};
pub use model::{Attachment, EntityId, EntityKind, EntityRef, Folder, Identified, Note};
pub use render::{render_note, ExportFormat, RenderOptions};
pub use resolve::{resolve, ResolveError};
pub use search::{search_notes, SearchError, SearchQuery};
pub use session::{FolderRow, Listing, Session};
pub use store::{MemoryNoteStore, NoteStore, SqliteNoteStore, StoreError, StoreResult};
pub use tree::{TreeError, TreeIndex};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
