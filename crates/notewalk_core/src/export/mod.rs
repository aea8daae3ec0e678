//! Render/export engine.
//!
//! # Responsibility
//! - Mirror a folder subtree (or one note) into directories and files.
//! - Extract attachment blobs next to the notes that reference them.
//!
//! # Invariants
//! - A folder's directory exists before anything is written into it.
//! - Fail-soft per note, fail-fast per directory: a failed directory skips
//!   its whole subtree and is reported once.
//! - Traversal follows [`TreeIndex`](crate::tree::TreeIndex) order (notes,
//!   then subfolders), so output is deterministic for one snapshot.
//! - Same-named notes in one directory overwrite each other; the last one in
//!   traversal order wins.
//!
//! # See also
//! - `fs` for the filesystem seam and its in-memory double.

mod engine;
mod fs;
mod naming;
mod report;

pub use engine::{ExportTarget, Exporter};
pub use fs::{ExportFs, LocalFs, MemoryFs};
pub use naming::{attachment_file_name, extension_for_mime, sanitize_segment};
pub use report::{ExportError, ExportFailure, ExportReport, ExportResult, FailureKind};
