//! Read model for notebooks and notes loaded from the external store.
//!
//! # Responsibility
//! - Define the folder/note shapes shared by tree, search, export and edit.
//! - Keep identifiers opaque; core never interprets their structure.
//!
//! # Invariants
//! - Identifiers are immutable once loaded.
//! - A `Note` always names exactly one owning folder id (possibly dangling).

pub mod entity;
pub mod folder;
pub mod note;

pub use entity::{EntityId, EntityKind, EntityRef, Identified, SHORT_ID_LEN};
pub use folder::Folder;
pub use note::{Attachment, Note};
