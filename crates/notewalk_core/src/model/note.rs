//! Note document model.
//!
//! # Invariants
//! - `body` is opaque formatted text and is never rewritten by core except
//!   through an explicit edit commit.
//! - `tags` are kept in store order (sorted by tag title).

use super::entity::{EntityId, EntityKind, Identified};
use serde::{Deserialize, Serialize};

/// Reference to a binary attachment owned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Opaque blob handle (the resource id in Joplin).
    pub handle: EntityId,
    /// User-facing name.
    pub title: String,
    /// Original file name, empty when unknown.
    pub filename: String,
    /// Mime type, empty when unknown.
    pub mime: String,
}

/// Single document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: EntityId,
    pub title: String,
    pub body: String,
    /// Owning folder; may not resolve inside a snapshot (orphan).
    pub folder_id: Option<EntityId>,
    /// Epoch milliseconds.
    pub created_time: i64,
    /// Epoch milliseconds.
    pub updated_time: i64,
    pub tags: Vec<String>,
    pub attachments: Vec<Attachment>,
}

impl Note {
    pub fn new(
        id: impl Into<EntityId>,
        folder_id: impl Into<EntityId>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            folder_id: Some(folder_id.into()),
            created_time: 0,
            updated_time: 0,
            tags: Vec::new(),
            attachments: Vec::new(),
        }
    }
}

impl Identified for Note {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Note
    }
}
