use super::entity::{EntityId, EntityKind, Identified};
use serde::{Deserialize, Serialize};

/// Notebook or sub-notebook node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: EntityId,
    pub title: String,
    /// `None` means root level.
    pub parent_id: Option<EntityId>,
    /// Epoch milliseconds.
    pub created_time: i64,
    /// Epoch milliseconds.
    pub updated_time: i64,
}

impl Folder {
    pub fn new(id: impl Into<EntityId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            parent_id: None,
            created_time: 0,
            updated_time: 0,
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<EntityId>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }
}

impl Identified for Folder {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Folder
    }
}
