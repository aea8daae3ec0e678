//! Opaque identifiers and the shared identity contract.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Number of identifier characters shown to users and accepted as the
/// conventional short form.
pub const SHORT_ID_LEN: usize = 8;

/// Stable identifier of a folder or note.
///
/// The store owns the format. Joplin uses 32 lowercase hex characters, but
/// nothing in core relies on that.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generates a fresh Joplin-shaped identifier (32 hex chars).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the display prefix (first [`SHORT_ID_LEN`] chars).
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(SHORT_ID_LEN) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Which side of the forest an entity lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Folder,
    Note,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Folder => f.write_str("folder"),
            Self::Note => f.write_str("note"),
        }
    }
}

/// Lightweight handle used in reports and ambiguity listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: EntityId,
    pub title: String,
}

impl Display for EntityRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}] {}", self.kind, self.id.short(), self.title)
    }
}

/// Anything the identifier resolver can match against.
pub trait Identified {
    fn id(&self) -> &EntityId;
    fn title(&self) -> &str;
    fn kind(&self) -> EntityKind;

    fn entity_ref(&self) -> EntityRef {
        EntityRef {
            kind: self.kind(),
            id: self.id().clone(),
            title: self.title().to_string(),
        }
    }
}

impl Identified for EntityRef {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn kind(&self) -> EntityKind {
        self.kind
    }

    fn entity_ref(&self) -> EntityRef {
        self.clone()
    }
}

impl<T: Identified + ?Sized> Identified for &T {
    fn id(&self) -> &EntityId {
        (**self).id()
    }

    fn title(&self) -> &str {
        (**self).title()
    }

    fn kind(&self) -> EntityKind {
        (**self).kind()
    }
}

#[cfg(test)]
mod tests {
    use super::EntityId;

    #[test]
    fn generated_ids_are_joplin_shaped() {
        let id = EntityId::generate();
        assert_eq!(id.as_str().len(), 32);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn short_form_truncates_only_long_ids() {
        assert_eq!(EntityId::new("0123456789abcdef").short(), "01234567");
        assert_eq!(EntityId::new("abc").short(), "abc");
    }
}
