//! Navigation cursor over a [`TreeIndex`].
//!
//! # Invariants
//! - The stack always holds a valid root-to-current chain: every entry is a
//!   direct child folder of the one before it (the first of the root).
//! - An empty stack is the root position.

use crate::model::{EntityId, Folder};
use crate::tree::TreeIndex;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CursorResult<T> = Result<T, CursorError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorError {
    /// Target is not a direct child folder of the current position.
    InvalidTarget(EntityId),
}

impl Display for CursorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTarget(id) => {
                write!(f, "{id} is not a subfolder of the current folder")
            }
        }
    }
}

impl Error for CursorError {}

/// Current folder position, root when the stack is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavCursor {
    stack: Vec<EntityId>,
}

impl NavCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current folder id, `None` at root.
    pub fn current(&self) -> Option<&EntityId> {
        self.stack.last()
    }

    pub fn is_root(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Moves into `folder_id` if it is a child of the current position.
    pub fn descend(&mut self, index: &TreeIndex, folder_id: &EntityId) -> CursorResult<()> {
        if !index.is_child_folder(self.current(), folder_id) {
            return Err(CursorError::InvalidTarget(folder_id.clone()));
        }
        self.stack.push(folder_id.clone());
        Ok(())
    }

    /// Moves up one level. No-op at root.
    pub fn ascend(&mut self) {
        self.stack.pop();
    }

    pub fn reset(&mut self) {
        self.stack.clear();
    }

    /// Drops positions that no longer exist after a rebuild.
    ///
    /// Keeps the longest still-valid prefix of the stack.
    pub fn revalidate(&mut self, index: &TreeIndex) {
        let mut parent: Option<EntityId> = None;
        let mut valid = 0;
        for id in &self.stack {
            if !index.is_child_folder(parent.as_ref(), id) {
                break;
            }
            parent = Some(id.clone());
            valid += 1;
        }
        self.stack.truncate(valid);
    }

    /// Folders from root to the current position.
    pub fn folders<'a>(&self, index: &'a TreeIndex) -> Vec<&'a Folder> {
        self.stack.iter().filter_map(|id| index.folder(id)).collect()
    }

    /// Prompt-style path: `(root)` or `A/B/C`.
    pub fn breadcrumb(&self, index: &TreeIndex) -> String {
        if self.stack.is_empty() {
            return "(root)".to_string();
        }
        self.folders(index)
            .iter()
            .map(|folder| folder.title.as_str())
            .collect::<Vec<_>>()
            .join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::{CursorError, NavCursor};
    use crate::model::{EntityId, Folder};
    use crate::tree::TreeIndex;

    fn index() -> TreeIndex {
        TreeIndex::build(
            vec![
                Folder::new("a", "A"),
                Folder::new("b", "B").with_parent("a"),
                Folder::new("c", "C"),
            ],
            Vec::new(),
        )
    }

    #[test]
    fn descend_then_ascend_restores_state() {
        let index = index();
        let mut cursor = NavCursor::new();
        cursor.descend(&index, &EntityId::new("a")).unwrap();
        let before = cursor.clone();

        cursor.descend(&index, &EntityId::new("b")).unwrap();
        assert_eq!(cursor.breadcrumb(&index), "A/B");
        cursor.ascend();
        assert_eq!(cursor, before);
    }

    #[test]
    fn descend_into_non_child_fails() {
        let index = index();
        let mut cursor = NavCursor::new();
        cursor.descend(&index, &EntityId::new("a")).unwrap();

        let err = cursor.descend(&index, &EntityId::new("c")).unwrap_err();
        assert_eq!(err, CursorError::InvalidTarget(EntityId::new("c")));
        assert_eq!(cursor.depth(), 1);
    }

    #[test]
    fn ascend_at_root_is_noop() {
        let mut cursor = NavCursor::new();
        cursor.ascend();
        assert!(cursor.is_root());
        assert_eq!(cursor.breadcrumb(&index()), "(root)");
    }

    #[test]
    fn reset_returns_to_root() {
        let index = index();
        let mut cursor = NavCursor::new();
        cursor.descend(&index, &EntityId::new("a")).unwrap();
        cursor.descend(&index, &EntityId::new("b")).unwrap();
        cursor.reset();
        assert_eq!(cursor.current(), None);
    }

    #[test]
    fn revalidate_keeps_surviving_prefix() {
        let mut cursor = NavCursor::new();
        cursor.descend(&index(), &EntityId::new("a")).unwrap();
        cursor.descend(&index(), &EntityId::new("b")).unwrap();

        let rebuilt = TreeIndex::build(vec![Folder::new("a", "A")], Vec::new());
        cursor.revalidate(&rebuilt);
        assert_eq!(cursor.current(), Some(&EntityId::new("a")));
    }
}
