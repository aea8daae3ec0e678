//! Read-only snapshot of the folder forest.
//!
//! # Responsibility
//! - Group folders by parent and notes by owning folder in one pass.
//! - Answer children-of, parent-of and path-to-root queries.
//!
//! # Invariants
//! - Child lists are ordered by case-insensitive title, ties by id.
//! - Orphaned notes live in a synthetic root-level "Unfiled" folder.
//! - The snapshot is never updated in place; rebuild to observe changes.

mod index;

pub use index::{Children, TreeError, TreeIndex, TreeResult, UNFILED_FOLDER_ID, UNFILED_FOLDER_TITLE};
