use crate::model::{EntityId, Folder, Note};
use crate::store::{NoteStore, StoreResult};
use log::{info, warn};
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Id of the synthetic folder holding orphaned notes.
pub const UNFILED_FOLDER_ID: &str = "~unfiled";
/// Title of the synthetic folder holding orphaned notes.
pub const UNFILED_FOLDER_TITLE: &str = "Unfiled";

pub type TreeResult<T> = Result<T, TreeError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Folder id is not part of the snapshot.
    NotFound(EntityId),
    /// Walking parents from `folder_id` revisits a folder.
    CorruptHierarchy {
        folder_id: EntityId,
        cycle: Vec<EntityId>,
    },
}

impl Display for TreeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "folder not found: {id}"),
            Self::CorruptHierarchy { folder_id, cycle } => {
                let chain = cycle
                    .iter()
                    .map(|id| id.short().to_string())
                    .collect::<Vec<_>>()
                    .join(" -> ");
                write!(
                    f,
                    "corrupt folder hierarchy at {folder_id}: parent cycle {chain}"
                )
            }
        }
    }
}

impl Error for TreeError {}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FolderEntry {
    folder: Folder,
    /// Parent after re-rooting dangling references.
    parent: Option<EntityId>,
    child_folders: Vec<EntityId>,
    notes: Vec<EntityId>,
}

/// Direct children of one position, in listing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Children<'a> {
    pub folders: Vec<&'a Folder>,
    pub notes: Vec<&'a Note>,
}

/// Adjacency index over one folder/note snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TreeIndex {
    folders: BTreeMap<EntityId, FolderEntry>,
    notes: BTreeMap<EntityId, Note>,
    note_folder: BTreeMap<EntityId, EntityId>,
    root_folders: Vec<EntityId>,
    rerooted: Vec<EntityId>,
    orphaned_notes: usize,
}

impl TreeIndex {
    /// Builds the index from a full scan.
    ///
    /// Duplicate ids keep the first occurrence. Folders whose parent is
    /// missing are treated as root-level; notes whose folder is missing go to
    /// the Unfiled bucket.
    pub fn build(folders: Vec<Folder>, notes: Vec<Note>) -> Self {
        let mut index = Self::default();

        for folder in folders {
            if index.folders.contains_key(&folder.id) {
                warn!(
                    "event=tree_build module=tree status=warn reason=duplicate_folder id={}",
                    folder.id
                );
                continue;
            }
            index.folders.insert(
                folder.id.clone(),
                FolderEntry {
                    folder,
                    parent: None,
                    child_folders: Vec::new(),
                    notes: Vec::new(),
                },
            );
        }

        let ids = index.folders.keys().cloned().collect::<Vec<_>>();
        for id in ids {
            let declared = index.folders[&id].folder.parent_id.clone();
            match declared {
                Some(parent) if index.folders.contains_key(&parent) => {
                    if let Some(entry) = index.folders.get_mut(&parent) {
                        entry.child_folders.push(id.clone());
                    }
                    if let Some(entry) = index.folders.get_mut(&id) {
                        entry.parent = Some(parent);
                    }
                }
                Some(_) => {
                    index.rerooted.push(id.clone());
                    index.root_folders.push(id);
                }
                None => index.root_folders.push(id),
            }
        }

        for note in notes {
            if index.notes.contains_key(&note.id) {
                warn!(
                    "event=tree_build module=tree status=warn reason=duplicate_note id={}",
                    note.id
                );
                continue;
            }
            let owner = match note.folder_id.as_ref() {
                Some(folder_id) if index.folders.contains_key(folder_id) => folder_id.clone(),
                _ => {
                    index.orphaned_notes += 1;
                    index.ensure_unfiled()
                }
            };
            if let Some(entry) = index.folders.get_mut(&owner) {
                entry.notes.push(note.id.clone());
            }
            index.note_folder.insert(note.id.clone(), owner);
            index.notes.insert(note.id.clone(), note);
        }

        index.sort_children();
        index
    }

    /// Loads a snapshot from `store` and builds the index.
    pub fn from_store<S: NoteStore + ?Sized>(store: &S) -> StoreResult<Self> {
        let started_at = Instant::now();
        let folders = store.list_folders()?;
        let notes = store.list_notes()?;
        let index = Self::build(folders, notes);

        let unreachable = index.unreachable_folders().len();
        info!(
            "event=tree_build module=tree status=ok folders={} notes={} orphaned_notes={} rerooted_folders={} unreachable_folders={} duration_ms={}",
            index.folders.len(),
            index.notes.len(),
            index.orphaned_notes,
            index.rerooted.len(),
            unreachable,
            started_at.elapsed().as_millis()
        );
        if unreachable > 0 {
            warn!(
                "event=tree_build module=tree status=warn reason=parent_cycle unreachable_folders={unreachable}"
            );
        }
        Ok(index)
    }

    pub fn folder(&self, id: &EntityId) -> Option<&Folder> {
        self.folders.get(id).map(|entry| &entry.folder)
    }

    pub fn note(&self, id: &EntityId) -> Option<&Note> {
        self.notes.get(id)
    }

    /// All folders, including the synthetic Unfiled folder when present.
    pub fn folders(&self) -> impl Iterator<Item = &Folder> {
        self.folders.values().map(|entry| &entry.folder)
    }

    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        self.notes.values()
    }

    pub fn folder_count(&self) -> usize {
        self.folders.len()
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    pub fn orphaned_note_count(&self) -> usize {
        self.orphaned_notes
    }

    /// Folders whose declared parent was missing from the snapshot.
    pub fn rerooted_folders(&self) -> &[EntityId] {
        &self.rerooted
    }

    /// Direct children of `folder_id`, or of the root when `None`.
    ///
    /// The root holds folders only; orphaned notes are in Unfiled.
    pub fn children_of(&self, folder_id: Option<&EntityId>) -> TreeResult<Children<'_>> {
        let (folder_ids, note_ids): (&[EntityId], &[EntityId]) = match folder_id {
            None => (self.root_folders.as_slice(), &[][..]),
            Some(id) => {
                let entry = self
                    .folders
                    .get(id)
                    .ok_or_else(|| TreeError::NotFound(id.clone()))?;
                (entry.child_folders.as_slice(), entry.notes.as_slice())
            }
        };

        Ok(Children {
            folders: folder_ids
                .iter()
                .filter_map(|id| self.folder(id))
                .collect(),
            notes: note_ids.iter().filter_map(|id| self.note(id)).collect(),
        })
    }

    /// Number of notes directly inside `folder_id`.
    pub fn direct_note_count(&self, folder_id: &EntityId) -> usize {
        self.folders
            .get(folder_id)
            .map_or(0, |entry| entry.notes.len())
    }

    /// Effective parent of `folder_id` (`None` at root level).
    pub fn parent_of(&self, folder_id: &EntityId) -> TreeResult<Option<&Folder>> {
        let entry = self
            .folders
            .get(folder_id)
            .ok_or_else(|| TreeError::NotFound(folder_id.clone()))?;
        Ok(entry.parent.as_ref().and_then(|parent| self.folder(parent)))
    }

    /// Whether `child` is a direct child folder of `parent` (`None` = root).
    pub fn is_child_folder(&self, parent: Option<&EntityId>, child: &EntityId) -> bool {
        match self.folders.get(child) {
            Some(entry) => entry.parent.as_ref() == parent && self.reachable_root(child),
            None => false,
        }
    }

    /// Folders from the root down to and including `folder_id`.
    ///
    /// # Errors
    /// - `NotFound` for unknown ids.
    /// - `CorruptHierarchy` when the parent chain loops.
    pub fn path_to(&self, folder_id: &EntityId) -> TreeResult<Vec<&Folder>> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut cursor = Some(folder_id.clone());

        while let Some(current) = cursor {
            if !visited.insert(current.clone()) {
                let mut cycle = chain
                    .iter()
                    .map(|folder: &&Folder| folder.id.clone())
                    .collect::<Vec<_>>();
                cycle.push(current);
                return Err(TreeError::CorruptHierarchy {
                    folder_id: folder_id.clone(),
                    cycle,
                });
            }
            let entry = self
                .folders
                .get(&current)
                .ok_or_else(|| TreeError::NotFound(current.clone()))?;
            chain.push(&entry.folder);
            cursor = entry.parent.clone();
        }

        chain.reverse();
        Ok(chain)
    }

    /// Folder path of the folder owning `note_id`.
    pub fn path_to_note(&self, note_id: &EntityId) -> TreeResult<Vec<&Folder>> {
        let owner = self
            .note_folder
            .get(note_id)
            .ok_or_else(|| TreeError::NotFound(note_id.clone()))?;
        self.path_to(owner)
    }

    /// Effective owning folder of `note_id` (Unfiled for orphans).
    pub fn owner_of(&self, note_id: &EntityId) -> Option<&Folder> {
        self.note_folder
            .get(note_id)
            .and_then(|folder_id| self.folder(folder_id))
    }

    /// Folders that cannot be reached from the root (parent cycles).
    pub fn unreachable_folders(&self) -> Vec<&Folder> {
        let mut seen = HashSet::new();
        let mut queue = self.root_folders.iter().collect::<VecDeque<_>>();
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            if let Some(entry) = self.folders.get(id) {
                queue.extend(entry.child_folders.iter());
            }
        }
        self.folders
            .values()
            .filter(|entry| !seen.contains(&entry.folder.id))
            .map(|entry| &entry.folder)
            .collect()
    }

    fn reachable_root(&self, folder_id: &EntityId) -> bool {
        self.path_to(folder_id).is_ok()
    }

    fn ensure_unfiled(&mut self) -> EntityId {
        let id = EntityId::new(UNFILED_FOLDER_ID);
        if !self.folders.contains_key(&id) {
            self.folders.insert(
                id.clone(),
                FolderEntry {
                    folder: Folder::new(id.clone(), UNFILED_FOLDER_TITLE),
                    parent: None,
                    child_folders: Vec::new(),
                    notes: Vec::new(),
                },
            );
            self.root_folders.push(id.clone());
        }
        id
    }

    fn sort_children(&mut self) {
        let folder_keys = self
            .folders
            .iter()
            .map(|(id, entry)| (id.clone(), sort_key(&entry.folder.title, id)))
            .collect::<BTreeMap<_, _>>();
        let note_keys = self
            .notes
            .iter()
            .map(|(id, note)| (id.clone(), sort_key(&note.title, id)))
            .collect::<BTreeMap<_, _>>();

        self.root_folders
            .sort_by(|a, b| folder_keys[a].cmp(&folder_keys[b]));
        for entry in self.folders.values_mut() {
            entry
                .child_folders
                .sort_by(|a, b| folder_keys[a].cmp(&folder_keys[b]));
            entry.notes.sort_by(|a, b| note_keys[a].cmp(&note_keys[b]));
        }
    }
}

fn sort_key(title: &str, id: &EntityId) -> (String, EntityId) {
    (title.to_lowercase(), id.clone())
}

#[cfg(test)]
mod tests {
    use super::{TreeError, TreeIndex, UNFILED_FOLDER_ID};
    use crate::model::{EntityId, Folder, Note};

    fn id(value: &str) -> EntityId {
        EntityId::new(value)
    }

    #[test]
    fn children_are_sorted_case_insensitively_with_id_tiebreak() {
        let folders = vec![
            Folder::new("r", "Root"),
            Folder::new("c2", "beta").with_parent("r"),
            Folder::new("c1", "Alpha").with_parent("r"),
            Folder::new("c0", "Beta").with_parent("r"),
        ];
        let index = TreeIndex::build(folders, Vec::new());
        let children = index.children_of(Some(&id("r"))).unwrap();
        let order = children
            .folders
            .iter()
            .map(|folder| folder.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(order, vec!["c1", "c0", "c2"]);
    }

    #[test]
    fn orphaned_notes_land_in_unfiled_bucket() {
        let folders = vec![Folder::new("r", "Root")];
        let notes = vec![Note::new("n1", "missing", "Lost", "")];
        let index = TreeIndex::build(folders, notes);

        let unfiled = id(UNFILED_FOLDER_ID);
        assert_eq!(index.orphaned_note_count(), 1);
        assert_eq!(index.owner_of(&id("n1")).unwrap().id, unfiled);
        let root = index.children_of(None).unwrap();
        assert!(root.folders.iter().any(|folder| folder.id == unfiled));
    }

    #[test]
    fn dangling_parent_is_rerooted() {
        let folders = vec![Folder::new("a", "A").with_parent("ghost")];
        let index = TreeIndex::build(folders, Vec::new());
        assert_eq!(index.rerooted_folders(), &[id("a")]);
        assert_eq!(index.path_to(&id("a")).unwrap().len(), 1);
    }

    #[test]
    fn parent_cycle_is_reported_as_corrupt() {
        let folders = vec![
            Folder::new("a", "A").with_parent("b"),
            Folder::new("b", "B").with_parent("a"),
        ];
        let index = TreeIndex::build(folders, Vec::new());
        assert!(matches!(
            index.path_to(&id("a")),
            Err(TreeError::CorruptHierarchy { .. })
        ));
        assert_eq!(index.unreachable_folders().len(), 2);
        assert!(!index.is_child_folder(Some(&id("b")), &id("a")));
    }

    #[test]
    fn unknown_folder_is_not_found() {
        let index = TreeIndex::build(Vec::new(), Vec::new());
        assert_eq!(
            index.children_of(Some(&id("nope"))).unwrap_err(),
            TreeError::NotFound(id("nope"))
        );
    }
}
