//! One interactive browsing session.
//!
//! # Responsibility
//! - Own the tree snapshot and the navigation cursor.
//! - Route every user token through the identifier resolver.
//! - Dispatch to search, export and edit.
//!
//! # Invariants
//! - The cursor is always valid for the current snapshot.
//! - A failed `change_dir` leaves the cursor where it was.
//! - The snapshot is rebuilt only by `refresh` (and after a saved edit).

use crate::cursor::NavCursor;
use crate::edit::{EditController, EditOutcome, Editor};
use crate::error::{CoreError, CoreResult};
use crate::export::{ExportFs, ExportReport, ExportTarget, Exporter};
use crate::model::{EntityId, EntityKind, EntityRef, Folder, Identified, Note};
use crate::render::RenderOptions;
use crate::resolve::{resolve, ResolveError};
use crate::search::{search_notes, SearchQuery};
use crate::store::NoteStore;
use crate::tree::{TreeIndex, UNFILED_FOLDER_TITLE};
use log::{debug, info};
use std::path::Path;

/// Subfolder row of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRow<'a> {
    pub folder: &'a Folder,
    /// Notes directly inside the folder.
    pub note_count: usize,
}

/// Children of the current position, in index order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing<'a> {
    pub folders: Vec<FolderRow<'a>>,
    pub notes: Vec<&'a Note>,
}

impl Listing<'_> {
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.notes.is_empty()
    }
}

pub struct Session<'s, S: NoteStore + ?Sized> {
    store: &'s S,
    index: TreeIndex,
    cursor: NavCursor,
}

impl<'s, S: NoteStore + ?Sized> Session<'s, S> {
    /// Builds the snapshot from `store` and starts at the root.
    pub fn open(store: &'s S) -> CoreResult<Self> {
        let index = TreeIndex::from_store(store)?;
        Ok(Self::with_index(store, index))
    }

    pub fn with_index(store: &'s S, index: TreeIndex) -> Self {
        Self {
            store,
            index,
            cursor: NavCursor::new(),
        }
    }

    pub fn store(&self) -> &S {
        self.store
    }

    pub fn index(&self) -> &TreeIndex {
        &self.index
    }

    pub fn cursor(&self) -> &NavCursor {
        &self.cursor
    }

    pub fn current_folder(&self) -> Option<&Folder> {
        self.cursor.current().and_then(|id| self.index.folder(id))
    }

    pub fn breadcrumb(&self) -> String {
        self.cursor.breadcrumb(&self.index)
    }

    pub fn list(&self) -> CoreResult<Listing<'_>> {
        let children = self.index.children_of(self.cursor.current())?;
        Ok(Listing {
            folders: children
                .folders
                .into_iter()
                .map(|folder| FolderRow {
                    folder,
                    note_count: self.index.direct_note_count(&folder.id),
                })
                .collect(),
            notes: children.notes,
        })
    }

    /// Moves the cursor.
    ///
    /// Accepts `..`, `/`, a folder token, or a `/`-separated chain of them
    /// (`../Work`, `/abc/def`). An empty target returns to the root.
    pub fn change_dir(&mut self, target: &str) -> CoreResult<()> {
        let target = target.trim();
        let mut cursor = self.cursor.clone();

        let rest = match target.strip_prefix('/') {
            Some(rest) => {
                cursor.reset();
                rest
            }
            None if target.is_empty() => {
                cursor.reset();
                ""
            }
            None => target,
        };

        for segment in rest.split('/').filter(|segment| !segment.is_empty()) {
            match segment {
                ".." => cursor.ascend(),
                "." => {}
                token => {
                    let children = self.index.children_of(cursor.current())?;
                    let folder = match resolve(token, children.folders.iter().copied()) {
                        Ok(folder) => folder,
                        Err(ResolveError::NotFound { .. })
                            if self.index.folder(&EntityId::new(token)).is_some() =>
                        {
                            return Err(CoreError::InvalidTarget(EntityId::new(token)));
                        }
                        Err(err) => return Err(err.into()),
                    };
                    cursor.descend(&self.index, &folder.id)?;
                }
            }
        }

        self.cursor = cursor;
        debug!(
            "event=navigate module=session status=ok depth={}",
            self.cursor.depth()
        );
        Ok(())
    }

    /// Resolves a note token.
    ///
    /// `<folder>/<note>` resolves the folder among all folders and the note
    /// among that folder's notes. A bare token is tried as an exact id, then
    /// as a prefix among the current folder's notes (all notes at the root).
    pub fn find_note(&self, token: &str) -> CoreResult<&Note> {
        let token = token.trim();
        if let Some((folder_token, note_token)) = token.split_once('/') {
            if folder_token.is_empty() {
                return Ok(resolve(note_token, self.index.notes())?);
            }
            let folder = resolve(folder_token, self.index.folders())?;
            let children = self.index.children_of(Some(&folder.id))?;
            return Ok(resolve(note_token, children.notes.iter().copied())?);
        }

        if let Some(note) = self.index.note(&EntityId::new(token)) {
            return Ok(note);
        }
        Ok(resolve(token, self.note_scope()?)?)
    }

    /// Export target for `token`, or the current position when `None`.
    pub fn resolve_target(&self, token: Option<&str>) -> CoreResult<ExportTarget> {
        let Some(token) = token.map(str::trim).filter(|token| !token.is_empty()) else {
            return Ok(match self.cursor.current() {
                Some(id) => ExportTarget::Folder(id.clone()),
                None => ExportTarget::Root,
            });
        };

        if token.contains('/') {
            return Ok(ExportTarget::Note(self.find_note(token)?.id.clone()));
        }

        let exact = EntityId::new(token);
        if self.index.folder(&exact).is_some() {
            return Ok(ExportTarget::Folder(exact));
        }
        if self.index.note(&exact).is_some() {
            return Ok(ExportTarget::Note(exact));
        }

        let children = self.index.children_of(self.cursor.current())?;
        let candidates = children
            .folders
            .iter()
            .map(|folder| folder.entity_ref())
            .chain(self.note_scope()?.into_iter().map(|note| note.entity_ref()))
            .collect::<Vec<EntityRef>>();
        let hit = resolve(token, candidates)?;
        Ok(match hit.kind {
            EntityKind::Folder => ExportTarget::Folder(hit.id),
            EntityKind::Note => ExportTarget::Note(hit.id),
        })
    }

    pub fn search(&self, query: &SearchQuery) -> CoreResult<Vec<Note>> {
        Ok(search_notes(self.store, query)?)
    }

    /// Folder path of `note` for display, e.g. `Work/Projects`.
    pub fn note_location(&self, note: &Note) -> String {
        let path = match self.index.note(&note.id) {
            Some(_) => self.index.path_to_note(&note.id),
            None => match note.folder_id.as_ref() {
                Some(folder_id) => self.index.path_to(folder_id),
                None => return UNFILED_FOLDER_TITLE.to_string(),
            },
        };
        match path {
            Ok(folders) => folders
                .iter()
                .map(|folder| folder.title.as_str())
                .collect::<Vec<_>>()
                .join("/"),
            Err(_) => UNFILED_FOLDER_TITLE.to_string(),
        }
    }

    pub fn export<F: ExportFs + ?Sized>(
        &self,
        target: &ExportTarget,
        fs: &F,
        dest: &Path,
        options: &RenderOptions,
    ) -> CoreResult<ExportReport> {
        Ok(Exporter::new(self.store, &self.index, fs).export(target, dest, options)?)
    }

    /// Edits the note named by `token`, re-reading its body from the store.
    ///
    /// A saved edit rebuilds the snapshot.
    pub fn edit<E: Editor + ?Sized>(
        &mut self,
        token: &str,
        editor: &E,
        write_enabled: bool,
    ) -> CoreResult<EditOutcome> {
        let id = self.find_note(token)?.id.clone();
        let note = self
            .store
            .get_note(&id)?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;

        let outcome = EditController::new(self.store, editor).edit(&note, write_enabled)?;
        if matches!(outcome, EditOutcome::Saved { .. }) {
            self.refresh()?;
        }
        Ok(outcome)
    }

    /// Rebuilds the snapshot and trims the cursor to what still exists.
    pub fn refresh(&mut self) -> CoreResult<()> {
        self.index = TreeIndex::from_store(self.store)?;
        self.cursor.revalidate(&self.index);
        info!(
            "event=session_refresh module=session status=ok depth={}",
            self.cursor.depth()
        );
        Ok(())
    }

    fn note_scope(&self) -> CoreResult<Vec<&Note>> {
        match self.cursor.current() {
            None => Ok(self.index.notes().collect()),
            Some(id) => Ok(self.index.children_of(Some(id))?.notes),
        }
    }
}
