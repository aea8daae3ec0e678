use super::fs::ExportFs;
use super::naming::{attachment_file_name, sanitize_segment};
use super::report::{ExportError, ExportFailure, ExportReport, ExportResult, FailureKind};
use crate::model::{EntityId, Folder, Identified, Note};
use crate::render::{render_note, AttachmentLink, RenderOptions};
use crate::store::NoteStore;
use crate::tree::TreeIndex;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

const ATTACHMENTS_DIR: &str = "attachments";

/// What to export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    /// Every folder reachable from the root.
    Root,
    /// One folder and its subtree, under its mirrored ancestor path.
    Folder(EntityId),
    /// One note, under its mirrored folder path.
    Note(EntityId),
}

/// Walks a [`TreeIndex`] and writes rendered notes through an [`ExportFs`].
pub struct Exporter<'a, S: NoteStore + ?Sized, F: ExportFs + ?Sized> {
    store: &'a S,
    index: &'a TreeIndex,
    fs: &'a F,
}

struct Run<'r> {
    dest: &'r Path,
    options: &'r RenderOptions,
    report: ExportReport,
}

impl<'a, S: NoteStore + ?Sized, F: ExportFs + ?Sized> Exporter<'a, S, F> {
    pub fn new(store: &'a S, index: &'a TreeIndex, fs: &'a F) -> Self {
        Self { store, index, fs }
    }

    /// Exports `target` below `dest`.
    ///
    /// Per-entity failures are collected in the report; use
    /// [`ExportReport::ensure_complete`] to treat them as an error.
    ///
    /// # Errors
    /// - `NotFound` when the target id is not in the snapshot.
    /// - `CorruptHierarchy` when the target's ancestry loops.
    /// - `Destination` when `dest` itself cannot be created.
    pub fn export(
        &self,
        target: &ExportTarget,
        dest: &Path,
        options: &RenderOptions,
    ) -> ExportResult<ExportReport> {
        let started_at = Instant::now();
        info!(
            "event=export module=export status=start target={} format={} metadata={}",
            target_label(target),
            options.format,
            options.include_metadata
        );

        self.fs
            .create_dir_all(dest)
            .map_err(|source| ExportError::Destination {
                path: dest.to_path_buf(),
                source,
            })?;

        let mut run = Run {
            dest,
            options,
            report: ExportReport::default(),
        };

        match target {
            ExportTarget::Root => self.export_root(&mut run)?,
            ExportTarget::Folder(id) => self.export_folder_target(&mut run, id)?,
            ExportTarget::Note(id) => self.export_note_target(&mut run, id)?,
        }

        let report = run.report;
        info!(
            "event=export module=export status=ok target={} folders={} notes={} attachments={} failures={} duration_ms={}",
            target_label(target),
            report.folders_created,
            report.notes_written,
            report.attachments_written,
            report.failures.len(),
            started_at.elapsed().as_millis()
        );
        Ok(report)
    }

    fn export_root(&self, run: &mut Run<'_>) -> ExportResult<()> {
        let dest = run.dest.to_path_buf();
        let roots = self.index.children_of(None)?;
        for folder in roots.folders {
            self.export_folder(run, folder, dest.clone());
        }

        for folder in self.index.unreachable_folders() {
            let message = match self.index.path_to(&folder.id) {
                Err(err) => err.to_string(),
                Ok(_) => "folder is unreachable from the root".to_string(),
            };
            warn!(
                "event=export_folder module=export status=error reason=corrupt_hierarchy folder_id={}",
                folder.id
            );
            run.report.failures.push(ExportFailure {
                entity: folder.entity_ref(),
                kind: FailureKind::CorruptHierarchy,
                message,
                path: None,
            });
        }
        Ok(())
    }

    fn export_folder_target(&self, run: &mut Run<'_>, id: &EntityId) -> ExportResult<()> {
        let path = self.index.path_to(id)?;
        let Some((folder, ancestors)) = path.split_last() else {
            return Err(ExportError::NotFound(id.clone()));
        };
        let parent_dir = self.mirrored_dir(run.dest, ancestors);
        self.export_folder(run, folder, parent_dir);
        Ok(())
    }

    fn export_note_target(&self, run: &mut Run<'_>, id: &EntityId) -> ExportResult<()> {
        let note = self
            .index
            .note(id)
            .ok_or_else(|| ExportError::NotFound(id.clone()))?;
        let path = self.index.path_to_note(id)?;
        let dir = self.mirrored_dir(run.dest, &path);

        if let Err(err) = self.fs.create_dir_all(&dir) {
            self.record_failure(run, note, FailureKind::Directory, err.to_string(), dir);
            return Ok(());
        }
        self.export_note(run, note, &dir);
        Ok(())
    }

    fn export_folder(&self, run: &mut Run<'_>, folder: &Folder, parent_dir: PathBuf) {
        let dir = parent_dir.join(sanitize_segment(&folder.title, &folder.id));
        if let Err(err) = self.fs.create_dir_all(&dir) {
            self.record_failure(run, folder, FailureKind::Directory, err.to_string(), dir);
            return;
        }
        run.report.folders_created += 1;
        debug!(
            "event=export_folder module=export status=ok folder_id={}",
            folder.id
        );

        let children = match self.index.children_of(Some(&folder.id)) {
            Ok(children) => children,
            Err(err) => {
                self.record_failure(run, folder, FailureKind::Directory, err.to_string(), dir);
                return;
            }
        };
        for note in children.notes {
            self.export_note(run, note, &dir);
        }
        for child in children.folders {
            self.export_folder(run, child, dir.clone());
        }
    }

    fn export_note(&self, run: &mut Run<'_>, note: &Note, dir: &Path) {
        let links = if run.options.include_metadata && !note.attachments.is_empty() {
            match self.extract_attachments(run, note, dir) {
                Ok(links) => links,
                Err((message, path)) => {
                    self.record_failure(run, note, FailureKind::Attachment, message, path);
                    return;
                }
            }
        } else {
            Vec::new()
        };

        let content = render_note(note, run.options, &links);
        let file_name = format!(
            "{}.{}",
            sanitize_segment(&note.title, &note.id),
            run.options.format.extension()
        );
        let path = dir.join(file_name);

        if let Err(err) = self.fs.write_atomic(&path, content.as_bytes()) {
            self.record_failure(run, note, FailureKind::Write, err.to_string(), path);
            return;
        }
        run.report.notes_written += 1;
        debug!(
            "event=export_note module=export status=ok note_id={} bytes={}",
            note.id,
            content.len()
        );
    }

    /// Writes every attachment blob of `note` and returns the links to
    /// render. Attachments without data link to their original file name.
    fn extract_attachments(
        &self,
        run: &mut Run<'_>,
        note: &Note,
        note_dir: &Path,
    ) -> Result<Vec<AttachmentLink>, (String, PathBuf)> {
        let segment = sanitize_segment(&note.title, &note.id);
        let attachments_dir = note_dir.join(ATTACHMENTS_DIR).join(&segment);
        let mut dir_ready = false;
        let mut links = Vec::with_capacity(note.attachments.len());

        for attachment in &note.attachments {
            let data = self
                .store
                .read_attachment(&attachment.handle)
                .map_err(|err| (err.to_string(), attachments_dir.clone()))?;

            let Some(data) = data.filter(|bytes| !bytes.is_empty()) else {
                debug!(
                    "event=export_attachment module=export status=skip reason=no_data note_id={} handle={}",
                    note.id, attachment.handle
                );
                links.push(AttachmentLink::unextracted(attachment));
                continue;
            };

            if !dir_ready {
                self.fs
                    .create_dir_all(&attachments_dir)
                    .map_err(|err| (err.to_string(), attachments_dir.clone()))?;
                dir_ready = true;
            }

            let file_name = attachment_file_name(attachment);
            let path = attachments_dir.join(&file_name);
            self.fs
                .write_atomic(&path, &data)
                .map_err(|err| (err.to_string(), path.clone()))?;
            run.report.attachments_written += 1;

            let title = if attachment.title.is_empty() {
                file_name.clone()
            } else {
                attachment.title.clone()
            };
            links.push(AttachmentLink::new(
                title,
                format!("{ATTACHMENTS_DIR}/{segment}/{file_name}"),
            ));
        }

        Ok(links)
    }

    fn mirrored_dir(&self, dest: &Path, folders: &[&Folder]) -> PathBuf {
        folders.iter().fold(dest.to_path_buf(), |dir, folder| {
            dir.join(sanitize_segment(&folder.title, &folder.id))
        })
    }

    fn record_failure<E: Identified>(
        &self,
        run: &mut Run<'_>,
        entity: &E,
        kind: FailureKind,
        message: String,
        path: PathBuf,
    ) {
        warn!(
            "event=export_entity module=export status=error kind={kind} entity={} id={} error={message}",
            entity.kind(),
            entity.id()
        );
        run.report.failures.push(ExportFailure {
            entity: entity.entity_ref(),
            kind,
            message,
            path: Some(path),
        });
    }
}

fn target_label(target: &ExportTarget) -> String {
    match target {
        ExportTarget::Root => "root".to_string(),
        ExportTarget::Folder(id) => format!("folder:{id}"),
        ExportTarget::Note(id) => format!("note:{id}"),
    }
}
