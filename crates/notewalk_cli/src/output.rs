//! Human-readable rendering of session results.
//!
//! Every function writes to a caller-supplied sink so the loop can be driven
//! against buffers in tests.

use notewalk_core::render::format_timestamp;
use notewalk_core::session::Listing;
use notewalk_core::{CoreError, EditOutcome, ExportReport, Note};
use std::io::{self, Write};
use std::path::Path;

pub fn write_listing<W: Write>(out: &mut W, heading: Option<&str>, listing: &Listing<'_>) -> io::Result<()> {
    match heading {
        Some(title) => writeln!(out, "\n=== {title} ===")?,
        None => writeln!(out, "\n=== Your Joplin Folders ===")?,
    }

    writeln!(out, "Folders:")?;
    if listing.folders.is_empty() {
        writeln!(out, "  (No subfolders)")?;
    }
    for row in &listing.folders {
        writeln!(
            out,
            "  [{}] {} ({} notes)",
            row.folder.id.short(),
            row.folder.title,
            row.note_count
        )?;
    }

    writeln!(out, "\nNotes ({}):", listing.notes.len())?;
    if listing.notes.is_empty() {
        writeln!(out, "  (No notes)")?;
    }
    for note in &listing.notes {
        let tags = if note.tags.is_empty() {
            "-".to_string()
        } else {
            note.tags.join(", ")
        };
        writeln!(out, "  [{}] {} | tags: {}", note.id.short(), note.title, tags)?;
    }
    writeln!(out)
}

pub fn write_note<W: Write>(out: &mut W, note: &Note) -> io::Result<()> {
    writeln!(out, "\n=== {} ===", note.title)?;
    writeln!(out, "ID: {}", note.id)?;
    writeln!(out, "Created: {}", format_timestamp(note.created_time))?;
    writeln!(out, "Updated: {}", format_timestamp(note.updated_time))?;
    if note.tags.is_empty() {
        writeln!(out, "Tags: (no tags)")?;
    } else {
        writeln!(out, "Tags: {}", note.tags.join(", "))?;
    }

    if note.attachments.is_empty() {
        writeln!(out, "Attachments: (none)")?;
    } else {
        writeln!(out, "Attachments ({}):", note.attachments.len())?;
        for attachment in &note.attachments {
            let mime = if attachment.mime.is_empty() {
                "unknown"
            } else {
                attachment.mime.as_str()
            };
            writeln!(out, "  * {} ({mime})", attachment.title)?;
            if !attachment.filename.is_empty() {
                writeln!(out, "    File: {}", attachment.filename)?;
            }
        }
    }

    writeln!(out, "\n--- Content ---")?;
    if note.body.is_empty() {
        writeln!(out, "(No content)")?;
    } else {
        writeln!(out, "{}", note.body)?;
    }
    writeln!(out)
}

pub fn write_cat<W: Write>(out: &mut W, note: &Note) -> io::Result<()> {
    writeln!(out, "# {}\n", note.title)?;
    if note.body.is_empty() {
        writeln!(out, "(This note has no content)")?;
    } else {
        writeln!(out, "{}", note.body)?;
    }
    writeln!(out)
}

/// `hits` pairs each note with its folder path.
pub fn write_search_results<W: Write>(out: &mut W, query: &str, hits: &[(Note, String)]) -> io::Result<()> {
    if hits.is_empty() {
        return writeln!(out, "No matches found.");
    }
    writeln!(out, "\nSearch results for '{query}' ({} hits):", hits.len())?;
    for (note, location) in hits {
        let folder = note
            .folder_id
            .as_ref()
            .map(|id| format!("{}/", id.short()))
            .unwrap_or_default();
        writeln!(out, "  [{folder}{}] {}  ({location})", note.id.short(), note.title)?;
    }
    writeln!(out, "\nTip: use folder-id/note-id with n, cat or vim.")
}

pub fn write_export_report<W: Write>(out: &mut W, dest: &Path, report: &ExportReport) -> io::Result<()> {
    writeln!(
        out,
        "Export finished -> {} ({} folders, {} notes, {} attachments)",
        dest.display(),
        report.folders_created,
        report.notes_written,
        report.attachments_written
    )?;
    if !report.is_complete() {
        writeln!(out, "{} item(s) failed:", report.failures.len())?;
        for failure in &report.failures {
            match &failure.path {
                Some(path) => writeln!(out, "  {failure} [{}]", path.display())?,
                None => writeln!(out, "  {failure}")?,
            }
        }
    }
    Ok(())
}

pub fn write_edit_outcome<W: Write>(out: &mut W, title: &str, outcome: &EditOutcome) -> io::Result<()> {
    match outcome {
        EditOutcome::Unchanged => writeln!(out, "No changes made to the note."),
        EditOutcome::DiscardedReadOnly => {
            writeln!(out, "Note '{title}' was modified.")?;
            writeln!(out, "READ-ONLY: changes were not saved to the database.")?;
            writeln!(out, "Restart with --write to enable saving, or export the note with 'e'.")
        }
        EditOutcome::Saved { updated_time } => {
            writeln!(out, "Note '{title}' has been updated in the database.")?;
            writeln!(out, "  Updated time: {}", format_timestamp(*updated_time))
        }
    }
}

pub fn write_error<W: Write>(out: &mut W, err: &CoreError) -> io::Result<()> {
    if err.is_recoverable() {
        writeln!(out, "{err}")
    } else {
        writeln!(out, "ERROR: {err}")
    }
}

pub const HELP_TEXT: &str = "\
=== notewalk ===
Browse, search, edit and export Joplin notes.

Commands:
  l                 - List folders/notes at current location
  cd <folder-id>    - Navigate into folder (chains like ../Work work too)
  cd ..             - Go back to parent folder
  cd /              - Go back to root level
  s <search-term>   - Search all notes (full-text search)
  n <note-id>       - View full note content with metadata
  cat <note-id>     - View note content (no metadata)
  vim <note-id>     - Open note in the editor
  e [id]            - Export current folder, or one folder or note
  h, help, ?        - Show this help message
  q                 - Quit

Quick start:
  1. 'l' - see your folders
  2. 'cd <id>' - enter a folder
  3. 'n <id>' - read a note
  4. 'cd /' - return to root level

Tip: use the first 8 characters of any ID.
";

#[cfg(test)]
mod tests {
    use super::{write_cat, write_edit_outcome, write_listing, write_note, write_search_results};
    use notewalk_core::session::{FolderRow, Listing};
    use notewalk_core::{Attachment, EditOutcome, EntityId, Folder, Note};

    fn render<F: FnOnce(&mut Vec<u8>) -> std::io::Result<()>>(f: F) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn listing_shows_short_ids_counts_and_tags() {
        let folder = Folder::new("0123456789abcdef", "Work");
        let mut note = Note::new("fedcba9876543210", "0123456789abcdef", "Plan", "");
        note.tags = vec!["a".to_string(), "b".to_string()];
        let listing = Listing {
            folders: vec![FolderRow {
                folder: &folder,
                note_count: 3,
            }],
            notes: vec![&note],
        };

        let text = render(|out| write_listing(out, Some("Work"), &listing));
        assert!(text.contains("=== Work ==="));
        assert!(text.contains("  [01234567] Work (3 notes)"));
        assert!(text.contains("Notes (1):"));
        assert!(text.contains("  [fedcba98] Plan | tags: a, b"));
    }

    #[test]
    fn empty_root_listing_has_placeholders() {
        let listing = Listing {
            folders: Vec::new(),
            notes: Vec::new(),
        };
        let text = render(|out| write_listing(out, None, &listing));
        assert!(text.contains("=== Your Joplin Folders ==="));
        assert!(text.contains("(No subfolders)"));
        assert!(text.contains("(No notes)"));
    }

    #[test]
    fn note_view_lists_attachments_and_body() {
        let mut note = Note::new("n1", "f1", "Trip", "pack bags");
        note.attachments.push(Attachment {
            handle: EntityId::new("r1"),
            title: "Map".to_string(),
            filename: "map.png".to_string(),
            mime: "image/png".to_string(),
        });

        let text = render(|out| write_note(out, &note));
        assert!(text.contains("=== Trip ==="));
        assert!(text.contains("Tags: (no tags)"));
        assert!(text.contains("Created: n/a"));
        assert!(text.contains("Attachments (1):"));
        assert!(text.contains("  * Map (image/png)"));
        assert!(text.contains("    File: map.png"));
        assert!(text.contains("--- Content ---\npack bags"));
    }

    #[test]
    fn cat_prints_heading_and_body_only() {
        let note = Note::new("n1", "f1", "Trip", "pack bags");
        let text = render(|out| write_cat(out, &note));
        assert_eq!(text, "# Trip\n\npack bags\n\n");
    }

    #[test]
    fn search_without_hits_says_so() {
        let text = render(|out| write_search_results(out, "zzz", &[]));
        assert_eq!(text, "No matches found.\n");
    }

    #[test]
    fn read_only_edit_explains_discard() {
        let text = render(|out| write_edit_outcome(out, "Trip", &EditOutcome::DiscardedReadOnly));
        assert!(text.contains("READ-ONLY"));
    }
}
