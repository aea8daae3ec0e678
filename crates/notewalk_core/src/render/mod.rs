//! Formatter strategy: note + metadata policy + dialect -> text.
//!
//! # Responsibility
//! - Produce the exact file content written by export and shown by `cat`.
//! - Invert the no-metadata layout back to the body for edit round-trips.
//!
//! # Invariants
//! - Pure: no I/O, no clock, no logging.
//! - The body is embedded verbatim; only the heading is escaped.
//! - Metadata order is fixed: created, updated, tags, attachments, then the
//!   dialect delimiter.
//! - Heading and metadata values are single-line.

mod format;
mod markdown;
mod plain;

pub use format::{ExportFormat, FormatParseError};
pub use markdown::{escape_heading, Markdown};
pub use plain::PlainText;

use crate::model::{Attachment, Note};
use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// Placeholder used for empty tag and attachment lists.
pub const EMPTY_LIST_MARKER: &str = "(none)";
/// Placeholder used for unknown timestamps.
pub const UNKNOWN_TIME: &str = "n/a";

/// Output dialect hooks used by [`render_note`].
pub trait Dialect {
    /// Heading block, terminated by a blank line.
    fn heading(&self, title: &str) -> String;
    /// One `label: value` metadata line.
    fn field(&self, label: &str, value: &str) -> String;
    /// One attachment list item.
    fn attachment(&self, link: &AttachmentLink) -> String;
    /// Line separating metadata from the body.
    fn delimiter(&self) -> &'static str;
}

/// How a note should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RenderOptions {
    pub format: ExportFormat,
    pub include_metadata: bool,
}

impl RenderOptions {
    pub fn new(format: ExportFormat, include_metadata: bool) -> Self {
        Self {
            format,
            include_metadata,
        }
    }
}

/// Attachment entry as it appears in rendered metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentLink {
    pub title: String,
    /// Relative path of the extracted file, or the original file name.
    pub target: String,
}

impl AttachmentLink {
    pub fn new(title: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            target: target.into(),
        }
    }

    /// Link to the attachment's original file name (`unknown` if empty).
    pub fn unextracted(attachment: &Attachment) -> Self {
        let target = if attachment.filename.is_empty() {
            "unknown".to_string()
        } else {
            attachment.filename.clone()
        };
        Self::new(attachment.title.clone(), target)
    }
}

/// Renders `note` with `links` as its attachment list.
pub fn render_note(note: &Note, options: &RenderOptions, links: &[AttachmentLink]) -> String {
    match options.format {
        ExportFormat::Markdown => render_with(&Markdown, note, options.include_metadata, links),
        ExportFormat::PlainText => render_with(&PlainText, note, options.include_metadata, links),
    }
}

/// Renders with an explicit dialect.
pub fn render_with<D: Dialect + ?Sized>(
    dialect: &D,
    note: &Note,
    include_metadata: bool,
    links: &[AttachmentLink],
) -> String {
    let mut out = dialect.heading(&single_line(&note.title));

    if include_metadata {
        out.push_str(&dialect.field("Created", &format_timestamp(note.created_time)));
        out.push_str(&dialect.field("Updated", &format_timestamp(note.updated_time)));

        let tags = if note.tags.is_empty() {
            EMPTY_LIST_MARKER.to_string()
        } else {
            note.tags
                .iter()
                .map(|tag| single_line(tag))
                .collect::<Vec<_>>()
                .join(", ")
        };
        out.push_str(&dialect.field("Tags", &tags));

        if links.is_empty() {
            out.push_str(&dialect.field("Attachments", EMPTY_LIST_MARKER));
        } else {
            out.push_str(&dialect.field("Attachments", ""));
            for link in links {
                let link = AttachmentLink::new(single_line(&link.title), single_line(&link.target));
                out.push_str(&dialect.attachment(&link));
            }
        }

        out.push('\n');
        out.push_str(dialect.delimiter());
        out.push_str("\n\n");
    }

    out.push_str(&note.body);
    out.push('\n');
    out
}

/// Recovers the body of `note` from text produced by [`render_note`].
///
/// The text must start with the exact heading rendered for `note.title`
/// (its trailing blank line may be missing). At most one trailing newline
/// is removed. Returns `None` when the heading or the metadata delimiter
/// is not where it was rendered.
pub fn parse_body(rendered: &str, note: &Note, options: &RenderOptions) -> Option<String> {
    let heading = match options.format {
        ExportFormat::Markdown => Markdown.heading(&single_line(&note.title)),
        ExportFormat::PlainText => PlainText.heading(&single_line(&note.title)),
    };
    let rest = rendered
        .strip_prefix(heading.as_str())
        .or_else(|| rendered.strip_prefix(heading.strip_suffix('\n')?))?;

    let body = if options.include_metadata {
        let delimiter = match options.format {
            ExportFormat::Markdown => Markdown.delimiter(),
            ExportFormat::PlainText => PlainText.delimiter(),
        };
        let marker = format!("\n{delimiter}\n\n");
        let (_, body) = rest.split_once(&marker)?;
        body
    } else {
        rest
    };
    Some(body.strip_suffix('\n').unwrap_or(body).to_string())
}

/// Formats epoch milliseconds as UTC `YYYY-MM-DDTHH:MM:SSZ`.
///
/// Zero and out-of-range values render as `n/a`.
pub fn format_timestamp(epoch_ms: i64) -> String {
    if epoch_ms == 0 {
        return UNKNOWN_TIME.to_string();
    }
    DateTime::from_timestamp_millis(epoch_ms)
        .map(|value| value.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| UNKNOWN_TIME.to_string())
}

fn single_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}
