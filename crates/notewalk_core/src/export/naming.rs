use crate::model::{Attachment, EntityId};
use once_cell::sync::Lazy;
use regex::Regex;

static UNSAFE_SEGMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[\\/:*?"<>|\x00-\x1F\x7F]"#).expect("valid unsafe segment regex")
});

/// Maps `title` to a single safe path segment.
///
/// Unsafe characters become `_` and surrounding whitespace is trimmed.
/// Titles that end up empty (or `.`/`..`) fall back to
/// `untitled-<short id>`.
pub fn sanitize_segment(title: &str, id: &EntityId) -> String {
    clean_segment(title).unwrap_or_else(|| format!("untitled-{}", id.short()))
}

/// File name for an extracted attachment.
///
/// Uses the original file name, else the title, else `resource_<short id>`,
/// adding an extension derived from the mime type when the name has none.
pub fn attachment_file_name(attachment: &Attachment) -> String {
    let name = [attachment.filename.as_str(), attachment.title.as_str()]
        .into_iter()
        .find_map(clean_segment)
        .unwrap_or_else(|| format!("resource_{}", attachment.handle.short()));

    if name.contains('.') {
        return name;
    }
    match extension_for_mime(&attachment.mime) {
        Some(extension) => format!("{name}.{extension}"),
        None => name,
    }
}

/// Preferred file extension for `mime`, without the dot.
pub fn extension_for_mime(mime: &str) -> Option<String> {
    let essence = mime.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    if essence.is_empty() {
        return None;
    }
    if essence == "text/plain" {
        return Some("txt".to_string());
    }

    let subtype = essence.split_once('/').map(|(_, subtype)| subtype)?;
    let known = mime_guess::get_mime_extensions_str(&essence).unwrap_or_default();
    if known.iter().any(|extension| *extension == subtype) {
        return Some(subtype.to_string());
    }
    if let Some(first) = known.first() {
        return Some((*first).to_string());
    }
    if essence.starts_with("image/") || essence.starts_with("text/") {
        let simple = subtype.split('+').next().unwrap_or(subtype);
        if !simple.is_empty() && simple.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Some(simple.to_string());
        }
    }
    None
}

fn clean_segment(raw: &str) -> Option<String> {
    let replaced = UNSAFE_SEGMENT_RE.replace_all(raw, "_");
    let trimmed = replaced.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        return None;
    }
    Some(trimmed.to_string())
}
