use super::{AttachmentLink, Dialect};

/// Structured dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct Markdown;

impl Dialect for Markdown {
    fn heading(&self, title: &str) -> String {
        format!("# {}\n\n", escape_heading(title))
    }

    fn field(&self, label: &str, value: &str) -> String {
        if value.is_empty() {
            format!("*{label}:*\n")
        } else {
            format!("*{label}:* {value}\n")
        }
    }

    fn attachment(&self, link: &AttachmentLink) -> String {
        format!("- [{}]({})\n", link.title, link_destination(&link.target))
    }

    fn delimiter(&self) -> &'static str {
        "---"
    }
}

/// Wraps a link target in `<...>` so spaces and parentheses stay inside it.
fn link_destination(target: &str) -> String {
    let mut wrapped = String::with_capacity(target.len() + 2);
    wrapped.push('<');
    for ch in target.chars() {
        if matches!(ch, '\\' | '<' | '>') {
            wrapped.push('\\');
        }
        wrapped.push(ch);
    }
    wrapped.push('>');
    wrapped
}

/// Backslash-escapes characters that change inline markdown meaning.
pub fn escape_heading(title: &str) -> String {
    let mut escaped = String::with_capacity(title.len());
    for ch in title.chars() {
        if matches!(
            ch,
            '\\' | '`' | '*' | '_' | '[' | ']' | '<' | '>' | '#' | '|'
        ) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
