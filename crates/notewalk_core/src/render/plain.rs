use super::{AttachmentLink, Dialect};

const DELIMITER: &str = "----------------------------------------";

/// Plain-text dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainText;

impl Dialect for PlainText {
    fn heading(&self, title: &str) -> String {
        let width = title.chars().count().max(1);
        format!("{title}\n{}\n\n", "=".repeat(width))
    }

    fn field(&self, label: &str, value: &str) -> String {
        if value.is_empty() {
            format!("{label}:\n")
        } else {
            format!("{label}: {value}\n")
        }
    }

    fn attachment(&self, link: &AttachmentLink) -> String {
        format!("- {} ({})\n", link.title, link.target)
    }

    fn delimiter(&self) -> &'static str {
        DELIMITER
    }
}
