use super::{EditError, EditResult};
use std::path::Path;
use std::process::Command;

/// Blocking editor hand-off: returns once the file at `path` holds the
/// final content.
pub trait Editor {
    fn edit_file(&self, path: &Path) -> EditResult<()>;
}

impl<F> Editor for F
where
    F: Fn(&Path) -> EditResult<()>,
{
    fn edit_file(&self, path: &Path) -> EditResult<()> {
        self(path)
    }
}

/// Editor subprocess such as `vim` or `code --wait`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalEditor {
    command: String,
}

impl ExternalEditor {
    /// `command` is split on whitespace; the file path is appended last.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    fn unavailable(&self, message: impl Into<String>) -> EditError {
        EditError::EditorUnavailable {
            command: self.command.clone(),
            message: message.into(),
        }
    }
}

impl Editor for ExternalEditor {
    fn edit_file(&self, path: &Path) -> EditResult<()> {
        let mut parts = self.command.split_whitespace();
        let Some(program) = parts.next() else {
            return Err(self.unavailable("empty editor command"));
        };

        let status = Command::new(program)
            .args(parts)
            .arg(path)
            .status()
            .map_err(|err| self.unavailable(format!("failed to launch: {err}")))?;

        if !status.success() {
            return Err(self.unavailable(format!("exited with {status}")));
        }
        Ok(())
    }
}
