use crate::model::{EntityId, EntityRef};
use crate::tree::TreeError;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;

pub type ExportResult<T> = Result<T, ExportError>;

/// What went wrong for one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Folder directory could not be created; its subtree was skipped.
    Directory,
    /// An attachment could not be read or written.
    Attachment,
    /// The rendered note file could not be written.
    Write,
    /// Folder sits on a parent cycle and is unreachable from the root.
    CorruptHierarchy,
}

impl Display for FailureKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Directory => "directory",
            Self::Attachment => "attachment",
            Self::Write => "write",
            Self::CorruptHierarchy => "corrupt_hierarchy",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportFailure {
    pub entity: EntityRef,
    pub kind: FailureKind,
    pub message: String,
    /// Path being created or written, when known.
    pub path: Option<PathBuf>,
}

impl Display for ExportFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.entity, self.kind, self.message)
    }
}

/// Aggregate outcome of one export run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    /// Folder directories ensured (created or reused).
    pub folders_created: usize,
    pub notes_written: usize,
    pub attachments_written: usize,
    pub failures: Vec<ExportFailure>,
}

impl ExportReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Converts a report with failures into `ExportError::PartialFailure`.
    pub fn ensure_complete(self) -> ExportResult<Self> {
        if self.is_complete() {
            Ok(self)
        } else {
            Err(ExportError::PartialFailure(self))
        }
    }
}

#[derive(Debug)]
pub enum ExportError {
    /// Export target does not exist in the snapshot.
    NotFound(EntityId),
    /// Target path from the root cannot be computed.
    CorruptHierarchy(TreeError),
    /// Destination root directory cannot be created.
    Destination { path: PathBuf, source: io::Error },
    /// The run finished but some entities failed.
    PartialFailure(ExportReport),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "export target not found: {id}"),
            Self::CorruptHierarchy(err) => write!(f, "{err}"),
            Self::Destination { path, source } => {
                write!(f, "cannot create export root {}: {source}", path.display())
            }
            Self::PartialFailure(report) => write!(
                f,
                "export finished with {} failure(s); {} note(s) written",
                report.failures.len(),
                report.notes_written
            ),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CorruptHierarchy(err) => Some(err),
            Self::Destination { source, .. } => Some(source),
            Self::NotFound(_) | Self::PartialFailure(_) => None,
        }
    }
}

impl From<TreeError> for ExportError {
    fn from(value: TreeError) -> Self {
        match value {
            TreeError::NotFound(id) => Self::NotFound(id),
            other => Self::CorruptHierarchy(other),
        }
    }
}
