//! Session-level error taxonomy.
//!
//! # Responsibility
//! - Fold module errors into the categories the interactive loop reports.
//! - Tell recoverable, session-local failures from integrity problems.

use crate::cursor::CursorError;
use crate::db::DbError;
use crate::edit::EditError;
use crate::export::{ExportError, ExportReport};
use crate::model::{EntityId, EntityRef};
use crate::resolve::ResolveError;
use crate::search::SearchError;
use crate::store::StoreError;
use crate::tree::TreeError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug)]
pub enum CoreError {
    /// Token or id resolves to nothing.
    NotFound(String),
    /// Token matches several entities.
    Ambiguous {
        token: String,
        matches: Vec<EntityRef>,
    },
    /// Navigation into something that is not a child folder.
    InvalidTarget(EntityId),
    /// Full-text syntax rejected by the store, message verbatim.
    InvalidQuery { query: String, message: String },
    /// Parent cycle in the folder data.
    CorruptHierarchy(String),
    EditorUnavailable { command: String, message: String },
    StoreWriteFailed(StoreError),
    /// Export finished with per-entity failures.
    ExportPartialFailure(ExportReport),
    Store(StoreError),
    Io(io::Error),
}

impl CoreError {
    /// `true` when the session can simply report the error and continue.
    ///
    /// Corrupt hierarchy, store transport and I/O failures are integrity
    /// or environment problems and are surfaced prominently instead.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::NotFound(_)
            | Self::Ambiguous { .. }
            | Self::InvalidTarget(_)
            | Self::InvalidQuery { .. }
            | Self::EditorUnavailable { .. }
            | Self::StoreWriteFailed(_)
            | Self::ExportPartialFailure(_) => true,
            Self::CorruptHierarchy(_) | Self::Store(_) | Self::Io(_) => false,
        }
    }
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(what) => write!(f, "not found: {what}"),
            Self::Ambiguous { token, matches } => {
                write!(f, "`{token}` is ambiguous; candidates:")?;
                for entity in matches {
                    write!(f, "\n  {entity}")?;
                }
                Ok(())
            }
            Self::InvalidTarget(id) => write!(f, "{id} is not a subfolder of the current folder"),
            Self::InvalidQuery { query, message } => {
                write!(f, "invalid search query `{query}`: {message}")
            }
            Self::CorruptHierarchy(message) => write!(f, "corrupt folder hierarchy: {message}"),
            Self::EditorUnavailable { command, message } => {
                write!(f, "editor `{command}` unavailable: {message}")
            }
            Self::StoreWriteFailed(err) => write!(f, "failed to save note: {err}"),
            Self::ExportPartialFailure(report) => write!(
                f,
                "export finished with {} failure(s); {} note(s) written",
                report.failures.len(),
                report.notes_written
            ),
            Self::Store(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StoreWriteFailed(err) | Self::Store(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResolveError> for CoreError {
    fn from(value: ResolveError) -> Self {
        match value {
            ResolveError::NotFound { token } => Self::NotFound(format!("`{token}`")),
            ResolveError::Ambiguous { token, matches } => Self::Ambiguous { token, matches },
        }
    }
}

impl From<CursorError> for CoreError {
    fn from(value: CursorError) -> Self {
        match value {
            CursorError::InvalidTarget(id) => Self::InvalidTarget(id),
        }
    }
}

impl From<TreeError> for CoreError {
    fn from(value: TreeError) -> Self {
        match value {
            TreeError::NotFound(id) => Self::NotFound(id.to_string()),
            err @ TreeError::CorruptHierarchy { .. } => Self::CorruptHierarchy(err.to_string()),
        }
    }
}

impl From<SearchError> for CoreError {
    fn from(value: SearchError) -> Self {
        match value {
            SearchError::InvalidQuery { query, message } => Self::InvalidQuery { query, message },
            SearchError::Store(err) => Self::Store(err),
        }
    }
}

impl From<EditError> for CoreError {
    fn from(value: EditError) -> Self {
        match value {
            EditError::EditorUnavailable { command, message } => {
                Self::EditorUnavailable { command, message }
            }
            EditError::StoreWriteFailed(err) => Self::StoreWriteFailed(err),
            EditError::Io(err) => Self::Io(err),
        }
    }
}

impl From<ExportError> for CoreError {
    fn from(value: ExportError) -> Self {
        match value {
            ExportError::NotFound(id) => Self::NotFound(id.to_string()),
            ExportError::CorruptHierarchy(err) => Self::CorruptHierarchy(err.to_string()),
            ExportError::Destination { path, source } => Self::Io(io::Error::new(
                source.kind(),
                format!("{}: {source}", path.display()),
            )),
            ExportError::PartialFailure(report) => Self::ExportPartialFailure(report),
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => Self::NotFound(id.to_string()),
            StoreError::InvalidQuery { query, message } => Self::InvalidQuery { query, message },
            other => Self::Store(other),
        }
    }
}

impl From<DbError> for CoreError {
    fn from(value: DbError) -> Self {
        Self::Store(StoreError::Db(value))
    }
}

impl From<io::Error> for CoreError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(test)]
mod tests {
    use super::CoreError;
    use crate::export::{ExportError, ExportReport};
    use crate::model::EntityId;
    use crate::resolve::ResolveError;
    use crate::tree::TreeError;

    #[test]
    fn resolver_errors_are_recoverable() {
        let err = CoreError::from(ResolveError::Ambiguous {
            token: "ab".to_string(),
            matches: Vec::new(),
        });
        assert!(err.is_recoverable());
    }

    #[test]
    fn corrupt_hierarchy_is_not_recoverable() {
        let err = CoreError::from(TreeError::CorruptHierarchy {
            folder_id: EntityId::new("a"),
            cycle: vec![EntityId::new("a"), EntityId::new("b"), EntityId::new("a")],
        });
        assert!(matches!(err, CoreError::CorruptHierarchy(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn partial_export_keeps_report() {
        let report = ExportReport {
            notes_written: 3,
            ..ExportReport::default()
        };
        let err = CoreError::from(ExportError::PartialFailure(report));
        assert!(err.to_string().contains("3 note(s) written"));
    }
}
